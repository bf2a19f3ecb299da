use crate::Context;
use crate::cli::{ApplyArgs, Paths};
use crate::commands::{Workspace, plan};
use crate::display;
use crate::progress::{BarProgress, PromptConfirm};
use crate::session::ClientSession;
use crate::ui;
use anyhow::{Result, bail};
use colored::Colorize;
use declarative::{
    AutoConfirm, ExecuteOptions, ExecuteReport, ExecutionPlan, Provider, execute,
};

/// Execute a plan with terminal progress, prompting unless `yes`
pub fn execute_plan(
    ctx: &Context,
    provider: &Provider<dyn ClientSession>,
    session: &(dyn ClientSession + 'static),
    plan: ExecutionPlan,
    opts: ExecuteOptions,
    yes: bool,
) -> Result<ExecuteReport> {
    let mut progress = BarProgress::new(ctx.verbose > 0);
    if yes {
        execute(provider, session, plan, opts, &mut progress, &mut AutoConfirm)
    } else {
        execute(provider, session, plan, opts, &mut progress, &mut PromptConfirm)
    }
}

pub fn run(ctx: &Context, paths: &Paths, args: ApplyArgs) -> Result<()> {
    let mut workspace = Workspace::load(paths)?;
    let plan = plan::build(&workspace, args.target.as_deref())?;

    if !ctx.quiet {
        display::display_plan(&plan);
    }
    if plan.is_empty() {
        return Ok(());
    }
    if args.dry_run {
        println!();
        ui::info("Dry run - no changes made");
        return Ok(());
    }

    let session = workspace.session()?;
    let opts = ExecuteOptions {
        dry_run: false,
        jobs: usize::from(args.jobs.max(1)),
        verbose: ctx.verbose > 0,
    };
    let report = execute_plan(
        ctx,
        &workspace.provider,
        &session,
        plan,
        opts,
        args.yes,
    )?;

    if report.summary.skipped > 0 && report.summary.total_changes() == 0 {
        println!();
        println!("  {} Aborted", "✗".red());
        return Ok(());
    }

    workspace.record(&report)?;
    display::print_summary(&report.summary, "Apply");

    if !report.summary.is_success() {
        bail!("{} change(s) failed", report.summary.failed);
    }
    Ok(())
}

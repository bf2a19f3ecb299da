use crate::Context;
use crate::cli::{DestroyArgs, Paths};
use crate::commands::Workspace;
use crate::commands::apply::execute_plan;
use crate::display;
use crate::ui;
use anyhow::{Result, bail};
use declarative::{ExecuteOptions, ExecutionPlan};

/// Delete every managed instance, or those matching `--target`
pub fn run(ctx: &Context, paths: &Paths, args: DestroyArgs) -> Result<()> {
    let mut workspace = Workspace::load_state_only(paths)?;
    let plan = ExecutionPlan::destroy(&workspace.instances).filter_by_target(args.target.as_deref());

    if plan.is_empty() {
        ui::info("Nothing to destroy");
        return Ok(());
    }
    if !ctx.quiet {
        display::display_plan(&plan);
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

    workspace.record(&report)?;
    display::print_summary(&report.summary, "Destroy");

    if !report.summary.is_success() {
        bail!("{} deletion(s) failed", report.summary.failed);
    }
    Ok(())
}

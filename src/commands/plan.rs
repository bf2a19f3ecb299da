use crate::Context;
use crate::cli::Paths;
use crate::commands::Workspace;
use crate::display;
use anyhow::Result;
use declarative::ExecutionPlan;

/// Build the plan for a workspace, limited to `target`
pub fn build(workspace: &Workspace, target: Option<&str>) -> Result<ExecutionPlan> {
    let desired = workspace.config.desired()?;
    let plan = ExecutionPlan::build(&workspace.provider, &desired, &workspace.instances)?;
    Ok(plan.filter_by_target(target))
}

/// Show what apply would change
///
/// Works from persisted state; run `refresh` first to pick up remote drift.
pub fn run(ctx: &Context, paths: &Paths, target: Option<&str>) -> Result<()> {
    let workspace = Workspace::load(paths)?;
    let plan = build(&workspace, target)?;

    if ctx.quiet {
        let summary = plan.summary();
        println!(
            "{} to add, {} to change, {} to replace, {} to destroy",
            summary.additions, summary.modifications, summary.replacements, summary.removals
        );
    } else {
        display::display_plan(&plan);
    }
    Ok(())
}

use crate::Context;
use crate::cli::Paths;
use crate::commands::Workspace;
use crate::ui;
use anyhow::{Result, bail};
use colored::Colorize;
use declarative::validate_desired;

/// Check every configured instance against its schema, offline
pub fn run(ctx: &Context, paths: &Paths) -> Result<()> {
    let workspace = Workspace::load(paths)?;
    let desired = workspace.config.desired()?;
    let problems = validate_desired(&workspace.provider, &desired);

    if !problems.is_empty() {
        ui::header("Configuration problems");
        for problem in &problems {
            println!("  {} {}", "✗".red(), problem);
        }
        bail!("{} problem(s) found in {}", problems.len(), paths.config.display());
    }

    if !ctx.quiet {
        ui::success(&format!(
            "Configuration is valid ({} instance(s))",
            desired.len()
        ));
    }
    Ok(())
}

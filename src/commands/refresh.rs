use crate::Context;
use crate::cli::Paths;
use crate::commands::Workspace;
use crate::session::ClientSession;
use crate::ui;
use anyhow::{Result, bail};
use colored::Colorize;
use declarative::refresh_all;

/// Re-read every managed instance; instances gone remotely leave state
pub fn run(ctx: &Context, paths: &Paths, jobs: u16) -> Result<()> {
    let mut workspace = Workspace::load_state_only(paths)?;
    if workspace.instances.is_empty() {
        ui::info("No managed instances to refresh");
        return Ok(());
    }

    let session = workspace.session()?;
    let results = refresh_all(
        &workspace.provider,
        &session as &dyn ClientSession,
        &workspace.instances,
        usize::from(jobs.max(1)),
    )?;

    let mut updated = 0;
    let mut dropped = 0;
    let mut failures = Vec::new();
    for (address, result) in results {
        match result {
            Ok(Some(state)) => {
                if ctx.verbose > 0 {
                    println!("  {} {}", "✓".green(), address);
                }
                workspace.instances.insert(address, state);
                updated += 1;
            }
            Ok(None) => {
                ui::warn(&format!("{} no longer exists and was removed from state", address));
                workspace.instances.remove(&address);
                dropped += 1;
            }
            Err(e) => {
                ui::error(&format!("{}: {:#}", address, e));
                failures.push(address);
            }
        }
    }

    workspace.save()?;
    if !ctx.quiet {
        ui::success(&format!(
            "Refreshed {} instance(s), removed {}",
            updated, dropped
        ));
    }

    if !failures.is_empty() {
        bail!("{} instance(s) could not be refreshed", failures.len());
    }
    Ok(())
}

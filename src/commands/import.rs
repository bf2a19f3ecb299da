use crate::Context;
use crate::cli::Paths;
use crate::commands::{Workspace, parse_address};
use crate::session::ClientSession;
use crate::ui;
use anyhow::{Context as AnyhowContext, Result, bail};
use declarative::import_instance;

/// Adopt an existing remote object under `address`
pub fn run(ctx: &Context, paths: &Paths, address: &str, id: &str) -> Result<()> {
    let mut workspace = Workspace::load_state_only(paths)?;
    let address = parse_address(address)?;

    if workspace.instances.contains_key(&address) {
        bail!("{} is already managed; remove it from state first", address);
    }
    let Some(resource) = workspace.provider.resource(&address.resource_type) else {
        bail!("Unknown resource type '{}'", address.resource_type);
    };

    let session = workspace.session()?;
    let state = import_instance(resource, &session as &dyn ClientSession, id)
        .with_context(|| format!("Failed to import {} as {}", id, address))?;

    workspace.instances.insert(address.clone(), state);
    workspace.save()?;

    if !ctx.quiet {
        ui::success(&format!("Imported {} as {}", id, address));
        ui::dim("Add a matching [resource] table to the configuration to keep managing it");
    }
    Ok(())
}

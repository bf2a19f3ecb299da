use crate::Context;
use crate::cli::{Paths, ShowArgs};
use crate::commands::{Workspace, parse_address};
use crate::display::render_value;
use crate::resource::openwhisk_action::{ActionSummary, RESOURCE_TYPE};
use crate::ui;
use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use declarative::InstanceState;

pub fn run(_ctx: &Context, paths: &Paths, args: ShowArgs) -> Result<()> {
    let workspace = Workspace::load_state_only(paths)?;

    let Some(address) = args.address.as_deref() else {
        if args.json {
            println!("{}", serde_json::to_string_pretty(&workspace.state.resources)?);
            return Ok(());
        }
        return list(&workspace);
    };

    let address = parse_address(address)?;
    let state = workspace
        .instances
        .get(&address)
        .with_context(|| format!("No instance {} in state", address))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(state)?);
        return Ok(());
    }

    ui::header(&address.to_string());
    ui::kv("id", &state.id);
    for (name, value) in &state.attributes {
        ui::kv(name, &render_value(Some(value)));
    }
    Ok(())
}

fn list(workspace: &Workspace) -> Result<()> {
    if workspace.instances.is_empty() {
        ui::info("No managed instances");
        return Ok(());
    }

    ui::header(&format!(
        "Managed instances (serial {})",
        workspace.state.serial
    ));
    for (address, state) in &workspace.instances {
        println!("  {} {}", "•".cyan(), address.to_string().bold());
        println!("      {}", describe(&address.resource_type, state).dimmed());
    }
    Ok(())
}

fn describe(resource_type: &str, state: &InstanceState) -> String {
    if resource_type == RESOURCE_TYPE {
        let summary = ActionSummary::from_attributes(&state.attributes);
        format!(
            "{} ({}, version {})",
            summary.name, summary.kind, summary.version
        )
    } else {
        format!("id {}", state.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_describe_action() {
        let state = InstanceState::new(
            "hello",
            json!({"name": "hello", "version": "0.0.2", "exec": [{"kind": "nodejs:20", "code": "x"}]})
                .as_object()
                .cloned()
                .unwrap(),
        );
        assert_eq!(
            describe(RESOURCE_TYPE, &state),
            "hello (nodejs:20, version 0.0.2)"
        );
        assert_eq!(describe("other", &state), "id hello");
    }
}

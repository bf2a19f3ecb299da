//! Command implementations
//!
//! Every command loads what it needs from disk through [`Workspace`], so
//! none of them keeps state between invocations.

pub mod apply;
pub mod destroy;
pub mod import;
pub mod plan;
pub mod refresh;
pub mod show;
pub mod validate;

use crate::cli::Paths;
use crate::config::WorkspaceConfig;
use crate::provider::provider;
use crate::session::{ClientSession, Session};
use crate::state::WorkspaceState;
use anyhow::{Context as AnyhowContext, Result};
use declarative::{Address, ExecuteReport, InstanceState, Provider};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Configuration, state and provider of one workspace
pub struct Workspace {
    pub config: WorkspaceConfig,
    pub state: WorkspaceState,
    pub instances: BTreeMap<Address, InstanceState>,
    pub provider: Provider<dyn ClientSession>,
    state_path: PathBuf,
}

impl Workspace {
    /// Load configuration and state
    pub fn load(paths: &Paths) -> Result<Self> {
        let config = WorkspaceConfig::load(&paths.config)?;
        Self::with_config(config, paths)
    }

    /// Load state only; for commands that work without a configuration file
    pub fn load_state_only(paths: &Paths) -> Result<Self> {
        let config = if paths.config.exists() {
            WorkspaceConfig::load(&paths.config)?
        } else {
            WorkspaceConfig::default()
        };
        Self::with_config(config, paths)
    }

    fn with_config(config: WorkspaceConfig, paths: &Paths) -> Result<Self> {
        let state = WorkspaceState::load(&paths.state)?;
        let instances = state.instances()?;
        Ok(Self {
            config,
            state,
            instances,
            provider: provider()?,
            state_path: paths.state.clone(),
        })
    }

    /// Session built from the resolved provider settings
    pub fn session(&self) -> Result<Session> {
        let config = self
            .config
            .provider
            .resolve()
            .context("Cannot configure the OpenWhisk client")?;
        log::debug!(
            "Using OpenWhisk at {} (namespace {})",
            config.base_url(),
            config.namespace
        );
        Ok(Session::new(config))
    }

    /// Record executed outcomes and persist state
    pub fn record(&mut self, report: &ExecuteReport) -> Result<()> {
        if report.outcomes.is_empty() {
            return Ok(());
        }
        report.apply_to(&mut self.instances);
        self.save()
    }

    pub fn save(&mut self) -> Result<()> {
        self.state.set_instances(&self.instances);
        self.state.save(&self.state_path)
    }
}

/// Parse a `type.label` address given on the command line
pub fn parse_address(address: &str) -> Result<Address> {
    Address::parse(address).with_context(|| {
        format!(
            "Invalid address '{}', expected <type>.<label> (e.g. ibm_openwhisk_action.hello)",
            address
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn paths(dir: &TempDir) -> Paths {
        Paths {
            config: dir.path().join("whiskform.toml"),
            state: dir.path().join("whiskform.state.json"),
        }
    }

    #[test]
    fn test_parse_address() {
        let address = parse_address("ibm_openwhisk_action.hello").unwrap();
        assert_eq!(address.label, "hello");
        assert!(parse_address("hello").is_err());
    }

    #[test]
    fn test_load_requires_config() {
        let dir = TempDir::new().unwrap();
        assert!(Workspace::load(&paths(&dir)).is_err());
        assert!(Workspace::load_state_only(&paths(&dir)).is_ok());
    }

    #[test]
    fn test_save_round_trip() {
        let dir = TempDir::new().unwrap();
        let paths = paths(&dir);
        fs::write(&paths.config, "").unwrap();

        let mut workspace = Workspace::load(&paths).unwrap();
        workspace.instances.insert(
            Address::new("ibm_openwhisk_action", "hello"),
            InstanceState::new("hello", Default::default()),
        );
        workspace.save().unwrap();

        let reloaded = Workspace::load(&paths).unwrap();
        assert_eq!(reloaded.instances.len(), 1);
        assert_eq!(reloaded.state.serial, 1);
    }
}

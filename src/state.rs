//! Persisted instance state
//!
//! One JSON document per workspace, keyed by resource address. Every save
//! bumps the serial and goes through a temporary file and a rename.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use declarative::{Address, Attributes, InstanceState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Current layout version of the state file
pub const STATE_VERSION: u32 = 1;

/// State of one managed instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub id: String,
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceState {
    pub version: u32,

    /// Incremented on every save
    pub serial: u64,

    pub last_updated: DateTime<Utc>,

    /// Instances keyed by `type.label`
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceEntry>,
}

impl Default for WorkspaceState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            serial: 0,
            last_updated: Utc::now(),
            resources: BTreeMap::new(),
        }
    }
}

impl WorkspaceState {
    /// Load state from disk, or return default if file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file does not exist, using empty state");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;
        let state: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        if state.version > STATE_VERSION {
            anyhow::bail!(
                "State file {} has version {}, newer than supported version {}",
                path.display(),
                state.version,
                STATE_VERSION
            );
        }

        log::debug!(
            "Loaded state serial {} from {}",
            state.serial,
            path.display()
        );
        Ok(state)
    }

    /// Save state to disk
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.serial += 1;
        self.last_updated = Utc::now();

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| {
                format!("Failed to create state directory: {}", dir.display())
            })?;
        }

        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize state to JSON")?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, content)
            .with_context(|| format!("Failed to write state file: {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace state file: {}", path.display()))?;

        log::debug!("Saved state serial {} to {}", self.serial, path.display());
        Ok(())
    }

    /// Instances keyed by address
    pub fn instances(&self) -> Result<BTreeMap<Address, InstanceState>> {
        self.resources
            .iter()
            .map(|(key, entry)| {
                let address = Address::parse(key)
                    .with_context(|| format!("Invalid resource address in state: '{}'", key))?;
                Ok((
                    address,
                    InstanceState::new(entry.id.clone(), entry.attributes.clone()),
                ))
            })
            .collect()
    }

    /// Replace every instance with `instances`
    pub fn set_instances(&mut self, instances: &BTreeMap<Address, InstanceState>) {
        self.resources = instances
            .iter()
            .map(|(address, state)| {
                (
                    address.to_string(),
                    ResourceEntry {
                        id: state.id.clone(),
                        attributes: state.attributes.clone(),
                    },
                )
            })
            .collect();
    }
}

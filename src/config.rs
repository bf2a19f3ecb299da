//! Workspace configuration: provider settings and declared resources
//!
//! Provider settings resolve from the environment first, then the
//! `[provider]` table, then `~/.wskprops` as written by the `wsk` CLI.

use anyhow::{Context, Result, bail};
use declarative::{Address, Attributes};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_API_HOST: &str = "OPENWHISK_API_HOST";
pub const ENV_AUTH_KEY: &str = "OPENWHISK_AUTH_KEY";
pub const ENV_NAMESPACE: &str = "OPENWHISK_NAMESPACE";

/// Overrides the location of the wsk properties file
const ENV_WSK_CONFIG_FILE: &str = "WSK_CONFIG_FILE";

/// Expand `~` in a user supplied path
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

// ============================================================================
// Workspace file
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_host: Option<String>,
    #[serde(default)]
    pub auth_key: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Contents of `whiskform.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    /// `[resource.<type>.<label>]` tables
    #[serde(default)]
    pub resource: BTreeMap<String, BTreeMap<String, toml::Table>>,
}

impl WorkspaceConfig {
    /// Load a workspace file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Declared instances keyed by address
    pub fn desired(&self) -> Result<BTreeMap<Address, Attributes>> {
        let mut desired = BTreeMap::new();
        for (resource_type, instances) in &self.resource {
            for (label, table) in instances {
                let address = Address::new(resource_type, label);
                let Value::Object(attributes) = serde_json::to_value(table)
                    .with_context(|| format!("{}: cannot convert attributes", address))?
                else {
                    bail!("{}: expected a table of attributes", address);
                };
                desired.insert(address, attributes);
            }
        }
        Ok(desired)
    }
}

// ============================================================================
// wsk properties
// ============================================================================

/// Settings read from a `.wskprops` file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WskProps {
    pub api_host: Option<String>,
    pub auth: Option<String>,
    pub namespace: Option<String>,
}

impl WskProps {
    /// Parse `KEY=VALUE` lines; unknown keys and comments are ignored
    pub fn parse(content: &str) -> Self {
        let mut props = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
            match key.trim() {
                "APIHOST" => props.api_host = value,
                "AUTH" => props.auth = value,
                "NAMESPACE" => props.namespace = value,
                _ => {}
            }
        }
        props
    }

    /// Load from `$WSK_CONFIG_FILE` or `~/.wskprops`, if present
    pub fn load_default() -> Result<Option<Self>> {
        let path = match std::env::var(ENV_WSK_CONFIG_FILE) {
            Ok(path) if !path.is_empty() => expand_path(&path),
            _ => match dirs::home_dir() {
                Some(home) => home.join(".wskprops"),
                None => return Ok(None),
            },
        };
        Self::load(&path)
    }

    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            log::debug!("No wsk properties at {}", path.display());
            return Ok(None);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        Ok(Some(Self::parse(&content)))
    }
}

// ============================================================================
// Resolution
// ============================================================================

impl ProviderConfig {
    /// Resolve client settings from the process environment and `.wskprops`
    pub fn resolve(&self) -> Result<openwhisk::Config> {
        let props = WskProps::load_default()?.unwrap_or_default();
        self.resolve_with(|key| std::env::var(key).ok(), &props)
    }

    /// Resolve client settings with an explicit environment lookup
    pub fn resolve_with<F>(&self, env: F, props: &WskProps) -> Result<openwhisk::Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |key: &str, table: &Option<String>, props: &Option<String>| {
            env(key)
                .filter(|v| !v.is_empty())
                .or_else(|| table.clone())
                .or_else(|| props.clone())
        };

        let Some(api_host) = pick(ENV_API_HOST, &self.api_host, &props.api_host) else {
            bail!(
                "No OpenWhisk API host configured (set {} or provider.api_host)",
                ENV_API_HOST
            );
        };
        let Some(auth_key) = pick(ENV_AUTH_KEY, &self.auth_key, &props.auth) else {
            bail!(
                "No OpenWhisk auth key configured (set {} or provider.auth_key)",
                ENV_AUTH_KEY
            );
        };

        let mut config = openwhisk::Config::new(api_host, auth_key);
        if let Some(namespace) = pick(ENV_NAMESPACE, &self.namespace, &props.namespace) {
            config = config.namespace(namespace);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.timeout(Duration::from_secs(secs));
        }

        config.validate().context("Invalid provider configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
[provider]
api_host = "https://openwhisk.example.com"
auth_key = "uuid:key"
timeout_secs = 30

[resource.ibm_openwhisk_action.hello]
name = "hello"
publish = true
parameters = '[{"key":"greeting","value":"hi"}]'
exec = [{ kind = "nodejs:20", code = "function main() { return {}; }" }]
limits = [{ timeout = 60000, memory = 256 }]
"#;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_workspace() {
        let config = WorkspaceConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.provider.timeout_secs, Some(30));

        let desired = config.desired().unwrap();
        let attrs = &desired[&Address::new("ibm_openwhisk_action", "hello")];
        assert_eq!(attrs["name"], json!("hello"));
        assert_eq!(attrs["publish"], json!(true));
        assert_eq!(attrs["exec"][0]["kind"], json!("nodejs:20"));
        assert_eq!(attrs["limits"], json!([{"timeout": 60000, "memory": 256}]));
    }

    #[test]
    fn test_unknown_top_level_key_is_rejected() {
        assert!(WorkspaceConfig::parse("[providers]\napi_host = \"x\"").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = WorkspaceConfig::load(&dir.path().join("whiskform.toml")).unwrap_err();
        assert!(err.to_string().contains("Could not read"));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("whiskform.toml");
        fs::write(&path, SAMPLE).unwrap();
        let config = WorkspaceConfig::load(&path).unwrap();
        assert_eq!(config.desired().unwrap().len(), 1);
    }

    #[test]
    fn test_wskprops_parse() {
        let props = WskProps::parse(
            "# comment\nAPIHOST=openwhisk.example.com\nAUTH=a:b\nNAMESPACE=\nAPIGW_ACCESS_TOKEN=x\n",
        );
        assert_eq!(props.api_host.as_deref(), Some("openwhisk.example.com"));
        assert_eq!(props.auth.as_deref(), Some("a:b"));
        assert_eq!(props.namespace, None);
    }

    #[test]
    fn test_wskprops_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".wskprops");
        assert!(WskProps::load(&path).unwrap().is_none());

        fs::write(&path, "AUTH=a:b\n").unwrap();
        let props = WskProps::load(&path).unwrap().unwrap();
        assert_eq!(props.auth.as_deref(), Some("a:b"));
    }

    #[test]
    fn test_resolve_precedence() {
        let table = ProviderConfig {
            api_host: Some("table.example.com".into()),
            auth_key: None,
            namespace: Some("table-ns".into()),
            timeout_secs: Some(5),
        };
        let props = WskProps {
            api_host: Some("props.example.com".into()),
            auth: Some("props:key".into()),
            namespace: Some("props-ns".into()),
        };

        let config = table
            .resolve_with(env(&[(ENV_NAMESPACE, "env-ns")]), &props)
            .unwrap();
        assert_eq!(config.api_host, "table.example.com");
        assert_eq!(config.auth_key, "props:key");
        assert_eq!(config.namespace, "env-ns");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_resolve_requires_host_and_key() {
        let empty = ProviderConfig::default();
        let err = empty
            .resolve_with(env(&[]), &WskProps::default())
            .unwrap_err();
        assert!(err.to_string().contains(ENV_API_HOST));

        let err = empty
            .resolve_with(env(&[(ENV_API_HOST, "localhost")]), &WskProps::default())
            .unwrap_err();
        assert!(err.to_string().contains(ENV_AUTH_KEY));

        let err = empty
            .resolve_with(
                env(&[(ENV_API_HOST, "localhost"), (ENV_AUTH_KEY, "nocolon")]),
                &WskProps::default(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("Invalid provider configuration"));
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(expand_path("state.json"), PathBuf::from("state.json"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/x.toml"), home.join("x.toml"));
        }
    }
}

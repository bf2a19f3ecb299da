//! Client configuration.

use crate::error::{Error, Result};
use std::time::Duration;

/// Namespace placeholder resolved by the platform to the caller's default.
pub const DEFAULT_NAMESPACE: &str = "_";

/// Default timeout for a single HTTP exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for an OpenWhisk deployment.
///
/// # Example
///
/// ```
/// use openwhisk::Config;
///
/// let config = Config::new("openwhisk.example.com", "user:secret").namespace("guest");
/// assert_eq!(config.base_url(), "https://openwhisk.example.com");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// API host, with or without scheme.
    pub api_host: String,
    /// Auth key in `<uuid>:<key>` form.
    pub auth_key: String,
    /// Namespace to manage actions in.
    pub namespace: String,
    /// Global timeout applied to each request.
    pub timeout: Duration,
}

impl Config {
    /// Create a config for the default namespace.
    pub fn new(api_host: impl Into<String>, auth_key: impl Into<String>) -> Self {
        Self {
            api_host: api_host.into(),
            auth_key: auth_key.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// API host as an absolute URL. Hosts without a scheme use https.
    #[must_use]
    pub fn base_url(&self) -> String {
        let host = self.api_host.trim().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        }
    }

    /// Check that the settings are usable.
    pub fn validate(&self) -> Result<()> {
        if self.api_host.trim().is_empty() {
            return Err(Error::Config("API host is not set".to_string()));
        }
        match self.auth_key.split_once(':') {
            Some((user, key)) if !user.is_empty() && !key.is_empty() => {}
            _ => {
                return Err(Error::Config(
                    "auth key must have the form <uuid>:<key>".to_string(),
                ));
            }
        }
        if self.namespace.trim().is_empty() {
            return Err(Error::Config("namespace is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new("localhost", "a:b");
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_base_url_keeps_scheme() {
        assert_eq!(
            Config::new("http://127.0.0.1:3233/", "a:b").base_url(),
            "http://127.0.0.1:3233"
        );
        assert_eq!(
            Config::new("us-south.functions.cloud.ibm.com", "a:b").base_url(),
            "https://us-south.functions.cloud.ibm.com"
        );
    }

    #[test]
    fn test_validate_rejects_bad_auth() {
        assert!(Config::new("host", "no-colon").validate().is_err());
        assert!(Config::new("host", ":key").validate().is_err());
        assert!(Config::new("host", "user:").validate().is_err());
        assert!(Config::new("", "a:b").validate().is_err());
        assert!(Config::new("host", "a:b").namespace(" ").validate().is_err());
    }
}

//! HTTP action service.
//!
//! Talks to `{api_host}/api/v1/namespaces/{namespace}/actions/{name}` with
//! HTTP Basic authentication. Every call is a single blocking request; there
//! are no retries.

use crate::backend::ActionService;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::Action;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use ureq::Body;
use ureq::http::Response;
use url::Url;

const USER_AGENT: &str = concat!("openwhisk-rs/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP implementation of [`ActionService`].
///
/// # Example
///
/// ```no_run
/// use openwhisk::backend::ActionService;
/// use openwhisk::backend::http::HttpActionService;
/// use openwhisk::Config;
///
/// let service = HttpActionService::new(&Config::new("openwhisk.example.com", "user:key")).unwrap();
/// let action = service.get("hello").unwrap();
/// println!("{} is at version {}", action.name, action.version);
/// ```
pub struct HttpActionService {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// `.../namespaces/{ns}/actions` collection URL.
    collection: Url,
    /// Precomputed `Authorization` header value.
    authorization: String,
}

impl HttpActionService {
    /// Create a service from a validated config.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let mut collection = Url::parse(&config.base_url())
            .map_err(|e| Error::Config(format!("invalid API host '{}': {}", config.api_host, e)))?;
        {
            let mut segments = collection.path_segments_mut().map_err(|()| {
                Error::Config(format!("API host '{}' cannot carry a path", config.api_host))
            })?;
            segments
                .pop_if_empty()
                .extend(["api", "v1", "namespaces"])
                .push(&config.namespace)
                .push("actions");
        }

        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false)
            .build();

        Ok(Self {
            agent: ureq::Agent::new_with_config(agent_config),
            collection,
            authorization: format!("Basic {}", STANDARD.encode(&config.auth_key)),
        })
    }

    /// Collection URL the service targets.
    #[must_use]
    pub fn collection_url(&self) -> &str {
        self.collection.as_str()
    }

    /// Build the URL for a (possibly package-qualified) action name.
    fn action_url(&self, name: &str) -> Result<Url> {
        if name.is_empty() {
            return Err(Error::Config("action name is empty".to_string()));
        }

        let mut url = self.collection.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                Error::Config(format!("cannot build action URL from {}", self.collection))
            })?;
            segments.extend(name.split('/'));
        }
        Ok(url)
    }
}

impl ActionService for HttpActionService {
    fn insert(&self, name: &str, action: &Action, overwrite: bool) -> Result<Action> {
        let url = self.action_url(name)?;
        log::debug!("PUT {} (overwrite={})", url, overwrite);

        let response = self
            .agent
            .put(url.as_str())
            .query("overwrite", if overwrite { "true" } else { "false" })
            .header("Authorization", self.authorization.as_str())
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .send_json(action)?;

        read_response(response)
    }

    fn get(&self, name: &str) -> Result<Action> {
        let url = self.action_url(name)?;
        log::debug!("GET {}", url);

        let response = self
            .agent
            .get(url.as_str())
            .query("code", "true")
            .header("Authorization", self.authorization.as_str())
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .call()?;

        read_response(response)
    }

    fn delete(&self, name: &str) -> Result<()> {
        let url = self.action_url(name)?;
        log::debug!("DELETE {}", url);

        let response = self
            .agent
            .delete(url.as_str())
            .header("Authorization", self.authorization.as_str())
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .call()?;

        read_body(response).map(|_| ())
    }
}

// =============================================================================
// Response handling
// =============================================================================

/// Error body returned by the platform on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

fn read_response<T: DeserializeOwned>(response: Response<Body>) -> Result<T> {
    let text = read_body(response)?;
    serde_json::from_str(&text).map_err(Into::into)
}

/// Read the body of a successful response, or turn the failure into an error.
fn read_body(mut response: Response<Body>) -> Result<String> {
    let status = response.status().as_u16();
    let text = response.body_mut().read_to_string()?;
    log::trace!("HTTP {} body: {}", status, text);

    if (200..300).contains(&status) {
        Ok(text)
    } else {
        Err(api_error(status, &text))
    }
}

fn api_error(status: u16, body: &str) -> Error {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => Error::Api {
            status,
            message: parsed.error,
            code: parsed.code.map(|c| match c {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            }),
        },
        Err(_) if body.trim().is_empty() => Error::api(status, format!("HTTP {}", status)),
        Err(_) => Error::api(status, body.trim()),
    }
}

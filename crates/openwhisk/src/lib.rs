//! # openwhisk
//!
//! Blocking Rust client for the Apache OpenWhisk actions API.
//!
//! This crate provides:
//! - Typed wire models for actions ([`Action`], [`Exec`], [`Limits`], [`KeyValue`])
//! - The [`ActionService`](backend::ActionService) seam with an HTTP
//!   implementation and an in-memory mock
//! - Categorized errors that tell a missing action apart from transport failures
//!
//! ## Example
//!
//! ```no_run
//! use openwhisk::{Action, Client, Config};
//!
//! let client = Client::new(Config::new("openwhisk.example.com", "user:key"))?;
//! let action = client.actions().get("hello")?;
//! println!("{} ({})", action, action.version);
//! # Ok::<(), openwhisk::Error>(())
//! ```
//!
//! Numbers inside annotation and parameter values keep their original
//! literal text (serde_json's `arbitrary_precision`), so values such as
//! `9007199254740993` survive a fetch/store cycle unchanged.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod config;
pub mod error;
pub mod types;

pub use backend::{ActionService, MockActionService, Request};
pub use config::Config;
pub use error::{Error, ErrorCategory, Result};
pub use types::{Action, DEFAULT_VERSION, EXEC_ANNOTATION, Exec, KeyValue, KeyValueArr, Limits};

use backend::http::HttpActionService;

/// Handle on one namespace of an OpenWhisk deployment.
///
/// # Example
///
/// ```
/// use openwhisk::{Action, Client, MockActionService};
///
/// let mock = MockActionService::new();
/// let client = Client::with_service("guest", Box::new(mock.clone()));
///
/// client.actions().insert("hello", &Action::named("hello"), false).unwrap();
/// assert!(mock.stored("hello").is_some());
/// ```
pub struct Client {
    namespace: String,
    actions: Box<dyn ActionService>,
}

impl Client {
    /// Create a client backed by the HTTP service.
    pub fn new(config: Config) -> Result<Self> {
        let actions = HttpActionService::new(&config)?;
        Ok(Self {
            namespace: config.namespace,
            actions: Box::new(actions),
        })
    }

    /// Create a client with a custom service (useful for testing).
    #[must_use]
    pub fn with_service(namespace: impl Into<String>, actions: Box<dyn ActionService>) -> Self {
        Self {
            namespace: namespace.into(),
            actions,
        }
    }

    /// Namespace this client manages.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Action operations.
    #[must_use]
    pub fn actions(&self) -> &dyn ActionService {
        self.actions.as_ref()
    }
}

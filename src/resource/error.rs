//! Errors raised by OpenWhisk resources

use thiserror::Error;

/// Failure of an action lifecycle operation
#[derive(Debug, Error)]
pub enum ActionError {
    /// Configuration rejected before any remote call
    #[error("invalid configuration: {0}")]
    Validation(String),

    /// A JSON attribute is not a list of key/value entries
    #[error("{field} must be a JSON list of {{\"key\", \"value\"}} objects")]
    Parse {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Encoding remote data for state failed
    #[error("cannot encode {field}")]
    Serialization {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The API call failed
    #[error("{context}")]
    Remote {
        context: String,
        #[source]
        source: openwhisk::Error,
    },

    /// An existence check failed for a reason other than "not found"
    #[error("Error communicating with OpenWhisk Client")]
    Communication(#[source] openwhisk::Error),

    /// No client could be obtained from the session
    #[error("cannot obtain an OpenWhisk client")]
    Session(#[source] openwhisk::Error),
}

impl ActionError {
    pub fn remote(context: impl Into<String>, source: openwhisk::Error) -> Self {
        Self::Remote {
            context: context.into(),
            source,
        }
    }

    /// Whether the remote system reported the action missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Remote { source, .. } if source.is_not_found())
    }
}

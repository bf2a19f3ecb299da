//! Error types for OpenWhisk client operations.
//!
//! Errors are categorized so callers can tell a missing action (404) apart
//! from transport failures and give the user an actionable hint.

use std::fmt;

/// Result type alias for OpenWhisk operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of client errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transport-level failure (DNS, TLS, connection reset, timeout).
    Network,
    /// The requested entity does not exist.
    NotFound,
    /// The entity already exists and overwrite was not requested.
    Conflict,
    /// Credentials were rejected.
    Unauthorized,
    /// The response could not be decoded.
    Format,
    /// The client configuration is unusable.
    Config,
    /// Any other API failure.
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::NotFound => "Action not found",
            Self::Conflict => "Action already exists",
            Self::Unauthorized => "Authentication failed",
            Self::Format => "Invalid API response",
            Self::Config => "Invalid client configuration",
            Self::Other => "Unexpected API error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check the API host and your network connection",
            Self::NotFound => "Verify the action name and namespace",
            Self::Conflict => "Set overwrite = true to replace the existing action",
            Self::Unauthorized => "Check the auth key (expected <uuid>:<key>)",
            Self::Format => "The API host may not be an OpenWhisk endpoint",
            Self::Config => "Check the [provider] settings or OPENWHISK_* variables",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to OpenWhisk.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP transport failed before a response was received.
    #[error("HTTP request failed: {message}")]
    HttpError {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// The API answered with a non-success status.
    #[error("OpenWhisk API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message reported by the platform.
        message: String,
        /// Platform activation/transaction code, if any.
        code: Option<String>,
    },

    /// Invalid response from API.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// Client configuration problem.
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl Error {
    /// Create an HTTP transport error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::HttpError {
            message: message.into(),
            status,
        }
    }

    /// Create an API error without a platform code.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            code: None,
        }
    }

    /// The 404 error the platform returns for a missing action.
    pub fn not_found(name: &str) -> Self {
        Self::api(404, format!("The requested resource '{}' does not exist.", name))
    }

    /// HTTP status carried by this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpError { status, .. } => *status,
            Self::Api { status, .. } => Some(*status),
            Self::InvalidResponse(_) | Self::Config(_) => None,
        }
    }

    /// Whether the remote reported the entity as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::HttpError { status: None, .. } => ErrorCategory::Network,
            Error::HttpError {
                status: Some(status),
                ..
            }
            | Error::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Unauthorized,
                404 => ErrorCategory::NotFound,
                409 => ErrorCategory::Conflict,
                _ => ErrorCategory::Other,
            },
            Error::InvalidResponse(_) => ErrorCategory::Format,
            Error::Config(_) => ErrorCategory::Config,
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::HttpError {
                message: format!("HTTP {}", code),
                status: Some(code),
            },
            other => Self::HttpError {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

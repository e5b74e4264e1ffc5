//! Bugzilla-specific error types.

use thiserror::Error;

/// Bugzilla connector errors.
#[derive(Error, Debug)]
pub enum BugzillaError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bugzilla answered with an error document
    #[error("Bugzilla API error {code}: {message}")]
    Api { code: i64, message: String },

    /// Non-success status without a parseable error document
    #[error("Bugzilla returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BugzillaError {
    /// HTTP status associated with this error, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Convert to the core error type.
    #[must_use]
    pub fn to_core_error(&self) -> nocrash_core::Error {
        match self {
            Self::Config(message) => {
                nocrash_core::ConfigError::ValidationError(format!("bugzilla: {message}")).into()
            }
            _ => nocrash_core::Error::Service {
                service: "bugzilla",
                message: self.to_string(),
                status_code: self.status_code(),
            },
        }
    }
}

impl From<BugzillaError> for nocrash_core::Error {
    fn from(err: BugzillaError) -> Self {
        err.to_core_error()
    }
}

/// Result type for Bugzilla operations.
pub type BugzillaResult<T> = Result<T, BugzillaError>;

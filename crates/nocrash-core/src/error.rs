//! Error types for nocrash-core.

use thiserror::Error;

/// Configuration loading and validation failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {0}: {1}")]
    ReadFailed(String, String),

    /// The configuration file is not valid TOML for the expected schema.
    #[error("failed to parse config: {0}")]
    ParseFailed(String),

    /// A value parsed fine but is out of range or inconsistent.
    #[error("invalid config: {0}")]
    ValidationError(String),
}

/// Errors surfaced by a triage run.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The crash service answered a batch query but flagged it as failed.
    ///
    /// Fatal: the run produces no candidates.
    #[error("crash query for batch {batch} reported errors: {}", .errors.join("; "))]
    RemoteQuery { batch: usize, errors: Vec<String> },

    /// A remote service could not be reached or returned an unusable response.
    #[error("{service} request failed: {message}")]
    Service {
        service: &'static str,
        message: String,
        status_code: Option<u16>,
    },

    /// The batch planner was handed nothing to plan.
    #[error("cannot plan query batches for an empty signature set")]
    EmptySignatureSet,

    /// The query window cannot be represented as calendar dates.
    #[error("invalid query window: {0}")]
    InvalidWindow(String),
}

impl Error {
    /// Shorthand for a [`Error::Service`] without an HTTP status.
    pub fn service(service: &'static str, message: impl Into<String>) -> Self {
        Self::Service {
            service,
            message: message.into(),
            status_code: None,
        }
    }

    /// Whether this error came from a remote collaborator rather than local input.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteQuery { .. } | Self::Service { .. })
    }
}

/// Result type for nocrash-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_query_lists_every_error() {
        let err = Error::RemoteQuery {
            batch: 2,
            errors: vec!["shard down".into(), "timeout".into()],
        };
        let rendered = err.to_string();
        assert!(rendered.contains("batch 2"));
        assert!(rendered.contains("shard down; timeout"));
        assert!(err.is_remote());
    }

    #[test]
    fn config_error_is_transparent() {
        let err: Error = ConfigError::ValidationError("weeks must be positive".into()).into();
        assert_eq!(err.to_string(), "invalid config: weeks must be positive");
        assert!(!err.is_remote());
    }

    #[test]
    fn service_helper_has_no_status() {
        let err = Error::service("bugzilla", "connection refused");
        assert!(matches!(
            err,
            Error::Service {
                service: "bugzilla",
                status_code: None,
                ..
            }
        ));
    }
}

//! Socorro-specific error types.

use thiserror::Error;

/// Socorro connector errors.
#[derive(Error, Debug)]
pub enum SocorroError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success status from SuperSearch
    #[error("SuperSearch returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SocorroError {
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
                nocrash_core::ConfigError::ValidationError(format!("socorro: {message}")).into()
            }
            _ => nocrash_core::Error::Service {
                service: "socorro",
                message: self.to_string(),
                status_code: self.status_code(),
            },
        }
    }
}

impl From<SocorroError> for nocrash_core::Error {
    fn from(err: SocorroError) -> Self {
        err.to_core_error()
    }
}

/// Result type for Socorro operations.
pub type SocorroResult<T> = Result<T, SocorroError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_maps_to_service() {
        let core = SocorroError::Status {
            status: 429,
            body: "slow down".into(),
        }
        .to_core_error();
        assert!(matches!(
            core,
            nocrash_core::Error::Service {
                service: "socorro",
                status_code: Some(429),
                ..
            }
        ));
    }

    #[test]
    fn config_error_maps_to_config() {
        let core: nocrash_core::Error = SocorroError::Config("bad url".into()).into();
        assert!(core.to_string().contains("socorro: bad url"));
    }
}

//! Configuration (`nocrash.toml`).
//!
//! ```toml
//! [bugzilla]
//! url = "https://bugzilla.mozilla.org"
//! page_size = 1000
//!
//! [socorro]
//! url = "https://crash-stats.mozilla.org"
//! max_concurrency = 4
//!
//! [no_crashes]
//! number_of_weeks = 12
//! reporter_exception = ["intermittent-bug-filer@mozilla.bugs"]
//! keyword_exception = ["stalled"]
//! ```
//!
//! Every field is optional; missing values fall back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::resolver::DEFAULT_MAX_CONCURRENCY;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub bugzilla: BugzillaSettings,
    pub socorro: SocorroSettings,
    pub no_crashes: NoCrashesSettings,
}

/// Bug tracker endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BugzillaSettings {
    /// Base URL, including the protocol.
    pub url: String,
    /// Bugs requested per search page.
    pub page_size: usize,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for BugzillaSettings {
    fn default() -> Self {
        Self {
            url: "https://bugzilla.mozilla.org".into(),
            page_size: 1000,
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Crash aggregator endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SocorroSettings {
    /// Base URL, including the protocol.
    pub url: String,
    /// Batch searches allowed in flight at once.
    pub max_concurrency: usize,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for SocorroSettings {
    fn default() -> Self {
        Self {
            url: "https://crash-stats.mozilla.org".into(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Settings of the no-crashes rule itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NoCrashesSettings {
    /// Lookback window length.
    pub number_of_weeks: u32,
    /// Reporters whose bugs are never considered.
    pub reporter_exception: Vec<String>,
    /// Keywords that exclude a bug from consideration.
    pub keyword_exception: Vec<String>,
}

impl Default for NoCrashesSettings {
    fn default() -> Self {
        Self {
            number_of_weeks: 12,
            reporter_exception: Vec::new(),
            keyword_exception: Vec::new(),
        }
    }
}

const fn default_connect_timeout_ms() -> u64 {
    10_000 // 10 seconds
}

const fn default_request_timeout_ms() -> u64 {
    60_000 // 60 seconds
}

impl Config {
    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.display().to_string(), e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Load `path` when given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges and URL shapes.
    pub fn validate(&self) -> Result<()> {
        validate_url("bugzilla.url", &self.bugzilla.url)?;
        validate_url("socorro.url", &self.socorro.url)?;
        validate_timeouts(
            "bugzilla",
            self.bugzilla.connect_timeout_ms,
            self.bugzilla.request_timeout_ms,
        )?;
        validate_timeouts(
            "socorro",
            self.socorro.connect_timeout_ms,
            self.socorro.request_timeout_ms,
        )?;

        if self.bugzilla.page_size == 0 || self.bugzilla.page_size > 10_000 {
            return Err(invalid("bugzilla.page_size must be between 1 and 10000"));
        }
        if self.socorro.max_concurrency == 0 || self.socorro.max_concurrency > 64 {
            return Err(invalid("socorro.max_concurrency must be between 1 and 64"));
        }
        if self.no_crashes.number_of_weeks == 0 {
            return Err(invalid("no_crashes.number_of_weeks must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> crate::Error {
    ConfigError::ValidationError(message.into()).into()
}

fn validate_url(field: &str, url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(invalid(format!("{field} cannot be empty")));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(invalid(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

fn validate_timeouts(section: &str, connect_ms: u64, request_ms: u64) -> Result<()> {
    if connect_ms == 0 || connect_ms > 300_000 {
        return Err(invalid(format!(
            "{section}.connect_timeout_ms must be between 1 and 300000"
        )));
    }
    if request_ms == 0 || request_ms > 600_000 {
        return Err(invalid(format!(
            "{section}.request_timeout_ms must be between 1 and 600000"
        )));
    }
    Ok(())
}

//! Collaborator seams: the bug tracker and the crash aggregator.
//!
//! nocrash-core stays free of HTTP client dependencies. The connectors under
//! `connectors/` provide the real implementations; tests use in-memory fakes.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::window::QueryWindow;

/// Bug statuses that count as unresolved.
pub const OPEN_STATUSES: [&str; 3] = ["UNCONFIRMED", "NEW", "ASSIGNED"];

/// Summary shown in place of the real one for access-restricted bugs.
pub const HIDDEN_SUMMARY: &str = "...";

/// Fields every bug search must return.
pub const BUG_FIELDS: [&str; 4] = ["id", "summary", "groups", "cf_crash_signature"];

/// Search criteria for open bugs carrying crash signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BugQuery {
    /// Accepted statuses; the resolution is always empty.
    pub statuses: Vec<String>,
    /// Only bugs created strictly before this date.
    pub created_before: NaiveDate,
    /// Only bugs whose last change is strictly more than this many days old.
    pub min_days_elapsed: u64,
    /// Skip bugs whose reporter contains any of these.
    pub reporter_exclusions: Vec<String>,
    /// Skip bugs carrying any of these keywords.
    pub keyword_exclusions: Vec<String>,
    /// Restrict the search to these bugs when non-empty.
    pub bug_ids: Vec<u64>,
    pub include_fields: Vec<String>,
}

impl BugQuery {
    /// Criteria for bugs old enough to be judged against `window`.
    pub fn for_window(window: &QueryWindow) -> Result<Self> {
        Ok(Self {
            statuses: OPEN_STATUSES.iter().map(ToString::to_string).collect(),
            created_before: window.start()?,
            min_days_elapsed: window.lookback_days(),
            reporter_exclusions: Vec::new(),
            keyword_exclusions: Vec::new(),
            bug_ids: Vec::new(),
            include_fields: BUG_FIELDS.iter().map(ToString::to_string).collect(),
        })
    }

    #[must_use]
    pub fn with_reporter_exclusions(mut self, reporters: Vec<String>) -> Self {
        self.reporter_exclusions = reporters;
        self
    }

    #[must_use]
    pub fn with_keyword_exclusions(mut self, keywords: Vec<String>) -> Self {
        self.keyword_exclusions = keywords;
        self
    }

    #[must_use]
    pub fn with_bug_ids(mut self, bug_ids: Vec<u64>) -> Self {
        self.bug_ids = bug_ids;
        self
    }
}

/// A bug as returned by the tracker, before signature extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBug {
    pub id: u64,
    #[serde(default)]
    pub summary: String,
    /// Access-restriction groups; non-empty means the bug is confidential.
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default, rename = "cf_crash_signature")]
    pub crash_signature: Option<String>,
}

impl RawBug {
    /// Summary safe to publish in a report.
    #[must_use]
    pub fn display_summary(&self) -> &str {
        if self.groups.is_empty() {
            &self.summary
        } else {
            HIDDEN_SUMMARY
        }
    }
}

/// One facet-only crash search over an explicit signature list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetQuery {
    /// Inclusive lower bound of the crash date.
    pub date_from: NaiveDate,
    /// Exclusive upper bound of the crash date.
    pub date_to: NaiveDate,
    /// Exact-match signatures, OR'd together.
    pub signatures: Vec<String>,
    /// Maximum number of facet buckets to return.
    pub facet_size: usize,
}

/// One signature bucket in a facet response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetTerm {
    pub term: String,
    pub count: u64,
}

/// Facet-only answer from the crash aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetResponse {
    /// Logical errors reported by the service; non-empty means the batch failed.
    #[serde(default)]
    pub errors: Vec<String>,
    /// Signatures with at least one crash in the window.
    #[serde(default)]
    pub signatures: Vec<FacetTerm>,
}

impl FacetResponse {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Bug tracker search.
#[async_trait]
pub trait BugQueryService: Send + Sync {
    /// Return every bug matching `query`, across all result pages.
    async fn search(&self, query: &BugQuery) -> Result<Vec<RawBug>>;
}

/// Crash aggregator facet search.
#[async_trait]
pub trait CrashOccurrenceService: Send + Sync {
    async fn signature_facets(&self, query: &FacetQuery) -> Result<FacetResponse>;
}

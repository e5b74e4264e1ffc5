//! Signature collection from the bug tracker.

use std::collections::BTreeMap;

use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::service::{BugQuery, BugQueryService, RawBug};
use crate::signature::{SignatureSet, parse_signature_field};

/// Everything the rest of a run needs from the bug tracker.
///
/// `universe` starts as the union of all bug signatures and is narrowed in
/// place by the resolver; `per_bug` and `summaries` are read-only after
/// collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedSignatures {
    pub universe: SignatureSet,
    pub per_bug: BTreeMap<u64, SignatureSet>,
    pub summaries: BTreeMap<u64, String>,
    /// Bugs returned by the search, including those without usable signatures.
    pub bugs_fetched: usize,
}

impl CollectedSignatures {
    /// Fold one bug into the collection. Bugs without signatures are skipped.
    pub fn add_bug(&mut self, bug: &RawBug) {
        self.bugs_fetched += 1;
        let Some(raw) = bug.crash_signature.as_deref() else {
            return;
        };
        let signatures = parse_signature_field(raw);
        if signatures.is_empty() {
            debug!(bug_id = bug.id, "crash signature field has no signatures");
            return;
        }
        self.universe.extend_from(&signatures);
        self.summaries
            .insert(bug.id, bug.display_summary().to_string());
        self.per_bug.insert(bug.id, signatures);
    }

    /// Number of bugs that contributed at least one signature.
    #[must_use]
    pub fn bugs_with_signatures(&self) -> usize {
        self.per_bug.len()
    }
}

impl<'a> FromIterator<&'a RawBug> for CollectedSignatures {
    fn from_iter<I: IntoIterator<Item = &'a RawBug>>(iter: I) -> Self {
        let mut collected = Self::default();
        for bug in iter {
            collected.add_bug(bug);
        }
        collected
    }
}

/// Run the bug search and collect signatures from every match.
#[instrument(skip(service, query), fields(created_before = %query.created_before))]
pub async fn collect_signatures(
    service: &dyn BugQueryService,
    query: &BugQuery,
) -> Result<CollectedSignatures> {
    let bugs = service.search(query).await?;
    let collected: CollectedSignatures = bugs.iter().collect();
    info!(
        bugs_fetched = collected.bugs_fetched,
        bugs_with_signatures = collected.bugs_with_signatures(),
        signatures = collected.universe.len(),
        "collected crash signatures"
    );
    Ok(collected)
}

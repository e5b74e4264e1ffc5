//! Closure eligibility.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::collector::CollectedSignatures;
use crate::signature::SignatureSet;

/// A bug whose signatures all stayed quiet during the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureCandidate {
    pub id: String,
    pub summary: String,
}

/// Whether a bug with `signatures` may be closed given the surviving universe.
///
/// A bug without signatures never qualifies.
#[must_use]
pub fn is_eligible(signatures: &SignatureSet, universe: &SignatureSet) -> bool {
    !signatures.is_empty() && signatures.is_subset(universe)
}

/// Closure candidates keyed by bug id rendered as text.
#[must_use]
pub fn closure_candidates(collected: &CollectedSignatures) -> BTreeMap<String, ClosureCandidate> {
    collected
        .per_bug
        .iter()
        .filter(|(_, signatures)| is_eligible(signatures, &collected.universe))
        .map(|(bug_id, _)| {
            let id = bug_id.to_string();
            let summary = collected
                .summaries
                .get(bug_id)
                .cloned()
                .unwrap_or_default();
            (id.clone(), ClosureCandidate { id, summary })
        })
        .collect()
}

//! Batch planning for crash searches.
//!
//! Each batch becomes one search request whose query string carries every
//! member signature, so the combined signature length of a batch is capped at
//! [`BATCH_BUDGET`]. Placement is greedy first-fit over a pre-sized pool of
//! batches. It is not optimal bin packing, and batch assignment depends on
//! input order.

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::signature::{SignatureSet, signature_len};

/// Maximum combined signature length of one batch.
pub const BATCH_BUDGET: usize = 1536;

/// A group of signatures sent in a single search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Batch {
    /// Budget left after the current members.
    pub capacity_remaining: usize,
    pub members: Vec<String>,
}

impl Batch {
    fn empty(budget: usize) -> Self {
        Self {
            capacity_remaining: budget,
            members: Vec::new(),
        }
    }

    /// Combined length of the members.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.members.iter().map(|s| signature_len(s)).sum()
    }

    /// Place `signature` if it fits. The remaining capacity must be strictly
    /// greater than the signature length.
    fn try_place(&mut self, signature: &str, len: usize) -> bool {
        if self.capacity_remaining > len {
            self.capacity_remaining -= len;
            self.members.push(signature.to_string());
            true
        } else {
            false
        }
    }
}

/// Output of [`plan_batches`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchPlan {
    /// Non-empty batches in creation order.
    pub batches: Vec<Batch>,
    /// Member count of the largest batch; sizes the facet of every search.
    pub max_batch_len: usize,
    /// Signatures longer than the budget, which no batch can hold.
    pub oversized: Vec<String>,
}

impl BatchPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Number of signatures placed in some batch.
    #[must_use]
    pub fn planned_signatures(&self) -> usize {
        self.batches.iter().map(|b| b.members.len()).sum()
    }
}

/// Partition `signatures` into batches of at most [`BATCH_BUDGET`] characters.
pub fn plan_batches(signatures: &SignatureSet) -> Result<BatchPlan> {
    plan_batches_with_budget(signatures, BATCH_BUDGET)
}

/// [`plan_batches`] with an explicit budget.
///
/// # Errors
///
/// Returns [`Error::EmptySignatureSet`] when `signatures` is empty; callers are
/// expected to skip planning entirely in that case.
pub fn plan_batches_with_budget(signatures: &SignatureSet, budget: usize) -> Result<BatchPlan> {
    if signatures.is_empty() {
        return Err(Error::EmptySignatureSet);
    }

    let total: usize = signatures.iter().map(signature_len).sum();
    let estimate = total / budget + 1;
    let mut batches: Vec<Batch> = (0..estimate).map(|_| Batch::empty(budget)).collect();
    let mut oversized = Vec::new();

    for signature in signatures {
        let len = signature_len(signature);
        if len > budget {
            debug!(len, budget, "signature exceeds batch budget, dropping");
            oversized.push(signature.to_string());
            continue;
        }
        if !batches.iter_mut().any(|batch| batch.try_place(signature, len)) {
            batches.push(Batch {
                capacity_remaining: budget - len,
                members: vec![signature.to_string()],
            });
        }
    }

    batches.retain(|batch| !batch.members.is_empty());
    let max_batch_len = batches.iter().map(|b| b.members.len()).max().unwrap_or(0);

    Ok(BatchPlan {
        batches,
        max_batch_len,
        oversized,
    })
}

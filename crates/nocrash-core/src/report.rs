//! Run output handed back to the caller.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decider::ClosureCandidate;

/// One-line description of the rule for a window of `weeks`.
#[must_use]
pub fn description(weeks: u32) -> String {
    format!("Bugs with no more crashes in the last {weeks} weeks")
}

/// Status change the scheduling framework applies to each candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutofixChange {
    pub status: String,
    pub resolution: String,
    pub comment: AutofixComment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutofixComment {
    pub body: String,
}

impl AutofixChange {
    /// Resolve as WORKSFORME, citing the window length.
    #[must_use]
    pub fn works_for_me(weeks: u32) -> Self {
        Self {
            status: "RESOLVED".into(),
            resolution: "WORKSFORME".into(),
            comment: AutofixComment {
                body: format!("Closing because no crashes reported for {weeks} weeks."),
            },
        }
    }
}

/// Counters collected across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub bugs_fetched: usize,
    pub bugs_with_signatures: usize,
    pub distinct_signatures: usize,
    /// Signatures too long for any batch; they can never be seen crashing.
    pub oversized_signatures: usize,
    pub batches: usize,
    pub crashed_signatures: usize,
    pub candidates: usize,
}

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoCrashReport {
    pub description: String,
    /// Lookback length, exposed for templates.
    pub nweeks: u32,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub candidates: BTreeMap<String, ClosureCandidate>,
    pub stats: RunStats,
    pub autofix: AutofixChange,
}

impl NoCrashReport {
    /// Render as a plain-text table, one candidate per line.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = format!(
            "{} ({} to {})\n",
            self.description, self.window_start, self.window_end
        );
        if self.candidates.is_empty() {
            out.push_str("No bugs to close.\n");
        } else {
            let width = self.candidates.keys().map(String::len).max().unwrap_or(0);
            for candidate in self.candidates.values() {
                out.push_str(&format!(
                    "  {:>width$}  {}\n",
                    candidate.id, candidate.summary
                ));
            }
        }
        out.push_str(&format!(
            "{} bugs fetched, {} signatures in {} batches, {} crashed, {} oversized, {} candidates\n",
            self.stats.bugs_fetched,
            self.stats.distinct_signatures,
            self.stats.batches,
            self.stats.crashed_signatures,
            self.stats.oversized_signatures,
            self.stats.candidates,
        ));
        out
    }
}

//! One triage pass: collect, plan, resolve, decide.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::collector::collect_signatures;
use crate::config::NoCrashesSettings;
use crate::decider::closure_candidates;
use crate::error::Result;
use crate::planner::plan_batches;
use crate::report::{AutofixChange, NoCrashReport, RunStats, description};
use crate::resolver::{DEFAULT_MAX_CONCURRENCY, resolve_occurrences};
use crate::service::{BugQuery, BugQueryService, CrashOccurrenceService};
use crate::window::QueryWindow;

/// The "no crashes" rule bound to its two services.
pub struct NoCrashes {
    bugs: Arc<dyn BugQueryService>,
    crashes: Arc<dyn CrashOccurrenceService>,
    settings: NoCrashesSettings,
    max_concurrency: usize,
    bug_ids: Vec<u64>,
}

impl NoCrashes {
    #[must_use]
    pub fn new(
        bugs: Arc<dyn BugQueryService>,
        crashes: Arc<dyn CrashOccurrenceService>,
        settings: NoCrashesSettings,
    ) -> Self {
        Self {
            bugs,
            crashes,
            settings,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            bug_ids: Vec::new(),
        }
    }

    /// Limit on crash searches in flight at once.
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Only consider these bugs.
    #[must_use]
    pub fn with_bug_ids(mut self, bug_ids: Vec<u64>) -> Self {
        self.bug_ids = bug_ids;
        self
    }

    #[must_use]
    pub fn weeks(&self) -> u32 {
        self.settings.number_of_weeks
    }

    #[must_use]
    pub fn description(&self) -> String {
        description(self.weeks())
    }

    /// Bug search criteria for `window`, including configured exclusions.
    pub fn bug_query(&self, window: &QueryWindow) -> Result<BugQuery> {
        Ok(BugQuery::for_window(window)?
            .with_reporter_exclusions(self.settings.reporter_exception.clone())
            .with_keyword_exclusions(self.settings.keyword_exception.clone())
            .with_bug_ids(self.bug_ids.clone()))
    }

    /// Run the rule for the window ending on `end`.
    ///
    /// Any service failure aborts the run; no partial candidate list is
    /// returned.
    #[instrument(skip(self), fields(weeks = self.weeks()))]
    pub async fn run(&self, end: NaiveDate) -> Result<NoCrashReport> {
        let window = QueryWindow::new(end, self.weeks())?;
        let query = self.bug_query(&window)?;
        let mut collected = collect_signatures(self.bugs.as_ref(), &query).await?;

        let mut stats = RunStats {
            bugs_fetched: collected.bugs_fetched,
            bugs_with_signatures: collected.bugs_with_signatures(),
            distinct_signatures: collected.universe.len(),
            ..RunStats::default()
        };

        if !collected.universe.is_empty() {
            let plan = plan_batches(&collected.universe)?;
            stats.batches = plan.batches.len();
            stats.oversized_signatures = plan.oversized.len();

            let resolved = resolve_occurrences(
                self.crashes.as_ref(),
                &window,
                &plan,
                &mut collected.universe,
                self.max_concurrency,
            )
            .await?;
            stats.crashed_signatures = resolved.crashed_signatures;
        }

        let candidates = closure_candidates(&collected);
        stats.candidates = candidates.len();
        info!(
            candidates = stats.candidates,
            bugs = stats.bugs_with_signatures,
            "no-crash triage complete"
        );

        Ok(NoCrashReport {
            description: self.description(),
            nweeks: self.weeks(),
            window_start: window.start()?,
            window_end: window.end,
            candidates,
            stats,
            autofix: AutofixChange::works_for_me(self.weeks()),
        })
    }
}

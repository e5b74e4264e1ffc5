//! Occurrence resolution against the crash aggregator.
//!
//! Every batch is an independent facet search. Searches run concurrently up
//! to a limit; their completions are consumed on the calling task, which holds
//! the only `&mut` to the universe, so removals are serialized without a lock.

use futures_util::StreamExt;
use futures_util::stream;
use tracing::{debug, info, instrument, warn};

use crate::error::{Error, Result};
use crate::planner::BatchPlan;
use crate::service::{CrashOccurrenceService, FacetQuery};
use crate::signature::SignatureSet;
use crate::window::QueryWindow;

/// Concurrency used when the caller has no preference.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Counters from one resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub batches_queried: usize,
    /// Signatures removed from the universe because they crashed in-window.
    pub crashed_signatures: usize,
}

/// Build the facet search for each batch of `plan`.
///
/// Every search uses the plan's largest batch size as its facet size so that
/// result shapes are uniform across batches.
pub fn facet_queries(window: &QueryWindow, plan: &BatchPlan) -> Result<Vec<FacetQuery>> {
    let date_from = window.start()?;
    let date_to = window.search_end_exclusive()?;
    Ok(plan
        .batches
        .iter()
        .map(|batch| FacetQuery {
            date_from,
            date_to,
            signatures: batch.members.clone(),
            facet_size: plan.max_batch_len,
        })
        .collect())
}

/// Remove from `universe` every signature that crashed during `window`.
///
/// All in-flight searches are drained before an error is returned; the error
/// is the first one observed. A batch whose response carries logical errors
/// fails the whole pass with [`Error::RemoteQuery`].
#[instrument(skip_all, fields(batches = plan.batches.len(), facet_size = plan.max_batch_len))]
pub async fn resolve_occurrences(
    service: &dyn CrashOccurrenceService,
    window: &QueryWindow,
    plan: &BatchPlan,
    universe: &mut SignatureSet,
    max_concurrency: usize,
) -> Result<ResolveStats> {
    let queries = facet_queries(window, plan)?;
    let mut stats = ResolveStats::default();
    if queries.is_empty() {
        return Ok(stats);
    }

    let mut completions = stream::iter(queries.iter().enumerate())
        .map(|(batch, query)| async move { (batch, service.signature_facets(query).await) })
        .buffer_unordered(max_concurrency.max(1));

    let mut failure: Option<Error> = None;
    while let Some((batch, outcome)) = completions.next().await {
        stats.batches_queried += 1;
        match outcome {
            Ok(response) if response.has_errors() => {
                warn!(batch, errors = ?response.errors, "crash search reported errors");
                if failure.is_none() {
                    failure = Some(Error::RemoteQuery {
                        batch,
                        errors: response.errors,
                    });
                }
            }
            Ok(response) => {
                let before = universe.len();
                for facet in &response.signatures {
                    universe.remove(&facet.term);
                }
                let removed = before - universe.len();
                stats.crashed_signatures += removed;
                debug!(batch, facets = response.signatures.len(), removed, "batch resolved");
            }
            Err(err) => {
                warn!(batch, error = %err, "crash search failed");
                if failure.is_none() {
                    failure = Some(err);
                }
            }
        }
    }

    if let Some(err) = failure {
        return Err(err);
    }

    info!(
        batches = stats.batches_queried,
        crashed = stats.crashed_signatures,
        remaining = universe.len(),
        "resolved crash occurrences"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::plan_batches_with_budget;
    use crate::service::{FacetResponse, FacetTerm};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Answers from a fixed set of crashing signatures; optionally fails
    /// batches containing a poisoned signature.
    struct FakeCrashStats {
        crashing: HashSet<String>,
        poisoned: Option<String>,
        transport_down: bool,
        queries: Mutex<Vec<FacetQuery>>,
    }

    impl FakeCrashStats {
        fn new(crashing: &[&str]) -> Self {
            Self {
                crashing: crashing.iter().map(ToString::to_string).collect(),
                poisoned: None,
                transport_down: false,
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CrashOccurrenceService for FakeCrashStats {
        async fn signature_facets(&self, query: &FacetQuery) -> Result<FacetResponse> {
            self.queries.lock().unwrap().push(query.clone());
            if self.transport_down {
                return Err(Error::service("socorro", "connection reset"));
            }
            if let Some(poison) = &self.poisoned {
                if query.signatures.contains(poison) {
                    return Ok(FacetResponse {
                        errors: vec!["shards failed".into()],
                        signatures: Vec::new(),
                    });
                }
            }
            let signatures = query
                .signatures
                .iter()
                .filter(|s| self.crashing.contains(*s))
                .map(|s| FacetTerm {
                    term: s.clone(),
                    count: 3,
                })
                .collect();
            Ok(FacetResponse {
                errors: Vec::new(),
                signatures,
            })
        }
    }

    fn window() -> QueryWindow {
        QueryWindow::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), 12).unwrap()
    }

    fn universe(items: &[&str]) -> SignatureSet {
        items.iter().copied().collect()
    }

    #[tokio::test]
    async fn crashed_signatures_leave_the_universe() {
        let service = FakeCrashStats::new(&["sig2"]);
        let mut universe = universe(&["sig1", "sig2", "sig3"]);
        let plan = plan_batches_with_budget(&universe, 1536).unwrap();

        let stats = resolve_occurrences(&service, &window(), &plan, &mut universe, 2)
            .await
            .unwrap();

        assert_eq!(universe.iter().collect::<Vec<_>>(), vec!["sig1", "sig3"]);
        assert_eq!(stats.crashed_signatures, 1);
        assert_eq!(stats.batches_queried, 1);
    }

    #[tokio::test]
    async fn every_batch_is_queried_with_uniform_facet_size() {
        let service = FakeCrashStats::new(&["bbb"]);
        let mut universe = universe(&["aaa", "bbb", "c"]);
        let plan = plan_batches_with_budget(&universe, 5).unwrap();
        assert_eq!(plan.batches.len(), 2);

        resolve_occurrences(&service, &window(), &plan, &mut universe, 1)
            .await
            .unwrap();

        let queries = service.queries.lock().unwrap();
        assert_eq!(queries.len(), 2);
        assert!(queries.iter().all(|q| q.facet_size == 2));
        assert!(
            queries
                .iter()
                .all(|q| q.date_from == NaiveDate::from_ymd_opt(2024, 2, 7).unwrap())
        );
        assert!(
            queries
                .iter()
                .all(|q| q.date_to == NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())
        );
        assert!(!universe.contains("bbb"));
    }

    #[tokio::test]
    async fn logical_error_in_any_batch_is_fatal() {
        let mut service = FakeCrashStats::new(&["aaa"]);
        service.poisoned = Some("bbb".into());
        let mut universe = universe(&["aaa", "bbb", "c"]);
        let plan = plan_batches_with_budget(&universe, 5).unwrap();

        let err = resolve_occurrences(&service, &window(), &plan, &mut universe, 4)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::RemoteQuery { batch: 1, .. }));
        // Healthy batches were still drained.
        assert_eq!(service.queries.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn transport_failure_is_fatal() {
        let mut service = FakeCrashStats::new(&[]);
        service.transport_down = true;
        let mut universe = universe(&["x"]);
        let plan = plan_batches_with_budget(&universe, 1536).unwrap();

        let err = resolve_occurrences(&service, &window(), &plan, &mut universe, 4)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Service { service: "socorro", .. }));
    }

    #[tokio::test]
    async fn oversized_signature_is_never_removed() {
        let huge: String = std::iter::repeat_n('h', 2000).collect();
        let service = FakeCrashStats::new(&[huge.as_str(), "small"]);
        let mut universe: SignatureSet = [huge.clone(), "small".to_string()].into_iter().collect();
        let plan = plan_batches_with_budget(&universe, 1536).unwrap();

        resolve_occurrences(&service, &window(), &plan, &mut universe, 4)
            .await
            .unwrap();

        assert!(universe.contains(&huge));
        assert!(!universe.contains("small"));
    }

    #[tokio::test]
    async fn empty_plan_issues_no_queries() {
        let huge: String = std::iter::repeat_n('h', 2000).collect();
        let service = FakeCrashStats::new(&[]);
        let mut universe: SignatureSet = std::iter::once(huge).collect();
        let plan = plan_batches_with_budget(&universe, 1536).unwrap();

        let stats = resolve_occurrences(&service, &window(), &plan, &mut universe, 4)
            .await
            .unwrap();

        assert_eq!(stats, ResolveStats::default());
        assert!(service.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn universe_only_shrinks() {
        let service = FakeCrashStats::new(&["b", "d", "not-in-universe"]);
        let before = universe(&["a", "b", "c", "d"]);
        let mut after = before.clone();
        let plan = plan_batches_with_budget(&after, 1536).unwrap();

        resolve_occurrences(&service, &window(), &plan, &mut after, 3)
            .await
            .unwrap();

        assert!(after.is_subset(&before));
        assert_eq!(after.iter().collect::<Vec<_>>(), vec!["a", "c"]);
    }
}

//! Coordinator Query Service
//!
//! Presents one search operation over the whole worker pool.
//!
//! ## Query lifecycle
//! 1. **Received**: the query is validated; an empty query is never dispatched.
//! 2. **Dispatched**: the latest membership snapshot is taken and every healthy
//!    worker in it receives the query concurrently.
//! 3. **Per worker**: each call races the per-worker timeout, and all of them race
//!    the overall query deadline. Pending calls are aborted when the deadline fires
//!    or when the query future is dropped.
//! 4. **Merged**: successful hit lists are concatenated in snapshot order. The query
//!    fails only when no worker contributed: as a client error when every worker
//!    rejected the request, as unavailability otherwise.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinSet;

use super::client::WorkerClient;
use super::membership::HealthRegistry;
use super::metrics::CoordinatorMetrics;
use super::types::{
    AggregateResult, Exclusion, ExclusionReason, MembershipSnapshot, WorkerEndpoint,
    WorkerResult,
};
use crate::config::CoordinatorConfig;
use crate::error::{CoordinatorError, WorkerCallError};
use crate::worker::protocol::{MatchHit, document_counts};

pub struct Coordinator {
    registry: Arc<HealthRegistry>,
    snapshots: watch::Receiver<Arc<MembershipSnapshot>>,
    client: WorkerClient,
    worker_timeout: Duration,
    query_deadline: Duration,
    dedupe_hits: bool,
    pub metrics: Arc<CoordinatorMetrics>,
}

impl Coordinator {
    pub fn new(
        config: &CoordinatorConfig,
        registry: Arc<HealthRegistry>,
        client: WorkerClient,
        metrics: Arc<CoordinatorMetrics>,
    ) -> Arc<Self> {
        Arc::new(Self {
            snapshots: registry.subscribe(),
            registry,
            client,
            worker_timeout: config.worker_timeout(),
            query_deadline: config.query_deadline(),
            dedupe_hits: config.dedupe_hits,
            metrics,
        })
    }

    pub fn registry(&self) -> &HealthRegistry {
        &self.registry
    }

    /// Answers `query` from every healthy worker.
    ///
    /// `algorithm`, when present, is forwarded to each worker, which rejects it unless
    /// it names its own strategy.
    pub async fn search(
        &self,
        query: &str,
        algorithm: Option<&str>,
    ) -> Result<AggregateResult, CoordinatorError> {
        let _inflight = self.metrics.track_inflight();
        let started = Instant::now();

        let result = self.execute(query, algorithm, started).await;

        self.metrics.observe_query(started.elapsed(), result.is_ok());
        result
    }

    async fn execute(
        &self,
        query: &str,
        algorithm: Option<&str>,
        started: Instant,
    ) -> Result<AggregateResult, CoordinatorError> {
        if query.is_empty() {
            return Err(CoordinatorError::InvalidQuery(
                "query parameter 'q' must not be empty".to_string(),
            ));
        }

        let snapshot = self.snapshots.borrow().clone();

        let mut excluded: Vec<Exclusion> = snapshot
            .ineligible
            .iter()
            .map(|(worker_id, status)| Exclusion {
                worker_id: worker_id.clone(),
                reason: ExclusionReason::from(*status),
                detail: None,
            })
            .collect();

        if snapshot.healthy.is_empty() {
            tracing::warn!(
                "No healthy workers in snapshot v{} ({} excluded)",
                snapshot.version,
                excluded.len()
            );
            return Err(CoordinatorError::NoWorkersAvailable {
                excluded: excluded.len(),
            });
        }

        tracing::debug!(
            "Dispatching {:?} to {} workers (snapshot v{})",
            query,
            snapshot.healthy.len(),
            snapshot.version
        );

        let results = self.fan_out(&snapshot.healthy, query, algorithm).await;

        let mut hits: Vec<MatchHit> = Vec::new();
        let mut contributors = Vec::new();
        let mut seen: HashSet<MatchHit> = HashSet::new();
        let mut rejections: Vec<String> = Vec::new();
        let dispatched = results.len();

        for result in results {
            match result.error {
                None => {
                    tracing::debug!(
                        "Worker {} answered with {} hits in {:?}",
                        result.worker_id,
                        result.hits.len(),
                        result.elapsed
                    );
                    contributors.push(result.worker_id);
                    for hit in result.hits {
                        if !self.dedupe_hits || seen.insert(hit.clone()) {
                            hits.push(hit);
                        }
                    }
                }
                Some(err) => {
                    if let WorkerCallError::Status { status: 400, message, .. } = &err {
                        rejections.push(message.clone());
                    }
                    let reason = ExclusionReason::from(&err);
                    tracing::warn!("Dropping worker {}: {}", result.worker_id, err);
                    self.metrics.observe_worker_failure(reason);
                    excluded.push(Exclusion {
                        worker_id: result.worker_id,
                        reason,
                        detail: Some(err.to_string()),
                    });
                }
            }
        }

        if contributors.is_empty() && rejections.len() == dispatched {
            tracing::debug!("Every dispatched worker rejected query {:?}", query);
            return Err(CoordinatorError::InvalidQuery(rejections.swap_remove(0)));
        }

        if contributors.is_empty() {
            tracing::warn!("Every dispatched worker failed for query {:?}", query);
            return Err(CoordinatorError::NoWorkersAvailable {
                excluded: excluded.len(),
            });
        }

        Ok(AggregateResult {
            query: query.to_string(),
            total_hits: hits.len(),
            documents: document_counts(&hits),
            hits,
            contributors,
            excluded,
            snapshot_version: snapshot.version,
            elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
        })
    }

    /// Scatter-gather over `endpoints`. The result keeps the order of `endpoints`.
    async fn fan_out(
        &self,
        endpoints: &[WorkerEndpoint],
        query: &str,
        algorithm: Option<&str>,
    ) -> Vec<WorkerResult> {
        let deadline = tokio::time::Instant::now() + self.query_deadline;
        let mut calls = JoinSet::new();

        for (index, endpoint) in endpoints.iter().cloned().enumerate() {
            let client = self.client.clone();
            let query = query.to_string();
            let algorithm = algorithm.map(str::to_string);
            let timeout = self.worker_timeout;

            calls.spawn(async move {
                let started = Instant::now();
                let outcome = client
                    .search(&endpoint, &query, algorithm.as_deref(), timeout)
                    .await;
                (index, outcome, started.elapsed())
            });
        }

        let mut slots: Vec<Option<WorkerResult>> = endpoints.iter().map(|_| None).collect();
        let mut deadline_reached = false;

        loop {
            match tokio::time::timeout_at(deadline, calls.join_next()).await {
                Ok(Some(Ok((index, outcome, elapsed)))) => {
                    let worker_id = endpoints[index].id.clone();
                    slots[index] = Some(match outcome {
                        Ok(response) => WorkerResult {
                            worker_id,
                            hits: response.hits,
                            elapsed,
                            error: None,
                        },
                        Err(e) => WorkerResult::failed(worker_id, e, elapsed),
                    });
                }
                Ok(Some(Err(e))) => {
                    tracing::error!("Worker call task failed: {}", e);
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        "Query deadline of {:?} reached with {} calls pending",
                        self.query_deadline,
                        calls.len()
                    );
                    calls.abort_all();
                    deadline_reached = true;
                    break;
                }
            }
        }

        slots
            .into_iter()
            .zip(endpoints)
            .map(|(slot, endpoint)| {
                slot.unwrap_or_else(|| {
                    let worker = endpoint.id.to_string();
                    let error = if deadline_reached {
                        WorkerCallError::TimedOut {
                            worker,
                            after: self.query_deadline,
                        }
                    } else {
                        WorkerCallError::Transport {
                            worker,
                            message: "call did not complete".to_string(),
                        }
                    };
                    WorkerResult::failed(endpoint.id.clone(), error, self.query_deadline)
                })
            })
            .collect()
    }
}

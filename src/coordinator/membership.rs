//! Worker Health Registry
//!
//! Holds one `WorkerHealth` record per worker ever discovered and publishes a
//! versioned `MembershipSnapshot` after every health tick.
//!
//! Records live in a `DashMap` that only the health loop writes. Dispatch never reads
//! the map: it reads the latest snapshot from a `watch` channel, so a health write can
//! never stall a query.

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::watch;

use super::types::{HealthStatus, MembershipSnapshot, WorkerEndpoint, WorkerHealth, WorkerId};

pub struct HealthRegistry {
    records: DashMap<WorkerId, WorkerHealth>,
    failure_threshold: u32,
    next_sequence: AtomicU64,
    version: AtomicU64,
    snapshots: watch::Sender<Arc<MembershipSnapshot>>,
}

impl HealthRegistry {
    pub fn new(failure_threshold: u32) -> Self {
        let (snapshots, _) = watch::channel(Arc::new(MembershipSnapshot::default()));

        Self {
            records: DashMap::new(),
            failure_threshold: failure_threshold.max(1),
            next_sequence: AtomicU64::new(0),
            version: AtomicU64::new(0),
            snapshots,
        }
    }

    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    /// Creates an `unknown` record for a worker seen for the first time.
    ///
    /// Returns `true` when the worker was new.
    pub fn observe(&self, endpoint: &WorkerEndpoint) -> bool {
        if self.records.contains_key(&endpoint.id) {
            return false;
        }

        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        let inserted = self
            .records
            .entry(endpoint.id.clone())
            .or_insert_with(|| WorkerHealth {
                endpoint: endpoint.clone(),
                status: HealthStatus::Unknown,
                consecutive_failures: 0,
                last_checked_at: None,
                last_error: None,
                sequence,
            })
            .sequence
            == sequence;

        if inserted {
            tracing::info!("Discovered worker {}", endpoint.id);
        }
        inserted
    }

    /// A passing check: the worker becomes healthy and its failure streak resets.
    pub fn record_success(&self, worker_id: &WorkerId) {
        let Some(mut record) = self.records.get_mut(worker_id) else {
            tracing::debug!("Health result for unknown worker {}", worker_id);
            return;
        };

        if record.status != HealthStatus::Healthy {
            tracing::info!(
                "Worker {} is now healthy (was {})",
                worker_id,
                record.status
            );
        }

        record.status = HealthStatus::Healthy;
        record.consecutive_failures = 0;
        record.last_checked_at = Some(Instant::now());
        record.last_error = None;
    }

    /// A failed check. At the threshold the worker becomes unhealthy; below it the
    /// status is left as it was.
    pub fn record_failure(&self, worker_id: &WorkerId, error: String) {
        let Some(mut record) = self.records.get_mut(worker_id) else {
            tracing::debug!("Health result for unknown worker {}", worker_id);
            return;
        };

        record.consecutive_failures = record.consecutive_failures.saturating_add(1);
        record.last_checked_at = Some(Instant::now());

        tracing::debug!(
            "Worker {} failed health check ({}/{}): {}",
            worker_id,
            record.consecutive_failures,
            self.failure_threshold,
            error
        );

        if record.consecutive_failures >= self.failure_threshold
            && record.status != HealthStatus::Unhealthy
        {
            tracing::warn!(
                "Worker {} marked unhealthy after {} consecutive failures: {}",
                worker_id,
                record.consecutive_failures,
                error
            );
            record.status = HealthStatus::Unhealthy;
        }
        record.last_error = Some(error);
    }

    /// Builds a new snapshot from the current records and makes it visible to dispatch.
    pub fn publish(&self) -> Arc<MembershipSnapshot> {
        let version = self.version.fetch_add(1, Ordering::Relaxed) + 1;

        let mut healthy = Vec::new();
        let mut ineligible = Vec::new();
        for record in self.records() {
            match record.status {
                HealthStatus::Healthy => healthy.push(record.endpoint),
                status => ineligible.push((record.endpoint.id, status)),
            }
        }

        let snapshot = Arc::new(MembershipSnapshot {
            version,
            healthy,
            ineligible,
        });
        self.snapshots.send_replace(snapshot.clone());
        snapshot
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<MembershipSnapshot> {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<MembershipSnapshot>> {
        self.snapshots.subscribe()
    }

    /// Copy of every record, in discovery order.
    pub fn records(&self) -> Vec<WorkerHealth> {
        let mut records: Vec<WorkerHealth> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|record| record.sequence);
        records
    }

    pub fn known_ids(&self) -> Vec<WorkerId> {
        self.records().into_iter().map(|r| r.endpoint.id).collect()
    }
}

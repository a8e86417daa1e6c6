use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

use crate::corpus::DocumentId;
use crate::error::WorkerCallError;
use crate::worker::protocol::{DocumentCount, MatchHit};

/// Identity of a worker as the coordinator sees it: its normalized base URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub String);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A candidate worker address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerEndpoint {
    pub id: WorkerId,
    pub base_url: String,
}

impl WorkerEndpoint {
    /// Accepts `host:port` or a full base URL; trailing slashes are dropped.
    pub fn new(address: &str) -> Self {
        let trimmed = address.trim().trim_end_matches('/');
        let base_url = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{}", trimmed)
        };

        Self {
            id: WorkerId(base_url.clone()),
            base_url,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Unknown,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy => "unhealthy",
            HealthStatus::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Health record of one worker.
///
/// Created the first time discovery returns the worker and never removed; only the
/// health loop writes it.
#[derive(Debug, Clone)]
pub struct WorkerHealth {
    pub endpoint: WorkerEndpoint,
    pub status: HealthStatus,
    pub consecutive_failures: u32,
    pub last_checked_at: Option<Instant>,
    pub last_error: Option<String>,
    /// Discovery order, used to keep snapshots stable.
    pub(crate) sequence: u64,
}

/// Versioned, immutable view of the pool published after each health tick.
///
/// Dispatch reads only this; a query keeps the snapshot it started with.
#[derive(Debug, Clone, Default)]
pub struct MembershipSnapshot {
    pub version: u64,
    /// Dispatch targets, in discovery order.
    pub healthy: Vec<WorkerEndpoint>,
    pub ineligible: Vec<(WorkerId, HealthStatus)>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    Unhealthy,
    Unknown,
    TimedOut,
    Failed,
}

impl ExclusionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExclusionReason::Unhealthy => "unhealthy",
            ExclusionReason::Unknown => "unknown",
            ExclusionReason::TimedOut => "timed_out",
            ExclusionReason::Failed => "failed",
        }
    }
}

impl From<HealthStatus> for ExclusionReason {
    fn from(status: HealthStatus) -> Self {
        match status {
            HealthStatus::Unknown => ExclusionReason::Unknown,
            HealthStatus::Healthy | HealthStatus::Unhealthy => ExclusionReason::Unhealthy,
        }
    }
}

impl From<&WorkerCallError> for ExclusionReason {
    fn from(err: &WorkerCallError) -> Self {
        match err {
            WorkerCallError::TimedOut { .. } => ExclusionReason::TimedOut,
            _ => ExclusionReason::Failed,
        }
    }
}

/// A worker left out of a merge, and why.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exclusion {
    pub worker_id: WorkerId,
    pub reason: ExclusionReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Outcome of one per-worker call inside a fan-out.
#[derive(Debug, Clone)]
pub struct WorkerResult {
    pub worker_id: WorkerId,
    pub hits: Vec<MatchHit>,
    pub elapsed: Duration,
    pub error: Option<WorkerCallError>,
}

impl WorkerResult {
    pub fn failed(worker_id: WorkerId, error: WorkerCallError, elapsed: Duration) -> Self {
        Self {
            worker_id,
            hits: Vec::new(),
            elapsed,
            error: Some(error),
        }
    }
}

/// Merged answer returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResult {
    pub query: String,
    pub hits: Vec<MatchHit>,
    pub total_hits: usize,
    pub documents: Vec<DocumentCount>,
    pub contributors: Vec<WorkerId>,
    pub excluded: Vec<Exclusion>,
    pub snapshot_version: u64,
    pub elapsed_ms: f64,
}

impl AggregateResult {
    /// `(document, offset)` pairs, in merge order.
    pub fn locations(&self) -> Vec<(DocumentId, usize)> {
        self.hits
            .iter()
            .map(|hit| (hit.document_id.clone(), hit.offset))
            .collect()
    }
}

/// One row of the coordinator's `/health` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerHealthView {
    pub worker_id: WorkerId,
    pub status: HealthStatus,
    pub consecutive_failures: u32,
    pub last_checked_ms_ago: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl From<&WorkerHealth> for WorkerHealthView {
    fn from(record: &WorkerHealth) -> Self {
        Self {
            worker_id: record.endpoint.id.clone(),
            status: record.status,
            consecutive_failures: record.consecutive_failures,
            last_checked_ms_ago: record
                .last_checked_at
                .map(|at| at.elapsed().as_millis() as u64),
            last_error: record.last_error.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorHealthResponse {
    pub status: String,
    pub snapshot_version: u64,
    pub healthy_workers: usize,
    pub workers: Vec<WorkerHealthView>,
}

//! Error types shared across the worker and the coordinator.
//!
//! Per-worker and per-document failures are recovered locally (excluded from a merge,
//! or degraded to zero hits); only the variants that reach a client map to an HTTP
//! status, see `handlers` in each service module.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures while building a worker's corpus shard. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("corpus directory {path} is unreadable: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corpus directory {path} contains no eligible files")]
    Empty { path: PathBuf },

    #[error("document {path} is {size} bytes, above the {limit} byte limit")]
    DocumentTooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },
}

/// Rejected patterns. Raised before any scanning takes place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("pattern must not be empty")]
    EmptyPattern,
}

/// A document that could not be scanned. Logged and treated as zero hits.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("document {document} is not valid UTF-8: {source}")]
    Decoding {
        document: String,
        #[source]
        source: std::str::Utf8Error,
    },
}

/// Errors surfaced by a worker's search operation.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("requested algorithm {requested} but this worker runs {configured}")]
    AlgorithmMismatch {
        requested: String,
        configured: String,
    },

    #[error("search pool failure: {0}")]
    Pool(String),
}

/// A single worker could not contribute to a query. Recovered by exclusion.
#[derive(Debug, Clone, Error)]
pub enum WorkerCallError {
    #[error("worker {worker} timed out after {after:?}")]
    TimedOut { worker: String, after: Duration },

    #[error("transport failure talking to {worker}: {message}")]
    Transport { worker: String, message: String },

    #[error("worker {worker} answered with status {status}: {message}")]
    Status {
        worker: String,
        status: u16,
        message: String,
    },

    #[error("worker {worker} sent an undecodable body: {message}")]
    Decode { worker: String, message: String },
}

impl WorkerCallError {
    /// Short label used for metrics and exclusion reasons.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerCallError::TimedOut { .. } => "timed_out",
            WorkerCallError::Transport { .. } => "transport",
            WorkerCallError::Status { .. } => "status",
            WorkerCallError::Decode { .. } => "decode",
        }
    }
}

/// Errors surfaced by the coordinator to its clients.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("no workers available ({excluded} excluded)")]
    NoWorkersAvailable { excluded: usize },
}

/// Startup configuration that parsed but does not make sense.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("threads per worker must be at least 1")]
    ZeroThreads,

    #[error("shard index {index} is out of range for {count} shards")]
    ShardOutOfRange { index: usize, count: usize },

    #[error("health failure threshold must be at least 1")]
    ZeroFailureThreshold,

    #[error("at least one worker address is required")]
    NoWorkers,
}

//! Worker Service Module
//!
//! Answers exact-substring queries against one in-memory corpus shard.
//!
//! ## Overview
//! Each query is compiled once with the worker's configured `Algorithm`, then one
//! matching task per document is run on a fixed-size `rayon` pool. The async request
//! handler awaits the whole batch on a blocking thread, so slow scans never stall the
//! HTTP runtime. All documents are always scanned; there is no early exit.
//!
//! ## Submodules
//! - **`service`**: The `WorkerService` (search + health operations).
//! - **`handlers`**: Axum handlers and the worker `Router`.
//! - **`protocol`**: Endpoints and wire types, shared with the coordinator.
//! - **`metrics`**: Prometheus counters and histograms tagged by algorithm.

pub mod handlers;
pub mod metrics;
pub mod protocol;
pub mod service;

pub use service::WorkerService;

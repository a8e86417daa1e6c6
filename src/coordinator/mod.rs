//! Coordinator Module
//!
//! Fans a client query out to every healthy worker, merges their hits and hides the
//! existence of the pool from the client.
//!
//! ## Responsibilities
//! - **Discovery**: enumerating candidate worker addresses (`WorkerDiscovery`).
//! - **Health**: a periodic, independent check loop that maintains one
//!   `WorkerHealth` record per worker and publishes versioned snapshots.
//! - **Dispatch**: scatter-gather over the snapshot's healthy workers with a
//!   per-worker timeout and an overall deadline.
//! - **Merge**: concatenation in snapshot order, with optional `(document, offset)`
//!   de-duplication for replicated corpora.
//!
//! ## Submodules
//! - **`types`**: Worker identity, health records, snapshots and the aggregate result.
//! - **`discovery`**: The discovery seam and the static address list.
//! - **`membership`**: The `HealthRegistry` and its snapshot channel.
//! - **`health`**: The `HealthMonitor` loop.
//! - **`client`**: HTTP calls against the worker wire contract.
//! - **`service`**: The `Coordinator` query operation.
//! - **`handlers`**: Axum handlers and the coordinator `Router`.
//! - **`metrics`**: Prometheus counters, gauges and the latency histogram.

pub mod client;
pub mod discovery;
pub mod handlers;
pub mod health;
pub mod membership;
pub mod metrics;
pub mod service;
pub mod types;

pub use client::WorkerClient;
pub use discovery::{StaticDiscovery, WorkerDiscovery};
pub use health::HealthMonitor;
pub use membership::HealthRegistry;
pub use service::Coordinator;

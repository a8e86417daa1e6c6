//! Distributed Exact-Substring Search Library
//!
//! This library crate defines the modules that make up the search cluster. It serves
//! as the foundation for the binary executable (`main.rs`), which runs either a worker
//! or the coordinator.
//!
//! ## Architecture Modules
//! - **`corpus`**: The document store. Loads a read-only shard of text files into
//!   memory once at worker startup.
//! - **`matching`**: The matching engine. Brute-force, Knuth-Morris-Pratt and
//!   Boyer-Moore behind one closed `Algorithm` / `Matcher` interface.
//! - **`worker`**: The worker service. Runs one matching task per document on a fixed
//!   thread pool and serves `/search`, `/health` and `/metrics`.
//! - **`coordinator`**: The query front end. Health-checks the worker pool, fans each
//!   query out to the healthy workers and merges their hits.
//! - **`config`**: Command line and environment configuration for both services.
//! - **`error`**: Typed errors for every layer.
//! - **`telemetry`**: Logging setup and Prometheus text rendering.

pub mod config;
pub mod coordinator;
pub mod corpus;
pub mod error;
pub mod matching;
pub mod telemetry;
pub mod worker;

#[cfg(test)]
mod test_support;

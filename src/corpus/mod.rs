//! Document Store Module
//!
//! Loads a worker's read-only corpus shard into memory at startup.
//!
//! ## Overview
//! - **Eligibility**: regular files under the corpus directory (walked recursively) whose
//!   extension is in the configured set.
//! - **Identity**: a document's id is its path relative to the corpus root, which is
//!   stable across restarts and identical on every replica.
//! - **Ordering**: documents are sorted by id, which fixes the iteration order used for
//!   hit ordering.
//! - **Partitioning**: optionally keep only every `count`-th document starting at `index`.
//!
//! The shard is never mutated after `load` returns and lives for the whole process.

pub mod loader;
pub mod types;

pub use loader::{LoadOptions, load};
pub use types::{CorpusShard, Document, DocumentId};

#[cfg(test)]
mod tests;

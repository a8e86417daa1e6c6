//! Worker Search Service
//!
//! Owns the immutable corpus shard, the configured matching strategy and the search
//! thread pool.
//!
//! ## Responsibilities
//! - **Validation**: empty queries and mismatched algorithm names are rejected up front.
//! - **Dispatch**: one matching task per document on the fixed-size pool.
//! - **Assembly**: hits concatenated in document order, ascending offset within a document.
//! - **Degradation**: a document that fails to decode is logged and yields zero hits.

use anyhow::Result;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;

use super::metrics::WorkerMetrics;
use super::protocol::{HealthResponse, MatchHit, SearchResponse, document_counts};
use crate::config::WorkerConfig;
use crate::corpus::{CorpusShard, Document};
use crate::error::WorkerError;
use crate::matching::{Algorithm, Matcher, byte_to_char_offsets};

pub struct WorkerService {
    worker_id: String,
    algorithm: Algorithm,
    threads: usize,
    shard: Arc<CorpusShard>,
    pool: Arc<rayon::ThreadPool>,
    pub metrics: Arc<WorkerMetrics>,
}

/// Outcome of scanning a single document.
enum DocumentScan {
    Hits(Vec<MatchHit>),
    Skipped,
}

impl WorkerService {
    pub fn new(config: &WorkerConfig, shard: CorpusShard) -> Result<Arc<Self>> {
        let worker_id = config
            .worker_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(|i| format!("search-worker-{i}"))
            .build()?;

        let metrics = Arc::new(WorkerMetrics::new(
            config.algorithm,
            shard.len(),
            config.threads,
        )?);

        tracing::info!(
            "Worker {} ready: algorithm={} threads={} documents={}",
            worker_id,
            config.algorithm,
            config.threads,
            shard.len()
        );

        Ok(Arc::new(Self {
            worker_id,
            algorithm: config.algorithm,
            threads: config.threads,
            shard: Arc::new(shard),
            pool: Arc::new(pool),
            metrics,
        }))
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn shard(&self) -> &CorpusShard {
        &self.shard
    }

    /// Searches every document of the shard for `query`.
    ///
    /// `requested_algorithm`, when present, must name this worker's strategy.
    pub async fn handle_search(
        &self,
        query: &str,
        requested_algorithm: Option<&str>,
    ) -> Result<SearchResponse, WorkerError> {
        let matcher = match self.prepare(query, requested_algorithm) {
            Ok(matcher) => matcher,
            Err(e) => {
                self.metrics.observe_invalid();
                return Err(e);
            }
        };

        let started = Instant::now();
        let shard = self.shard.clone();
        let pool = self.pool.clone();
        let metrics = self.metrics.clone();
        let scans = tokio::task::spawn_blocking(move || {
            pool.install(|| {
                shard
                    .documents()
                    .par_iter()
                    .map(|document| {
                        let _busy = metrics.busy_thread();
                        scan_document(document, &matcher)
                    })
                    .collect::<Vec<DocumentScan>>()
            })
        })
        .await
        .map_err(|e| WorkerError::Pool(e.to_string()))?;

        let mut hits = Vec::new();
        let mut skipped_documents = 0;
        for scan in scans {
            match scan {
                DocumentScan::Hits(document_hits) => hits.extend(document_hits),
                DocumentScan::Skipped => skipped_documents += 1,
            }
        }

        let elapsed = started.elapsed();
        self.metrics
            .observe_search(hits.len(), skipped_documents, elapsed);

        tracing::debug!(
            "Query {:?} -> {} hits in {:?} ({} documents skipped)",
            query,
            hits.len(),
            elapsed,
            skipped_documents
        );

        Ok(SearchResponse {
            worker_id: self.worker_id.clone(),
            algorithm: self.algorithm,
            query: query.to_string(),
            total_hits: hits.len(),
            documents: document_counts(&hits),
            hits,
            skipped_documents,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
        })
    }

    /// Liveness snapshot built from values captured at startup.
    pub fn handle_health(&self) -> HealthResponse {
        HealthResponse {
            worker_id: self.worker_id.clone(),
            status: "ok".to_string(),
            algorithm: self.algorithm,
            threads: self.threads,
            documents: self.shard.len(),
        }
    }

    fn prepare(
        &self,
        query: &str,
        requested_algorithm: Option<&str>,
    ) -> Result<Matcher, WorkerError> {
        if query.is_empty() {
            return Err(WorkerError::InvalidQuery(
                "query parameter 'q' must not be empty".to_string(),
            ));
        }

        if let Some(requested) = requested_algorithm
            && requested.parse::<Algorithm>().ok() != Some(self.algorithm)
        {
            return Err(WorkerError::AlgorithmMismatch {
                requested: requested.to_string(),
                configured: self.algorithm.to_string(),
            });
        }

        self.algorithm
            .compile(query.as_bytes())
            .map_err(|e| WorkerError::InvalidQuery(e.to_string()))
    }
}

fn scan_document(document: &Document, matcher: &Matcher) -> DocumentScan {
    let text = match document.text() {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Skipping document: {}", e);
            return DocumentScan::Skipped;
        }
    };

    let byte_offsets = matcher.find_all(text.as_bytes());
    let char_offsets = byte_to_char_offsets(text, &byte_offsets);

    DocumentScan::Hits(
        byte_offsets
            .into_iter()
            .zip(char_offsets)
            .map(|(byte_offset, offset)| MatchHit {
                document_id: document.id.clone(),
                offset,
                byte_offset,
            })
            .collect(),
    )
}

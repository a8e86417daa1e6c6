//! Worker Network Protocol
//!
//! Endpoints and Data Transfer Objects exposed by a worker. The coordinator talks to
//! workers exclusively through these types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::corpus::DocumentId;
use crate::matching::Algorithm;

// --- API Endpoints ---

/// Query endpoint: `GET /search?q=...` or `POST /search` with a JSON `SearchRequest`.
pub const ENDPOINT_SEARCH: &str = "/search";
/// Liveness endpoint. Never touches the corpus or the search pool.
pub const ENDPOINT_HEALTH: &str = "/health";
/// Prometheus text exposition.
pub const ENDPOINT_METRICS: &str = "/metrics";

// --- Data Transfer Objects ---

/// Query-string form of a search.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    /// Optional; must name the worker's configured algorithm when given.
    pub algorithm: Option<String>,
}

/// JSON body form of a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub q: String,
    #[serde(default)]
    pub algorithm: Option<String>,
}

/// One match: which document and where it starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MatchHit {
    pub document_id: DocumentId,
    /// Zero-based character position of the match start.
    pub offset: usize,
    pub byte_offset: usize,
}

/// Number of hits a document contributed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentCount {
    pub document_id: DocumentId,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub worker_id: String,
    pub algorithm: Algorithm,
    pub query: String,
    /// Document iteration order, then ascending offset.
    pub hits: Vec<MatchHit>,
    pub total_hits: usize,
    pub documents: Vec<DocumentCount>,
    /// Documents that could not be scanned and contributed nothing.
    #[serde(default)]
    pub skipped_documents: usize,
    pub elapsed_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub worker_id: String,
    pub status: String,
    pub algorithm: Algorithm,
    pub threads: usize,
    pub documents: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Per-document hit counts, most hits first, ties broken by document id.
pub fn document_counts(hits: &[MatchHit]) -> Vec<DocumentCount> {
    let mut counts: HashMap<&DocumentId, usize> = HashMap::new();
    for hit in hits {
        *counts.entry(&hit.document_id).or_insert(0) += 1;
    }

    let mut documents: Vec<DocumentCount> = counts
        .into_iter()
        .map(|(document_id, count)| DocumentCount {
            document_id: document_id.clone(),
            count,
        })
        .collect();
    documents.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.document_id.cmp(&b.document_id))
    });
    documents
}

//! Helpers shared by the service tests: in-memory shards and ephemeral HTTP servers.

use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::WorkerConfig;
use crate::corpus::{CorpusShard, Document, DocumentId};
use crate::matching::Algorithm;
use crate::worker::WorkerService;

pub fn shard(documents: &[(&str, &[u8])]) -> CorpusShard {
    CorpusShard::new(
        "memory",
        documents
            .iter()
            .map(|(id, content)| {
                Document::new(
                    DocumentId(id.to_string()),
                    PathBuf::from(id),
                    content.to_vec(),
                )
            })
            .collect(),
    )
}

pub fn worker(worker_id: &str, algorithm: Algorithm, documents: &[(&str, &[u8])]) -> Arc<WorkerService> {
    let config = WorkerConfig {
        worker_id: Some(worker_id.to_string()),
        algorithm,
        threads: 2,
        ..WorkerConfig::default()
    };
    WorkerService::new(&config, shard(documents)).expect("worker service")
}

/// Serves `router` on an ephemeral local port for the rest of the test.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    addr
}

use serde::de::DeserializeOwned;
use std::time::Duration;

use super::types::WorkerEndpoint;
use crate::error::WorkerCallError;
use crate::worker::protocol::{
    ENDPOINT_HEALTH, ENDPOINT_SEARCH, ErrorResponse, HealthResponse, SearchResponse,
};

/// HTTP client for the worker wire contract. Cheap to clone.
#[derive(Clone, Default)]
pub struct WorkerClient {
    http_client: reqwest::Client,
}

impl WorkerClient {
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
        }
    }

    /// `GET {base}/search?q=...[&algorithm=...]`, bounded by `timeout` end to end.
    pub async fn search(
        &self,
        endpoint: &WorkerEndpoint,
        query: &str,
        algorithm: Option<&str>,
        timeout: Duration,
    ) -> Result<SearchResponse, WorkerCallError> {
        let mut request = self
            .http_client
            .get(endpoint.url(ENDPOINT_SEARCH))
            .query(&[("q", query)])
            .timeout(timeout);
        if let Some(algorithm) = algorithm {
            request = request.query(&[("algorithm", algorithm)]);
        }

        self.fetch(endpoint, request, timeout).await
    }

    /// `GET {base}/health`. Anything but an `"ok"` status counts as a failure.
    pub async fn check_health(
        &self,
        endpoint: &WorkerEndpoint,
        timeout: Duration,
    ) -> Result<HealthResponse, WorkerCallError> {
        let request = self
            .http_client
            .get(endpoint.url(ENDPOINT_HEALTH))
            .timeout(timeout);

        let health: HealthResponse = self.fetch(endpoint, request, timeout).await?;
        if health.status != "ok" {
            return Err(WorkerCallError::Decode {
                worker: endpoint.id.to_string(),
                message: format!("reported status {:?}", health.status),
            });
        }
        Ok(health)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &WorkerEndpoint,
        request: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> Result<T, WorkerCallError> {
        let worker = endpoint.id.to_string();

        let response = request
            .send()
            .await
            .map_err(|e| classify(&worker, e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(WorkerCallError::Status {
                worker,
                status: status.as_u16(),
                message,
            });
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                classify(&worker, e, timeout)
            } else {
                WorkerCallError::Decode {
                    worker: worker.clone(),
                    message: e.to_string(),
                }
            }
        })
    }
}

fn classify(worker: &str, err: reqwest::Error, timeout: Duration) -> WorkerCallError {
    if err.is_timeout() {
        WorkerCallError::TimedOut {
            worker: worker.to_string(),
            after: timeout,
        }
    } else {
        WorkerCallError::Transport {
            worker: worker.to_string(),
            message: err.to_string(),
        }
    }
}

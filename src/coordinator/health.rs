//! Periodic health checking.
//!
//! Runs on its own interval, independent of query traffic. Each tick re-enumerates
//! discovery, checks every candidate concurrently, updates the registry and publishes
//! a fresh snapshot.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;

use super::client::WorkerClient;
use super::discovery::WorkerDiscovery;
use super::membership::HealthRegistry;
use super::metrics::CoordinatorMetrics;
use super::types::{MembershipSnapshot, WorkerId};
use crate::config::CoordinatorConfig;

pub struct HealthMonitor {
    discovery: Arc<dyn WorkerDiscovery>,
    registry: Arc<HealthRegistry>,
    client: WorkerClient,
    metrics: Arc<CoordinatorMetrics>,
    interval: Duration,
    check_timeout: Duration,
}

impl HealthMonitor {
    pub fn new(
        config: &CoordinatorConfig,
        discovery: Arc<dyn WorkerDiscovery>,
        registry: Arc<HealthRegistry>,
        client: WorkerClient,
        metrics: Arc<CoordinatorMetrics>,
    ) -> Arc<Self> {
        Arc::new(Self {
            discovery,
            registry,
            client,
            metrics,
            interval: config.health_interval(),
            check_timeout: config.health_timeout(),
        })
    }

    /// Spawns the health loop. The first check runs immediately.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        tracing::info!(
            "Starting health checks every {:?} (check timeout {:?}, threshold {})",
            self.interval,
            self.check_timeout,
            self.registry.failure_threshold()
        );

        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            self.check_once().await;
        }
    }

    /// One full health tick.
    pub async fn check_once(&self) -> Arc<MembershipSnapshot> {
        let candidates = self.discovery.candidates();
        for endpoint in &candidates {
            self.registry.observe(endpoint);
        }

        let current: HashSet<&WorkerId> = candidates.iter().map(|e| &e.id).collect();
        for worker_id in self.registry.known_ids() {
            if !current.contains(&worker_id) {
                self.registry
                    .record_failure(&worker_id, "no longer discovered".to_string());
            }
        }

        let mut checks = JoinSet::new();
        for endpoint in candidates.iter().cloned() {
            let client = self.client.clone();
            let timeout = self.check_timeout;
            checks.spawn(async move {
                let outcome = client.check_health(&endpoint, timeout).await;
                (endpoint.id, outcome)
            });
        }

        while let Some(joined) = checks.join_next().await {
            match joined {
                Ok((worker_id, Ok(_))) => self.registry.record_success(&worker_id),
                Ok((worker_id, Err(e))) => self.registry.record_failure(&worker_id, e.to_string()),
                Err(e) => tracing::error!("Health check task failed: {}", e),
            }
        }

        let snapshot = self.registry.publish();
        self.metrics.set_healthy_workers(snapshot.healthy.len());

        tracing::debug!(
            "Health tick v{}: {} healthy, {} ineligible",
            snapshot.version,
            snapshot.healthy.len(),
            snapshot.ineligible.len()
        );

        snapshot
    }
}

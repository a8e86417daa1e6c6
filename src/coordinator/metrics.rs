use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
};
use std::time::Duration;

use super::types::ExclusionReason;

pub struct CoordinatorMetrics {
    registry: Registry,
    requests: IntCounter,
    request_errors: IntCounter,
    inflight: IntGauge,
    latency: Histogram,
    worker_failures: IntCounterVec,
    healthy_workers: IntGauge,
}

/// Decrements the in-flight gauge when the query finishes or is dropped.
pub struct InflightGuard<'a> {
    gauge: &'a IntGauge,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        self.gauge.dec();
    }
}

impl CoordinatorMetrics {
    /// `workers` is the number of configured worker addresses.
    pub fn new(workers: usize) -> prometheus::Result<Self> {
        let registry = Registry::new();

        let requests = IntCounter::new("coord_requests_total", "Queries received")?;
        let request_errors = IntCounter::new(
            "coord_requests_errors",
            "Queries answered with an error",
        )?;
        let inflight = IntGauge::new("coord_inflight", "Queries currently being served")?;
        let latency = Histogram::with_opts(HistogramOpts::new(
            "coord_total_latency_seconds",
            "End-to-end query latency",
        ))?;
        let worker_failures = IntCounterVec::new(
            Opts::new(
                "coord_worker_failures_total",
                "Workers dropped from a merge",
            ),
            &["reason"],
        )?;
        let healthy_workers = IntGauge::new(
            "coord_healthy_workers",
            "Workers in the latest dispatch snapshot",
        )?;

        let info = IntGaugeVec::new(
            Opts::new("coord_info", "Coordinator configuration"),
            &["workers"],
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(request_errors.clone()))?;
        registry.register(Box::new(inflight.clone()))?;
        registry.register(Box::new(latency.clone()))?;
        registry.register(Box::new(worker_failures.clone()))?;
        registry.register(Box::new(healthy_workers.clone()))?;
        registry.register(Box::new(info.clone()))?;

        info.with_label_values(&[&workers.to_string()]).set(1);

        Ok(Self {
            registry,
            requests,
            request_errors,
            inflight,
            latency,
            worker_failures,
            healthy_workers,
        })
    }

    pub fn track_inflight(&self) -> InflightGuard<'_> {
        self.requests.inc();
        self.inflight.inc();
        InflightGuard {
            gauge: &self.inflight,
        }
    }

    pub fn observe_query(&self, elapsed: Duration, succeeded: bool) {
        self.latency.observe(elapsed.as_secs_f64());
        if !succeeded {
            self.request_errors.inc();
        }
    }

    pub fn observe_worker_failure(&self, reason: ExclusionReason) {
        self.worker_failures
            .with_label_values(&[reason.as_str()])
            .inc();
    }

    pub fn set_healthy_workers(&self, count: usize) {
        self.healthy_workers.set(count as i64);
    }

    pub fn inflight(&self) -> i64 {
        self.inflight.get()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
};
use std::time::Duration;

use crate::matching::Algorithm;

/// Pull-based worker metrics, all tagged with the worker's algorithm.
pub struct WorkerMetrics {
    registry: Registry,
    algorithm: Algorithm,
    requests: IntCounterVec,
    hits: IntCounterVec,
    skipped_documents: IntCounterVec,
    latency: HistogramVec,
    invalid_requests: IntCounter,
    active_threads: IntGauge,
}

/// Marks one pool thread busy for as long as it is held.
pub struct BusyThread {
    gauge: IntGauge,
}

impl Drop for BusyThread {
    fn drop(&mut self) {
        self.gauge.dec();
    }
}

impl WorkerMetrics {
    pub fn new(algorithm: Algorithm, documents: usize, threads: usize) -> prometheus::Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("worker_requests_total", "Searches served"),
            &["algorithm"],
        )?;
        let hits = IntCounterVec::new(
            Opts::new("worker_hits_total", "Matches found across all searches"),
            &["algorithm"],
        )?;
        let skipped_documents = IntCounterVec::new(
            Opts::new(
                "worker_skipped_documents_total",
                "Documents that could not be scanned",
            ),
            &["algorithm"],
        )?;
        let latency = HistogramVec::new(
            HistogramOpts::new("worker_latency_seconds", "Search latency"),
            &["algorithm"],
        )?;
        let invalid_requests = IntCounter::new(
            "worker_invalid_requests_total",
            "Searches rejected before dispatch",
        )?;
        let document_gauge = IntGauge::new("worker_documents", "Documents in this shard")?;
        let thread_gauge = IntGauge::new("worker_threads", "Size of the search thread pool")?;
        let active_threads = IntGauge::new(
            "worker_threads_active",
            "Pool threads currently scanning a document",
        )?;
        let info = IntGaugeVec::new(
            Opts::new("worker_algorithm_info", "Algorithm in use"),
            &["algorithm"],
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(hits.clone()))?;
        registry.register(Box::new(skipped_documents.clone()))?;
        registry.register(Box::new(latency.clone()))?;
        registry.register(Box::new(invalid_requests.clone()))?;
        registry.register(Box::new(document_gauge.clone()))?;
        registry.register(Box::new(thread_gauge.clone()))?;
        registry.register(Box::new(active_threads.clone()))?;
        registry.register(Box::new(info.clone()))?;

        document_gauge.set(documents as i64);
        thread_gauge.set(threads as i64);
        info.with_label_values(&[algorithm.as_str()]).set(1);

        Ok(Self {
            registry,
            algorithm,
            requests,
            hits,
            skipped_documents,
            latency,
            invalid_requests,
            active_threads,
        })
    }

    /// Called from a pool thread when it starts scanning a document.
    pub fn busy_thread(&self) -> BusyThread {
        self.active_threads.inc();
        BusyThread {
            gauge: self.active_threads.clone(),
        }
    }

    pub fn active_threads(&self) -> i64 {
        self.active_threads.get()
    }

    pub fn observe_search(&self, hits: usize, skipped: usize, elapsed: Duration) {
        let label = [self.algorithm.as_str()];
        self.requests.with_label_values(&label).inc();
        self.hits.with_label_values(&label).inc_by(hits as u64);
        if skipped > 0 {
            self.skipped_documents
                .with_label_values(&label)
                .inc_by(skipped as u64);
        }
        self.latency
            .with_label_values(&label)
            .observe(elapsed.as_secs_f64());
    }

    pub fn observe_invalid(&self) {
        self.invalid_requests.inc();
    }

    pub fn requests_served(&self) -> u64 {
        self.requests
            .with_label_values(&[self.algorithm.as_str()])
            .get()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

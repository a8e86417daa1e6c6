use anyhow::Context;
use clap::Parser;
use std::sync::Arc;

use distributed_search::config::{Cli, Command, CoordinatorConfig, WorkerConfig};
use distributed_search::coordinator::handlers::router as coordinator_router;
use distributed_search::coordinator::metrics::CoordinatorMetrics;
use distributed_search::coordinator::{
    Coordinator, HealthMonitor, HealthRegistry, StaticDiscovery, WorkerClient,
};
use distributed_search::corpus;
use distributed_search::telemetry;
use distributed_search::worker::WorkerService;
use distributed_search::worker::handlers::router as worker_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.log_level);

    match cli.command {
        Command::Worker(config) => run_worker(config).await,
        Command::Coordinator(config) => run_coordinator(config).await,
    }
}

async fn run_worker(config: WorkerConfig) -> anyhow::Result<()> {
    config.validate()?;

    // 1. Corpus shard (blocking file IO):
    tracing::info!("Loading corpus from {}", config.corpus_dir.display());
    let root = config.corpus_dir.clone();
    let options = config.load_options();
    let shard = tokio::task::spawn_blocking(move || corpus::load(&root, &options))
        .await?
        .with_context(|| format!("loading corpus from {}", config.corpus_dir.display()))?;
    tracing::info!(
        "Loaded {} documents ({} bytes)",
        shard.len(),
        shard.total_bytes()
    );

    // 2. Search service:
    let service = WorkerService::new(&config, shard)?;

    // 3. HTTP server:
    let app = worker_router(service);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("Worker listening on {}", config.bind);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Worker stopped");
    Ok(())
}

async fn run_coordinator(config: CoordinatorConfig) -> anyhow::Result<()> {
    config.validate()?;

    let addresses = config.worker_addresses();
    tracing::info!("Coordinating {} worker address(es)", addresses.len());
    for address in &addresses {
        tracing::info!("  - {}", address);
    }

    // 1. Health registry and monitor:
    let registry = Arc::new(HealthRegistry::new(config.failure_threshold));
    let metrics = Arc::new(CoordinatorMetrics::new(addresses.len())?);
    let client = WorkerClient::new();
    let monitor = HealthMonitor::new(
        &config,
        Arc::new(StaticDiscovery::new(&addresses)),
        registry.clone(),
        client.clone(),
        metrics.clone(),
    );
    let health_handle = monitor.start();

    // 2. Query service:
    let coordinator = Coordinator::new(&config, registry.clone(), client, metrics);

    // 3. Spawn stats reporter:
    let stats_registry = registry.clone();
    let stats_interval = config.stats_interval();
    let stats_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(stats_interval);

        loop {
            interval.tick().await;
            let snapshot = stats_registry.snapshot();
            tracing::info!(
                "Cluster stats: {} healthy workers (snapshot v{})",
                snapshot.healthy.len(),
                snapshot.version
            );
            for record in stats_registry.records() {
                tracing::info!(
                    "  - {} status={} failures={}",
                    record.endpoint.id,
                    record.status,
                    record.consecutive_failures
                );
            }
        }
    });

    // 4. HTTP server:
    let app = coordinator_router(coordinator);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("Coordinator listening on {}", config.bind);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    health_handle.abort();
    stats_handle.abort();
    tracing::info!("Coordinator stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

//! Startup Configuration
//!
//! One `Cli` value is parsed at process start from flags and the environment variables
//! set by the deployment tooling. The resulting `WorkerConfig` / `CoordinatorConfig`
//! is validated once and handed to the service constructors; nothing else in the crate
//! reads the environment.

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::corpus::LoadOptions;
use crate::corpus::loader::DEFAULT_MAX_DOCUMENT_BYTES;
use crate::error::ConfigError;
use crate::matching::Algorithm;

pub const DEFAULT_THREADS: usize = 8;
pub const DEFAULT_WORKER_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_QUERY_DEADLINE_MS: u64 = 10_000;
pub const DEFAULT_HEALTH_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_HEALTH_TIMEOUT_MS: u64 = 1_000;
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
pub const DEFAULT_STATS_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Parser)]
#[command(
    name = "distributed_search",
    version,
    about = "Distributed exact-substring search (coordinator and workers)"
)]
pub struct Cli {
    /// Maximum log level (trace, debug, info, warn, error).
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve searches over a local corpus shard.
    Worker(WorkerConfig),
    /// Fan queries out to a pool of workers and merge their hits.
    Coordinator(CoordinatorConfig),
}

#[derive(Debug, Clone, Args)]
pub struct WorkerConfig {
    #[arg(long, env = "WORKER_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    #[arg(long, env = "CORPUS_DIR", default_value = "/data")]
    pub corpus_dir: PathBuf,

    #[arg(long, env = "SEARCH_ALGORITHM", default_value = "brute-force")]
    pub algorithm: Algorithm,

    /// Size of the per-worker search thread pool.
    #[arg(long, env = "THREADS_PER_WORKER", default_value_t = DEFAULT_THREADS)]
    pub threads: usize,

    /// Identifier reported in responses; a random UUID when unset.
    #[arg(long, env = "WORKER_ID")]
    pub worker_id: Option<String>,

    #[arg(long, env = "MAX_DOCUMENT_BYTES", default_value_t = DEFAULT_MAX_DOCUMENT_BYTES)]
    pub max_document_bytes: u64,

    #[arg(long, env = "CORPUS_EXTENSIONS", value_delimiter = ',', default_value = "txt")]
    pub extensions: Vec<String>,

    #[arg(long, env = "SHARD_INDEX", default_value_t = 0)]
    pub shard_index: usize,

    #[arg(long, env = "SHARD_COUNT", default_value_t = 1)]
    pub shard_count: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            corpus_dir: PathBuf::from("/data"),
            algorithm: Algorithm::BruteForce,
            threads: DEFAULT_THREADS,
            worker_id: None,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            extensions: vec!["txt".to_string()],
            shard_index: 0,
            shard_count: 1,
        }
    }
}

impl WorkerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        if self.shard_count == 0 || self.shard_index >= self.shard_count {
            return Err(ConfigError::ShardOutOfRange {
                index: self.shard_index,
                count: self.shard_count,
            });
        }
        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            extensions: self
                .extensions
                .iter()
                .map(|ext| ext.trim().to_string())
                .filter(|ext| !ext.is_empty())
                .collect(),
            max_document_bytes: self.max_document_bytes,
            shard_index: self.shard_index,
            shard_count: self.shard_count,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct CoordinatorConfig {
    #[arg(long, env = "COORDINATOR_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Worker base URLs, comma separated.
    #[arg(long, env = "WORKERS", value_delimiter = ',', default_value = "http://worker:8000")]
    pub workers: Vec<String>,

    #[arg(long, env = "WORKER_TIMEOUT_MS", default_value_t = DEFAULT_WORKER_TIMEOUT_MS)]
    pub worker_timeout_ms: u64,

    /// Upper bound for a whole fan-out, whatever the per-worker timeout.
    #[arg(long, env = "QUERY_DEADLINE_MS", default_value_t = DEFAULT_QUERY_DEADLINE_MS)]
    pub query_deadline_ms: u64,

    #[arg(long, env = "HEALTH_INTERVAL_MS", default_value_t = DEFAULT_HEALTH_INTERVAL_MS)]
    pub health_interval_ms: u64,

    #[arg(long, env = "HEALTH_TIMEOUT_MS", default_value_t = DEFAULT_HEALTH_TIMEOUT_MS)]
    pub health_timeout_ms: u64,

    /// Consecutive failed checks before a worker is marked unhealthy.
    #[arg(long, env = "HEALTH_FAILURE_THRESHOLD", default_value_t = DEFAULT_FAILURE_THRESHOLD)]
    pub failure_threshold: u32,

    /// Drop repeated (document, offset) hits when workers are replicas.
    #[arg(long, env = "DEDUPLICATE_HITS")]
    pub dedupe_hits: bool,

    #[arg(long, env = "STATS_INTERVAL_SECS", default_value_t = DEFAULT_STATS_INTERVAL_SECS)]
    pub stats_interval_secs: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            workers: vec!["http://worker:8000".to_string()],
            worker_timeout_ms: DEFAULT_WORKER_TIMEOUT_MS,
            query_deadline_ms: DEFAULT_QUERY_DEADLINE_MS,
            health_interval_ms: DEFAULT_HEALTH_INTERVAL_MS,
            health_timeout_ms: DEFAULT_HEALTH_TIMEOUT_MS,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            dedupe_hits: false,
            stats_interval_secs: DEFAULT_STATS_INTERVAL_SECS,
        }
    }
}

impl CoordinatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.failure_threshold == 0 {
            return Err(ConfigError::ZeroFailureThreshold);
        }
        if self.worker_addresses().is_empty() {
            return Err(ConfigError::NoWorkers);
        }
        Ok(())
    }

    /// Non-blank worker addresses, in configuration order.
    pub fn worker_addresses(&self) -> Vec<String> {
        self.workers
            .iter()
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect()
    }

    pub fn worker_timeout(&self) -> Duration {
        Duration::from_millis(self.worker_timeout_ms)
    }

    pub fn query_deadline(&self) -> Duration {
        Duration::from_millis(self.query_deadline_ms)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_millis(self.health_interval_ms)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    fn test_worker_flags() {
        let cli = parse(&[
            "distributed_search",
            "--log-level",
            "debug",
            "worker",
            "--bind",
            "127.0.0.1:9000",
            "--corpus-dir",
            "/tmp/corpus",
            "--algorithm",
            "KMP",
            "--threads",
            "4",
            "--extensions",
            "txt,md",
        ]);

        assert_eq!(cli.log_level, tracing::Level::DEBUG);
        match cli.command {
            Command::Worker(config) => {
                assert_eq!(config.bind.port(), 9000);
                assert_eq!(config.algorithm, Algorithm::Kmp);
                assert_eq!(config.threads, 4);
                assert_eq!(config.extensions, vec!["txt", "md"]);
                assert!(config.validate().is_ok());
            }
            other => panic!("expected worker command, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_algorithm_is_rejected() {
        let result = Cli::try_parse_from([
            "distributed_search",
            "worker",
            "--algorithm",
            "regex",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_coordinator_flags() {
        let cli = parse(&[
            "distributed_search",
            "coordinator",
            "--workers",
            "http://a:8000, http://b:8000,,",
            "--worker-timeout-ms",
            "250",
            "--dedupe-hits",
        ]);

        match cli.command {
            Command::Coordinator(config) => {
                assert_eq!(
                    config.worker_addresses(),
                    vec!["http://a:8000", "http://b:8000"]
                );
                assert_eq!(config.worker_timeout(), Duration::from_millis(250));
                assert!(config.dedupe_hits);
                assert!(config.validate().is_ok());
            }
            other => panic!("expected coordinator command, got {:?}", other),
        }
    }

    #[test]
    fn test_worker_validation() {
        let zero_threads = WorkerConfig {
            threads: 0,
            ..WorkerConfig::default()
        };
        assert_eq!(zero_threads.validate(), Err(ConfigError::ZeroThreads));

        let bad_shard = WorkerConfig {
            shard_index: 2,
            shard_count: 2,
            ..WorkerConfig::default()
        };
        assert_eq!(
            bad_shard.validate(),
            Err(ConfigError::ShardOutOfRange { index: 2, count: 2 })
        );
    }

    #[test]
    fn test_coordinator_validation() {
        let no_threshold = CoordinatorConfig {
            failure_threshold: 0,
            ..CoordinatorConfig::default()
        };
        assert_eq!(no_threshold.validate(), Err(ConfigError::ZeroFailureThreshold));

        let no_workers = CoordinatorConfig {
            workers: vec![" ".to_string()],
            ..CoordinatorConfig::default()
        };
        assert_eq!(no_workers.validate(), Err(ConfigError::NoWorkers));
    }

    #[test]
    fn test_load_options_follow_config() {
        let config = WorkerConfig {
            extensions: vec![" txt ".to_string(), String::new()],
            max_document_bytes: 10,
            shard_index: 1,
            shard_count: 3,
            ..WorkerConfig::default()
        };
        let options = config.load_options();

        assert_eq!(options.extensions, vec!["txt"]);
        assert_eq!(options.max_document_bytes, 10);
        assert_eq!(options.shard_index, 1);
        assert_eq!(options.shard_count, 3);
    }
}

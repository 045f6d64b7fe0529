//! ISP Service Checker
//!
//! Periodically measures download/upload throughput and latency through a
//! pluggable speed-test provider and appends each result as a row of a CSV
//! log, until SIGINT or SIGTERM.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod provider;
pub mod scheduler;
pub mod shutdown;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, MeasurementError, Result};
pub use models::{Config, Measurement, MeasurementRecord};
pub use output::CsvLog;
pub use provider::{HttpSpeedProvider, MeasurementProvider};
pub use scheduler::Scheduler;
pub use shutdown::ShutdownSignal;
pub use types::{CycleOutcome, RunState, RunSummary, SleepOutcome};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const TARGET_TRIPLE: &str = env!("TARGET_TRIPLE");
pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);
    pub const DEFAULT_LOG_FILE: &str = "internet_metrics.csv";
    pub const DEFAULT_DOWNLOAD_URL: &str = "https://speed.cloudflare.com/__down";
    pub const DEFAULT_UPLOAD_URL: &str = "https://speed.cloudflare.com/__up";
    pub const DEFAULT_DOWNLOAD_BYTES: u64 = 25_000_000;
    pub const DEFAULT_UPLOAD_BYTES: u64 = 10_000_000;
    /// Hard ceiling for either transfer size
    pub const MAX_TRANSFER_BYTES: u64 = 1_000_000_000;
    pub const DEFAULT_PING_SAMPLES: u32 = 5;
    pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(120);
    pub const DEFAULT_ENABLE_COLOR: bool = true;
}

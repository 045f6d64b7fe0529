//! Configuration data model and validation

use crate::error::{AppError, Result};
use crate::logging::{LogFormat, LogLevel};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Scheduling and CSV output
    #[serde(default)]
    pub app: AppSettings,

    /// Speed-test endpoints and transfer sizes
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Console output
    #[serde(default)]
    pub output: OutputSettings,

    /// Enable verbose output (CLI only)
    #[serde(skip)]
    pub verbose: bool,

    /// Enable debug output (CLI only)
    #[serde(skip)]
    pub debug: bool,
}

/// `[app]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Seconds to sleep between cycles
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,

    /// CSV log path
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

/// `[provider]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_download_url")]
    pub download_url: String,

    #[serde(default = "default_upload_url")]
    pub upload_url: String,

    /// Bytes requested for the download test
    #[serde(default = "default_download_bytes")]
    pub download_bytes: u64,

    /// Bytes sent for the upload test
    #[serde(default = "default_upload_bytes")]
    pub upload_bytes: u64,

    /// Number of latency probes averaged into `ping_ms`
    #[serde(default = "default_ping_samples")]
    pub ping_samples: u32,

    /// Upper bound for one complete speed test
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,
}

/// `[output]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// console | json | compact
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// trace | debug | info | warn | error | off
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            log_file: default_log_file(),
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            download_url: default_download_url(),
            upload_url: default_upload_url(),
            download_bytes: default_download_bytes(),
            upload_bytes: default_upload_bytes(),
            ping_samples: default_ping_samples(),
            timeout_seconds: default_timeout_secs(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            enable_color: default_enable_color(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

impl ProviderSettings {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cycle interval as Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.app.interval_seconds)
    }

    /// Effective console log level after CLI flags are applied
    pub fn log_level(&self) -> Result<LogLevel> {
        if self.debug {
            return Ok(LogLevel::Debug);
        }
        let configured = LogLevel::from_str(&self.output.log_level)?;
        if self.verbose {
            Ok(configured.min(LogLevel::Debug))
        } else {
            Ok(configured)
        }
    }

    /// Console log format
    pub fn log_format(&self) -> Result<LogFormat> {
        LogFormat::from_str(&self.output.log_format)
    }

    /// Validate the configuration and return the first hard error
    pub fn validate(&self) -> Result<()> {
        if self.app.interval_seconds == 0 {
            return Err(AppError::config("interval_seconds must be a positive integer"));
        }

        if self.app.log_file.as_os_str().is_empty() {
            return Err(AppError::config("log_file cannot be empty"));
        }

        for (key, value) in [
            ("download_url", &self.provider.download_url),
            ("upload_url", &self.provider.upload_url),
        ] {
            match url::Url::parse(value) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                Ok(parsed) => {
                    return Err(AppError::config(format!(
                        "{} must use http or https, got scheme '{}'",
                        key,
                        parsed.scheme()
                    )));
                }
                Err(e) => {
                    return Err(AppError::config(format!("Invalid {} '{}': {}", key, value, e)));
                }
            }
        }

        let max = crate::defaults::MAX_TRANSFER_BYTES;
        for (key, value) in [
            ("download_bytes", self.provider.download_bytes),
            ("upload_bytes", self.provider.upload_bytes),
        ] {
            if value == 0 || value > max {
                return Err(AppError::config(format!(
                    "{} must be between 1 and {}, got {}",
                    key, max, value
                )));
            }
        }

        if self.provider.ping_samples == 0 {
            return Err(AppError::config("ping_samples must be greater than 0"));
        }

        if self.provider.timeout_seconds == 0 {
            return Err(AppError::config("provider timeout_seconds must be greater than 0"));
        }

        self.log_level()
            .map_err(|e| AppError::config(format!("Invalid log_level: {}", e)))?;
        self.log_format()
            .map_err(|e| AppError::config(format!("Invalid log_format: {}", e)))?;

        Ok(())
    }
}

// Default value functions for serde
fn default_interval_seconds() -> u64 {
    crate::defaults::DEFAULT_INTERVAL.as_secs()
}

fn default_log_file() -> PathBuf {
    PathBuf::from(crate::defaults::DEFAULT_LOG_FILE)
}

fn default_download_url() -> String {
    crate::defaults::DEFAULT_DOWNLOAD_URL.to_string()
}

fn default_upload_url() -> String {
    crate::defaults::DEFAULT_UPLOAD_URL.to_string()
}

fn default_download_bytes() -> u64 {
    crate::defaults::DEFAULT_DOWNLOAD_BYTES
}

fn default_upload_bytes() -> u64 {
    crate::defaults::DEFAULT_UPLOAD_BYTES
}

fn default_ping_samples() -> u32 {
    crate::defaults::DEFAULT_PING_SAMPLES
}

fn default_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_PROVIDER_TIMEOUT.as_secs()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}

fn default_log_format() -> String {
    "console".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

//! Non-fatal configuration checks shown at startup

use crate::{error::Result, models::Config};

/// Download sizes above this make every cycle expensive on metered links
const LARGE_TRANSFER_BYTES: u64 = 100_000_000;

/// Intervals below this hammer the speed-test service
const SHORT_INTERVAL_SECS: u64 = 60;

/// Configuration validator producing warnings on top of `Config::validate`
pub struct ConfigValidator;

impl ConfigValidator {
    /// Run hard validation, then collect advisory warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_schedule(config));
        warnings.extend(Self::validate_provider(config));

        Ok(warnings)
    }

    fn validate_schedule(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.app.interval_seconds < SHORT_INTERVAL_SECS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Interval of {}s runs a full speed test more than once a minute",
                    config.app.interval_seconds
                ),
            ));
        }

        if config.provider.timeout_seconds > config.app.interval_seconds {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "Provider timeout ({}s) exceeds the interval ({}s); later cycles start late",
                    config.provider.timeout_seconds, config.app.interval_seconds
                ),
            ));
        }

        if let Some(ext) = config.app.log_file.extension().and_then(|e| e.to_str()) {
            if !ext.eq_ignore_ascii_case("csv") {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!(
                        "Log file '{}' does not use a .csv extension",
                        config.app.log_file.display()
                    ),
                ));
            }
        }

        warnings
    }

    fn validate_provider(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for url in [&config.provider.download_url, &config.provider.upload_url] {
            if url.starts_with("http://") {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!(
                        "Endpoint '{}' uses HTTP instead of HTTPS; proxies may skew results",
                        url
                    ),
                ));
            }
        }

        let largest = config.provider.download_bytes.max(config.provider.upload_bytes);
        if largest > LARGE_TRANSFER_BYTES {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Large transfer sizes ({} B down / {} B up) are repeated every cycle",
                    config.provider.download_bytes, config.provider.upload_bytes
                ),
            ));
        }

        if config.provider.ping_samples == 1 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                "A single ping sample makes ping_ms noisy (recommended: >= 3)".to_string(),
            ));
        }

        warnings
    }
}

/// Validation warning level
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

/// Validation warning
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        if use_color {
            use colored::Colorize;
            let tag = match self.level {
                ValidationLevel::Info => self.level.as_str().blue(),
                ValidationLevel::Warning => self.level.as_str().yellow(),
            };
            format!("[{}] {}", tag, self.message)
        } else {
            format!("[{}] {}", self.level.as_str(), self.message)
        }
    }
}

/// Convenience function to validate configuration
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}

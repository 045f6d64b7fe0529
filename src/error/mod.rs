//! Error handling for the ISP service checker

use std::time::Duration;
use thiserror::Error;

/// Crate-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A measurement failure that escaped the scheduler loop
    #[error("Measurement error: {0}")]
    Measurement(#[from] MeasurementError),

    /// Network setup errors (building the HTTP client, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// I/O errors (CSV log, config file writes)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (URLs, log levels, etc.)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure of a single speed measurement.
///
/// Always recovered by the scheduler: the cycle is logged as failed, no CSV
/// row is written and the loop continues at the next interval.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasurementError {
    /// Connection refused, DNS failure, reset mid-transfer
    #[error("network failure during {stage}: {message}")]
    Network { stage: &'static str, message: String },

    /// The whole test did not finish within the configured bound
    #[error("speed test timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The speed-test endpoint answered with a non-success status
    #[error("{stage} endpoint returned HTTP {status}")]
    HttpStatus { stage: &'static str, status: u16 },

    /// The provider produced numbers that cannot be logged
    #[error("invalid measurement result: {0}")]
    InvalidResult(String),
}

impl MeasurementError {
    /// Create a network failure for the given test stage
    pub fn network<S: Into<String>>(stage: &'static str, message: S) -> Self {
        Self::Network { stage, message: message.into() }
    }

    /// Create an invalid-result failure
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::InvalidResult(message.into())
    }

    /// Map a reqwest error raised during `stage`
    pub fn from_reqwest(stage: &'static str, error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            Self::HttpStatus { stage, status: status.as_u16() }
        } else {
            Self::network(stage, error.to_string())
        }
    }

    /// Short machine-friendly kind, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Timeout(_) => "timeout",
            Self::HttpStatus { .. } => "http_status",
            Self::InvalidResult(_) => "invalid_result",
        }
    }
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Measurement(_) => "MEASUREMENT",
            Self::Network(_) => "NETWORK",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Check if error is recoverable (the next cycle may succeed)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Measurement(_) | Self::Network(_) | Self::Io(_) => true,
            Self::Config(_) | Self::Parse(_) | Self::Internal(_) => false,
        }
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        let (summary, hint) = match self {
            Self::Config(msg) => (
                format!("Configuration problem: {}", msg),
                "Check config.toml, your .env file and ISP_CHECKER__* variables.",
            ),
            Self::Measurement(err) => (
                format!("Speed test failed: {}", err),
                "Check your internet connection; the next cycle retries automatically.",
            ),
            Self::Network(msg) => (
                format!("Network setup failed: {}", msg),
                "Check TLS/proxy settings and the provider URLs.",
            ),
            Self::Io(msg) => (
                format!("File operation failed: {}", msg),
                "Check permissions and free space for the CSV log directory.",
            ),
            Self::Parse(msg) => (
                format!("Failed to parse value: {}", msg),
                "Check the format of your configuration values.",
            ),
            Self::Internal(msg) => (
                format!("Internal error: {}", msg),
                "This is likely a bug. Please report it with the error details.",
            ),
        };
        format!("{}\n\nSuggestion: {}", summary, hint)
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Parse(_) => 1,
            Self::Measurement(_) | Self::Network(_) => 2,
            Self::Io(_) => 5,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Measurement(_) | Self::Network(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Io(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::parse(format!("URL parse error: {}", error))
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Error reporter for user-facing error output
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Report an error to the user on stderr
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", self.render(error));
    }

    /// Render the report without printing it
    pub fn render(&self, error: &AppError) -> String {
        let mut output = error.format_for_console(self.use_color);

        if self.verbose {
            output.push_str("\n\n");
            output.push_str(&error.user_friendly_message());
        }

        output
    }
}

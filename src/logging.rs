//! Leveled logging for the checker
//!
//! Every logger carries the session id of the run it belongs to. Scheduler
//! cycles add a cycle id so the lines of one speed test can be grouped.

use crate::error::{AppError, MeasurementError, Result};
use crate::models::Config;
use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::{self, Write};
use uuid::Uuid;

/// Log level, ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    /// Threshold only: nothing is emitted at or above it
    Off,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Off => "OFF",
        }
    }

    fn paint(self, text: &str) -> ColoredString {
        match self {
            LogLevel::Trace => text.dimmed(),
            LogLevel::Debug => text.cyan(),
            LogLevel::Info => text.green(),
            LogLevel::Warn => text.yellow(),
            LogLevel::Error | LogLevel::Off => text.red().bold(),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" => Ok(LogLevel::Off),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// Line format of emitted entries
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Timestamp, level, logger name, message and `key=value` fields
    Console,
    /// One JSON object per line
    Json,
    /// Time, level initial and message only
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "console" => Ok(LogFormat::Console),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(AppError::parse(format!("Invalid log format: {}", s))),
        }
    }
}

/// One log line before rendering
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub logger: String,
    pub message: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_id: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Value>,
    /// `file:line` of the call site, set by `log_debug!`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Leveled logger bound to one run session
#[derive(Debug, Clone)]
pub struct Logger {
    name: String,
    session_id: String,
    min_level: LogLevel,
    format: LogFormat,
    use_color: bool,
    show_source: bool,
}

impl Logger {
    /// Logger at `Info` with console output and a fresh session id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            session_id: Uuid::new_v4().to_string(),
            min_level: LogLevel::Info,
            format: LogFormat::Console,
            use_color: true,
            show_source: false,
        }
    }

    /// Logger configured from `[output]` and the `--verbose`/`--debug` flags
    pub fn from_config(name: impl Into<String>, config: &Config) -> Self {
        Self {
            min_level: config.log_level().unwrap_or(LogLevel::Info),
            format: config.log_format().unwrap_or(LogFormat::Console),
            use_color: config.output.enable_color,
            show_source: config.debug,
            ..Self::new(name)
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn set_format(&mut self, format: LogFormat) {
        self.format = format;
    }

    pub fn set_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    /// Fresh id for one scheduler cycle
    pub fn new_cycle_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level < LogLevel::Off && level >= self.min_level
    }

    pub fn debug(&self, message: impl Into<String>) -> LogEntryBuilder<'_> {
        self.entry(LogLevel::Debug, message.into())
    }

    pub fn info(&self, message: impl Into<String>) -> LogEntryBuilder<'_> {
        self.entry(LogLevel::Info, message.into())
    }

    pub fn warn(&self, message: impl Into<String>) -> LogEntryBuilder<'_> {
        self.entry(LogLevel::Warn, message.into())
    }

    pub fn error(&self, message: impl Into<String>) -> LogEntryBuilder<'_> {
        self.entry(LogLevel::Error, message.into())
    }

    fn entry(&self, level: LogLevel, message: String) -> LogEntryBuilder<'_> {
        LogEntryBuilder {
            logger: self,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                logger: self.name.clone(),
                message,
                session_id: self.session_id.clone(),
                cycle_id: None,
                fields: BTreeMap::new(),
                source: None,
            },
        }
    }

    fn render(&self, entry: &LogEntry) -> Option<String> {
        if !self.enabled(entry.level) {
            return None;
        }

        let line = match self.format {
            LogFormat::Console => self.render_console(entry),
            LogFormat::Json => serde_json::to_string(entry).unwrap_or_else(|e| {
                format!("{{\"level\":\"error\",\"message\":\"unserializable log entry: {}\"}}", e)
            }),
            LogFormat::Compact => format!(
                "{} {} {}: {}",
                entry.timestamp.format("%H:%M:%S"),
                &entry.level.as_str()[..1],
                entry.logger,
                entry.message
            ),
        };
        Some(line)
    }

    fn render_console(&self, entry: &LogEntry) -> String {
        let level = format!("{:>5}", entry.level.as_str());
        let level = if self.use_color {
            entry.level.paint(&level).to_string()
        } else {
            level
        };

        let mut line = format!(
            "{} {} [{}] {}",
            entry.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            level,
            entry.logger,
            entry.message
        );

        if let Some(cycle_id) = &entry.cycle_id {
            line.push_str(&format!(" cycle={}", cycle_id.get(..8).unwrap_or(cycle_id)));
        }
        for (key, value) in &entry.fields {
            line.push_str(&format!(" {}={}", key, value));
        }
        if self.show_source {
            if let Some(source) = &entry.source {
                line.push_str(&format!(" ({})", source));
            }
        }

        line
    }

    fn emit(&self, entry: LogEntry) {
        let Some(line) = self.render(&entry) else {
            return;
        };
        // Nowhere left to report a failed console write
        if entry.level >= LogLevel::Warn {
            let _ = writeln!(io::stderr(), "{}", line);
        } else {
            let _ = writeln!(io::stdout(), "{}", line);
        }
    }
}

/// Collects fields for one entry; finish with `log` or `render`
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl LogEntryBuilder<'_> {
    pub fn cycle(mut self, id: &str) -> Self {
        self.entry.cycle_id = Some(id.to_string());
        self
    }

    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), value);
        }
        self
    }

    pub fn source(mut self, file: &str, line: u32) -> Self {
        self.entry.source = Some(format!("{}:{}", file, line));
        self
    }

    pub fn app_error(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_recoverable", error.is_recoverable())
    }

    pub fn measurement_error(self, error: &MeasurementError) -> Self {
        self.field("error_kind", error.kind())
            .field("error", error.to_string())
    }

    pub fn log(self) {
        self.logger.emit(self.entry);
    }

    /// The rendered line, or `None` when the level is filtered out
    pub fn render(self) -> Option<String> {
        self.logger.render(&self.entry)
    }
}

/// Debug line tagged with the calling file and line
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(format!($($arg)*)).source(file!(), line!()).log()
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn plain_logger() -> Logger {
        let mut logger = Logger::new("TEST");
        logger.set_color(false);
        logger
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("off").unwrap(), LogLevel::Off);
        assert!(LogLevel::from_str("fatal").is_err());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
        assert!(LogFormat::from_str("xml").is_err());
    }

    #[test]
    fn test_from_config_uses_output_settings() {
        let mut config = Config::default();
        config.output.enable_color = false;
        config.output.log_format = "json".to_string();
        config.verbose = true;

        let logger = Logger::from_config("SCHED", &config);
        assert!(!logger.use_color);
        assert!(!logger.show_source);
        assert_eq!(logger.format, LogFormat::Json);
        assert!(logger.enabled(LogLevel::Debug));
        assert!(!logger.enabled(LogLevel::Trace));
    }

    #[test]
    fn test_level_filtering() {
        let mut logger = plain_logger();
        assert!(logger.debug("hidden").render().is_none());
        assert!(logger.info("shown").render().is_some());

        logger.set_level(LogLevel::Off);
        assert!(logger.error("silenced").render().is_none());
    }

    #[test]
    fn test_console_line() {
        let logger = plain_logger();
        let line = logger
            .info("cycle finished")
            .cycle("0123456789abcdef")
            .field("rows", 1)
            .render()
            .unwrap();

        assert!(line.contains(" INFO [TEST] cycle finished cycle=01234567 rows=1"));
        assert!(!line.contains(&logger.session_id));
    }

    #[test]
    fn test_source_only_shown_in_debug_mode() {
        let mut logger = plain_logger();
        let line = logger.info("x").source("src/app.rs", 7).render().unwrap();
        assert!(!line.contains("src/app.rs"));

        logger.show_source = true;
        let line = logger.info("x").source("src/app.rs", 7).render().unwrap();
        assert!(line.ends_with("(src/app.rs:7)"));
    }

    #[test]
    fn test_json_line_carries_session() {
        let mut logger = plain_logger();
        logger.set_format(LogFormat::Json);

        let line = logger.warn("slow cycle").field("log_file", "metrics.csv").render().unwrap();
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "warn");
        assert_eq!(value["session_id"], logger.session_id());
        assert_eq!(value["fields"]["log_file"], "metrics.csv");
        assert!(value.get("cycle_id").is_none());
    }

    #[test]
    fn test_clones_keep_session() {
        let logger = plain_logger();
        assert_eq!(logger.clone().session_id(), logger.session_id());
        assert_ne!(Logger::new("TEST").session_id(), logger.session_id());
    }

    #[test]
    fn test_compact_line() {
        let mut logger = plain_logger();
        logger.set_format(LogFormat::Compact);
        let line = logger.error("write failed").render().unwrap();
        assert!(line.ends_with("E TEST: write failed"));
    }

    #[test]
    fn test_error_fields() {
        let logger = plain_logger();
        let err = MeasurementError::HttpStatus { stage: "upload", status: 502 };
        let line = logger.warn("measurement failed").measurement_error(&err).render().unwrap();
        assert!(line.contains("error_kind=\"http_status\""));

        let line = logger
            .error("append failed")
            .app_error(&AppError::io("disk full"))
            .render()
            .unwrap();
        assert!(line.contains("error_category=\"IO\""));
        assert!(line.contains("error_recoverable=true"));
    }
}

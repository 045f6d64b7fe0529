//! Human-readable console lines for measurements and run summaries

use crate::models::MeasurementRecord;
use crate::types::RunSummary;
use colored::Colorize;
use std::path::Path;
use std::time::Duration;

/// Formats console output, with or without ANSI colors
#[derive(Debug, Clone, Copy)]
pub struct ConsoleFormatter {
    use_color: bool,
}

impl ConsoleFormatter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    /// `[2026-10-17T08:30:00Z] Download: 50.20 Mbps | Upload: 10.10 Mbps | Ping: 12.00 ms`
    pub fn measurement_line(&self, record: &MeasurementRecord) -> String {
        let m = record.measurement();
        let download = format!("{:.2} Mbps", m.download_mbps);
        let upload = format!("{:.2} Mbps", m.upload_mbps);
        let ping = format!("{:.2} ms", m.ping_ms);

        if self.use_color {
            format!(
                "[{}] Download: {} | Upload: {} | Ping: {}",
                record.timestamp_iso().dimmed(),
                download.green().bold(),
                upload.cyan().bold(),
                ping.yellow().bold()
            )
        } else {
            format!(
                "[{}] Download: {} | Upload: {} | Ping: {}",
                record.timestamp_iso(),
                download,
                upload,
                ping
            )
        }
    }

    /// Startup banner lines
    pub fn startup_lines(&self, log_file: &Path, interval: Duration) -> Vec<String> {
        vec![
            format!("Logging to: {}", log_file.display()),
            format!("Interval: {} seconds", interval.as_secs()),
        ]
    }

    /// Final line printed after the loop exits
    pub fn summary_line(&self, summary: &RunSummary) -> String {
        let text = format!(
            "Stopped after {} cycle(s): {} recorded, {} measurement failure(s), \
             {} write failure(s).",
            summary.cycles, summary.recorded, summary.measurement_failures, summary.write_failures
        );

        if !self.use_color {
            return text;
        }
        if summary.measurement_failures + summary.write_failures > 0 {
            text.yellow().to_string()
        } else {
            text.green().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Measurement;
    use chrono::{TimeZone, Utc};

    fn record() -> MeasurementRecord {
        MeasurementRecord::new(
            Utc.with_ymd_and_hms(2026, 10, 17, 8, 30, 0).unwrap(),
            Measurement::new(50.2, 10.1, 12.0).unwrap(),
        )
    }

    #[test]
    fn test_plain_measurement_line() {
        let formatter = ConsoleFormatter::new(false);
        assert_eq!(
            formatter.measurement_line(&record()),
            "[2026-10-17T08:30:00Z] Download: 50.20 Mbps | Upload: 10.10 Mbps | Ping: 12.00 ms"
        );
    }

    #[test]
    fn test_colored_line_keeps_values() {
        colored::control::set_override(true);
        let line = ConsoleFormatter::new(true).measurement_line(&record());
        colored::control::unset_override();

        assert!(line.contains("50.20 Mbps"));
        assert!(line.contains("\x1b["));
    }

    #[test]
    fn test_startup_lines() {
        let lines = ConsoleFormatter::new(false)
            .startup_lines(Path::new("out.csv"), Duration::from_secs(300));
        assert_eq!(lines, vec!["Logging to: out.csv", "Interval: 300 seconds"]);
    }

    #[test]
    fn test_summary_line() {
        let summary = RunSummary {
            cycles: 3,
            recorded: 2,
            measurement_failures: 1,
            write_failures: 0,
        };
        assert_eq!(
            ConsoleFormatter::new(false).summary_line(&summary),
            "Stopped after 3 cycle(s): 2 recorded, 1 measurement failure(s), 0 write failure(s)."
        );
    }
}

//! Measurement scheduler: measure, append, sleep, repeat until stopped

use crate::{
    error::Result,
    logging::Logger,
    models::MeasurementRecord,
    output::{ConsoleFormatter, CsvLog},
    provider::MeasurementProvider,
    shutdown::ShutdownSignal,
    types::{CycleOutcome, RunSummary, SleepOutcome},
};
use chrono::Utc;
use std::time::Duration;

/// Drives the measurement loop for one provider and one CSV log
pub struct Scheduler<P: MeasurementProvider> {
    provider: P,
    log: CsvLog,
    interval: Duration,
    shutdown: ShutdownSignal,
    logger: Logger,
    console: ConsoleFormatter,
}

impl<P: MeasurementProvider> Scheduler<P> {
    pub fn new(
        provider: P,
        log: CsvLog,
        interval: Duration,
        shutdown: ShutdownSignal,
        logger: Logger,
    ) -> Self {
        Self {
            provider,
            log,
            interval,
            shutdown,
            logger,
            console: ConsoleFormatter::new(false),
        }
    }

    /// Use colored measurement lines
    pub fn with_console(mut self, console: ConsoleFormatter) -> Self {
        self.console = console;
        self
    }

    pub fn log(&self) -> &CsvLog {
        &self.log
    }

    /// Run cycles until shutdown is requested.
    ///
    /// Fails only if the CSV log cannot be prepared before the first cycle;
    /// later measurement and write failures are logged and counted.
    pub async fn run(&self) -> Result<RunSummary> {
        if self.log.ensure_header()? {
            self.logger
                .info("Created CSV log with header")
                .field("log_file", self.log.path().display().to_string())
                .log();
        }

        let mut summary = RunSummary::default();

        while !self.shutdown.is_stopping() {
            let outcome = self.run_cycle().await;
            summary.record(&outcome);
            if matches!(outcome, CycleOutcome::Interrupted) {
                break;
            }

            let next_run = chrono::Duration::from_std(self.interval)
                .ok()
                .and_then(|interval| Utc::now().checked_add_signed(interval));
            if let Some(next_run) = next_run {
                self.logger
                    .debug("Sleeping until next cycle")
                    .field("next_run", next_run.to_rfc3339())
                    .log();
            }

            if self.shutdown.sleep(self.interval).await == SleepOutcome::Interrupted {
                break;
            }
        }

        self.logger
            .info("Scheduler stopped")
            .field("cycles", summary.cycles)
            .field("recorded", summary.recorded)
            .field("measurement_failures", summary.measurement_failures)
            .field("write_failures", summary.write_failures)
            .log();

        Ok(summary)
    }

    /// Run one measure-and-append cycle
    pub async fn run_cycle(&self) -> CycleOutcome {
        let cycle_id = Logger::new_cycle_id();
        let started = Utc::now();

        self.logger
            .debug("Starting speed test")
            .cycle(&cycle_id)
            .field("provider", self.provider.name())
            .log();

        // Dropping an unfinished measurement is safe: nothing has been written yet
        let result = tokio::select! {
            biased;
            _ = self.shutdown.stopped() => None,
            result = self.provider.measure() => Some(result),
        };

        let outcome = match result {
            None => CycleOutcome::Interrupted,
            Some(Err(error)) => CycleOutcome::MeasurementFailed(error),
            Some(Ok(measurement)) => {
                let record = MeasurementRecord::new(started, measurement);
                match self.log.append(&record) {
                    Ok(()) => CycleOutcome::Recorded(record),
                    Err(error) => CycleOutcome::WriteFailed(error),
                }
            }
        };

        self.report(&cycle_id, &outcome);
        outcome
    }

    fn report(&self, cycle_id: &str, outcome: &CycleOutcome) {
        match outcome {
            CycleOutcome::Recorded(record) => {
                let m = record.measurement();
                self.logger
                    .info(self.console.measurement_line(record))
                    .cycle(cycle_id)
                    .field("download_mbps", m.download_mbps)
                    .field("upload_mbps", m.upload_mbps)
                    .field("ping_ms", m.ping_ms)
                    .log();
            }
            CycleOutcome::MeasurementFailed(error) => {
                self.logger
                    .warn(format!("Error during speed test: {}", error))
                    .cycle(cycle_id)
                    .measurement_error(error)
                    .log();
            }
            CycleOutcome::WriteFailed(error) => {
                self.logger
                    .error(format!("Failed to append result: {}", error))
                    .cycle(cycle_id)
                    .app_error(error)
                    .log();
            }
            CycleOutcome::Interrupted => {
                self.logger
                    .info("Speed test abandoned: shutdown requested")
                    .cycle(cycle_id)
                    .log();
            }
        }
    }
}

//! Shared enums for the run loop

use crate::error::{AppError, MeasurementError};
use crate::models::MeasurementRecord;

// Re-export commonly used types
pub use crate::error::Result;

/// Scheduler lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Stopping,
}

/// How an interruptible sleep ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    /// The full duration passed
    Elapsed,
    /// Shutdown was requested first
    Interrupted,
}

/// Result of one scheduler cycle
#[derive(Debug)]
pub enum CycleOutcome {
    /// Measurement succeeded and one row was appended
    Recorded(MeasurementRecord),
    /// Provider failed; nothing was written
    MeasurementFailed(MeasurementError),
    /// Measurement succeeded but the row could not be written
    WriteFailed(AppError),
    /// Shutdown arrived before the measurement finished; nothing was written
    Interrupted,
}

impl CycleOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded(_))
    }
}

/// Counters reported when the scheduler stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Cycles that ran to completion or failure (interrupted ones excluded)
    pub cycles: u64,
    pub recorded: u64,
    pub measurement_failures: u64,
    pub write_failures: u64,
}

impl RunSummary {
    /// Fold one cycle outcome into the counters
    pub fn record(&mut self, outcome: &CycleOutcome) {
        match outcome {
            CycleOutcome::Recorded(_) => self.recorded += 1,
            CycleOutcome::MeasurementFailed(_) => self.measurement_failures += 1,
            CycleOutcome::WriteFailed(_) => self.write_failures += 1,
            CycleOutcome::Interrupted => return,
        }
        self.cycles += 1;
    }
}

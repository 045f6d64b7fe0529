//! Run/stop state shared between the signal listener and the scheduler
//!
//! The state starts as `Running`, is flipped to `Stopping` by SIGINT/SIGTERM
//! (or `trigger`) and never goes back.

#[cfg(unix)]
use crate::error::AppError;
use crate::error::Result;
use crate::logging::Logger;
use crate::types::{RunState, SleepOutcome};
#[cfg(unix)]
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

/// Cloneable handle to the process run state
#[derive(Clone, Debug)]
pub struct ShutdownSignal {
    state: Arc<watch::Sender<RunState>>,
}

impl ShutdownSignal {
    /// New signal in the `Running` state
    pub fn new() -> Self {
        let (state, _) = watch::channel(RunState::Running);
        Self {
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    pub fn is_stopping(&self) -> bool {
        self.state() == RunState::Stopping
    }

    /// Request shutdown; later calls are no-ops
    pub fn trigger(&self) {
        self.state.send_if_modified(|state| {
            if *state == RunState::Stopping {
                false
            } else {
                *state = RunState::Stopping;
                true
            }
        });
    }

    /// Resolve once shutdown has been requested
    pub async fn stopped(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close under us
        let _ = rx.wait_for(|state| *state == RunState::Stopping).await;
    }

    /// Sleep for `duration` unless shutdown is requested first
    pub async fn sleep(&self, duration: Duration) -> SleepOutcome {
        if self.is_stopping() {
            return SleepOutcome::Interrupted;
        }

        tokio::select! {
            _ = tokio::time::sleep(duration) => SleepOutcome::Elapsed,
            _ = self.stopped() => SleepOutcome::Interrupted,
        }
    }

    /// Spawn a task translating SIGINT/SIGTERM into `trigger`.
    ///
    /// On Unix both handlers are registered before this returns, so a signal
    /// sent right after startup is never handled by the default action.
    pub fn install_handlers(&self, logger: Logger) -> Result<()> {
        #[cfg(unix)]
        let (mut interrupt, mut terminate) = (
            unix_signal(SignalKind::interrupt(), "SIGINT")?,
            unix_signal(SignalKind::terminate(), "SIGTERM")?,
        );

        let shutdown = self.clone();
        tokio::spawn(async move {
            #[cfg(unix)]
            let received = first_signal(interrupt.recv(), terminate.recv()).await;
            #[cfg(not(unix))]
            let received = tokio::signal::ctrl_c().await.ok().map(|()| "SIGINT");

            let Some(name) = received else {
                logger
                    .warn("No termination signal can be received; stop the process by other means")
                    .log();
                return;
            };

            logger
                .info("Termination signal received, stopping after the current step")
                .field("signal", name)
                .log();
            shutdown.trigger();
        });

        Ok(())
    }
}

#[cfg(unix)]
fn unix_signal(kind: SignalKind, name: &str) -> Result<Signal> {
    signal(kind)
        .map_err(|e| AppError::internal(format!("Failed to install {} handler: {}", name, e)))
}

/// Name of the first termination signal to arrive.
///
/// A source that closes without delivering is ignored and the other one is
/// still awaited. `None` means neither can deliver anything.
#[cfg(unix)]
async fn first_signal<I, T>(interrupt: I, terminate: T) -> Option<&'static str>
where
    I: Future<Output = Option<()>>,
    T: Future<Output = Option<()>>,
{
    tokio::select! {
        Some(()) = interrupt => Some("SIGINT"),
        Some(()) = terminate => Some("SIGTERM"),
        else => None,
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_starts_running() {
        let signal = ShutdownSignal::new();
        assert_eq!(signal.state(), RunState::Running);
        assert!(!signal.is_stopping());
    }

    #[test]
    fn test_trigger_is_sticky_and_shared() {
        let signal = ShutdownSignal::new();
        let clone = signal.clone();

        clone.trigger();
        assert!(signal.is_stopping());

        clone.trigger();
        assert_eq!(signal.state(), RunState::Stopping);
    }

    #[tokio::test]
    async fn test_sleep_elapses_when_running() {
        let signal = ShutdownSignal::new();
        let outcome = signal.sleep(Duration::from_millis(20)).await;
        assert_eq!(outcome, SleepOutcome::Elapsed);
    }

    #[tokio::test]
    async fn test_sleep_interrupted_by_trigger() {
        let signal = ShutdownSignal::new();
        let trigger = signal.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.trigger();
        });

        let start = Instant::now();
        let outcome = signal.sleep(Duration::from_secs(3600)).await;
        assert_eq!(outcome, SleepOutcome::Interrupted);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_sleep_returns_immediately_when_already_stopping() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        let outcome = tokio::time::timeout(
            Duration::from_secs(1),
            signal.sleep(Duration::from_secs(3600)),
        )
        .await
        .unwrap();
        assert_eq!(outcome, SleepOutcome::Interrupted);
    }

    #[tokio::test]
    async fn test_stopped_resolves_after_trigger() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        tokio::time::timeout(Duration::from_secs(1), signal.stopped())
            .await
            .unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_first_signal_reports_interrupt() {
        let name = first_signal(async { Some(()) }, std::future::pending()).await;
        assert_eq!(name, Some("SIGINT"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_closed_interrupt_source_keeps_waiting_for_terminate() {
        let terminate = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Some(())
        };

        let start = Instant::now();
        assert_eq!(first_signal(async { None::<()> }, terminate).await, Some("SIGTERM"));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_closed_terminate_source_still_allows_interrupt() {
        let interrupt = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Some(())
        };
        assert_eq!(first_signal(interrupt, async { None::<()> }).await, Some("SIGINT"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_no_signal_sources_left() {
        assert_eq!(first_signal(async { None::<()> }, async { None::<()> }).await, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_installed_handlers_leave_state_running() {
        let shutdown = ShutdownSignal::new();
        let mut logger = Logger::new("signal-test");
        logger.set_level(crate::logging::LogLevel::Off);

        shutdown.install_handlers(logger).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!shutdown.is_stopping());
    }
}

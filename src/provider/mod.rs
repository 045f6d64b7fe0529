//! Speed measurement providers

pub mod http;

pub use http::HttpSpeedProvider;

use crate::{error::MeasurementError, models::Measurement};
use async_trait::async_trait;

/// Performs one network speed test.
///
/// Implementations must not panic on network trouble; every failure is a
/// `MeasurementError` so the scheduler can skip the cycle and carry on.
#[async_trait]
pub trait MeasurementProvider: Send + Sync {
    /// Run a full test and return download/upload throughput and ping
    async fn measure(&self) -> Result<Measurement, MeasurementError>;

    /// Short name used in log output
    fn name(&self) -> &str;
}

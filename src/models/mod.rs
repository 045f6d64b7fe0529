//! Data models for the ISP service checker

pub mod config;
pub mod record;

// Re-export main model types
pub use config::{AppSettings, Config, OutputSettings, ProviderSettings};
pub use record::{Measurement, MeasurementRecord};

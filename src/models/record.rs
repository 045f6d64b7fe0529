//! Measurement result data models

use crate::error::MeasurementError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Raw result of one speed test, as returned by a provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub download_mbps: f64,
    pub upload_mbps: f64,
    pub ping_ms: f64,
}

impl Measurement {
    /// Build a measurement, rejecting values that cannot be logged
    pub fn new(
        download_mbps: f64,
        upload_mbps: f64,
        ping_ms: f64,
    ) -> Result<Self, MeasurementError> {
        for (name, value) in [
            ("download_mbps", download_mbps),
            ("upload_mbps", upload_mbps),
            ("ping_ms", ping_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(MeasurementError::invalid(format!("{} = {}", name, value)));
            }
        }

        // Adding 0.0 turns -0.0 into 0.0 so rows never render "-0.00"
        Ok(Self {
            download_mbps: download_mbps + 0.0,
            upload_mbps: upload_mbps + 0.0,
            ping_ms: ping_ms + 0.0,
        })
    }
}

/// One row of the CSV log.
///
/// Immutable once built; the scheduler writes it and drops it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    timestamp: DateTime<Utc>,
    measurement: Measurement,
}

impl MeasurementRecord {
    /// Column names, in row order
    pub const CSV_HEADER: [&'static str; 4] =
        ["timestamp_iso", "download_mbps", "upload_mbps", "ping_ms"];

    pub fn new(timestamp: DateTime<Utc>, measurement: Measurement) -> Self {
        Self {
            timestamp,
            measurement,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn measurement(&self) -> &Measurement {
        &self.measurement
    }

    /// ISO-8601 UTC timestamp truncated to whole seconds, e.g. `2026-10-17T08:30:00Z`
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Header line without the trailing newline
    pub fn csv_header() -> String {
        Self::CSV_HEADER.join(",")
    }

    /// Data line without the trailing newline
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{:.2},{:.2},{:.2}",
            self.timestamp_iso(),
            self.measurement.download_mbps,
            self.measurement.upload_mbps,
            self.measurement.ping_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 8, 30, 0).unwrap()
    }

    fn record_of(dl: f64, ul: f64, ping: f64) -> MeasurementRecord {
        MeasurementRecord::new(fixed_time(), Measurement::new(dl, ul, ping).unwrap())
    }

    #[test]
    fn test_csv_header() {
        assert_eq!(
            MeasurementRecord::csv_header(),
            "timestamp_iso,download_mbps,upload_mbps,ping_ms"
        );
    }

    #[test]
    fn test_row_formatting() {
        let record = record_of(50.2, 10.1, 12.0);
        assert_eq!(record.to_csv_row(), "2026-10-17T08:30:00Z,50.20,10.10,12.00");
    }

    #[test]
    fn test_timestamp_drops_subseconds() {
        let ts = fixed_time() + chrono::Duration::milliseconds(987);
        let record = MeasurementRecord::new(ts, Measurement::new(1.0, 1.0, 1.0).unwrap());
        assert_eq!(record.timestamp_iso(), "2026-10-17T08:30:00Z");
    }

    #[test]
    fn test_rejects_negative_and_non_finite() {
        assert!(Measurement::new(-0.1, 1.0, 1.0).is_err());
        assert!(Measurement::new(1.0, f64::NAN, 1.0).is_err());
        assert!(Measurement::new(1.0, 1.0, f64::INFINITY).is_err());
        assert!(Measurement::new(0.0, 0.0, 0.0).is_ok());
    }

    #[test]
    fn test_negative_zero_renders_unsigned() {
        let record = record_of(-0.0, 0.0, 0.0);
        assert_eq!(record.to_csv_row(), "2026-10-17T08:30:00Z,0.00,0.00,0.00");
    }

    #[test]
    fn test_invalid_result_names_field() {
        let err = Measurement::new(1.0, -3.0, 1.0).unwrap_err();
        assert!(matches!(
            err,
            MeasurementError::InvalidResult(ref msg) if msg.contains("upload_mbps")
        ));
    }

    proptest! {
        #[test]
        fn prop_row_has_four_non_negative_fields(
            dl in 0.0f64..10_000.0,
            ul in 0.0f64..10_000.0,
            ping in 0.0f64..5_000.0,
        ) {
            let record = record_of(dl, ul, ping);
            let row = record.to_csv_row();
            let fields: Vec<&str> = row.split(',').collect();
            prop_assert_eq!(fields.len(), 4);
            prop_assert!(chrono::DateTime::parse_from_rfc3339(fields[0]).is_ok());
            for field in &fields[1..] {
                let value: f64 = field.parse().unwrap();
                prop_assert!(value >= 0.0);
                prop_assert_eq!(field.split('.').nth(1).map(str::len), Some(2));
            }
        }
    }
}

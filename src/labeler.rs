//! Delay label derivation for training data.

use crate::error::LabelError;
use chrono::NaiveDateTime;

/// Timestamp format of the historical dataset
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Flights arriving more than this many minutes late are labeled delayed
pub const DELAY_THRESHOLD_MINUTES: f64 = 15.0;

/// Derives the binary delay label from scheduled and actual timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelayLabeler;

impl DelayLabeler {
    pub fn new() -> Self {
        Self
    }

    /// Minutes between the scheduled and the actual time (negative if early).
    pub fn delay_minutes(&self, scheduled: &str, actual: &str) -> Result<f64, LabelError> {
        let scheduled = parse_timestamp("Fecha-I", scheduled)?;
        let actual = parse_timestamp("Fecha-O", actual)?;
        Ok((actual - scheduled).num_seconds() as f64 / 60.0)
    }

    /// 1 iff the flight left more than 15 minutes after schedule, else 0.
    pub fn label(&self, scheduled: &str, actual: &str) -> Result<u8, LabelError> {
        let minutes = self.delay_minutes(scheduled, actual)?;
        Ok(u8::from(minutes > DELAY_THRESHOLD_MINUTES))
    }
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<NaiveDateTime, LabelError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|e| {
        LabelError::InvalidTimestamp {
            field,
            value: value.to_string(),
            reason: e.to_string(),
        }
    })
}

//! Type definitions for the delay pipeline

pub mod flight;
pub mod prediction;

pub use flight::{FlightRecord, TrainingRecord};
pub use prediction::PredictResponse;

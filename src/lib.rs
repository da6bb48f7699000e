//! Flight Delay Pipeline Library
//!
//! Predicts whether a flight will leave more than 15 minutes late from its
//! airline, flight type and month. Provides the fixed-schema feature
//! encoder, the class-weighted logistic classifier, offline training and
//! the HTTP scoring service.

pub mod config;
pub mod error;
pub mod feature_encoder;
pub mod labeler;
pub mod metrics;
pub mod models;
pub mod server;
pub mod service;
pub mod telemetry;
pub mod training;
pub mod types;
pub mod validation;

pub use config::AppConfig;
pub use feature_encoder::{FeatureEncoder, FEATURE_COLUMNS, FEATURE_COUNT};
pub use labeler::DelayLabeler;
pub use models::{DelayClassifier, ModelArtifact};
pub use service::{ModelStatus, PredictionService};
pub use types::{FlightRecord, PredictResponse, TrainingRecord};

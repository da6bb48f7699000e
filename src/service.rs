//! Prediction service: validation, encoding and classification behind one
//! request/response contract.

use crate::config::ModelConfig;
use crate::error::ValidationError;
use crate::feature_encoder::FeatureEncoder;
use crate::models::artifact::load_classifier;
use crate::models::classifier::DelayClassifier;
use crate::types::flight::FlightRecord;
use crate::types::prediction::PredictResponse;
use crate::validation::parse_flights;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

/// Where the serving classifier came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ModelStatus {
    /// No model configured; every flight is predicted on time
    Unfitted,
    /// Fitted in-process
    Fitted,
    /// Loaded from an artifact
    Loaded { path: String },
    /// Loading was requested but failed; serving the unfitted default
    LoadFailed { path: String, error: String },
}

/// Scores flights with a read-only classifier.
///
/// Built once at startup and shared across requests; nothing here mutates
/// after construction.
pub struct PredictionService {
    encoder: FeatureEncoder,
    classifier: DelayClassifier,
    status: ModelStatus,
}

impl PredictionService {
    /// Create a service around an existing classifier
    pub fn new(classifier: DelayClassifier, status: ModelStatus) -> Self {
        Self {
            encoder: FeatureEncoder::new(),
            classifier,
            status,
        }
    }

    /// Service with no model: predicts 0 for every flight
    pub fn unfitted() -> Self {
        Self::new(DelayClassifier::Unfitted, ModelStatus::Unfitted)
    }

    /// Service around a classifier fitted in this process
    pub fn with_fitted(classifier: DelayClassifier) -> Self {
        let status = if classifier.is_fitted() {
            ModelStatus::Fitted
        } else {
            ModelStatus::Unfitted
        };
        Self::new(classifier, status)
    }

    /// Load the classifier from an artifact, falling back to the unfitted
    /// default if the artifact cannot be used. The failure is kept in
    /// [`ModelStatus::LoadFailed`].
    pub fn load_or_unfitted<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let shown = path.display().to_string();

        match load_classifier(path) {
            Ok(classifier) => {
                info!(path = %shown, "Serving loaded model");
                Self::new(classifier, ModelStatus::Loaded { path: shown })
            }
            Err(e) => {
                warn!(
                    path = %shown,
                    error = %e,
                    "Failed to load model, serving unfitted default"
                );
                Self::new(
                    DelayClassifier::Unfitted,
                    ModelStatus::LoadFailed {
                        path: shown,
                        error: e.to_string(),
                    },
                )
            }
        }
    }

    /// Build the service according to the model configuration
    pub fn from_config(config: &ModelConfig) -> Self {
        if config.load_on_startup {
            Self::load_or_unfitted(&config.path)
        } else {
            info!("Model loading disabled, serving unfitted default");
            Self::unfitted()
        }
    }

    /// Current model status
    pub fn status(&self) -> &ModelStatus {
        &self.status
    }

    /// Whether predictions come from a fitted model
    pub fn is_ready(&self) -> bool {
        self.classifier.is_fitted()
    }

    /// Predict already-validated flights; one 0/1 per flight in input order.
    pub fn predict(&self, flights: &[FlightRecord]) -> Vec<u8> {
        let features = self.encoder.encode(flights);
        let predictions = self.classifier.predict(features.view());

        debug!(
            flights = flights.len(),
            delayed = predictions.iter().filter(|&&p| p == 1).count(),
            fitted = self.classifier.is_fitted(),
            "Batch scored"
        );

        predictions
    }

    /// Validate a raw request payload and score it.
    ///
    /// Any invalid flight rejects the whole payload; nothing is scored.
    pub fn predict_payload(&self, payload: &Value) -> Result<PredictResponse, ValidationError> {
        let flights = parse_flights(payload)?;
        Ok(PredictResponse::new(self.predict(&flights)))
    }
}

impl Default for PredictionService {
    fn default() -> Self {
        Self::unfitted()
    }
}

//! Model artifact persistence

use crate::error::ArtifactError;
use crate::feature_encoder::{FEATURE_COLUMNS, FEATURE_COUNT};
use crate::models::classifier::{DelayClassifier, FittedClassifier};
use crate::models::logistic::{ClassWeights, LogisticModel, LogisticParams};
use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Current on-disk format version
pub const ARTIFACT_VERSION: u32 = 1;

/// Serialized form of a fitted delay classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// On-disk format version
    pub format_version: u32,
    /// Unique model identifier
    pub model_id: String,
    /// When the model was trained
    pub trained_at: DateTime<Utc>,
    /// Feature columns the coefficients refer to, in order
    pub feature_columns: Vec<String>,
    /// One coefficient per feature column
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub class_weights: ClassWeights,
    pub params: LogisticParams,
    /// Number of rows the model was fitted on
    pub training_samples: usize,
}

impl ModelArtifact {
    /// Capture a fitted classifier. Unfitted classifiers have nothing to persist.
    pub fn from_classifier(classifier: &DelayClassifier) -> Result<Self, ArtifactError> {
        let DelayClassifier::Ready(fitted) = classifier else {
            return Err(ArtifactError::Unfitted);
        };

        Ok(Self {
            format_version: ARTIFACT_VERSION,
            model_id: uuid::Uuid::new_v4().to_string(),
            trained_at: Utc::now(),
            feature_columns: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            coefficients: fitted.model.coefficients.to_vec(),
            intercept: fitted.model.intercept,
            class_weights: fitted.class_weights,
            params: fitted.params.clone(),
            training_samples: fitted.training_samples,
        })
    }

    /// Rebuild the classifier, checking the artifact against this build's
    /// feature contract.
    pub fn into_classifier(self) -> Result<DelayClassifier, ArtifactError> {
        if self.format_version != ARTIFACT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: self.format_version,
                expected: ARTIFACT_VERSION,
            });
        }
        if self.feature_columns != FEATURE_COLUMNS {
            return Err(ArtifactError::IncompatibleColumns(format!(
                "artifact columns {:?} differ from {:?}",
                self.feature_columns, FEATURE_COLUMNS
            )));
        }
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(ArtifactError::IncompatibleColumns(format!(
                "{} coefficients for {} columns",
                self.coefficients.len(),
                FEATURE_COUNT
            )));
        }

        Ok(DelayClassifier::Ready(FittedClassifier {
            model: LogisticModel {
                coefficients: Array1::from(self.coefficients),
                intercept: self.intercept,
            },
            class_weights: self.class_weights,
            params: self.params,
            training_samples: self.training_samples,
        }))
    }

    /// Write the artifact as pretty-printed JSON, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;

        info!(
            model_id = %self.model_id,
            path = %path.display(),
            "Model artifact saved"
        );
        Ok(())
    }

    /// Read an artifact from disk without validating it.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let text = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Persist a fitted classifier and return the written artifact.
pub fn save_classifier<P: AsRef<Path>>(
    classifier: &DelayClassifier,
    path: P,
) -> Result<ModelArtifact, ArtifactError> {
    let artifact = ModelArtifact::from_classifier(classifier)?;
    artifact.save(path)?;
    Ok(artifact)
}

/// Load and validate a classifier from disk.
pub fn load_classifier<P: AsRef<Path>>(path: P) -> Result<DelayClassifier, ArtifactError> {
    let path = path.as_ref();
    let artifact = ModelArtifact::read(path)?;

    info!(
        model_id = %artifact.model_id,
        trained_at = %artifact.trained_at,
        samples = artifact.training_samples,
        path = %path.display(),
        "Loading model artifact"
    );

    artifact.into_classifier()
}

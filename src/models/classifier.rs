//! Delay classifier: an unfitted default or a fitted logistic model.

use crate::error::TrainingError;
use crate::feature_encoder::FEATURE_COUNT;
use crate::models::logistic::{ClassWeights, LogisticModel, LogisticParams};
use ndarray::{Array1, ArrayView1, ArrayView2};
use tracing::info;

/// A fitted classifier together with the weights it was trained under.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedClassifier {
    pub model: LogisticModel,
    pub class_weights: ClassWeights,
    pub params: LogisticParams,
    pub training_samples: usize,
}

/// Binary delay classifier.
///
/// `Unfitted` is a valid serving state, not an error: it predicts "no
/// delay" for every flight. A fitted classifier is never mutated; retraining
/// produces a new value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DelayClassifier {
    #[default]
    Unfitted,
    Ready(FittedClassifier),
}

impl DelayClassifier {
    /// Fit a class-weighted logistic regression on encoded features.
    ///
    /// Fails if either class is absent from `labels`, or if the shapes
    /// do not match the encoder's output.
    pub fn fit(
        features: ArrayView2<f64>,
        labels: ArrayView1<u8>,
        params: &LogisticParams,
    ) -> Result<Self, TrainingError> {
        if features.ncols() != FEATURE_COUNT {
            return Err(TrainingError::ShapeMismatch(format!(
                "expected {} feature columns, got {}",
                FEATURE_COUNT,
                features.ncols()
            )));
        }

        let class_weights = ClassWeights::from_labels(labels)?;
        info!(
            samples = labels.len(),
            weight_on_time = class_weights.negative,
            weight_delayed = class_weights.positive,
            "Fitting delay classifier"
        );

        let model = LogisticModel::fit(features, labels, class_weights, params)?;

        Ok(DelayClassifier::Ready(FittedClassifier {
            model,
            class_weights,
            params: params.clone(),
            training_samples: labels.len(),
        }))
    }

    /// Whether a model is available
    pub fn is_fitted(&self) -> bool {
        matches!(self, DelayClassifier::Ready(_))
    }

    /// Predict 0/1 per feature row, in row order.
    ///
    /// `features` must be `FEATURE_COUNT` columns wide, as produced by the
    /// feature encoder.
    pub fn predict(&self, features: ArrayView2<f64>) -> Vec<u8> {
        debug_assert_eq!(features.ncols(), FEATURE_COUNT);
        match self {
            DelayClassifier::Unfitted => vec![0; features.nrows()],
            DelayClassifier::Ready(fitted) => fitted.model.predict(features),
        }
    }

    /// Probability of delay per feature row; zero everywhere when unfitted.
    pub fn predict_proba(&self, features: ArrayView2<f64>) -> Array1<f64> {
        debug_assert_eq!(features.ncols(), FEATURE_COUNT);
        match self {
            DelayClassifier::Unfitted => Array1::zeros(features.nrows()),
            DelayClassifier::Ready(fitted) => fitted.model.predict_proba(features),
        }
    }
}

//! Offline training: CSV ingestion, labeling, fitting and evaluation.

use crate::config::TrainingConfig;
use crate::feature_encoder::FeatureEncoder;
use crate::models::classifier::DelayClassifier;
use crate::models::logistic::ClassWeights;
use crate::types::flight::TrainingRecord;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Read historical flights from a CSV file with a header row.
///
/// Columns other than `Fecha-I, Fecha-O, OPERA, TIPOVUELO, MES` are ignored.
pub fn read_training_records<P: AsRef<Path>>(path: P) -> Result<Vec<TrainingRecord>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open training data {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    let mut records = Vec::new();
    for (line, row) in reader.deserialize::<TrainingRecord>().enumerate() {
        // +2: header row and 1-based numbering
        let record = row.with_context(|| format!("Invalid training row at line {}", line + 2))?;
        records.push(record);
    }

    info!(rows = records.len(), path = %path.display(), "Training data loaded");
    Ok(records)
}

/// In-sample quality of a fitted classifier.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub samples: usize,
    pub delayed: usize,
    pub class_weights: ClassWeights,
    pub accuracy: f64,
    /// Precision for the delayed class
    pub precision: f64,
    /// Recall for the delayed class
    pub recall: f64,
    pub f1: f64,
    /// Mean unweighted cross-entropy of the predicted delay probabilities
    pub log_loss: f64,
}

impl TrainingReport {
    fn evaluate(
        labels: &[u8],
        predictions: &[u8],
        probabilities: &[f64],
        class_weights: ClassWeights,
    ) -> Self {
        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        let mut correct = 0usize;
        for (&y, &p) in labels.iter().zip(predictions) {
            match (y, p) {
                (1, 1) => tp += 1,
                (0, 1) => fp += 1,
                (1, 0) => fn_ += 1,
                _ => {}
            }
            if y == p {
                correct += 1;
            }
        }

        let ratio = |num: usize, den: usize| if den > 0 { num as f64 / den as f64 } else { 0.0 };
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        // Clamped so a saturated probability costs a finite amount.
        let cross_entropy: f64 = labels
            .iter()
            .zip(probabilities)
            .map(|(&y, &p)| {
                let p = p.clamp(1e-15, 1.0 - 1e-15);
                if y == 1 {
                    -p.ln()
                } else {
                    -(1.0 - p).ln()
                }
            })
            .sum();
        let log_loss = if labels.is_empty() {
            0.0
        } else {
            cross_entropy / labels.len() as f64
        };

        Self {
            samples: labels.len(),
            delayed: tp + fn_,
            class_weights,
            accuracy: ratio(correct, labels.len()),
            precision,
            recall,
            f1,
            log_loss,
        }
    }
}

/// A fitted classifier and how it scores on its own training data.
pub struct TrainingOutcome {
    pub classifier: DelayClassifier,
    pub report: TrainingReport,
}

/// Label, encode and fit on historical records.
///
/// Malformed timestamps and single-class label sets abort training.
pub fn train(records: &[TrainingRecord], config: &TrainingConfig) -> Result<TrainingOutcome> {
    let encoder = FeatureEncoder::new();
    let (features, labels) = encoder
        .encode_labeled(records)
        .context("Failed to derive delay labels")?;

    let classifier = DelayClassifier::fit(features.view(), labels.view(), &config.logistic_params())
        .context("Failed to fit delay classifier")?;

    let class_weights = match &classifier {
        DelayClassifier::Ready(fitted) => fitted.class_weights,
        DelayClassifier::Unfitted => anyhow::bail!("Classifier fit produced no model"),
    };
    let predictions = classifier.predict(features.view());
    let probabilities = classifier.predict_proba(features.view());
    let report = TrainingReport::evaluate(
        &labels.to_vec(),
        &predictions,
        &probabilities.to_vec(),
        class_weights,
    );

    info!(
        samples = report.samples,
        delayed = report.delayed,
        accuracy = format!("{:.3}", report.accuracy),
        precision = format!("{:.3}", report.precision),
        recall = format!("{:.3}", report.recall),
        f1 = format!("{:.3}", report.f1),
        log_loss = format!("{:.4}", report.log_loss),
        "Training complete"
    );

    Ok(TrainingOutcome { classifier, report })
}

/// Train from the configured CSV file.
pub fn train_from_csv<P: AsRef<Path>>(path: P, config: &TrainingConfig) -> Result<TrainingOutcome> {
    let records = read_training_records(path)?;
    train(&records, config)
}

//! Class-weighted, L2-regularized logistic regression.
//!
//! Minimizes `0.5 * |w|^2 + C * sum_i s_i * logloss_i` with an unpenalized
//! intercept, where `s_i` is the weight of sample i's class. Solved with
//! Newton's method and step halving; the solver is deterministic.

use crate::error::TrainingError;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Per-class sample weights for imbalance correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassWeights {
    /// Weight applied to on-time (label 0) samples
    pub negative: f64,
    /// Weight applied to delayed (label 1) samples
    pub positive: f64,
}

impl ClassWeights {
    /// Weight each class by the frequency of the other one:
    /// `w(1) = n0 / n`, `w(0) = n1 / n`.
    pub fn from_labels(labels: ArrayView1<u8>) -> Result<Self, TrainingError> {
        if let Some((index, &value)) = labels.iter().enumerate().find(|&(_, &y)| y > 1) {
            return Err(TrainingError::InvalidLabel { index, value });
        }

        let positives = labels.iter().filter(|&&y| y == 1).count();
        let negatives = labels.len() - positives;

        if positives == 0 || negatives == 0 {
            return Err(TrainingError::DegenerateLabels {
                negatives,
                positives,
            });
        }

        let total = labels.len() as f64;
        Ok(Self {
            negative: positives as f64 / total,
            positive: negatives as f64 / total,
        })
    }

    /// Weight for a given label.
    pub fn for_label(&self, label: u8) -> f64 {
        if label == 1 {
            self.positive
        } else {
            self.negative
        }
    }
}

/// Hyperparameters for fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    /// Inverse regularization strength (scikit-learn's `C`)
    pub regularization: f64,
    /// Maximum Newton iterations
    pub max_iter: usize,
    /// Convergence threshold on the gradient's max-norm
    pub tolerance: f64,
    /// Seed recorded with the fitted model
    pub random_state: u64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            regularization: 1.0,
            max_iter: 100,
            tolerance: 1e-6,
            random_state: 1,
        }
    }
}

/// Fitted logistic regression parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub coefficients: Array1<f64>,
    pub intercept: f64,
}

impl LogisticModel {
    /// Fit on `features` (n x d) and `labels` (n) with per-class weights.
    pub fn fit(
        features: ArrayView2<f64>,
        labels: ArrayView1<u8>,
        weights: ClassWeights,
        params: &LogisticParams,
    ) -> Result<Self, TrainingError> {
        let (n, d) = features.dim();
        if labels.len() != n {
            return Err(TrainingError::ShapeMismatch(format!(
                "{} feature rows but {} labels",
                n,
                labels.len()
            )));
        }
        if params.regularization.is_nan() || params.regularization <= 0.0 {
            return Err(TrainingError::Solver(format!(
                "regularization must be positive, got {}",
                params.regularization
            )));
        }

        // Design matrix with a trailing column of ones for the intercept.
        let mut design = Array2::<f64>::ones((n, d + 1));
        design.slice_mut(ndarray::s![.., ..d]).assign(&features);

        let targets: Array1<f64> = labels.mapv(|y| if y == 1 { 1.0 } else { 0.0 });
        let sample_weights: Array1<f64> = labels.mapv(|y| weights.for_label(y));
        let c = params.regularization;

        let mut theta = Array1::<f64>::zeros(d + 1);
        let mut loss = objective(&design, &targets, &sample_weights, &theta, c);

        for iteration in 0..params.max_iter {
            let probs = design.dot(&theta).mapv(sigmoid);

            // Gradient
            let residual = (&probs - &targets) * &sample_weights;
            let mut gradient = design.t().dot(&residual) * c;
            for j in 0..d {
                gradient[j] += theta[j];
            }

            let grad_norm = gradient.iter().fold(0.0_f64, |m, g| m.max(g.abs()));
            if grad_norm < params.tolerance {
                debug!(iteration, loss, "Logistic regression converged");
                break;
            }

            // Hessian
            let curvature = (&probs * &probs.mapv(|p| 1.0 - p)) * &sample_weights * c;
            let weighted = &design * &curvature.view().insert_axis(Axis(1));
            let mut hessian = design.t().dot(&weighted);
            for j in 0..d {
                hessian[[j, j]] += 1.0;
            }

            let step = solve(hessian, gradient).ok_or_else(|| {
                TrainingError::Solver(format!("singular Hessian at iteration {}", iteration))
            })?;

            // Step halving keeps every accepted update a descent step.
            let mut scale = 1.0;
            let mut accepted = false;
            for _ in 0..30 {
                let candidate = &theta - &(&step * scale);
                let candidate_loss = objective(&design, &targets, &sample_weights, &candidate, c);
                if candidate_loss.is_finite() && candidate_loss <= loss {
                    theta = candidate;
                    loss = candidate_loss;
                    accepted = true;
                    break;
                }
                scale *= 0.5;
            }

            if !loss.is_finite() {
                return Err(TrainingError::Solver("objective is not finite".to_string()));
            }
            if !accepted {
                debug!(iteration, loss, "No descent step found, stopping");
                break;
            }
            if iteration + 1 == params.max_iter {
                warn!(
                    max_iter = params.max_iter,
                    grad_norm, "Logistic regression hit the iteration limit"
                );
            }
        }

        Ok(Self {
            coefficients: theta.slice(ndarray::s![..d]).to_owned(),
            intercept: theta[d],
        })
    }

    /// Raw decision values `w . x + b` per row.
    pub fn decision_function(&self, features: ArrayView2<f64>) -> Array1<f64> {
        features.dot(&self.coefficients) + self.intercept
    }

    /// Probability of the positive class per row.
    pub fn predict_proba(&self, features: ArrayView2<f64>) -> Array1<f64> {
        self.decision_function(features).mapv(sigmoid)
    }

    /// Class per row: 1 iff the decision value is positive.
    pub fn predict(&self, features: ArrayView2<f64>) -> Vec<u8> {
        self.decision_function(features)
            .iter()
            .map(|&z| u8::from(z > 0.0))
            .collect()
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// `log(1 + exp(z))` without overflow.
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

fn objective(
    design: &Array2<f64>,
    targets: &Array1<f64>,
    sample_weights: &Array1<f64>,
    theta: &Array1<f64>,
    c: f64,
) -> f64 {
    let d = theta.len() - 1;
    let penalty = 0.5 * theta.iter().take(d).map(|w| w * w).sum::<f64>();

    let z = design.dot(theta);
    let data_loss: f64 = z
        .iter()
        .zip(targets.iter())
        .zip(sample_weights.iter())
        .map(|((&z, &y), &s)| s * (softplus(z) - y * z))
        .sum();

    penalty + c * data_loss
}

/// Solve `a x = b` by Gaussian elimination with partial pivoting.
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Option<Array1<f64>> {
    let n = b.len();

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))?;
        if a[[pivot, col]].abs() < 1e-12 {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }

        for row in col + 1..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_class_weights_inverse_frequency() {
        let mut labels = vec![0u8; 90];
        labels.extend(vec![1u8; 10]);
        let labels = Array1::from(labels);

        let weights = ClassWeights::from_labels(labels.view()).unwrap();

        let n0 = labels.iter().filter(|&&y| y == 0).count() as f64;
        let n1 = labels.iter().filter(|&&y| y == 1).count() as f64;
        let n = labels.len() as f64;
        assert!((weights.positive - n0 / n).abs() < 1e-12);
        assert!((weights.negative - n1 / n).abs() < 1e-12);
        assert!((weights.positive - 0.9).abs() < 1e-12);
        assert!((weights.negative - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_class_weights_reject_non_binary_labels() {
        let labels = Array1::from(vec![0u8, 1, 2, 0]);
        let err = ClassWeights::from_labels(labels.view()).unwrap_err();
        assert!(matches!(
            err,
            TrainingError::InvalidLabel { index: 2, value: 2 }
        ));

        let labels = Array1::from(vec![255u8, 1]);
        assert!(ClassWeights::from_labels(labels.view()).is_err());
    }

    #[test]
    fn test_class_weights_reject_single_class() {
        let labels = Array1::from(vec![0u8; 5]);
        let err = ClassWeights::from_labels(labels.view()).unwrap_err();
        assert!(matches!(
            err,
            TrainingError::DegenerateLabels {
                negatives: 5,
                positives: 0
            }
        ));

        let labels = Array1::from(vec![1u8; 3]);
        assert!(ClassWeights::from_labels(labels.view()).is_err());
    }

    #[test]
    fn test_class_weights_reject_empty() {
        let labels = Array1::<u8>::zeros(0);
        assert!(ClassWeights::from_labels(labels.view()).is_err());
    }

    #[test]
    fn test_solve_small_system() {
        let a = array![[2.0, 1.0], [1.0, 3.0]];
        let b = array![3.0, 5.0];

        let x = solve(a, b).unwrap();
        assert!((x[0] - 0.8).abs() < 1e-12);
        assert!((x[1] - 1.4).abs() < 1e-12);
    }

    #[test]
    fn test_solve_singular_system() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let b = array![1.0, 2.0];
        assert!(solve(a, b).is_none());
    }

    #[test]
    fn test_sigmoid_and_softplus() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(20.0) > 0.999);
        assert!(sigmoid(-20.0) < 0.001);
        assert!((softplus(0.0) - 2f64.ln()).abs() < 1e-12);
        assert!((softplus(800.0) - 800.0).abs() < 1e-9);
        assert!(softplus(-800.0) >= 0.0);
    }

    #[test]
    fn test_fit_separates_minority_class() {
        // 80 on-time rows with no indicator, 20 delayed rows with column 0 set.
        let mut features = Array2::<f64>::zeros((100, 2));
        let mut labels = Array1::<u8>::zeros(100);
        for i in 80..100 {
            features[[i, 0]] = 1.0;
            labels[i] = 1;
        }
        let weights = ClassWeights::from_labels(labels.view()).unwrap();

        let model = LogisticModel::fit(
            features.view(),
            labels.view(),
            weights,
            &LogisticParams::default(),
        )
        .unwrap();

        assert!(model.coefficients[0] > 0.0);
        assert!(model.intercept < 0.0);
        assert_eq!(model.predict(features.view()), labels.to_vec());
    }

    #[test]
    fn test_fit_matches_gradient_optimum() {
        // Noisy data: indicator raises the delay rate from 20% to 60%.
        let mut features = Array2::<f64>::zeros((20, 1));
        let mut labels = Array1::<u8>::zeros(20);
        for i in 0..10 {
            features[[i, 0]] = 1.0;
            labels[i] = u8::from(i < 6);
        }
        for i in 10..20 {
            labels[i] = u8::from(i < 12);
        }
        let weights = ClassWeights::from_labels(labels.view()).unwrap();
        let params = LogisticParams::default();

        let model =
            LogisticModel::fit(features.view(), labels.view(), weights, &params).unwrap();

        // At the optimum the objective's gradient vanishes.
        let probs = model.predict_proba(features.view());
        let mut grad_w = model.coefficients[0];
        let mut grad_b = 0.0;
        for i in 0..20 {
            let s = weights.for_label(labels[i]);
            let r = s * (probs[i] - labels[i] as f64);
            grad_w += params.regularization * r * features[[i, 0]];
            grad_b += params.regularization * r;
        }
        assert!(grad_w.abs() < 1e-5);
        assert!(grad_b.abs() < 1e-5);
        assert!(model.coefficients[0] > 0.0);
    }

    #[test]
    fn test_fit_rejects_mismatched_rows() {
        let features = Array2::<f64>::zeros((3, 2));
        let labels = Array1::from(vec![0u8, 1]);
        let weights = ClassWeights {
            negative: 0.5,
            positive: 0.5,
        };

        let err = LogisticModel::fit(
            features.view(),
            labels.view(),
            weights,
            &LogisticParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TrainingError::ShapeMismatch(_)));
    }

    #[test]
    fn test_predict_uses_decision_sign() {
        let model = LogisticModel {
            coefficients: array![2.0, -1.0],
            intercept: -0.5,
        };
        let features = array![[1.0, 0.0], [0.0, 1.0], [0.0, 0.0]];

        assert_eq!(model.predict(features.view()), vec![1, 0, 0]);
        let probs = model.predict_proba(features.view());
        assert!(probs[0] > 0.5 && probs[1] < 0.5 && probs[2] < 0.5);
    }
}

//! Prediction response structures

use serde::{Deserialize, Serialize};

/// Response body of the scoring endpoint.
///
/// `predict[i]` is the prediction for `flights[i]` of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predict: Vec<u8>,
}

impl PredictResponse {
    pub fn new(predict: Vec<u8>) -> Self {
        Self { predict }
    }

    /// Number of flights predicted as delayed
    pub fn delayed_count(&self) -> usize {
        self.predict.iter().filter(|&&p| p == 1).count()
    }
}

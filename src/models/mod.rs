//! Delay classifier and model persistence

pub mod artifact;
pub mod classifier;
pub mod logistic;

pub use artifact::{load_classifier, save_classifier, ModelArtifact};
pub use classifier::{DelayClassifier, FittedClassifier};
pub use logistic::{ClassWeights, LogisticModel, LogisticParams};

//! Pre-trained drought classifier
//!
//! The classifier is a random forest trained with scikit-learn and exported to
//! JSON (see [`forest::ForestExport`]). Inference reproduces scikit-learn's
//! `predict`, `predict_proba` and `feature_importances_`.

pub mod forest;
pub mod importance;
pub mod labels;
pub mod tree;

use ndarray::{Array2, ArrayView2};
use thiserror::Error;

pub use forest::RandomForest;
pub use importance::{importance_ranking, FeatureImportance};
pub use labels::ClassLabel;
pub use tree::DecisionTree;

/// Errors that can occur while loading or running the model
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid model file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tree {tree} is malformed: {reason}")]
    InvalidTree { tree: usize, reason: String },

    #[error("Model features {found:?} do not match the expected {expected:?}")]
    SchemaMismatch { expected: Vec<String>, found: Vec<String> },

    #[error("Expected {expected} features per row, got {found}")]
    InputShape { expected: usize, found: usize },

    #[error("Model has no trees")]
    NoTrees,

    #[error("Model has no classes")]
    NoClasses,

    #[error("Model carries neither feature importances nor node impurities")]
    MissingImportances,
}

/// Fixed-schema classifier
pub trait Classifier: Send + Sync {
    /// Class labels, in probability column order
    fn classes(&self) -> &[ClassLabel];

    /// Class probabilities, one row per input row
    fn predict_proba(&self, features: ArrayView2<'_, f64>) -> Result<Array2<f64>, ModelError>;

    /// Static importance of each feature, in feature order
    fn feature_importances(&self) -> &[f64];

    /// Most probable class of each row; the first class wins ties
    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Vec<ClassLabel>, ModelError> {
        let probabilities = self.predict_proba(features)?;

        Ok(probabilities
            .rows()
            .into_iter()
            .map(|row| {
                let best = row
                    .iter()
                    .enumerate()
                    .fold(0, |best, (i, p)| if *p > row[best] { i } else { best });
                self.classes()[best].clone()
            })
            .collect())
    }
}

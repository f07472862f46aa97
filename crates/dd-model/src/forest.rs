//! Random forest classifier

use std::path::Path;

use dd_core::COVARIATES;
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::tree::{DecisionTree, TreeExport};
use crate::{ClassLabel, Classifier, ModelError};

/// JSON export of a scikit-learn `RandomForestClassifier`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestExport {
    /// `classes_`
    pub classes: Vec<ClassLabel>,

    /// `feature_names_in_`, checked against the covariate schema when present
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,

    /// `feature_importances_`; derived from the trees when absent
    #[serde(default)]
    pub feature_importances: Option<Vec<f64>>,

    /// `estimators_[i].tree_`
    pub trees: Vec<TreeExport>,
}

/// Random forest over the six covariates
#[derive(Debug, Clone)]
pub struct RandomForest {
    classes: Vec<ClassLabel>,
    trees: Vec<DecisionTree>,
    importances: Vec<f64>,
}

impl RandomForest {
    /// Load a forest from a JSON export
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path)?;
        let forest = Self::from_json(&text)?;
        tracing::info!(
            "Loaded random forest from {}: {} trees, classes {:?}",
            path.display(),
            forest.trees.len(),
            forest.classes
        );
        Ok(forest)
    }

    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        let export: ForestExport = serde_json::from_str(text)?;
        Self::from_export(export)
    }

    pub fn from_export(export: ForestExport) -> Result<Self, ModelError> {
        let n_features = COVARIATES.len();
        let expected: Vec<String> = COVARIATES.iter().map(|c| c.column_name().to_string()).collect();

        if let Some(found) = export.feature_names {
            if found != expected {
                return Err(ModelError::SchemaMismatch { expected, found });
            }
        }
        if export.classes.is_empty() {
            return Err(ModelError::NoClasses);
        }
        if export.trees.is_empty() {
            return Err(ModelError::NoTrees);
        }

        let n_classes = export.classes.len();
        let trees = export
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, tree)| DecisionTree::from_export(i, tree, n_features, n_classes))
            .collect::<Result<Vec<_>, _>>()?;

        let importances = match export.feature_importances {
            Some(importances) if importances.len() == n_features => importances,
            Some(importances) => {
                return Err(ModelError::InputShape {
                    expected: n_features,
                    found: importances.len(),
                })
            }
            None => impurity_importances(&trees, n_features)?,
        };

        Ok(Self {
            classes: export.classes,
            trees,
            importances,
        })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

/// Forest importances: mean of the per-tree importances of non-stump trees,
/// renormalized to sum 1
fn impurity_importances(trees: &[DecisionTree], n_features: usize) -> Result<Vec<f64>, ModelError> {
    let mut total = vec![0.0; n_features];
    let mut counted = 0usize;

    for tree in trees.iter().filter(|t| t.node_count() > 1) {
        let importances = tree
            .impurity_importances(n_features)
            .ok_or(ModelError::MissingImportances)?;
        for (sum, value) in total.iter_mut().zip(importances) {
            *sum += value;
        }
        counted += 1;
    }

    if counted == 0 {
        return Ok(total);
    }

    total.iter_mut().for_each(|v| *v /= counted as f64);
    let sum: f64 = total.iter().sum();
    if sum > 0.0 {
        total.iter_mut().for_each(|v| *v /= sum);
    }
    Ok(total)
}

impl Classifier for RandomForest {
    fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }

    fn predict_proba(&self, features: ArrayView2<'_, f64>) -> Result<Array2<f64>, ModelError> {
        if features.ncols() != COVARIATES.len() {
            return Err(ModelError::InputShape {
                expected: COVARIATES.len(),
                found: features.ncols(),
            });
        }

        let mut probabilities = Array2::zeros((features.nrows(), self.classes.len()));
        let mut sample = vec![0.0; features.ncols()];

        for (row, mut out) in features.rows().into_iter().zip(probabilities.rows_mut()) {
            sample.iter_mut().zip(row.iter()).for_each(|(s, v)| *s = *v);
            for tree in &self.trees {
                for (acc, p) in out.iter_mut().zip(tree.predict_proba(&sample)) {
                    *acc += p;
                }
            }
            out.mapv_inplace(|p| p / self.trees.len() as f64);
        }

        Ok(probabilities)
    }

    fn feature_importances(&self) -> &[f64] {
        &self.importances
    }
}

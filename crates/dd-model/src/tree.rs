//! Decision tree stored as scikit-learn node arrays

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Child index marking a leaf
pub const TREE_LEAF: i64 = -1;

/// Per-node class counts or fractions.
///
/// `tree_.value` has shape `(n_nodes, n_outputs, n_classes)`; a flattened
/// `(n_nodes, n_classes)` export is accepted as well.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeValues {
    Flat(Vec<Vec<f64>>),
    PerOutput(Vec<Vec<Vec<f64>>>),
}

/// One exported tree of the forest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeExport {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: NodeValues,
    #[serde(default)]
    pub impurity: Option<Vec<f64>>,
    #[serde(default)]
    pub weighted_n_node_samples: Option<Vec<f64>>,
}

/// Validated decision tree
#[derive(Debug, Clone)]
pub struct DecisionTree {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<usize>,
    threshold: Vec<f64>,
    /// Leaf class distributions, normalized to sum 1
    distributions: Vec<Vec<f64>>,
    impurity: Option<Vec<f64>>,
    weighted_samples: Option<Vec<f64>>,
}

impl DecisionTree {
    /// Validate an exported tree against the model dimensions
    pub fn from_export(
        index: usize,
        export: TreeExport,
        n_features: usize,
        n_classes: usize,
    ) -> Result<Self, ModelError> {
        let invalid = |reason: String| ModelError::InvalidTree { tree: index, reason };

        let values = match export.value {
            NodeValues::Flat(values) => values,
            NodeValues::PerOutput(values) => values
                .into_iter()
                .map(|mut outputs| {
                    if outputs.is_empty() {
                        Vec::new()
                    } else {
                        outputs.swap_remove(0)
                    }
                })
                .collect(),
        };

        let n_nodes = export.children_left.len();
        if n_nodes == 0 {
            return Err(invalid("no nodes".to_string()));
        }
        let lengths = [
            export.children_right.len(),
            export.feature.len(),
            export.threshold.len(),
            values.len(),
        ];
        if lengths.iter().any(|len| *len != n_nodes) {
            return Err(invalid(format!("node arrays of unequal length ({} nodes)", n_nodes)));
        }
        for (name, optional) in [
            ("impurity", &export.impurity),
            ("weighted_n_node_samples", &export.weighted_n_node_samples),
        ] {
            if let Some(array) = optional {
                if array.len() != n_nodes {
                    return Err(invalid(format!("{} has {} entries for {} nodes", name, array.len(), n_nodes)));
                }
            }
        }

        let mut feature = Vec::with_capacity(n_nodes);
        for node in 0..n_nodes {
            let (left, right) = (export.children_left[node], export.children_right[node]);

            if left == TREE_LEAF || right == TREE_LEAF {
                if left != right {
                    return Err(invalid(format!("node {} has a single child", node)));
                }
                feature.push(0);
            } else {
                // Children always come after their parent, which also rules out cycles
                for child in [left, right] {
                    if child <= node as i64 || child >= n_nodes as i64 {
                        return Err(invalid(format!("node {} has invalid child {}", node, child)));
                    }
                }
                let f = export.feature[node];
                if f < 0 || f as usize >= n_features {
                    return Err(invalid(format!("node {} splits on unknown feature {}", node, f)));
                }
                feature.push(f as usize);
            }

            if values[node].len() != n_classes {
                return Err(invalid(format!(
                    "node {} has {} class values, expected {}",
                    node,
                    values[node].len(),
                    n_classes
                )));
            }
        }

        let distributions = values
            .into_iter()
            .map(|counts| {
                let total: f64 = counts.iter().sum();
                let normalizer = if total == 0.0 { 1.0 } else { total };
                counts.into_iter().map(|c| c / normalizer).collect()
            })
            .collect();

        Ok(Self {
            children_left: export.children_left,
            children_right: export.children_right,
            feature,
            threshold: export.threshold,
            distributions,
            impurity: export.impurity,
            weighted_samples: export.weighted_n_node_samples,
        })
    }

    pub fn node_count(&self) -> usize {
        self.children_left.len()
    }

    /// Index of the leaf reached by `sample`.
    ///
    /// Samples are compared in single precision, as scikit-learn casts its
    /// input to `float32` before walking the tree.
    pub fn leaf_index(&self, sample: &[f64]) -> usize {
        let mut node = 0usize;
        loop {
            let left = self.children_left[node];
            if left == TREE_LEAF {
                return node;
            }

            let value = sample[self.feature[node]] as f32 as f64;
            node = if value <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }
    }

    /// Class distribution of the leaf reached by `sample`
    pub fn predict_proba(&self, sample: &[f64]) -> &[f64] {
        &self.distributions[self.leaf_index(sample)]
    }

    /// Mean decrease in impurity, normalized to sum 1.
    ///
    /// Returns `None` when the export carries no impurity information.
    pub fn impurity_importances(&self, n_features: usize) -> Option<Vec<f64>> {
        let impurity = self.impurity.as_ref()?;
        let weights = self.weighted_samples.as_ref()?;
        let mut importances = vec![0.0; n_features];

        for node in 0..self.node_count() {
            let left = self.children_left[node];
            if left == TREE_LEAF {
                continue;
            }
            let (left, right) = (left as usize, self.children_right[node] as usize);
            importances[self.feature[node]] += weights[node] * impurity[node]
                - weights[left] * impurity[left]
                - weights[right] * impurity[right];
        }

        let root_weight = weights[0];
        if root_weight > 0.0 {
            importances.iter_mut().for_each(|v| *v /= root_weight);
        }
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }

        Some(importances)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Stump on feature `feature`: left leaf favours class 0, right leaf class 1
    pub(crate) fn stump(feature: i64, threshold: f64) -> TreeExport {
        TreeExport {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![feature, -2, -2],
            threshold: vec![threshold, -2.0, -2.0],
            value: NodeValues::Flat(vec![vec![50.0, 50.0], vec![40.0, 10.0], vec![10.0, 40.0]]),
            impurity: Some(vec![0.5, 0.32, 0.32]),
            weighted_n_node_samples: Some(vec![100.0, 50.0, 50.0]),
        }
    }

    #[test]
    fn test_walks_to_leaves() {
        let tree = DecisionTree::from_export(0, stump(1, 15.0), 6, 2).unwrap();

        let cold = [0.0, 10.0, 0.0, 0.0, 0.0, 0.0];
        let warm = [0.0, 20.0, 0.0, 0.0, 0.0, 0.0];
        assert_eq!(tree.leaf_index(&cold), 1);
        assert_eq!(tree.predict_proba(&cold), &[0.8, 0.2]);
        assert_eq!(tree.predict_proba(&warm), &[0.2, 0.8]);
        // Equal to the threshold goes left
        assert_eq!(tree.leaf_index(&[0.0, 15.0, 0.0, 0.0, 0.0, 0.0]), 1);
    }

    #[test]
    fn test_single_precision_comparison() {
        // 0.1f64 rounds up in f32, so it lands right of a threshold stored as 0.1f64
        let tree = DecisionTree::from_export(0, stump(0, 0.1), 6, 2).unwrap();
        let sample = [0.1, 0.0, 0.0, 0.0, 0.0, 0.0];
        assert!(0.1f64 as f32 as f64 > 0.1);
        assert_eq!(tree.leaf_index(&sample), 2);
    }

    #[test]
    fn test_per_output_values_are_flattened() {
        let mut export = stump(0, 1.0);
        export.value = NodeValues::PerOutput(vec![
            vec![vec![0.5, 0.5]],
            vec![vec![1.0, 0.0]],
            vec![vec![0.0, 1.0]],
        ]);
        let tree = DecisionTree::from_export(0, export, 6, 2).unwrap();
        assert_eq!(tree.predict_proba(&[2.0, 0.0, 0.0, 0.0, 0.0, 0.0]), &[0.0, 1.0]);
    }

    #[test]
    fn test_rejects_malformed_trees() {
        let mut backwards = stump(0, 1.0);
        backwards.children_left[0] = 0;
        assert!(matches!(
            DecisionTree::from_export(3, backwards, 6, 2),
            Err(ModelError::InvalidTree { tree: 3, .. })
        ));

        let unknown_feature = stump(9, 1.0);
        assert!(DecisionTree::from_export(0, unknown_feature, 6, 2).is_err());

        assert!(DecisionTree::from_export(0, stump(0, 1.0), 6, 3).is_err());
    }

    #[test]
    fn test_impurity_importances() {
        let tree = DecisionTree::from_export(0, stump(4, 1.0), 6, 2).unwrap();
        let importances = tree.impurity_importances(6).unwrap();
        assert_eq!(importances, vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);

        let mut bare = stump(4, 1.0);
        bare.impurity = None;
        let tree = DecisionTree::from_export(0, bare, 6, 2).unwrap();
        assert!(tree.impurity_importances(6).is_none());
    }
}

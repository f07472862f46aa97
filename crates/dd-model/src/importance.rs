//! Feature importance ranking

use dd_core::{Covariate, COVARIATES};
use ordered_float::OrderedFloat;

use crate::Classifier;

/// Importance of one covariate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureImportance {
    pub covariate: Covariate,
    pub importance: f64,
}

/// Covariates by descending importance. Equal importances keep feature order.
pub fn importance_ranking(model: &dyn Classifier) -> Vec<FeatureImportance> {
    let mut ranking: Vec<FeatureImportance> = COVARIATES
        .iter()
        .zip(model.feature_importances())
        .map(|(covariate, importance)| FeatureImportance {
            covariate: *covariate,
            importance: *importance,
        })
        .collect();

    ranking.sort_by_key(|f| std::cmp::Reverse(OrderedFloat(f.importance)));
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::tests::sample_forest;
    use crate::{ClassLabel, ModelError};
    use ndarray::{Array2, ArrayView2};

    struct FixedImportances(Vec<f64>);

    impl Classifier for FixedImportances {
        fn classes(&self) -> &[ClassLabel] {
            &[]
        }

        fn predict_proba(&self, _: ArrayView2<'_, f64>) -> Result<Array2<f64>, ModelError> {
            Err(ModelError::NoTrees)
        }

        fn feature_importances(&self) -> &[f64] {
            &self.0
        }
    }

    #[test]
    fn test_descending_order() {
        let model = FixedImportances(vec![0.1, 0.3, 0.05, 0.05, 0.2, 0.3]);
        let ranking = importance_ranking(&model);

        let order: Vec<Covariate> = ranking.iter().map(|f| f.covariate).collect();
        assert_eq!(
            order,
            vec![
                Covariate::Temperature,
                Covariate::SoilWetness,
                Covariate::PotentialEvaporation,
                Covariate::Precipitation,
                Covariate::Evaporation,
                Covariate::Evapotranspiration,
            ]
        );
        assert!(ranking.windows(2).all(|w| w[0].importance >= w[1].importance));
    }

    #[test]
    fn test_ranking_of_forest() {
        let ranking = importance_ranking(&sample_forest());
        assert_eq!(ranking.len(), 6);
        assert_eq!(ranking[0].covariate, Covariate::Temperature);
        assert_eq!(ranking[1].covariate, Covariate::SoilWetness);
        assert_eq!(ranking[5].importance, 0.0);
    }
}

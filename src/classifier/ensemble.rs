//! Weighted blend of the calibrated forest and boosted trees

use serde::{Deserialize, Serialize};

use super::calibrated::CalibratedClassifier;
use super::forest::RandomForest;
use super::gbdt_model::BoostedTrees;
use super::{AnalysisError, TrainError};
use crate::config::{BoostingConfig, EnsembleConfig, ForestConfig};

/// Per-model and blended probabilities for one row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnsemblePrediction {
    pub forest: f64,
    pub boosted: f64,
    pub blended: f64,
}

/// Shape of a fitted ensemble, reported by `inspect`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleSummary {
    pub calibration_folds: usize,
    pub forest_trees: usize,
    /// Depth of the deepest tree across all forest folds
    pub forest_max_depth: usize,
    pub boosting_iterations: usize,
    /// Isotonic knots per fold, forest then boosted
    pub forest_knots: Vec<usize>,
    pub boosted_knots: Vec<usize>,
    pub forest_weight: f64,
    pub boosted_weight: f64,
}

#[derive(Debug)]
pub struct CalibratedEnsemble {
    forest: CalibratedClassifier<RandomForest>,
    boosted: CalibratedClassifier<BoostedTrees>,
    forest_weight: f64,
    boosted_weight: f64,
    dimension: usize,
}

impl CalibratedEnsemble {
    /// Train both calibrated members on the scaled matrix
    pub fn fit(
        rows: &[Vec<f64>],
        labels: &[bool],
        ensemble: &EnsembleConfig,
        forest: &ForestConfig,
        boosting: &BoostingConfig,
    ) -> Result<Self, TrainError> {
        let dimension = rows.first().map_or(0, Vec::len);
        let k = ensemble.calibration_folds;

        let (forest, boosted) = rayon::join(
            || CalibratedClassifier::<RandomForest>::fit(rows, labels, forest, k),
            || CalibratedClassifier::<BoostedTrees>::fit(rows, labels, boosting, k),
        );

        Ok(Self {
            forest: forest?,
            boosted: boosted?,
            forest_weight: ensemble.forest_weight,
            boosted_weight: ensemble.boosted_weight,
            dimension,
        })
    }

    /// Blend the two calibrated probabilities for one scaled row
    pub fn predict(&self, row: &[f64]) -> Result<EnsemblePrediction, AnalysisError> {
        if row.len() != self.dimension {
            return Err(AnalysisError::DimensionMismatch {
                expected: self.dimension,
                found: row.len(),
            });
        }
        let forest = self.forest.predict_proba(row);
        let boosted = self.boosted.predict_proba(row);
        let blended = self.boosted_weight * boosted + self.forest_weight * forest;
        if !blended.is_finite() {
            return Err(AnalysisError::NonFinite { stage: "ensemble" });
        }
        Ok(EnsemblePrediction {
            forest,
            boosted,
            blended: blended.clamp(0.0, 1.0),
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn summary(&self) -> EnsembleSummary {
        let forest = self.forest.folds();
        let boosted = self.boosted.folds();
        EnsembleSummary {
            calibration_folds: forest.len(),
            forest_trees: forest.first().map_or(0, |f| f.model.n_trees()),
            forest_max_depth: forest.iter().map(|f| f.model.max_depth()).max().unwrap_or(0),
            boosting_iterations: boosted.first().map_or(0, |f| f.model.iterations()),
            forest_knots: forest.iter().map(|f| f.calibration.knots()).collect(),
            boosted_knots: boosted.iter().map(|f| f.calibration.knots()).collect(),
            forest_weight: self.forest_weight,
            boosted_weight: self.boosted_weight,
        }
    }
}

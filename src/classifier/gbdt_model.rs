//! Gradient-boosted trees
//!
//! Wraps the `gbdt` crate with the `LogLikelyhood` loss (binary
//! classification, labels +1 / -1). The crate works in `f32`; conversions
//! happen at this boundary.

use gbdt::config::Config;
use gbdt::decision_tree::Data;
use gbdt::gradient_boost::GBDT;

use super::calibrated::ProbabilisticClassifier;
use super::TrainError;
use crate::config::BoostingConfig;

#[inline]
fn to_f32(row: &[f64]) -> Vec<f32> {
    row.iter().map(|&v| v as f32).collect()
}

#[inline]
fn to_label(phishing: bool) -> f32 {
    if phishing {
        1.0
    } else {
        -1.0
    }
}

/// Boosted-trees classifier over scaled feature rows
pub struct BoostedTrees {
    model: GBDT,
    dimension: usize,
    iterations: usize,
}

impl std::fmt::Debug for BoostedTrees {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoostedTrees")
            .field("dimension", &self.dimension)
            .field("iterations", &self.iterations)
            .finish_non_exhaustive()
    }
}

impl BoostedTrees {
    /// Train on a row-major matrix with boolean labels
    pub fn fit(rows: &[Vec<f64>], labels: &[bool], config: &BoostingConfig) -> Result<Self, TrainError> {
        if rows.is_empty() {
            return Err(TrainError::EmptyCorpus);
        }
        if rows.len() != labels.len() {
            return Err(TrainError::LabelMismatch {
                rows: rows.len(),
                labels: labels.len(),
            });
        }

        let dimension = rows[0].len();
        if dimension == 0 {
            return Err(TrainError::Boosting("feature rows are empty".into()));
        }

        let mut cfg = Config::new();
        cfg.set_feature_size(dimension);
        cfg.set_max_depth(config.max_depth);
        cfg.set_iterations(config.iterations);
        cfg.set_shrinkage(config.learning_rate as f32);
        cfg.set_loss("LogLikelyhood");
        cfg.set_debug(false);
        cfg.set_training_optimization_level(2);
        cfg.set_min_leaf_size(config.min_leaf_size);

        let mut model = GBDT::new(&cfg);

        let mut training_data: Vec<Data> = rows
            .iter()
            .zip(labels)
            .map(|(row, &label)| Data::new_training_data(to_f32(row), 1.0_f32, to_label(label), None))
            .collect();

        model.fit(&mut training_data);

        Ok(Self {
            model,
            dimension,
            iterations: config.iterations,
        })
    }

    /// Probability of the positive class
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        let data = vec![Data::new_test_data(to_f32(row), None)];
        let p = self.model.predict(&data).first().copied().unwrap_or(0.5_f32) as f64;
        if p.is_finite() {
            p.clamp(0.0, 1.0)
        } else {
            0.5
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Boosting rounds the model was trained with
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl ProbabilisticClassifier for BoostedTrees {
    type Config = BoostingConfig;

    fn fit(rows: &[Vec<f64>], labels: &[bool], config: &BoostingConfig) -> Result<Self, TrainError> {
        BoostedTrees::fit(rows, labels, config)
    }

    fn predict_proba(&self, row: &[f64]) -> f64 {
        BoostedTrees::predict_proba(self, row)
    }
}

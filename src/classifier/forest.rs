//! Bagged decision forest
//!
//! CART trees (gini impurity) grown on bootstrap resamples with a random
//! feature subset per split. Each tree gets its own ChaCha stream derived
//! from the configured seed, so trees can be grown in parallel and the
//! result is still reproducible.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use super::calibrated::ProbabilisticClassifier;
use super::TrainError;
use crate::config::ForestConfig;

/// Minimum impurity decrease for a split to be kept
const MIN_GAIN: f64 = 1e-12;

/// Golden-ratio increment separating per-tree seeds
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        /// Share of positive samples reaching this leaf
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, row: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = row.get(*feature).copied().unwrap_or(0.0);
                    node = if x <= *threshold { left } else { right };
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Random forest producing the mean leaf probability across trees
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<Node>,
    dimension: usize,
}

impl RandomForest {
    /// Grow the forest on a row-major matrix with boolean labels
    pub fn fit(rows: &[Vec<f64>], labels: &[bool], config: &ForestConfig) -> Result<Self, TrainError> {
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
        let max_features = config
            .max_features
            .unwrap_or_else(|| (dimension as f64).sqrt().floor() as usize)
            .clamp(1, dimension.max(1));

        let builder = TreeBuilder {
            rows,
            labels,
            config,
            max_features,
        };

        let trees = (0..config.trees)
            .into_par_iter()
            .map(|i| {
                let seed = config.seed.wrapping_add((i as u64).wrapping_mul(SEED_STRIDE));
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let sample: Vec<usize> = (0..rows.len())
                    .map(|_| rng.random_range(0..rows.len()))
                    .collect();
                builder.build(&sample, 0, &mut rng)
            })
            .collect();

        Ok(Self { trees, dimension })
    }

    /// Probability of the positive class
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        sum / self.trees.len() as f64
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Depth of the deepest tree
    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(Node::depth).max().unwrap_or(0)
    }
}

impl ProbabilisticClassifier for RandomForest {
    type Config = ForestConfig;

    fn fit(rows: &[Vec<f64>], labels: &[bool], config: &ForestConfig) -> Result<Self, TrainError> {
        RandomForest::fit(rows, labels, config)
    }

    fn predict_proba(&self, row: &[f64]) -> f64 {
        RandomForest::predict_proba(self, row)
    }
}

struct TreeBuilder<'a> {
    rows: &'a [Vec<f64>],
    labels: &'a [bool],
    config: &'a ForestConfig,
    max_features: usize,
}

impl TreeBuilder<'_> {
    fn build(&self, indices: &[usize], depth: usize, rng: &mut ChaCha8Rng) -> Node {
        let n = indices.len();
        let positives = indices.iter().filter(|&&i| self.labels[i]).count();
        let value = if n == 0 { 0.5 } else { positives as f64 / n as f64 };

        if depth >= self.config.max_depth
            || n < self.config.min_samples_split
            || positives == 0
            || positives == n
        {
            return Node::Leaf { value };
        }

        let Some((feature, threshold)) = self.best_split(indices, positives, rng) else {
            return Node::Leaf { value };
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.rows[i][feature] <= threshold);

        Node::Split {
            feature,
            threshold,
            left: Box::new(self.build(&left, depth + 1, rng)),
            right: Box::new(self.build(&right, depth + 1, rng)),
        }
    }

    /// Best (feature, threshold) among `max_features` non-constant features
    fn best_split(
        &self,
        indices: &[usize],
        positives: usize,
        rng: &mut ChaCha8Rng,
    ) -> Option<(usize, f64)> {
        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        let parent = gini(positives, n);

        let mut features: Vec<usize> = (0..self.rows[indices[0]].len()).collect();
        features.shuffle(rng);

        let mut best: Option<(usize, f64, f64)> = None;
        let mut tried = 0;
        let mut column: Vec<(f64, bool)> = Vec::with_capacity(n);

        for feature in features {
            if tried >= self.max_features {
                break;
            }
            column.clear();
            column.extend(indices.iter().map(|&i| (self.rows[i][feature], self.labels[i])));
            column.sort_by(|a, b| a.0.total_cmp(&b.0));
            if column[0].0 == column[n - 1].0 {
                continue;
            }
            tried += 1;

            let mut left_pos = 0;
            for k in 1..n {
                if column[k - 1].1 {
                    left_pos += 1;
                }
                let (lo, hi) = (column[k - 1].0, column[k].0);
                if lo == hi || k < min_leaf || n - k < min_leaf {
                    continue;
                }
                let impurity = (k as f64 * gini(left_pos, k)
                    + (n - k) as f64 * gini(positives - left_pos, n - k))
                    / n as f64;
                if parent - impurity > MIN_GAIN && best.map_or(true, |b| impurity < b.2) {
                    let mid = lo + (hi - lo) / 2.0;
                    let threshold = if mid < hi { mid } else { lo };
                    best = Some((feature, threshold, impurity));
                }
            }
        }

        best.map(|(feature, threshold, _)| (feature, threshold))
    }
}

fn gini(positives: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = positives as f64 / n as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

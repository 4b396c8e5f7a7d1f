//! Cross-validated evaluation of the full scoring pipeline
//!
//! Each stratified fold is scored by a model trained on the remaining
//! folds. A message counts as flagged when its risk level is not Low.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::calibrated::stratified_folds;
use super::train::train_with_config;
use super::{analyze_message, TrainError};
use crate::config::{ConfigError, EngineConfig};
use crate::corpus::Corpus;
use crate::models::RiskLevel;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionMatrix {
    pub fn record(&mut self, phishing: bool, flagged: bool) {
        match (phishing, flagged) {
            (true, true) => self.true_positive += 1,
            (false, true) => self.false_positive += 1,
            (false, false) => self.true_negative += 1,
            (true, false) => self.false_negative += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Held-out performance summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub folds: usize,
    pub examples: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Mean squared error of the final probability against the label
    pub brier: f64,
    pub confusion: ConfusionMatrix,
}

/// Stratified `folds`-fold cross-validation of train + analyze
pub fn evaluate(corpus: &Corpus, config: &EngineConfig, folds: usize) -> Result<EvaluationReport, TrainError> {
    if folds < 2 {
        return Err(ConfigError::Invalid(format!("evaluation needs at least 2 folds, got {folds}")).into());
    }
    let labels = corpus.labels();
    let assignment = stratified_folds(&labels, folds)?;

    let mut confusion = ConfusionMatrix::default();
    let mut squared_error = 0.0;

    for fold in 0..folds {
        let (held, kept): (Vec<usize>, Vec<usize>) = (0..corpus.len()).partition(|&i| assignment[i] == fold);
        let model = train_with_config(&corpus.subset(&kept), config)?;

        for &i in &held {
            let example = &corpus.examples()[i];
            let result = analyze_message(&model, &example.message);
            let p = result
                .breakdown
                .map_or(f64::from(result.score) / 100.0, |b| b.adjusted);
            let target = if example.phishing { 1.0 } else { 0.0 };
            squared_error += (p - target) * (p - target);
            confusion.record(example.phishing, result.risk_level != RiskLevel::Low);
        }
        info!("Evaluated fold {}/{} ({} held out)", fold + 1, folds, held.len());
    }

    let report = EvaluationReport {
        folds,
        examples: confusion.total(),
        accuracy: confusion.accuracy(),
        precision: confusion.precision(),
        recall: confusion.recall(),
        f1: confusion.f1(),
        brier: squared_error / confusion.total().max(1) as f64,
        confusion,
    };
    info!(
        "Cross-validation: accuracy {:.1}%, precision {:.1}%, recall {:.1}%",
        report.accuracy * 100.0,
        report.precision * 100.0,
        report.recall * 100.0
    );
    Ok(report)
}

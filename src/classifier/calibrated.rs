//! Cross-validated probability calibration
//!
//! For each of `k` stratified folds a base model is trained on the other
//! folds and an isotonic map is fitted on its held-out predictions.
//! Inference averages the `k` calibrated outputs.

use rayon::prelude::*;

use super::isotonic::IsotonicRegression;
use super::TrainError;

/// A binary classifier producing positive-class probabilities
pub trait ProbabilisticClassifier: Sized + Send + Sync {
    type Config: Sync;

    fn fit(rows: &[Vec<f64>], labels: &[bool], config: &Self::Config) -> Result<Self, TrainError>;

    fn predict_proba(&self, row: &[f64]) -> f64;
}

/// Base model paired with the isotonic map fitted on its held-out fold
#[derive(Debug, Clone)]
pub struct CalibratedFold<C> {
    pub model: C,
    pub calibration: IsotonicRegression,
}

/// Average of `k` fold-calibrated copies of a base classifier
#[derive(Debug, Clone)]
pub struct CalibratedClassifier<C> {
    folds: Vec<CalibratedFold<C>>,
}

impl<C: ProbabilisticClassifier> CalibratedClassifier<C> {
    /// Train and calibrate over `k` stratified folds
    pub fn fit(rows: &[Vec<f64>], labels: &[bool], config: &C::Config, k: usize) -> Result<Self, TrainError> {
        if rows.len() != labels.len() {
            return Err(TrainError::LabelMismatch {
                rows: rows.len(),
                labels: labels.len(),
            });
        }
        let assignment = stratified_folds(labels, k)?;

        let folds = (0..k)
            .into_par_iter()
            .map(|fold| {
                let (train_idx, held_idx): (Vec<usize>, Vec<usize>) =
                    (0..rows.len()).partition(|&i| assignment[i] != fold);

                let train_rows: Vec<Vec<f64>> = train_idx.iter().map(|&i| rows[i].clone()).collect();
                let train_labels: Vec<bool> = train_idx.iter().map(|&i| labels[i]).collect();
                let model = C::fit(&train_rows, &train_labels, config)?;

                let scores: Vec<f64> = held_idx.iter().map(|&i| model.predict_proba(&rows[i])).collect();
                let targets: Vec<f64> = held_idx
                    .iter()
                    .map(|&i| if labels[i] { 1.0 } else { 0.0 })
                    .collect();
                let calibration = IsotonicRegression::fit(&scores, &targets);

                Ok(CalibratedFold { model, calibration })
            })
            .collect::<Result<Vec<_>, TrainError>>()?;

        Ok(Self { folds })
    }

    /// Mean calibrated probability across folds
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        if self.folds.is_empty() {
            return 0.5;
        }
        let sum: f64 = self
            .folds
            .iter()
            .map(|f| f.calibration.predict(f.model.predict_proba(row)))
            .sum();
        sum / self.folds.len() as f64
    }

    pub fn folds(&self) -> &[CalibratedFold<C>] {
        &self.folds
    }
}

/// Assign each sample a fold in `0..k`, dealing each class round-robin so
/// every fold holds at least one example of both classes.
pub fn stratified_folds(labels: &[bool], k: usize) -> Result<Vec<usize>, TrainError> {
    if labels.is_empty() {
        return Err(TrainError::EmptyCorpus);
    }
    let positives = labels.iter().filter(|&&l| l).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(TrainError::SingleClass);
    }
    for (class, found) in [("phishing", positives), ("legitimate", negatives)] {
        if found < k {
            return Err(TrainError::TooFewPerClass {
                class,
                found,
                needed: k,
            });
        }
    }

    let mut next = [0usize; 2];
    Ok(labels
        .iter()
        .map(|&label| {
            let slot = &mut next[usize::from(label)];
            let fold = *slot % k;
            *slot += 1;
            fold
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Predicts the first feature, clamped
    #[derive(Debug)]
    struct Identity;

    impl ProbabilisticClassifier for Identity {
        type Config = ();

        fn fit(rows: &[Vec<f64>], _labels: &[bool], _config: &()) -> Result<Self, TrainError> {
            if rows.is_empty() {
                return Err(TrainError::EmptyCorpus);
            }
            Ok(Identity)
        }

        fn predict_proba(&self, row: &[f64]) -> f64 {
            row[0].clamp(0.0, 1.0)
        }
    }

    #[test]
    fn test_stratified_folds_balance_classes() {
        let labels = [true, true, true, false, false, false, true, false];
        let folds = stratified_folds(&labels, 3).unwrap();
        assert_eq!(folds.len(), labels.len());
        for fold in 0..3 {
            let members: Vec<bool> = labels
                .iter()
                .zip(&folds)
                .filter(|(_, &f)| f == fold)
                .map(|(&l, _)| l)
                .collect();
            assert!(members.contains(&true), "fold {fold} lacks phishing");
            assert!(members.contains(&false), "fold {fold} lacks legitimate");
        }
    }

    #[test]
    fn test_stratified_folds_errors() {
        assert!(matches!(stratified_folds(&[], 3), Err(TrainError::EmptyCorpus)));
        assert!(matches!(
            stratified_folds(&[true, true, true], 3),
            Err(TrainError::SingleClass)
        ));
        assert!(matches!(
            stratified_folds(&[true, true, true, false, false], 3),
            Err(TrainError::TooFewPerClass {
                class: "legitimate",
                found: 2,
                needed: 3
            })
        ));
    }

    #[test]
    fn test_calibration_maps_scores_to_frequencies() {
        // Raw score 0.9 is always phishing, 0.1 never
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for _ in 0..6 {
            rows.push(vec![0.9]);
            labels.push(true);
            rows.push(vec![0.1]);
            labels.push(false);
        }
        let model = CalibratedClassifier::<Identity>::fit(&rows, &labels, &(), 3).unwrap();
        assert_eq!(model.folds().len(), 3);
        assert_eq!(model.predict_proba(&[0.9]), 1.0);
        assert_eq!(model.predict_proba(&[0.1]), 0.0);
        let mid = model.predict_proba(&[0.5]);
        assert!(mid > 0.0 && mid < 1.0);
    }
}

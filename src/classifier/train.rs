//! Training for the phishing classifier
//!
//! Fits the vectorizer, scaler and calibrated ensemble on a labelled corpus
//! and packages them with the scoring policy into a [`FittedModel`].

use rayon::prelude::*;
use tracing::info;

use super::ensemble::CalibratedEnsemble;
use super::features::{FeatureExtractor, NUM_ENGINEERED};
use super::scaler::StandardScaler;
use super::vectorizer::TfidfVectorizer;
use super::{FeatureVector, FittedModel, ModelInfo, ScoringPolicy, TrainError};
use crate::config::EngineConfig;
use crate::corpus::Corpus;

/// Train with the default configuration
pub fn train(corpus: &Corpus) -> Result<FittedModel, TrainError> {
    train_with_config(corpus, &EngineConfig::default())
}

/// Train the full pipeline on `corpus`
pub fn train_with_config(corpus: &Corpus, config: &EngineConfig) -> Result<FittedModel, TrainError> {
    config.validate()?;

    if corpus.is_empty() {
        return Err(TrainError::EmptyCorpus);
    }
    let counts = corpus.class_counts();
    if !counts.has_both_classes() {
        return Err(TrainError::SingleClass);
    }
    let folds = config.ensemble.calibration_folds;
    for (class, found) in [("phishing", counts.phishing), ("legitimate", counts.legitimate)] {
        if found < folds {
            return Err(TrainError::TooFewPerClass {
                class,
                found,
                needed: folds,
            });
        }
    }

    let fingerprint = corpus.fingerprint();
    info!(
        "Training on {} examples ({} phishing, {} legitimate), corpus {}",
        corpus.len(),
        counts.phishing,
        counts.legitimate,
        &fingerprint[..12]
    );

    let extractor = FeatureExtractor::new();
    let texts: Vec<String> = corpus.examples().iter().map(|e| e.message.text()).collect();
    let vectorizer = TfidfVectorizer::fit(&texts, &config.vectorizer);
    info!("Fitted vocabulary of {} terms", vectorizer.dimension());

    let rows: Vec<Vec<f64>> = corpus
        .examples()
        .par_iter()
        .zip(texts.par_iter())
        .map(|(example, text)| {
            FeatureVector::new(extractor.extract(&example.message), vectorizer.transform(text)).to_row()
        })
        .collect();
    let labels = corpus.labels();

    let scaler = StandardScaler::fit(&rows)?;
    let scaled = rows
        .iter()
        .map(|row| scaler.transform(row))
        .collect::<Result<Vec<_>, _>>()?;

    let ensemble = CalibratedEnsemble::fit(
        &scaled,
        &labels,
        &config.ensemble,
        &config.forest,
        &config.boosting,
    )?;

    let mut correct = 0;
    for (row, &label) in scaled.iter().zip(&labels) {
        if (ensemble.predict(row)?.blended >= 0.5) == label {
            correct += 1;
        }
    }
    let training_accuracy = correct as f64 / labels.len() as f64;
    info!("Training accuracy: {:.1}%", training_accuracy * 100.0);

    let info = ModelInfo {
        corpus_fingerprint: fingerprint,
        examples: corpus.len(),
        phishing: counts.phishing,
        legitimate: counts.legitimate,
        engineered_features: NUM_ENGINEERED,
        text_features: vectorizer.dimension(),
        vocabulary: vectorizer.terms().to_vec(),
        training_accuracy,
        ensemble: ensemble.summary(),
    };

    Ok(FittedModel {
        extractor,
        vectorizer,
        scaler,
        ensemble,
        policy: ScoringPolicy::from_config(config),
        info,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Message, TrainingExample};

    fn example(subject: &str, phishing: bool) -> TrainingExample {
        TrainingExample::new(Message::new("x@example.com", subject, ""), phishing)
    }

    #[test]
    fn test_degenerate_corpora_are_rejected() {
        assert!(matches!(train(&Corpus::default()), Err(TrainError::EmptyCorpus)));

        let one_class = Corpus::new(vec![example("a", true), example("b", true), example("c", true)]);
        assert!(matches!(train(&one_class), Err(TrainError::SingleClass)));

        let thin = Corpus::new(vec![
            example("a", true),
            example("b", true),
            example("c", true),
            example("d", false),
        ]);
        assert!(matches!(
            train(&thin),
            Err(TrainError::TooFewPerClass {
                class: "legitimate",
                found: 1,
                needed: 3
            })
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.ensemble.calibration_folds = 1;
        let corpus = Corpus::reference().unwrap();
        assert!(matches!(
            train_with_config(&corpus, &config),
            Err(TrainError::Config(_))
        ));
    }

    #[test]
    fn test_train_reference_corpus() {
        let mut config = EngineConfig::default();
        config.forest.trees = 20;
        config.boosting.iterations = 20;
        let corpus = Corpus::reference().unwrap();
        let model = train_with_config(&corpus, &config).unwrap();

        let info = model.info();
        assert_eq!(info.examples, 28);
        assert_eq!(info.phishing, 14);
        assert_eq!(info.engineered_features, NUM_ENGINEERED);
        assert!(info.text_features > 0 && info.text_features <= 50);
        assert_eq!(info.vocabulary.len(), info.text_features);
        assert_eq!(model.dimension(), NUM_ENGINEERED + info.text_features);
        assert_eq!(info.corpus_fingerprint, corpus.fingerprint());
        assert!(info.training_accuracy > 0.5);
        assert_eq!(info.ensemble.calibration_folds, 3);
        assert_eq!(info.ensemble.forest_trees, 20);
        assert_eq!(info.ensemble.boosting_iterations, 20);
    }
}

//! Phishing risk classifier
//!
//! Pipeline: engineered features + TF-IDF text features → standard scaler →
//! calibrated forest / boosted-trees ensemble → confidence-band calibrator →
//! sender heuristics → risk level.
//!
//! `train` builds an immutable [`FittedModel`]; `analyze` scores a message
//! against it and never fails. Internal numerical errors degrade to the
//! configured fail-safe verdict instead of propagating.

pub mod calibrated;
pub mod calibrator;
pub mod ensemble;
pub mod evaluate;
pub mod features;
pub mod forest;
pub mod gbdt_model;
pub mod heuristics;
pub mod isotonic;
pub mod lexicon;
pub mod scaler;
pub mod shared;
pub mod thresholds;
pub mod train;
pub mod vectorizer;

pub use calibrator::ProbabilityCalibrator;
pub use ensemble::{CalibratedEnsemble, EnsemblePrediction, EnsembleSummary};
pub use evaluate::{evaluate, ConfusionMatrix, EvaluationReport};
pub use features::{EngineeredFeatures, Feature, FeatureExtractor, FEATURE_NAMES, NUM_ENGINEERED};
pub use heuristics::HeuristicOverrides;
pub use shared::ModelHandle;
pub use thresholds::{to_score, RiskThresholds};
pub use train::{train, train_with_config};
pub use vectorizer::TfidfVectorizer;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ConfigError, EngineConfig, FailureMode};
use crate::models::{AnalysisResult, Message, Override, RiskLevel, ScoreBreakdown};
use scaler::StandardScaler;

/// Errors that abort training
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("training corpus is empty")]
    EmptyCorpus,

    #[error("training corpus contains a single class; both phishing and legitimate examples are required")]
    SingleClass,

    #[error("need at least {needed} {class} examples for calibration, found {found}")]
    TooFewPerClass {
        class: &'static str,
        found: usize,
        needed: usize,
    },

    #[error("feature rows ({rows}) do not match labels ({labels})")]
    LabelMismatch { rows: usize, labels: usize },

    #[error("boosted trees training failed: {0}")]
    Boosting(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("numerical failure during training: {0}")]
    Numerical(#[from] AnalysisError),
}

/// Errors raised while scoring a message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("feature dimension mismatch (expected {expected}, found {found})")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("non-finite value during {stage}")]
    NonFinite { stage: &'static str },
}

/// Unscaled model input for one message
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub engineered: EngineeredFeatures,
    /// TF-IDF weights, one per vocabulary term
    pub text: Vec<f64>,
}

impl FeatureVector {
    pub fn new(engineered: EngineeredFeatures, text: Vec<f64>) -> Self {
        Self { engineered, text }
    }

    /// Engineered values followed by text weights
    pub fn to_row(&self) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.dimension());
        row.extend_from_slice(self.engineered.as_slice());
        row.extend_from_slice(&self.text);
        row
    }

    pub fn dimension(&self) -> usize {
        NUM_ENGINEERED + self.text.len()
    }
}

/// Summary of a trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// SHA-256 of the training corpus
    pub corpus_fingerprint: String,
    pub examples: usize,
    pub phishing: usize,
    pub legitimate: usize,
    pub engineered_features: usize,
    pub text_features: usize,
    pub vocabulary: Vec<String>,
    /// Share of training examples whose blended probability lands on the right side of 0.5
    pub training_accuracy: f64,
    pub ensemble: EnsembleSummary,
}

/// Everything after the ensemble: calibration, overrides, thresholds and the
/// failure verdict. Swappable per call without retraining.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub calibrator: ProbabilityCalibrator,
    pub heuristics: HeuristicOverrides,
    pub thresholds: RiskThresholds,
    pub failure_mode: FailureMode,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl ScoringPolicy {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            calibrator: ProbabilityCalibrator::from_config(&config.calibration),
            heuristics: HeuristicOverrides::from_config(&config.heuristics),
            thresholds: RiskThresholds::from_config(&config.thresholds),
            failure_mode: config.failure_mode,
        }
    }

    /// Map a final probability to a verdict
    pub fn verdict(&self, p: f64, override_applied: Option<Override>, indicators: &[&str]) -> AnalysisResult {
        let risk_level = self.thresholds.classify(p);
        AnalysisResult {
            score: to_score(p),
            risk_level,
            explanation: explain(risk_level, indicators, override_applied),
            breakdown: None,
        }
    }

    /// Verdict reported when scoring fails
    pub fn failure(&self, cause: &AnalysisError) -> AnalysisResult {
        let (score, risk_level) = match self.failure_mode {
            FailureMode::Open => (0, RiskLevel::Low),
            FailureMode::Closed => (self.thresholds.high_score(), RiskLevel::High),
        };
        AnalysisResult {
            score,
            risk_level,
            explanation: format!("Analysis Error: {cause}"),
            breakdown: None,
        }
    }
}

/// A trained, immutable scoring model
#[derive(Debug)]
pub struct FittedModel {
    pub(crate) extractor: FeatureExtractor,
    pub(crate) vectorizer: TfidfVectorizer,
    pub(crate) scaler: StandardScaler,
    pub(crate) ensemble: CalibratedEnsemble,
    pub(crate) policy: ScoringPolicy,
    pub(crate) info: ModelInfo,
}

impl FittedModel {
    pub fn info(&self) -> &ModelInfo {
        &self.info
    }

    /// Policy used by [`analyze`]
    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    /// Width of the scaled input row
    pub fn dimension(&self) -> usize {
        self.scaler.dimension()
    }

    /// Unscaled feature vector for a message
    pub fn features(&self, message: &Message) -> FeatureVector {
        FeatureVector::new(
            self.extractor.extract(message),
            self.vectorizer.transform(&message.text()),
        )
    }

    /// Blended ensemble probability for a feature vector
    pub fn predict(&self, features: &FeatureVector) -> Result<EnsemblePrediction, AnalysisError> {
        let scaled = self.scaler.transform(&features.to_row())?;
        self.ensemble.predict(&scaled)
    }

    fn score(&self, policy: &ScoringPolicy, sender: &str, features: &FeatureVector) -> Result<AnalysisResult, AnalysisError> {
        let prediction = self.predict(features)?;
        let calibrated = policy.calibrator.calibrate(prediction.blended);
        let (adjusted, override_applied) = policy.heuristics.apply(sender, calibrated);
        if !adjusted.is_finite() {
            return Err(AnalysisError::NonFinite { stage: "calibration" });
        }

        let signals = indicators(&features.engineered);
        let mut result = policy.verdict(adjusted, override_applied, &signals);
        let breakdown = ScoreBreakdown {
            forest: prediction.forest,
            boosted: prediction.boosted,
            ensemble: prediction.blended,
            calibrated,
            adjusted,
            override_applied,
        };
        debug!(
            forest = breakdown.forest,
            boosted = breakdown.boosted,
            ensemble = breakdown.ensemble,
            calibrated = breakdown.calibrated,
            adjusted = breakdown.adjusted,
            score = result.score,
            "Scored message"
        );
        result.breakdown = Some(breakdown);
        Ok(result)
    }
}

/// Score a message with the model's own policy
pub fn analyze(model: &FittedModel, sender: &str, subject: &str, snippet: &str) -> AnalysisResult {
    analyze_with_policy(model, &model.policy, sender, subject, snippet)
}

pub fn analyze_message(model: &FittedModel, message: &Message) -> AnalysisResult {
    analyze(model, &message.sender, &message.subject, &message.snippet)
}

/// Score a message with a caller-supplied policy
pub fn analyze_with_policy(
    model: &FittedModel,
    policy: &ScoringPolicy,
    sender: &str,
    subject: &str,
    snippet: &str,
) -> AnalysisResult {
    let message = Message::new(sender, subject, snippet);
    let features = model.features(&message);
    analyze_features(model, policy, sender, &features)
}

/// Score a precomputed feature vector. A vector of the wrong width yields
/// the policy's failure verdict.
pub fn analyze_features(
    model: &FittedModel,
    policy: &ScoringPolicy,
    sender: &str,
    features: &FeatureVector,
) -> AnalysisResult {
    match model.score(policy, sender, features) {
        Ok(result) => result,
        Err(e) => {
            warn!("Analysis failed, returning fail-safe verdict: {}", e);
            policy.failure(&e)
        }
    }
}

/// Score many messages in parallel; output order follows input order
pub fn analyze_batch(model: &FittedModel, messages: &[Message]) -> Vec<AnalysisResult> {
    messages
        .par_iter()
        .map(|m| analyze_message(model, m))
        .collect()
}

/// Human-readable signals present in the engineered features
pub fn indicators(features: &EngineeredFeatures) -> Vec<&'static str> {
    let on = |f: Feature| features.get(f) > 0.0;
    let mut out = Vec::new();
    if on(Feature::UrgencyRatio) {
        out.push("urgency/pressure language");
    }
    if on(Feature::FearRatio) {
        out.push("security alarm language");
    }
    if on(Feature::CredentialRatio) {
        out.push("credential request");
    }
    if on(Feature::FinancialRatio) {
        out.push("financial content");
    }
    if on(Feature::PublicWebmailSender) && on(Feature::OfficialSenderName) {
        out.push("official-sounding sender on public webmail");
    }
    if on(Feature::DomainTypoChars) {
        out.push("look-alike sender domain");
    }
    if on(Feature::UrlShortener) {
        out.push("URL shortener");
    }
    if on(Feature::ClickPhrase) {
        out.push("call-to-action link");
    }
    if on(Feature::UrlDensity) {
        out.push("embedded links");
    }
    if on(Feature::GenericGreeting) {
        out.push("generic greeting");
    }
    if on(Feature::AllCapsSubject) {
        out.push("all-caps subject");
    }
    out
}

fn headline(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Critical => "Threat detected: Multiple strong phishing indicators identified",
        RiskLevel::High => "High risk: Several suspicious patterns detected",
        RiskLevel::Low => "Low risk: Appears legitimate",
    }
}

fn explain(level: RiskLevel, indicators: &[&str], override_applied: Option<Override>) -> String {
    let mut text = headline(level).to_string();
    if !indicators.is_empty() {
        text.push_str(". Signals: ");
        text.push_str(&indicators.join(", "));
    }
    if let Some(o) = override_applied {
        text.push_str(". Override: ");
        text.push_str(&o.to_string());
    }
    text
}

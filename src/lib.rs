//! Aegis - calibrated phishing risk scoring
//!
//! Scores inbound mail metadata (sender, subject, snippet) with a calibrated
//! tree ensemble plus sender heuristics, and reports a 0-100 score, a risk
//! level and a short explanation.
//!
//! ```no_run
//! use aegis::{analyze, train, Corpus};
//!
//! let model = train(&Corpus::reference()?)?;
//! let verdict = analyze(&model, "security@gmail.com", "Unusual sign-in", "Verify your identity now");
//! println!("{} {} {}", verdict.score, verdict.risk_level, verdict.explanation);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod classifier;
pub mod config;
pub mod corpus;
pub mod models;

pub use classifier::{
    analyze, analyze_batch, analyze_features, analyze_message, analyze_with_policy, evaluate,
    train, train_with_config, AnalysisError, EvaluationReport, FeatureVector, FittedModel,
    ModelHandle, ModelInfo, RiskThresholds, ScoringPolicy, TrainError,
};
pub use config::{ConfigError, EngineConfig, FailureMode};
pub use corpus::{ClassCounts, Corpus, CorpusError};
pub use models::{AnalysisResult, Message, Override, RiskLevel, ScoreBreakdown, TrainingExample};

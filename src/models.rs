//! Core data models for Aegis
//!
//! Typed records passed between consumers and the scoring engine:
//! the inbound message, labelled training examples, and the verdict.

use serde::{Deserialize, Serialize};

/// Inbound message metadata. Missing fields deserialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub snippet: String,
}

impl Message {
    pub fn new(
        sender: impl Into<String>,
        subject: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            subject: subject.into(),
            snippet: snippet.into(),
        }
    }

    /// Subject and snippet joined by a single space, as seen by the text models.
    pub fn text(&self) -> String {
        format!("{} {}", self.subject, self.snippet)
    }
}

/// A labelled message. `phishing = true` is the positive class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    #[serde(flatten)]
    pub message: Message,
    pub phishing: bool,
}

impl TrainingExample {
    pub fn new(message: Message, phishing: bool) -> Self {
        Self { message, phishing }
    }
}

/// Discrete risk bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    High,
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::High => write!(f, "High"),
            RiskLevel::Critical => write!(f, "Critical"),
        }
    }
}

/// Heuristic correction applied after calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Override {
    /// Official-sounding or brand name on a public webmail domain
    SpoofBoost,
    /// Sender on the verified corporate allow-list
    SafeDomainRelief,
}

impl std::fmt::Display for Override {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Override::SpoofBoost => write!(f, "Spoofed sender (official name on public domain)"),
            Override::SafeDomainRelief => write!(f, "Verified sender domain"),
        }
    }
}

/// Intermediate probabilities behind a verdict
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Calibrated forest probability
    pub forest: f64,
    /// Calibrated boosted-trees probability
    pub boosted: f64,
    /// Weighted blend of the two
    pub ensemble: f64,
    /// Output of the confidence-band calibrator
    pub calibrated: f64,
    /// Probability after heuristic overrides
    pub adjusted: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_applied: Option<Override>,
}

/// Verdict for a single message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Risk score on a 0-100 scale (truncated, never rounded up)
    pub score: u8,
    pub risk_level: RiskLevel,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}

impl AnalysisResult {
    /// True when the verdict came from a successful scoring pass
    pub fn is_scored(&self) -> bool {
        self.breakdown.is_some()
    }
}

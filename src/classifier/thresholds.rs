//! Risk-level thresholds
//!
//! One threshold set drives both axes: probabilities in `[0, 1]` and the
//! truncated 0-100 score handed to consumers.

use serde::{Deserialize, Serialize};

use crate::config::ThresholdsConfig;
use crate::models::RiskLevel;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Lowest probability classified High
    pub high: f64,
    /// Lowest probability classified Critical
    pub critical: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self::from_config(&ThresholdsConfig::default())
    }
}

impl RiskThresholds {
    pub fn from_config(config: &ThresholdsConfig) -> Self {
        Self {
            high: config.high,
            critical: config.critical,
        }
    }

    /// Risk level for a probability. Boundaries belong to the higher level.
    pub fn classify(&self, p: f64) -> RiskLevel {
        if p >= self.critical {
            RiskLevel::Critical
        } else if p >= self.high {
            RiskLevel::High
        } else {
            RiskLevel::Low
        }
    }

    /// Risk level for a 0-100 score, using the same thresholds.
    ///
    /// Equal to `classify(score / 100)`, so a score never ranks above the
    /// probability it was truncated from.
    pub fn classify_score(&self, score: u8) -> RiskLevel {
        if score >= min_score(self.critical) {
            RiskLevel::Critical
        } else if score >= min_score(self.high) {
            RiskLevel::High
        } else {
            RiskLevel::Low
        }
    }

    /// Score reported for a fail-closed verdict: the lowest High score
    pub fn high_score(&self) -> u8 {
        min_score(self.high)
    }
}

/// Smallest score `s` with `s / 100 >= threshold`
fn min_score(threshold: f64) -> u8 {
    let t = threshold.clamp(0.0, 1.0);
    let s = (t * 100.0).round();
    let s = if s / 100.0 < t { s + 1.0 } else { s };
    s.min(100.0) as u8
}

/// Truncate a probability to a 0-100 score
pub fn to_score(p: f64) -> u8 {
    if p.is_nan() {
        return 0;
    }
    (p.clamp(0.0, 1.0) * 100.0) as u8
}

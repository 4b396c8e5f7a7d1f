//! Confidence-band calibration
//!
//! Shifts the ensemble probability by the operator's sensitivity, clamps
//! it into `[floor, ceiling]`, then squashes it through a sigmoid and
//! rescales into the same band. The output never reaches 0 or 1.

use serde::{Deserialize, Serialize};

use crate::config::CalibrationConfig;

/// Maximum shift applied by sensitivity (at 0 or 1)
const SENSITIVITY_SPAN: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityCalibrator {
    pub sensitivity: f64,
    pub floor: f64,
    pub ceiling: f64,
    pub beta: f64,
}

impl Default for ProbabilityCalibrator {
    fn default() -> Self {
        Self::from_config(&CalibrationConfig::default())
    }
}

impl ProbabilityCalibrator {
    pub fn from_config(config: &CalibrationConfig) -> Self {
        Self {
            sensitivity: config.sensitivity,
            floor: config.floor,
            ceiling: config.ceiling,
            beta: config.beta,
        }
    }

    /// Same band and steepness with a different sensitivity
    pub fn with_sensitivity(self, sensitivity: f64) -> Self {
        Self {
            sensitivity: sensitivity.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn calibrate(&self, p: f64) -> f64 {
        let adjusted = (p + (self.sensitivity - 0.5) * SENSITIVITY_SPAN).clamp(self.floor, self.ceiling);
        let smoothed = sigmoid(self.beta * (adjusted - 0.5));
        self.floor + (self.ceiling - self.floor) * smoothed
    }

    /// Output range `[calibrate(0), calibrate(1)]`
    pub fn range(&self) -> (f64, f64) {
        (self.calibrate(0.0), self.calibrate(1.0))
    }
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters() {
        let c = ProbabilityCalibrator::default();
        assert_eq!(c.sensitivity, 0.7);
        assert_eq!(c.floor, 0.15);
        assert_eq!(c.ceiling, 0.95);
        assert_eq!(c.beta, 2.0);
    }

    #[test]
    fn test_worked_value() {
        // p = 0.46: adjusted 0.50, sigmoid(0) = 0.5, 0.15 + 0.8 * 0.5
        let c = ProbabilityCalibrator::default();
        assert!((c.calibrate(0.46) - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_output_stays_in_band() {
        let c = ProbabilityCalibrator::default();
        let (lo, hi) = c.range();
        assert!(lo > c.floor && hi < c.ceiling);
        // clamp at the floor: sigmoid(2 * (0.15 - 0.5))
        let expected_lo = 0.15 + 0.8 * (1.0 / (1.0 + 0.7_f64.exp()));
        assert!((lo - expected_lo).abs() < 1e-12);
        for i in 0..=100 {
            let p = c.calibrate(i as f64 / 100.0);
            assert!(p >= lo - 1e-12 && p <= hi + 1e-12);
        }
    }

    #[test]
    fn test_monotone_in_probability_and_sensitivity() {
        let c = ProbabilityCalibrator::default();
        let mut prev = 0.0;
        for i in 0..=100 {
            let p = c.calibrate(i as f64 / 100.0);
            assert!(p >= prev);
            prev = p;
        }

        let cautious = c.with_sensitivity(0.2);
        let eager = c.with_sensitivity(0.9);
        assert!(eager.calibrate(0.4) > cautious.calibrate(0.4));
    }
}

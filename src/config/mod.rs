//! Engine configuration for Aegis
//!
//! Loads scoring and training parameters from `aegis.toml`. Every section is
//! optional; anything left out takes the built-in default.
//!
//! # Configuration Format
//!
//! ```toml
//! # aegis.toml
//! failure_mode = "closed"
//!
//! [calibration]
//! sensitivity = 0.8
//! floor = 0.15
//! ceiling = 0.95
//!
//! [thresholds]
//! high = 0.5
//! critical = 0.75
//!
//! [forest]
//! trees = 200
//! seed = 7
//!
//! [heuristics]
//! safe_domains = ["example.com"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::classifier::lexicon::{
    BRAND_KEYWORDS, OFFICIAL_SENDER_KEYWORDS, PUBLIC_WEBMAIL_DOMAINS, SAFE_SENDER_DOMAINS,
};


/// File name searched for in the working directory
pub const CONFIG_FILE_NAME: &str = "aegis.toml";

/// Environment variable overriding `calibration.sensitivity`
pub const ENV_SENSITIVITY: &str = "AEGIS_SENSITIVITY";

/// Environment variable overriding `failure_mode`
pub const ENV_FAILURE_MODE: &str = "AEGIS_FAILURE_MODE";

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// What `analyze` reports when scoring fails internally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// Score 0, Low risk
    #[default]
    Open,
    /// Score at the high threshold, High risk
    Closed,
}

impl std::fmt::Display for FailureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureMode::Open => write!(f, "open"),
            FailureMode::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for FailureMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(FailureMode::Open),
            "closed" => Ok(FailureMode::Closed),
            other => Err(ConfigError::Invalid(format!(
                "failure_mode must be \"open\" or \"closed\", got {other:?}"
            ))),
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub failure_mode: FailureMode,

    #[serde(default)]
    pub calibration: CalibrationConfig,

    #[serde(default)]
    pub thresholds: ThresholdsConfig,

    #[serde(default)]
    pub ensemble: EnsembleConfig,

    #[serde(default)]
    pub forest: ForestConfig,

    #[serde(default)]
    pub boosting: BoostingConfig,

    #[serde(default)]
    pub vectorizer: VectorizerConfig,

    #[serde(default)]
    pub heuristics: HeuristicsConfig,
}

/// Confidence-band calibration applied to the ensemble output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Higher values favor catching phishing over avoiding false positives
    pub sensitivity: f64,
    pub floor: f64,
    pub ceiling: f64,
    /// Sigmoid steepness
    pub beta: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.7,
            floor: 0.15,
            ceiling: 0.95,
            beta: 2.0,
        }
    }
}

/// Probability cut-offs for the risk levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    pub high: f64,
    pub critical: f64,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            high: 0.50,
            critical: 0.75,
        }
    }
}

/// Blend weights and calibration folds for the ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    pub boosted_weight: f64,
    pub forest_weight: f64,
    pub calibration_folds: usize,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            boosted_weight: 0.6,
            forest_weight: 0.4,
            calibration_folds: 3,
        }
    }
}

/// Bagged decision forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features tried per split. Defaults to sqrt of the dimension.
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            trees: 100,
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

/// Gradient-boosted trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingConfig {
    pub iterations: usize,
    pub max_depth: u32,
    pub learning_rate: f64,
    pub min_leaf_size: usize,
}

impl Default for BoostingConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            max_depth: 5,
            learning_rate: 0.1,
            min_leaf_size: 1,
        }
    }
}

/// TF-IDF vocabulary limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    pub max_features: usize,
    /// Longest n-gram kept (1 = unigrams only)
    pub max_ngram: usize,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 50,
            max_ngram: 2,
        }
    }
}

/// Sender-based overrides applied after calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicsConfig {
    pub enabled: bool,
    pub spoof_boost: f64,
    pub spoof_cap: f64,
    pub safe_relief: f64,
    pub relief_floor: f64,
    pub public_domains: Vec<String>,
    pub impersonation_keywords: Vec<String>,
    pub safe_domains: Vec<String>,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spoof_boost: 0.25,
            spoof_cap: 0.95,
            safe_relief: 0.30,
            relief_floor: 0.05,
            public_domains: to_owned(PUBLIC_WEBMAIL_DOMAINS),
            impersonation_keywords: BRAND_KEYWORDS
                .iter()
                .chain(OFFICIAL_SENDER_KEYWORDS)
                .map(|s| s.to_string())
                .collect(),
            safe_domains: to_owned(SAFE_SENDER_DOMAINS),
        }
    }
}

fn to_owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl EngineConfig {
    /// Parse a TOML document and validate it
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve configuration from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. Explicit path (errors if unreadable)
    /// 3. `./aegis.toml`
    /// 4. User config (`~/.config/aegis/config.toml`)
    /// 5. Defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => Self::load_implicit(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn load_implicit() -> Self {
        let candidates = [Some(PathBuf::from(CONFIG_FILE_NAME)), Self::user_config_path()];
        for path in candidates.into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            match Self::load(&path) {
                Ok(config) => return config,
                Err(e) => warn!("Ignoring {}: {}", path.display(), e),
            }
        }
        debug!("No config file found, using defaults");
        Self::default()
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("aegis").join("config.toml"))
    }

    /// Apply `AEGIS_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_SENSITIVITY) {
            self.calibration.sensitivity = raw.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{ENV_SENSITIVITY} must be a number, got {raw:?}"))
            })?;
        }
        if let Some(raw) = lookup(ENV_FAILURE_MODE) {
            self.failure_mode = raw.parse()?;
        }
        Ok(())
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        let cal = &self.calibration;
        if !(0.0..=1.0).contains(&cal.sensitivity) {
            return invalid(format!("calibration.sensitivity must be in [0, 1], got {}", cal.sensitivity));
        }
        if !(0.0..=1.0).contains(&cal.floor) || !(0.0..=1.0).contains(&cal.ceiling) || cal.floor >= cal.ceiling {
            return invalid(format!(
                "calibration needs 0 <= floor < ceiling <= 1, got floor={} ceiling={}",
                cal.floor, cal.ceiling
            ));
        }
        if !(cal.beta.is_finite() && cal.beta > 0.0) {
            return invalid(format!("calibration.beta must be positive, got {}", cal.beta));
        }

        let t = &self.thresholds;
        if !(t.high > 0.0 && t.high < t.critical && t.critical <= 1.0) {
            return invalid(format!(
                "thresholds need 0 < high < critical <= 1, got high={} critical={}",
                t.high, t.critical
            ));
        }

        let e = &self.ensemble;
        if e.boosted_weight < 0.0 || e.forest_weight < 0.0 || (e.boosted_weight + e.forest_weight - 1.0).abs() > 1e-6 {
            return invalid(format!(
                "ensemble weights must be non-negative and sum to 1, got boosted={} forest={}",
                e.boosted_weight, e.forest_weight
            ));
        }
        if e.calibration_folds < 2 {
            return invalid(format!("ensemble.calibration_folds must be >= 2, got {}", e.calibration_folds));
        }

        let f = &self.forest;
        if f.trees == 0 || f.max_depth == 0 {
            return invalid("forest.trees and forest.max_depth must be positive".into());
        }
        if f.min_samples_split < 2 || f.min_samples_leaf == 0 {
            return invalid("forest needs min_samples_split >= 2 and min_samples_leaf >= 1".into());
        }
        if f.max_features == Some(0) {
            return invalid("forest.max_features must be positive".into());
        }

        let b = &self.boosting;
        if b.iterations == 0 || b.max_depth == 0 {
            return invalid("boosting.iterations and boosting.max_depth must be positive".into());
        }
        if !(b.learning_rate > 0.0 && b.learning_rate <= 1.0) {
            return invalid(format!("boosting.learning_rate must be in (0, 1], got {}", b.learning_rate));
        }

        let v = &self.vectorizer;
        if v.max_features == 0 || !(1..=3).contains(&v.max_ngram) {
            return invalid(format!(
                "vectorizer needs max_features >= 1 and max_ngram in 1..=3, got {} and {}",
                v.max_features, v.max_ngram
            ));
        }

        let h = &self.heuristics;
        for (name, value) in [
            ("spoof_boost", h.spoof_boost),
            ("spoof_cap", h.spoof_cap),
            ("safe_relief", h.safe_relief),
            ("relief_floor", h.relief_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return invalid(format!("heuristics.{name} must be in [0, 1], got {value}"));
            }
        }

        Ok(())
    }
}

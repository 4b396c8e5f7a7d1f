//! Sender-based overrides applied after calibration
//!
//! Two mutually exclusive rules:
//! - a sender on the verified allow-list gets relief,
//! - otherwise a public-webmail sender using a brand or official-sounding
//!   name gets boosted.

use serde::{Deserialize, Serialize};

use super::features::sender_domain;
use super::lexicon::domain_in;
use crate::config::HeuristicsConfig;
use crate::models::Override;

/// Keywords this short must match a whole sender token ("irs" vs "first")
const SHORT_KEYWORD_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicOverrides {
    pub enabled: bool,
    pub spoof_boost: f64,
    pub spoof_cap: f64,
    pub safe_relief: f64,
    pub relief_floor: f64,
    public_domains: Vec<String>,
    impersonation_keywords: Vec<String>,
    safe_domains: Vec<String>,
}

impl Default for HeuristicOverrides {
    fn default() -> Self {
        Self::from_config(&HeuristicsConfig::default())
    }
}

impl HeuristicOverrides {
    pub fn from_config(config: &HeuristicsConfig) -> Self {
        let lower = |list: &[String]| -> Vec<String> {
            list.iter().map(|s| s.trim().to_lowercase()).collect()
        };
        Self {
            enabled: config.enabled,
            spoof_boost: config.spoof_boost,
            spoof_cap: config.spoof_cap,
            safe_relief: config.safe_relief,
            relief_floor: config.relief_floor,
            public_domains: lower(&config.public_domains),
            impersonation_keywords: lower(&config.impersonation_keywords),
            safe_domains: lower(&config.safe_domains),
        }
    }

    /// Rules turned off; `apply` is the identity
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Adjust a calibrated probability for the sender
    pub fn apply(&self, sender: &str, p: f64) -> (f64, Option<Override>) {
        if !self.enabled {
            return (p, None);
        }
        if self.is_verified_sender(sender) {
            return ((p - self.safe_relief).max(self.relief_floor), Some(Override::SafeDomainRelief));
        }
        if self.is_spoofed_sender(sender) {
            return ((p + self.spoof_boost).min(self.spoof_cap), Some(Override::SpoofBoost));
        }
        (p, None)
    }

    /// Sender address is on, or under, an allow-listed domain
    pub fn is_verified_sender(&self, sender: &str) -> bool {
        sender_domain(sender).is_some_and(|d| domain_in(&d, &self.safe_domains))
    }

    /// Public webmail domain combined with a brand or official-sounding name
    pub fn is_spoofed_sender(&self, sender: &str) -> bool {
        let Some(domain) = sender_domain(sender) else {
            return false;
        };
        if !domain_in(&domain, &self.public_domains) {
            return false;
        }
        self.impersonated_keyword(sender).is_some()
    }

    /// First impersonation keyword found in the sender string
    pub fn impersonated_keyword(&self, sender: &str) -> Option<&str> {
        let lower = sender.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        self.impersonation_keywords
            .iter()
            .find(|k| {
                if k.len() <= SHORT_KEYWORD_LEN {
                    tokens.contains(&k.as_str())
                } else {
                    lower.contains(k.as_str())
                }
            })
            .map(String::as_str)
    }
}

//! Feature extraction for phishing classification
//!
//! Maps a message to a fixed 20-dimensional vector of lexical, sender and
//! structural signals. Extraction is pure and never fails: empty fields
//! simply produce zero ratios and densities.

use regex::Regex;
use rustc_hash::FxHashMap;
use std::sync::OnceLock;

use super::lexicon::{
    domain_in, CLICK_PHRASES, CREDENTIAL_WORDS, FEAR_WORDS, FINANCIAL_WORDS, GENERIC_GREETINGS,
    OFFICIAL_SENDER_KEYWORDS, PUBLIC_WEBMAIL_DOMAINS, URGENCY_WORDS, URL_SHORTENERS,
};
use crate::models::Message;

/// Number of engineered features.
pub const NUM_ENGINEERED: usize = 20;

/// Human-readable names for each feature, in extraction order.
pub const FEATURE_NAMES: [&str; NUM_ENGINEERED] = [
    "urgency_ratio",
    "fear_ratio",
    "credential_ratio",
    "financial_ratio",
    "public_webmail_sender",
    "official_sender_name",
    "domain_typo_chars",
    "url_shortener",
    "click_phrase",
    "url_density",
    "all_caps_subject",
    "exclamation_density",
    "generic_greeting",
    "word_count",
    "char_count",
    "subject_word_count",
    "uppercase_ratio",
    "punctuation_density",
    "digit_density",
    "entropy",
];

/// Named index into an [`EngineeredFeatures`] vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    UrgencyRatio,
    FearRatio,
    CredentialRatio,
    FinancialRatio,
    PublicWebmailSender,
    OfficialSenderName,
    DomainTypoChars,
    UrlShortener,
    ClickPhrase,
    UrlDensity,
    AllCapsSubject,
    ExclamationDensity,
    GenericGreeting,
    WordCount,
    CharCount,
    SubjectWordCount,
    UppercaseRatio,
    PunctuationDensity,
    DigitDensity,
    Entropy,
}

impl Feature {
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        FEATURE_NAMES[self.index()]
    }
}

/// Engineered feature vector for a message
#[derive(Debug, Clone, PartialEq)]
pub struct EngineeredFeatures {
    pub values: [f64; NUM_ENGINEERED],
}

impl EngineeredFeatures {
    pub fn new(values: [f64; NUM_ENGINEERED]) -> Self {
        Self { values }
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// Extracts engineered features from messages
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    /// Urgency, fear, credential and financial vocabularies (ratio features 1-4)
    keyword_sets: [Vec<&'static str>; 4],
    public_domains: Vec<&'static str>,
    official_keywords: Vec<&'static str>,
    shorteners: Vec<&'static str>,
    click_phrases: Vec<&'static str>,
    greetings: Vec<&'static str>,
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self {
            keyword_sets: [
                URGENCY_WORDS.to_vec(),
                FEAR_WORDS.to_vec(),
                CREDENTIAL_WORDS.to_vec(),
                FINANCIAL_WORDS.to_vec(),
            ],
            public_domains: PUBLIC_WEBMAIL_DOMAINS.to_vec(),
            official_keywords: OFFICIAL_SENDER_KEYWORDS.to_vec(),
            shorteners: URL_SHORTENERS.to_vec(),
            click_phrases: CLICK_PHRASES.to_vec(),
            greetings: GENERIC_GREETINGS.to_vec(),
        }
    }

    /// Extract the feature vector for a message
    pub fn extract(&self, message: &Message) -> EngineeredFeatures {
        let raw = message.text();
        let text = raw.to_lowercase();
        let words: Vec<&str> = text.split_whitespace().collect();
        let char_count = text.chars().count();
        let identity = sender_identity(&message.sender);
        let domain = sender_domain(&message.sender).unwrap_or_default();

        let [urgency, fear, credential, financial] = &self.keyword_sets;

        EngineeredFeatures::new([
            // 1-4: language intensity
            keyword_ratio(&words, urgency),
            keyword_ratio(&words, fear),
            keyword_ratio(&words, credential),
            keyword_ratio(&words, financial),
            // 5-7: sender analysis
            flag(!domain.is_empty() && domain_in(&domain, &self.public_domains)),
            flag(self.official_keywords.iter().any(|k| identity.contains(k))),
            domain.chars().filter(|c| matches!(c, '-' | '0' | '1')).count() as f64,
            // 8-10: links
            flag(words.iter().any(|w| is_shortener_link(w, &self.shorteners))),
            flag(self.click_phrases.iter().any(|p| text.contains(p))),
            (url_count(&text) as f64 / 5.0).min(1.0),
            // 11-13: structure
            flag(is_shouting(&message.subject)),
            density(text.matches('!').count(), char_count),
            flag(self.greetings.iter().any(|g| text.contains(g))),
            // 14-16: size
            words.len() as f64,
            char_count as f64,
            message.subject.split_whitespace().count() as f64,
            // 17-20: character statistics
            density(raw.chars().filter(|c| c.is_uppercase()).count(), raw.chars().count()),
            density(text.chars().filter(|c| matches!(c, '!' | '?' | '.')).count(), char_count),
            density(text.chars().filter(|c| c.is_numeric()).count(), char_count),
            shannon_entropy(&text) / 10.0,
        ])
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn address_domain() -> &'static Regex {
    static DOMAIN: OnceLock<Regex> = OnceLock::new();
    DOMAIN.get_or_init(|| Regex::new(r"@([A-Za-z0-9.-]+)").expect("valid regex"))
}

/// Lowercased domain of the sender's address, if any.
///
/// Prefers the address inside `<...>` when a display name is present.
pub fn sender_domain(sender: &str) -> Option<String> {
    let re = address_domain();
    let address = sender.rfind('<').map_or(sender, |i| &sender[i..]);
    re.captures(address)
        .or_else(|| re.captures(sender))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches('.').to_lowercase())
        .filter(|d| !d.is_empty())
}

/// Lowercased display name and local part with every `@domain` removed
pub fn sender_identity(sender: &str) -> String {
    address_domain().replace_all(sender, "").to_lowercase()
}

/// Shannon entropy (bits) of the character distribution. 0 for empty text.
pub fn shannon_entropy(text: &str) -> f64 {
    let mut counts: FxHashMap<char, usize> = FxHashMap::default();
    let mut total = 0usize;
    for c in text.chars() {
        *counts.entry(c).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    counts
        .values()
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Share of words containing at least one keyword. Never exceeds 1.
fn keyword_ratio(words: &[&str], keywords: &[&str]) -> f64 {
    let hits = words
        .iter()
        .filter(|w| keywords.iter().any(|k| w.contains(k)))
        .count();
    hits as f64 / words.len().max(1) as f64
}

fn url_count(text: &str) -> usize {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| Regex::new(r"https?://").expect("valid regex"))
        .find_iter(text)
        .count()
}

/// A word whose host part is a known shortener, e.g. `bit.ly/x` or `(https://t.co/y)`.
fn is_shortener_link(word: &str, shorteners: &[&str]) -> bool {
    let trimmed = word
        .trim_start_matches(|c: char| matches!(c, '(' | '<' | '[' | '"' | '\''))
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | ')' | '>' | ']' | '"' | '\''));
    let host = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let host = host.strip_prefix("www.").unwrap_or(host);

    shorteners.iter().any(|s| {
        host.strip_prefix(s)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// Fully uppercase subject (at least one cased char) longer than 10 chars.
fn is_shouting(subject: &str) -> bool {
    let mut cased = false;
    for c in subject.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased && subject.chars().count() > 10
}

#[inline]
fn density(count: usize, len: usize) -> f64 {
    if len == 0 {
        0.0
    } else {
        count as f64 / len as f64
    }
}

#[inline]
fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(sender: &str, subject: &str, snippet: &str) -> EngineeredFeatures {
        FeatureExtractor::new().extract(&Message::new(sender, subject, snippet))
    }

    #[test]
    fn test_feature_extraction() {
        let f = extract(
            "PayPal Support <security@paypal-verify1.com>",
            "Urgent: Account Suspended",
            "Click here to verify your identity now!",
        );

        assert_eq!(f.values.len(), NUM_ENGINEERED);
        assert_eq!(FEATURE_NAMES.len(), NUM_ENGINEERED);
        assert_eq!(Feature::Entropy.name(), "entropy");

        // "urgent:" and "now!" out of 10 words
        assert!((f.get(Feature::UrgencyRatio) - 0.2).abs() < 1e-12);
        // "suspended"
        assert!((f.get(Feature::FearRatio) - 0.1).abs() < 1e-12);
        // "account", "verify", "identity"
        assert!((f.get(Feature::CredentialRatio) - 0.3).abs() < 1e-12);
        assert_eq!(f.get(Feature::FinancialRatio), 0.0);

        assert_eq!(f.get(Feature::PublicWebmailSender), 0.0);
        assert_eq!(f.get(Feature::OfficialSenderName), 1.0);
        // one '-' and one '1'
        assert_eq!(f.get(Feature::DomainTypoChars), 2.0);
        assert_eq!(f.get(Feature::ClickPhrase), 1.0);
        assert_eq!(f.get(Feature::WordCount), 10.0);
        assert_eq!(f.get(Feature::SubjectWordCount), 3.0);
        assert!(f.get(Feature::UppercaseRatio) > 0.0);
        assert!(f.get(Feature::ExclamationDensity) > 0.0);
    }

    #[test]
    fn test_empty_message_has_no_nan() {
        let f = extract("", "", "");
        for (name, v) in FEATURE_NAMES.iter().zip(f.values.iter()) {
            assert!(v.is_finite(), "{name} should be finite");
        }
        assert_eq!(f.get(Feature::Entropy), 0.0);
        assert_eq!(f.get(Feature::UrgencyRatio), 0.0);
        assert_eq!(f.get(Feature::WordCount), 0.0);
        assert_eq!(f.get(Feature::DigitDensity), 0.0);
    }

    #[test]
    fn test_public_webmail_sender() {
        let f = extract("security@gmail.com", "hi", "there");
        assert_eq!(f.get(Feature::PublicWebmailSender), 1.0);
        assert_eq!(f.get(Feature::OfficialSenderName), 1.0);

        let f = extract("friend@gmail.company.io", "hi", "there");
        assert_eq!(f.get(Feature::PublicWebmailSender), 0.0);
    }

    #[test]
    fn test_official_name_ignores_domain() {
        let f = extract("alice@servicenow.com", "Lunch", "See you");
        assert_eq!(f.get(Feature::OfficialSenderName), 0.0);
        let f = extract("noreply@apple-id-support.com", "Lunch", "See you");
        assert_eq!(f.get(Feature::OfficialSenderName), 0.0);

        let f = extract("Support <x@y.com>", "Lunch", "See you");
        assert_eq!(f.get(Feature::OfficialSenderName), 1.0);
        let f = extract("billing-team@y.com", "Lunch", "See you");
        assert_eq!(f.get(Feature::OfficialSenderName), 1.0);
    }

    #[test]
    fn test_sender_identity() {
        assert_eq!(sender_identity("Alice@ServiceNow.com"), "alice");
        assert_eq!(sender_identity("PayPal Support <security@paypal-verify.com>"), "paypal support <security>");
        assert_eq!(sender_identity("no address"), "no address");
    }

    #[test]
    fn test_sender_domain() {
        assert_eq!(sender_domain("a@Example.COM").as_deref(), Some("example.com"));
        assert_eq!(
            sender_domain("Stripe <receipts@stripe.com>").as_deref(),
            Some("stripe.com")
        );
        assert_eq!(sender_domain("no address here"), None);
        assert_eq!(sender_domain(""), None);
    }

    #[test]
    fn test_shortener_detection() {
        let f = extract("a@b.com", "hello", "see bit.ly/3xYz for details");
        assert_eq!(f.get(Feature::UrlShortener), 1.0);

        let f = extract("a@b.com", "hello", "(https://t.co/abc)");
        assert_eq!(f.get(Feature::UrlShortener), 1.0);

        // "microsoft.com" contains "t.co" but is not a shortener link
        let f = extract("a@b.com", "hello", "sign in at microsoft.com today");
        assert_eq!(f.get(Feature::UrlShortener), 0.0);
    }

    #[test]
    fn test_url_density_is_capped() {
        let f = extract("a@b.com", "links", "http://a.io https://b.io");
        assert!((f.get(Feature::UrlDensity) - 0.4).abs() < 1e-12);

        let many = "https://x.io ".repeat(8);
        let f = extract("a@b.com", "links", &many);
        assert_eq!(f.get(Feature::UrlDensity), 1.0);
    }

    #[test]
    fn test_all_caps_subject() {
        assert_eq!(extract("", "URGENT ACTION NEEDED", "").get(Feature::AllCapsSubject), 1.0);
        // too short
        assert_eq!(extract("", "URGENT", "").get(Feature::AllCapsSubject), 0.0);
        // no cased characters
        assert_eq!(extract("", "123 456 789 000", "").get(Feature::AllCapsSubject), 0.0);
        assert_eq!(extract("", "Urgent Action Needed", "").get(Feature::AllCapsSubject), 0.0);
    }

    #[test]
    fn test_entropy() {
        assert_eq!(shannon_entropy(""), 0.0);
        assert_eq!(shannon_entropy("aaaa"), 0.0);
        assert!((shannon_entropy("ab") - 1.0).abs() < 1e-12);
        assert!((shannon_entropy("abcd") - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_adding_keyword_never_lowers_ratio() {
        let snippets = [
            "",
            "hello there",
            "urgent urgent",
            "please reset your password now",
            "a b c d e f g h urgent",
        ];
        for snippet in snippets {
            let base = extract("x@y.com", "Notice", snippet);

            let more_urgent = extract("x@y.com", "Notice", &format!("{snippet} urgent"));
            assert!(
                more_urgent.get(Feature::UrgencyRatio) >= base.get(Feature::UrgencyRatio),
                "urgency ratio dropped for {snippet:?}"
            );

            let more_credential = extract("x@y.com", "Notice", &format!("{snippet} password"));
            assert!(
                more_credential.get(Feature::CredentialRatio) >= base.get(Feature::CredentialRatio),
                "credential ratio dropped for {snippet:?}"
            );
        }
    }
}

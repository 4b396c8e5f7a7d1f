//! TF-IDF text vectorizer
//!
//! Fit once on the training texts: keeps the most frequent unigrams and
//! bigrams (stop words removed) and their smoothed inverse document
//! frequencies. `transform` maps any text onto that fixed vocabulary.

use regex::Regex;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::lexicon::STOP_WORDS;
use crate::config::VectorizerConfig;

/// Fitted TF-IDF vocabulary
#[derive(Clone)]
pub struct TfidfVectorizer {
    /// Terms in column order (alphabetical)
    terms: Vec<String>,
    index: FxHashMap<String, usize>,
    idf: Vec<f64>,
    max_ngram: usize,
    documents: usize,
}

impl std::fmt::Debug for TfidfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfidfVectorizer")
            .field("vocabulary_size", &self.terms.len())
            .field("max_ngram", &self.max_ngram)
            .field("documents", &self.documents)
            .finish()
    }
}

impl TfidfVectorizer {
    /// Build the vocabulary from training documents
    pub fn fit(documents: &[String], config: &VectorizerConfig) -> Self {
        let max_ngram = config.max_ngram.max(1);

        // term -> (total count, document frequency)
        let mut stats: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        for doc in documents {
            let mut counts: BTreeMap<String, usize> = BTreeMap::new();
            for term in analyze(doc, max_ngram) {
                *counts.entry(term).or_insert(0) += 1;
            }
            for (term, count) in counts {
                let entry = stats.entry(term).or_insert((0, 0));
                entry.0 += count;
                entry.1 += 1;
            }
        }

        // Most frequent first, ties broken alphabetically
        let mut ranked: Vec<(String, usize, usize)> = stats
            .into_iter()
            .map(|(term, (total, df))| (term, total, df))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(config.max_features);
        ranked.sort_by(|a, b| a.0.cmp(&b.0));

        let n = documents.len() as f64;
        let idf = ranked
            .iter()
            .map(|(_, _, df)| ((1.0 + n) / (1.0 + *df as f64)).ln() + 1.0)
            .collect();
        let terms: Vec<String> = ranked.into_iter().map(|(term, _, _)| term).collect();
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        Self {
            terms,
            index,
            idf,
            max_ngram,
            documents: documents.len(),
        }
    }

    /// L2-normalized TF-IDF vector for `text`. Unknown terms are ignored.
    pub fn transform(&self, text: &str) -> Vec<f64> {
        let mut vector = vec![0.0; self.terms.len()];
        for term in analyze(text, self.max_ngram) {
            if let Some(&i) = self.index.get(&term) {
                vector[i] += 1.0;
            }
        }
        for (v, idf) in vector.iter_mut().zip(&self.idf) {
            *v *= idf;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }

    /// Output dimension (vocabulary size)
    pub fn dimension(&self) -> usize {
        self.terms.len()
    }

    /// Vocabulary terms in column order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Inverse document frequency of a term, if it is in the vocabulary
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.index.get(term).map(|&i| self.idf[i])
    }
}

/// Lowercase word tokens of two or more characters, stop words removed
fn tokenize(text: &str) -> Vec<String> {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    let re = TOKEN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("valid regex"));
    let lower = text.to_lowercase();
    re.find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|t| STOP_WORDS.binary_search(t).is_err())
        .map(str::to_string)
        .collect()
}

/// Tokens followed by every n-gram up to `max_ngram`, joined by a space
fn analyze(text: &str, max_ngram: usize) -> Vec<String> {
    let tokens = tokenize(text);
    let mut terms = tokens.clone();
    for n in 2..=max_ngram {
        terms.extend(tokens.windows(n).map(|w| w.join(" ")));
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tokenize_drops_stop_words_and_short_tokens() {
        assert_eq!(
            tokenize("Verify YOUR account at a bank!"),
            vec!["verify", "account", "bank"]
        );
    }

    #[test]
    fn test_bigrams_skip_removed_stop_words() {
        let terms = analyze("verify your account", 2);
        assert!(terms.contains(&"verify account".to_string()));
        assert!(!terms.iter().any(|t| t.contains("your")));
    }

    #[test]
    fn test_vocabulary_is_capped_and_sorted() {
        let corpus = docs(&[
            "urgent verify account now",
            "your package has shipped",
            "verify account immediately urgent",
            "meeting reminder team sync",
        ]);
        let config = VectorizerConfig {
            max_features: 5,
            max_ngram: 2,
        };
        let v = TfidfVectorizer::fit(&corpus, &config);
        assert_eq!(v.dimension(), 5);

        let mut sorted = v.terms().to_vec();
        sorted.sort();
        assert_eq!(sorted, v.terms());

        // terms seen twice always make the cut
        for term in ["account", "urgent", "verify", "verify account"] {
            assert!(v.terms().iter().any(|t| t == term), "missing {term}");
        }
    }

    #[test]
    fn test_transform_is_normalized_and_ignores_unknown_terms() {
        let corpus = docs(&["verify account", "package shipped", "verify identity"]);
        let v = TfidfVectorizer::fit(&corpus, &VectorizerConfig::default());

        let x = v.transform("Please verify your account");
        assert_eq!(x.len(), v.dimension());
        let norm: f64 = x.iter().map(|a| a * a).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);

        let unknown = v.transform("completely different words");
        assert!(unknown.iter().all(|&a| a == 0.0));
    }

    #[test]
    fn test_rare_terms_weigh_more() {
        let corpus = docs(&["verify account", "verify identity", "verify package"]);
        let v = TfidfVectorizer::fit(&corpus, &VectorizerConfig::default());
        let common = v.idf("verify").unwrap();
        let rare = v.idf("identity").unwrap();
        assert!(rare > common);
        assert!((common - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_corpus_has_no_dimensions() {
        let v = TfidfVectorizer::fit(&[], &VectorizerConfig::default());
        assert_eq!(v.dimension(), 0);
        assert!(v.transform("anything at all").is_empty());
    }
}

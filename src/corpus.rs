//! Labelled training corpora
//!
//! The 28-message reference corpus ships inside the binary. Other corpora
//! load from `.json` (an array, or `{ "examples": [...] }`) or `.jsonl`
//! (one example per line).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::TrainingExample;

const REFERENCE_CORPUS: &str = include_str!("../data/reference_corpus.json");

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read corpus {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid corpus JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid corpus entry on line {line}: {source}")]
    JsonLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported corpus format for {0} (expected .json or .jsonl)")]
    UnsupportedFormat(PathBuf),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusDocument {
    List(Vec<TrainingExample>),
    Wrapped { examples: Vec<TrainingExample> },
}

/// Examples per class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCounts {
    pub phishing: usize,
    pub legitimate: usize,
}

impl ClassCounts {
    pub fn total(&self) -> usize {
        self.phishing + self.legitimate
    }

    /// Both classes present
    pub fn has_both_classes(&self) -> bool {
        self.phishing > 0 && self.legitimate > 0
    }
}

/// An ordered set of labelled messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    examples: Vec<TrainingExample>,
}

impl Corpus {
    pub fn new(examples: Vec<TrainingExample>) -> Self {
        Self { examples }
    }

    /// The embedded reference corpus (14 phishing, 14 legitimate)
    pub fn reference() -> Result<Self, CorpusError> {
        Self::from_json_str(REFERENCE_CORPUS)
    }

    pub fn from_json_str(content: &str) -> Result<Self, CorpusError> {
        let examples = match serde_json::from_str(content)? {
            CorpusDocument::List(examples) => examples,
            CorpusDocument::Wrapped { examples } => examples,
        };
        Ok(Self { examples })
    }

    /// One example per line; blank lines are skipped
    pub fn from_jsonl_str(content: &str) -> Result<Self, CorpusError> {
        let examples = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).map_err(|source| CorpusError::JsonLine { line: i + 1, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { examples })
    }

    /// Load by file extension
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let read = || {
            std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
                path: path.to_path_buf(),
                source,
            })
        };
        match ext.as_deref() {
            Some("json") => Self::from_json_str(&read()?),
            Some("jsonl") | Some("ndjson") => Self::from_jsonl_str(&read()?),
            _ => Err(CorpusError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn examples(&self) -> &[TrainingExample] {
        &self.examples
    }

    pub fn labels(&self) -> Vec<bool> {
        self.examples.iter().map(|e| e.phishing).collect()
    }

    pub fn class_counts(&self) -> ClassCounts {
        let phishing = self.examples.iter().filter(|e| e.phishing).count();
        ClassCounts {
            phishing,
            legitimate: self.examples.len() - phishing,
        }
    }

    /// SHA-256 over every field of every example, in order (hex)
    pub fn fingerprint(&self) -> String {
        let mut h = Sha256::new();
        for ex in &self.examples {
            for field in [&ex.message.sender, &ex.message.subject, &ex.message.snippet] {
                h.update((field.len() as u64).to_le_bytes());
                h.update(field.as_bytes());
            }
            h.update([u8::from(ex.phishing)]);
        }
        format!("{:x}", h.finalize())
    }

    /// Examples at `indices`, in that order. Out-of-range indices are skipped.
    pub fn subset(&self, indices: &[usize]) -> Self {
        indices
            .iter()
            .filter_map(|&i| self.examples.get(i).cloned())
            .collect()
    }
}

impl FromIterator<TrainingExample> for Corpus {
    fn from_iter<I: IntoIterator<Item = TrainingExample>>(iter: I) -> Self {
        Self {
            examples: iter.into_iter().collect(),
        }
    }
}

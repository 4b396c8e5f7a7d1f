//! Shared model handle with atomic hot-swap
//!
//! Readers take an `Arc` snapshot and score without holding the lock.
//! A retrain builds the replacement off to the side and swaps it in, so
//! in-flight analyses finish on the model they started with.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

use super::train::train_with_config;
use super::{analyze, FittedModel, TrainError};
use crate::config::EngineConfig;
use crate::corpus::Corpus;
use crate::models::AnalysisResult;

#[derive(Debug)]
pub struct ModelHandle {
    current: RwLock<Arc<FittedModel>>,
}

impl ModelHandle {
    pub fn new(model: FittedModel) -> Self {
        Self {
            current: RwLock::new(Arc::new(model)),
        }
    }

    /// Snapshot of the active model
    pub fn current(&self) -> Arc<FittedModel> {
        Arc::clone(&self.current.read())
    }

    /// Install `model`, returning the one it replaced
    pub fn replace(&self, model: FittedModel) -> Arc<FittedModel> {
        let next = Arc::new(model);
        std::mem::replace(&mut *self.current.write(), next)
    }

    /// Train on `corpus` and swap the result in. On error the active model is kept.
    pub fn retrain(&self, corpus: &Corpus, config: &EngineConfig) -> Result<Arc<FittedModel>, TrainError> {
        let model = train_with_config(corpus, config)?;
        info!(
            "Swapping in retrained model (corpus {})",
            &model.info().corpus_fingerprint[..12]
        );
        let next = Arc::new(model);
        *self.current.write() = Arc::clone(&next);
        Ok(next)
    }

    /// Score against the active model
    pub fn analyze(&self, sender: &str, subject: &str, snippet: &str) -> AnalysisResult {
        let model = self.current();
        analyze(&model, sender, subject, snippet)
    }
}

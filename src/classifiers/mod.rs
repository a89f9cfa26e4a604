//! App category classifiers.
//!
//! - `RuleEngine`: keyword-overlap scorer over a fixed category table
//! - `NaiveBayesClassifier`: multinomial Naive Bayes trained on `TrainingCorpus`
//! - `LinearModelClassifier`: optional pre-trained linear model loaded from disk
//! - `HybridClassifier`: priority chain merging the three by confidence
//!
//! Every classifier exposes the same [`Classifier`] capability so the hybrid
//! can treat the external tier like the built-in ones.

pub mod corpus;
pub mod hybrid;
pub mod linear;
pub mod naive_bayes;
pub mod rule_engine;
pub mod vectorizer;

use thiserror::Error;

use crate::generic_types::ClassificationResult;

pub use corpus::TrainingCorpus;
pub use hybrid::{HybridClassifier, HybridThresholds};
pub use linear::LinearModelClassifier;
pub use naive_bayes::{NaiveBayesClassifier, NaiveBayesModel};
pub use rule_engine::RuleEngine;
pub use vectorizer::{Tokenizer, Vocabulary};

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Unknown label: {0}")]
    UnknownLabel(String),
}

/// Uniform classifier capability.
pub trait Classifier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// `Ok(None)` means the classifier has no opinion for this input.
    fn classify(&self, app_name: &str, package_id: &str) -> Result<Option<ClassificationResult>, ClassifierError>;
}

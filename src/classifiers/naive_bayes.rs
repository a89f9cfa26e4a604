use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::Path;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::classifiers::vectorizer::{SparseCounts, Vocabulary};
use crate::classifiers::{Classifier, ClassifierError};
use crate::generic_types::{Category, ClassificationResult};

pub const DEFAULT_MAX_VOCAB_SIZE: usize = 3000;

#[derive(Error, Debug)]
pub enum NaiveBayesError {
    #[error("Failed to save the model: {0}")]
    SaveError(io::Error),

    #[error("Failed to load the model: {0}")]
    LoadError(io::Error),

    #[error("Failed to serialize or deserialize the model: {0}")]
    SerializationError(serde_json::Error),

    #[error("Invalid input: {0}")]
    InputError(String),
}

/// Smoothed `ln P(token | category)` table for one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryLikelihood {
    token_log_prob: HashMap<usize, f64>,
    /// Used for any index the category never saw.
    unseen: f64,
}

impl CategoryLikelihood {
    pub fn log_prob(&self, idx: usize) -> f64 {
        self.token_log_prob.get(&idx).copied().unwrap_or(self.unseen)
    }

    pub fn unseen(&self) -> f64 {
        self.unseen
    }
}

/// Fitted multinomial Naive Bayes tables. Read-only after `fit`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesModel {
    vocab: Vocabulary,
    log_prior: BTreeMap<Category, f64>,
    log_likelihood: BTreeMap<Category, CategoryLikelihood>,
    vocab_size: usize,
}

impl NaiveBayesModel {
    /// Fit with Laplace (add-one) smoothing. An empty corpus gives an untrained model.
    pub fn fit(corpus: &[(String, Category)], max_vocab_size: usize) -> Self {
        if corpus.is_empty() {
            return Self::default();
        }

        let vocab = Vocabulary::fit(corpus, max_vocab_size);
        let vocab_size = vocab.len();
        let total_docs = corpus.len() as f64;

        let mut doc_counts: BTreeMap<Category, usize> = BTreeMap::new();
        let mut token_counts: BTreeMap<Category, HashMap<usize, u64>> = BTreeMap::new();
        let mut category_totals: BTreeMap<Category, u64> = BTreeMap::new();

        for (text, label) in corpus {
            *doc_counts.entry(*label).or_insert(0) += 1;
            let counts = token_counts.entry(*label).or_default();
            let total = category_totals.entry(*label).or_insert(0);
            for (idx, count) in vocab.transform(text) {
                *counts.entry(idx).or_insert(0) += count as u64;
                *total += count as u64;
            }
        }

        let mut log_prior = BTreeMap::new();
        let mut log_likelihood = BTreeMap::new();
        for (category, docs) in doc_counts {
            log_prior.insert(category, (docs as f64 / total_docs).ln());

            let denominator = (category_totals.get(&category).copied().unwrap_or(0) + vocab_size as u64) as f64;
            let token_log_prob = token_counts
                .remove(&category)
                .unwrap_or_default()
                .into_iter()
                .map(|(idx, count)| (idx, ((count + 1) as f64 / denominator).ln()))
                .collect();
            log_likelihood.insert(
                category,
                CategoryLikelihood { token_log_prob, unseen: (1.0 / denominator).ln() },
            );
        }

        Self { vocab, log_prior, log_likelihood, vocab_size }
    }

    pub fn is_trained(&self) -> bool {
        !self.log_prior.is_empty()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.log_prior.keys().copied()
    }

    pub fn likelihood(&self, category: Category) -> Option<&CategoryLikelihood> {
        self.log_likelihood.get(&category)
    }

    /// Unnormalized `ln P(c) + Σ count·ln P(token|c)` per category.
    pub fn log_scores(&self, features: &SparseCounts) -> BTreeMap<Category, f64> {
        let mut scores = BTreeMap::new();
        for (&category, &prior) in &self.log_prior {
            let Some(ll) = self.log_likelihood.get(&category) else { continue };
            let score = features
                .iter()
                .fold(prior, |acc, (&idx, &count)| acc + count as f64 * ll.log_prob(idx));
            scores.insert(category, score);
        }
        scores
    }

    /// Arg-max category with its softmax probability.
    ///
    /// Text with no vocabulary hits carries no signal and yields the sentinel.
    pub fn predict(&self, app_name: &str, package_id: &str) -> ClassificationResult {
        let features = self.vocab.transform(&format!("{} {}", app_name, package_id));
        if features.is_empty() {
            return ClassificationResult::unclassified();
        }
        let scores = self.log_scores(&features);
        if scores.is_empty() {
            return ClassificationResult::unclassified();
        }

        let max_score = scores.values().copied().fold(f64::NEG_INFINITY, f64::max);
        let sum_exp: f64 = scores.values().map(|s| (s - max_score).exp()).sum();

        let mut best: Option<(Category, f64)> = None;
        for (category, score) in scores {
            let p = (score - max_score).exp() / sum_exp;
            if best.map_or(true, |(_, b)| p > b) {
                best = Some((category, p));
            }
        }

        match best {
            Some((category, p)) => ClassificationResult::new(category, p as f32),
            None => ClassificationResult::unclassified(),
        }
    }
}

/// Naive Bayes classifier owning a compute-once model.
///
/// The model is trained at most once per instance unless `train` is called
/// explicitly. Concurrent first callers of `ensure_trained` block until the
/// single training pass finishes.
#[derive(Debug)]
pub struct NaiveBayesClassifier {
    model: OnceCell<NaiveBayesModel>,
    max_vocab_size: usize,
}

impl Default for NaiveBayesClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl NaiveBayesClassifier {
    pub fn new() -> Self {
        Self::with_max_vocab_size(DEFAULT_MAX_VOCAB_SIZE)
    }

    pub fn with_max_vocab_size(max_vocab_size: usize) -> Self {
        NaiveBayesClassifier { model: OnceCell::new(), max_vocab_size }
    }

    /// Retrain from scratch, replacing any existing model.
    pub fn train(&mut self, corpus: &[(String, Category)]) {
        let model = Self::fit_logged(corpus, self.max_vocab_size);
        self.model = OnceCell::with_value(model);
    }

    /// Train on `corpus()` if no model exists yet; otherwise reuse it.
    pub fn ensure_trained<F>(&self, corpus: F) -> &NaiveBayesModel
    where
        F: FnOnce() -> Vec<(String, Category)>,
    {
        self.model
            .get_or_init(|| Self::fit_logged(&corpus(), self.max_vocab_size))
    }

    pub fn is_trained(&self) -> bool {
        self.model.get().map_or(false, NaiveBayesModel::is_trained)
    }

    pub fn model(&self) -> Option<&NaiveBayesModel> {
        self.model.get()
    }

    /// Sentinel when no model has been trained yet.
    pub fn predict(&self, app_name: &str, package_id: &str) -> ClassificationResult {
        match self.model.get() {
            Some(model) => model.predict(app_name, package_id),
            None => ClassificationResult::unclassified(),
        }
    }

    /// Save the model to a JSON file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), NaiveBayesError> {
        let model = self
            .model
            .get()
            .ok_or_else(|| NaiveBayesError::InputError("model is not trained".to_string()))?;
        let serialized = serde_json::to_string(model).map_err(NaiveBayesError::SerializationError)?;
        std::fs::write(path, serialized).map_err(NaiveBayesError::SaveError)?;
        Ok(())
    }

    /// Load a model saved by `save_to_file`. The result counts as trained.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, NaiveBayesError> {
        let serialized = std::fs::read_to_string(path).map_err(NaiveBayesError::LoadError)?;
        let model: NaiveBayesModel =
            serde_json::from_str(&serialized).map_err(NaiveBayesError::SerializationError)?;
        Ok(NaiveBayesClassifier {
            max_vocab_size: DEFAULT_MAX_VOCAB_SIZE,
            model: OnceCell::with_value(model),
        })
    }

    fn fit_logged(corpus: &[(String, Category)], max_vocab_size: usize) -> NaiveBayesModel {
        let model = NaiveBayesModel::fit(corpus, max_vocab_size);
        info!(
            samples = corpus.len(),
            vocab_size = model.vocab_size(),
            "NaiveBayes trained"
        );
        model
    }
}

impl Classifier for NaiveBayesClassifier {
    fn name(&self) -> &str {
        "naive_bayes"
    }

    fn classify(&self, app_name: &str, package_id: &str) -> Result<Option<ClassificationResult>, ClassifierError> {
        Ok(self.model().map(|m| m.predict(app_name, package_id)))
    }
}

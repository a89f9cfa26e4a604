//! Optional pre-trained linear model used as the external classifier tier.
//!
//! Artifacts:
//! - `vocab.json`: token array (index = position) or `{token: index}` object
//! - `labels.txt`: one category per line, row order of the weight matrix
//! - `weights.npy`: `f32` matrix of shape `(num_labels, vocab_width)`

use std::io;
use std::path::Path;

use ndarray::{Array1, Array2};
use ndarray_npy::{read_npy, ReadNpyError};
use thiserror::Error;
use tracing::warn;

use crate::classifiers::vectorizer::Vocabulary;
use crate::classifiers::{Classifier, ClassifierError};
use crate::config::ExternalModelConfig;
use crate::generic_types::{Category, ClassificationResult};

#[derive(Error, Debug)]
pub enum ExternalModelError {
    #[error("Failed to load vocabulary: {0}")]
    Vocab(anyhow::Error),

    #[error("Failed to load labels: {0}")]
    Labels(io::Error),

    #[error("Failed to load weights: {0}")]
    Weights(#[from] ReadNpyError),

    #[error("Unknown label: {0}")]
    UnknownLabel(String),

    #[error("Shape mismatch: {0}")]
    Shape(String),
}

pub struct Labels {
    pub vec: Vec<String>,
}

impl Labels {
    /// One label per line; blank lines skipped, whitespace trimmed.
    pub fn load_from_txt<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let vec = s
            .lines()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect();
        Ok(Labels { vec })
    }

    pub fn to_categories(&self) -> Result<Vec<Category>, ExternalModelError> {
        self.vec
            .iter()
            .map(|l| Category::from_str(l).ok_or_else(|| ExternalModelError::UnknownLabel(l.clone())))
            .collect()
    }
}

pub struct LinearModelClassifier {
    vocab: Vocabulary,
    labels: Vec<Category>,
    // shape: (num_labels, vocab_width)
    w: Array2<f32>,
}

impl std::fmt::Debug for LinearModelClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinearModelClassifier")
            .field("vocab_size", &self.vocab.len())
            .field("labels", &self.labels)
            .field("shape", &self.w.shape())
            .finish()
    }
}

impl LinearModelClassifier {
    pub fn from_parts(vocab: Vocabulary, labels: Vec<Category>, w: Array2<f32>) -> Result<Self, ExternalModelError> {
        let (rows, cols) = w.dim();
        if rows != labels.len() {
            return Err(ExternalModelError::Shape(format!(
                "{} weight rows for {} labels",
                rows,
                labels.len()
            )));
        }
        if cols < vocab.width() {
            return Err(ExternalModelError::Shape(format!(
                "{} weight columns for vocabulary width {}",
                cols,
                vocab.width()
            )));
        }
        Ok(Self { vocab, labels, w })
    }

    pub fn load<P: AsRef<Path>>(vocab_path: P, labels_path: P, weights_path: P) -> Result<Self, ExternalModelError> {
        let vocab = Vocabulary::load_from_json(vocab_path).map_err(ExternalModelError::Vocab)?;
        let labels = Labels::load_from_txt(labels_path)
            .map_err(ExternalModelError::Labels)?
            .to_categories()?;
        let w: Array2<f32> = read_npy(weights_path)?;
        Self::from_parts(vocab, labels, w)
    }

    /// Best-effort load from config; failures are logged and yield `None`.
    pub fn try_load(config: &ExternalModelConfig) -> Option<Self> {
        match Self::load(&config.vocab_path, &config.labels_path, &config.weights_path) {
            Ok(model) => Some(model),
            Err(e) => {
                warn!("External model unavailable: {}", e);
                None
            }
        }
    }

    /// Dense bag-of-words row for the feature text.
    fn features(&self, text: &str) -> Array1<f32> {
        let mut x = Array1::<f32>::zeros(self.w.ncols());
        for (idx, count) in self.vocab.transform(text) {
            if idx < x.len() {
                x[idx] += count as f32;
            }
        }
        x
    }
}

impl Classifier for LinearModelClassifier {
    fn name(&self) -> &str {
        "linear_model"
    }

    fn classify(&self, app_name: &str, package_id: &str) -> Result<Option<ClassificationResult>, ClassifierError> {
        let x = self.features(&format!("{} {}", app_name, package_id));
        if x.iter().all(|v| *v == 0.0) {
            return Ok(None);
        }

        let scores = self.w.dot(&x);
        let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        if !max.is_finite() {
            return Err(ClassifierError::Inference("non-finite score".to_string()));
        }
        let exp = scores.mapv(|s| (s - max).exp());
        let sum = exp.sum();

        let mut best_idx = 0usize;
        let mut best_val = f32::NEG_INFINITY;
        for (j, v) in exp.iter().enumerate() {
            if *v > best_val {
                best_val = *v;
                best_idx = j;
            }
        }

        let category = self
            .labels
            .get(best_idx)
            .copied()
            .ok_or_else(|| ClassifierError::UnknownLabel(format!("row {}", best_idx)))?;
        Ok(Some(ClassificationResult::new(category, best_val / sum)))
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use ndarray_npy::write_npy;

    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::new_from_iter(["spotify", "ludo", "music"].map(String::from))
    }

    fn model() -> LinearModelClassifier {
        let w = array![[4.0f32, 0.0, 3.0], [0.0, 4.0, 0.0]];
        LinearModelClassifier::from_parts(vocab(), vec![Category::Music, Category::Games], w).unwrap()
    }

    #[test]
    fn picks_highest_scoring_label() {
        let m = model();
        let r = m.classify("Spotify", "com.spotify.music").unwrap().unwrap();
        assert_eq!(r.category, Category::Music);
        assert!(r.confidence > 0.99);

        let r = m.classify("Ludo", "com.ludo").unwrap().unwrap();
        assert_eq!(r.category, Category::Games);
    }

    #[test]
    fn no_known_tokens_means_no_opinion() {
        assert!(model().classify("Calculator", "com.calc").unwrap().is_none());
        assert!(model().classify("", "").unwrap().is_none());
    }

    #[test]
    fn rejects_mismatched_shapes() {
        let w = array![[1.0f32, 0.0, 0.0]];
        let err = LinearModelClassifier::from_parts(vocab(), vec![Category::Music, Category::Games], w);
        assert!(matches!(err, Err(ExternalModelError::Shape(_))));

        let w = array![[1.0f32], [0.0]];
        let err = LinearModelClassifier::from_parts(vocab(), vec![Category::Music, Category::Games], w);
        assert!(matches!(err, Err(ExternalModelError::Shape(_))));
    }

    #[test]
    fn loads_artifacts_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let vocab_path = dir.path().join("vocab.json");
        let labels_path = dir.path().join("labels.txt");
        let weights_path = dir.path().join("weights.npy");
        std::fs::write(&vocab_path, r#"["spotify","ludo","music"]"#).unwrap();
        std::fs::write(&labels_path, "Music\n\n  Games \n").unwrap();
        write_npy(&weights_path, &array![[4.0f32, 0.0, 3.0], [0.0, 4.0, 0.0]]).unwrap();

        let m = LinearModelClassifier::load(&vocab_path, &labels_path, &weights_path).unwrap();
        let r = m.classify("Ludo King", "com.ludo.king").unwrap().unwrap();
        assert_eq!(r.category, Category::Games);
    }

    #[test]
    fn unknown_label_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let labels_path = dir.path().join("labels.txt");
        std::fs::write(&labels_path, "Music\nWeather\n").unwrap();
        let labels = Labels::load_from_txt(&labels_path).unwrap();
        assert_eq!(labels.vec, vec!["Music".to_string(), "Weather".to_string()]);
        assert!(matches!(labels.to_categories(), Err(ExternalModelError::UnknownLabel(l)) if l == "Weather"));
    }

    #[test]
    fn try_load_missing_files_is_none() {
        let config = ExternalModelConfig {
            vocab_path: "/nonexistent/vocab.json".into(),
            labels_path: "/nonexistent/labels.txt".into(),
            weights_path: "/nonexistent/weights.npy".into(),
        };
        assert!(LinearModelClassifier::try_load(&config).is_none());
    }
}

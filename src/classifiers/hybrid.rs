//! Priority chain: external model, then Naive Bayes merged with the rule engine.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::classifiers::corpus::TrainingCorpus;
use crate::classifiers::linear::LinearModelClassifier;
use crate::classifiers::naive_bayes::NaiveBayesClassifier;
use crate::classifiers::rule_engine::{RuleEngine, RULE_THRESHOLD};
use crate::classifiers::{Classifier, ClassifierError};
use crate::config::{EngineConfig, ExternalModelConfig};
use crate::generic_types::{Category, ClassificationResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridThresholds {
    /// External results at or above this win outright.
    pub external: f32,
    pub naive_bayes: f32,
    pub rule: f32,
    /// Share of the Naive Bayes confidence when both classifiers agree.
    pub agreement_nb_weight: f32,
}

impl Default for HybridThresholds {
    fn default() -> Self {
        Self {
            external: 0.40,
            naive_bayes: 0.20,
            rule: RULE_THRESHOLD,
            agreement_nb_weight: 0.6,
        }
    }
}

impl From<&EngineConfig> for HybridThresholds {
    fn from(config: &EngineConfig) -> Self {
        Self {
            external: config.external_threshold,
            naive_bayes: config.nb_threshold,
            rule: config.rule_threshold,
            agreement_nb_weight: config.agreement_nb_weight.clamp(0.0, 1.0),
        }
    }
}

pub struct HybridClassifier {
    external: Option<Box<dyn Classifier>>,
    naive_bayes: NaiveBayesClassifier,
    rule_engine: RuleEngine,
    thresholds: HybridThresholds,
}

impl Default for HybridClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl HybridClassifier {
    pub fn new() -> Self {
        Self {
            external: None,
            naive_bayes: NaiveBayesClassifier::new(),
            rule_engine: RuleEngine::new(),
            thresholds: HybridThresholds::default(),
        }
    }

    /// Build from config. A configured model that fails to load is skipped.
    pub fn from_config(engine: &EngineConfig, external: Option<&ExternalModelConfig>) -> Self {
        let naive_bayes = match &engine.model_path {
            Some(path) => NaiveBayesClassifier::load_from_file(path).unwrap_or_else(|e| {
                warn!("Saved model {} unusable, training from corpus: {}", path.display(), e);
                NaiveBayesClassifier::with_max_vocab_size(engine.max_vocab_size)
            }),
            None => NaiveBayesClassifier::with_max_vocab_size(engine.max_vocab_size),
        };
        let mut hybrid = Self::new()
            .with_naive_bayes(naive_bayes)
            .with_rule_engine(RuleEngine::with_threshold(engine.rule_threshold))
            .with_thresholds(HybridThresholds::from(engine));
        if let Some(model) = external.and_then(LinearModelClassifier::try_load) {
            hybrid = hybrid.with_external(Box::new(model));
        }
        hybrid
    }

    pub fn with_external(mut self, external: Box<dyn Classifier>) -> Self {
        self.external = Some(external);
        self
    }

    /// Replace the Naive Bayes tier, e.g. with a model loaded from disk.
    pub fn with_naive_bayes(mut self, naive_bayes: NaiveBayesClassifier) -> Self {
        self.naive_bayes = naive_bayes;
        self
    }

    pub fn with_rule_engine(mut self, rule_engine: RuleEngine) -> Self {
        self.rule_engine = rule_engine;
        self
    }

    pub fn with_thresholds(mut self, thresholds: HybridThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn has_external(&self) -> bool {
        self.external.is_some()
    }

    pub fn naive_bayes(&self) -> &NaiveBayesClassifier {
        &self.naive_bayes
    }

    /// Train the Naive Bayes tier now instead of on the first `classify`.
    pub fn warm_up(&self) {
        self.naive_bayes.ensure_trained(TrainingCorpus::generate);
    }

    /// Regenerate the corpus and retrain Naive Bayes from scratch.
    pub fn retrain(&mut self) {
        self.naive_bayes.train(&TrainingCorpus::generate());
    }

    pub fn classify(&self, app_name: &str, package_id: &str) -> ClassificationResult {
        if let Some(result) = self.query_external(app_name, package_id) {
            if result.confidence >= self.thresholds.external {
                debug!(app_name, package_id, category = %result.category, confidence = result.confidence, "external");
                return result;
            }
        }

        let nb = self
            .naive_bayes
            .ensure_trained(TrainingCorpus::generate)
            .predict(app_name, package_id);
        let rule = self.rule_engine.classify(app_name, package_id);

        let result = Self::merge(nb, rule, &self.thresholds);
        debug!(
            app_name,
            package_id,
            nb = %nb.category,
            rule = %rule.category,
            category = %result.category,
            confidence = result.confidence,
            "hybrid"
        );
        result
    }

    /// Merge the Naive Bayes and rule engine opinions.
    ///
    /// 1. both agree and NB clears its threshold: blend toward NB
    /// 2. NB clears its threshold with a real category: NB
    /// 3. rule clears its threshold: rule
    /// 4. otherwise the higher confidence, rule on ties
    pub fn merge(nb: ClassificationResult, rule: ClassificationResult, t: &HybridThresholds) -> ClassificationResult {
        if nb.category == rule.category && nb.confidence >= t.naive_bayes {
            let blended = t.agreement_nb_weight * nb.confidence + (1.0 - t.agreement_nb_weight) * rule.confidence;
            ClassificationResult::new(nb.category, blended)
        } else if nb.confidence >= t.naive_bayes && nb.category != Category::Others {
            nb
        } else if rule.confidence >= t.rule {
            rule
        } else if nb.confidence > rule.confidence {
            nb
        } else {
            rule
        }
    }

    /// Errors and panics from the external tier count as "no opinion".
    fn query_external(&self, app_name: &str, package_id: &str) -> Option<ClassificationResult> {
        let external = self.external.as_ref()?;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| external.classify(app_name, package_id)));
        match outcome {
            Ok(Ok(result)) => result.map(|r| ClassificationResult::new(r.category, r.confidence)),
            Ok(Err(e)) => {
                warn!("{} failed: {}", external.name(), e);
                None
            }
            Err(_) => {
                warn!("{} panicked", external.name());
                None
            }
        }
    }
}

impl Classifier for HybridClassifier {
    fn name(&self) -> &str {
        "hybrid"
    }

    fn classify(&self, app_name: &str, package_id: &str) -> Result<Option<ClassificationResult>, ClassifierError> {
        Ok(Some(HybridClassifier::classify(self, app_name, package_id)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    use super::*;

    struct Fixed(ClassificationResult, Arc<AtomicUsize>);

    impl Classifier for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn classify(&self, _: &str, _: &str) -> Result<Option<ClassificationResult>, ClassifierError> {
            self.1.fetch_add(1, Ordering::SeqCst);
            Ok(Some(self.0))
        }
    }

    struct Failing;

    impl Classifier for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn classify(&self, _: &str, _: &str) -> Result<Option<ClassificationResult>, ClassifierError> {
            Err(ClassifierError::Unavailable("model missing".to_string()))
        }
    }

    struct Panicking;

    impl Classifier for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        fn classify(&self, _: &str, _: &str) -> Result<Option<ClassificationResult>, ClassifierError> {
            panic!("inference crashed")
        }
    }

    fn r(category: Category, confidence: f32) -> ClassificationResult {
        ClassificationResult::new(category, confidence)
    }

    #[test]
    fn confident_external_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let hybrid = HybridClassifier::new()
            .with_external(Box::new(Fixed(r(Category::Health, 0.9), calls.clone())));
        assert_eq!(hybrid.classify("Spotify", "com.spotify.music"), r(Category::Health, 0.9));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!hybrid.naive_bayes().is_trained());
    }

    #[test]
    fn weak_external_falls_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let hybrid = HybridClassifier::new()
            .with_external(Box::new(Fixed(r(Category::Health, 0.39), calls)));
        assert_eq!(hybrid.classify("Spotify", "com.spotify.music").category, Category::Music);
    }

    #[test]
    fn failing_or_panicking_external_is_ignored() {
        let plain = HybridClassifier::new().classify("Uber", "com.ubercab");
        let failing = HybridClassifier::new().with_external(Box::new(Failing));
        let panicking = HybridClassifier::new().with_external(Box::new(Panicking));

        let a = failing.classify("Uber", "com.ubercab");
        let b = panicking.classify("Uber", "com.ubercab");
        assert_eq!(a.category, plain.category);
        assert_eq!(b.category, plain.category);
        assert!((a.confidence - plain.confidence).abs() < 1e-5);
    }

    #[test]
    fn agreement_blends_toward_naive_bayes() {
        let t = HybridThresholds::default();
        let merged = HybridClassifier::merge(r(Category::Games, 0.5), r(Category::Games, 1.0), &t);
        assert_eq!(merged.category, Category::Games);
        assert!((merged.confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn confident_naive_bayes_wins_disagreement() {
        let t = HybridThresholds::default();
        let merged = HybridClassifier::merge(r(Category::Music, 0.25), r(Category::Games, 0.9), &t);
        assert_eq!(merged, r(Category::Music, 0.25));
    }

    #[test]
    fn naive_bayes_others_defers_to_rule() {
        let t = HybridThresholds::default();
        let merged = HybridClassifier::merge(r(Category::Others, 0.8), r(Category::Games, 0.5), &t);
        assert_eq!(merged, r(Category::Games, 0.5));
    }

    #[test]
    fn weak_results_pick_higher_confidence_rule_on_tie() {
        let t = HybridThresholds::default();
        let nb_wins = HybridClassifier::merge(r(Category::Music, 0.15), r(Category::Games, 0.1), &t);
        assert_eq!(nb_wins, r(Category::Music, 0.15));

        let rule_wins = HybridClassifier::merge(r(Category::Music, 0.1), r(Category::Games, 0.15), &t);
        assert_eq!(rule_wins, r(Category::Games, 0.15));

        let tie = HybridClassifier::merge(r(Category::Music, 0.15), r(Category::Games, 0.15), &t);
        assert_eq!(tie, r(Category::Games, 0.15));
    }

    #[test]
    fn known_apps_classify_end_to_end() {
        let hybrid = HybridClassifier::new();
        for (name, pkg, expected) in [
            ("Spotify", "com.spotify.music", Category::Music),
            ("GPay", "com.google.android.apps.nbu.paisa.user", Category::Payments),
            ("WhatsApp", "com.whatsapp", Category::Social),
            ("Ludo King", "com.ludo.king", Category::Games),
        ] {
            assert_eq!(hybrid.classify(name, pkg).category, expected, "{}", name);
        }
        assert!(hybrid.naive_bayes().is_trained());
    }

    #[test]
    fn empty_input_is_sentinel() {
        let hybrid = HybridClassifier::new();
        assert_eq!(hybrid.classify("", ""), ClassificationResult::unclassified());
        assert_eq!(hybrid.classify("", "com.unknown.xyz").category, Category::Others);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let hybrid = HybridClassifier::new();
        for (_, entries) in TrainingCorpus::templates() {
            for entry in entries.iter() {
                let (name, pkg) = entry.rsplit_once(' ').unwrap_or((*entry, ""));
                let a = hybrid.classify(name, pkg);
                let b = hybrid.classify(name, pkg);
                assert_eq!(a, b);
                assert!((0.0..=1.0).contains(&a.confidence));
                assert!(Category::ALL.contains(&a.category));
            }
        }
    }

    #[test]
    fn concurrent_classification_shares_one_model() {
        let hybrid = Arc::new(HybridClassifier::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let hybrid = Arc::clone(&hybrid);
                thread::spawn(move || hybrid.classify("Ola", "com.olacabs.customer"))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.iter().all(|r| *r == results[0]));
        assert_eq!(results[0].category, Category::Travel);
    }

    #[test]
    fn from_config_applies_rule_threshold() {
        let engine = EngineConfig { rule_threshold: 0.8, ..EngineConfig::default() };
        let hybrid = HybridClassifier::from_config(&engine, None);
        assert_eq!(hybrid.rule_engine.threshold(), 0.8);
        assert_eq!(hybrid.thresholds.rule, 0.8);
        assert!(!hybrid.has_external());
        assert_eq!(
            hybrid.rule_engine.classify("Ride", "com.zzz.qqq"),
            ClassificationResult::unclassified()
        );
    }

    #[test]
    fn retrain_replaces_model() {
        let mut hybrid = HybridClassifier::new();
        hybrid.warm_up();
        let before = hybrid.classify("Chess", "com.chess");
        hybrid.retrain();
        let after = hybrid.classify("Chess", "com.chess");
        assert_eq!(before.category, after.category);
    }
}

//! Tokenizer and vocabulary used by every classifier in the engine.
//!
//! Feature text is lowercased, split on runs of `.`, whitespace, `_`, `-`, `,`
//! and `/`, and expanded into unigrams followed by underscore-joined bigrams.
//! A [`Vocabulary`] maps the surviving tokens to dense indices and turns text
//! into sparse bag-of-words counts.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::generic_types::Category;

lazy_static! {
    static ref FEATURE_SPLIT: Regex = Regex::new(r"[.\s_\-,/]+").unwrap();
    static ref NAME_SPLIT: Regex = Regex::new(r"[\s_\-.,]+").unwrap();
    static ref STOP_WORDS: HashSet<&'static str> = [
        "com", "org", "net", "app", "android", "google", "the", "and", "for", "with", "from",
        "this", "that", "are", "have", "has",
    ]
    .into_iter()
    .collect();
}

/// Sparse bag-of-words: vocabulary index -> occurrence count.
pub type SparseCounts = BTreeMap<usize, u32>;

pub struct Tokenizer;

impl Tokenizer {
    /// Unigrams (segments longer than one char) followed by adjacent-pair bigrams.
    pub fn tokenize(text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let segments: Vec<&str> = FEATURE_SPLIT
            .split(&lowered)
            .filter(|s| s.chars().count() > 1)
            .collect();

        let mut tokens: Vec<String> = segments.iter().map(|s| s.to_string()).collect();
        for pair in segments.windows(2) {
            tokens.push(format!("{}_{}", pair[0], pair[1]));
        }
        tokens
    }

    /// Plain split of a display name, no bigrams and no length filter.
    pub fn split_name(text: &str) -> Vec<String> {
        NAME_SPLIT
            .split(&text.to_lowercase())
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_string())
            .collect()
    }

    pub fn is_stop_word(token: &str) -> bool {
        STOP_WORDS.contains(token)
    }
}

/// Token -> dense index in `[0, len)`. Immutable once fitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    token_to_idx: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build from an ordered token iterator: first token gets index 0.
    pub fn new_from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut token_to_idx = HashMap::new();
        for tok in iter {
            let next = token_to_idx.len();
            token_to_idx.entry(tok).or_insert(next);
        }
        Self { token_to_idx }
    }

    /// Keep the `max_vocab_size` most frequent non-stop-word terms of the corpus.
    ///
    /// Labels are ignored. Equal frequencies keep first-seen order.
    pub fn fit(corpus: &[(String, Category)], max_vocab_size: usize) -> Self {
        let mut first_seen: HashMap<String, usize> = HashMap::new();
        let mut terms: Vec<(String, usize)> = Vec::new();

        for (text, _) in corpus {
            for token in Tokenizer::tokenize(text) {
                match first_seen.get(&token) {
                    Some(&pos) => terms[pos].1 += 1,
                    None => {
                        first_seen.insert(token.clone(), terms.len());
                        terms.push((token, 1));
                    }
                }
            }
        }

        terms.retain(|(t, _)| !Tokenizer::is_stop_word(t) && t.chars().count() > 1);
        // stable: ties stay in first-seen order
        terms.sort_by(|a, b| b.1.cmp(&a.1));
        terms.truncate(max_vocab_size);

        Vocabulary::new_from_iter(terms.into_iter().map(|(t, _)| t))
    }

    /// Load from a JSON array of tokens (`["pay","game",..]`) or a `{token: index}` object.
    pub fn load_from_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)?;
        let json: Value = serde_json::from_slice(&bytes)?;

        match json {
            Value::Array(arr) => {
                let tokens = arr
                    .into_iter()
                    .filter_map(|v| v.as_str().map(|s| s.to_string()));
                Ok(Vocabulary::new_from_iter(tokens))
            }
            Value::Object(obj) => {
                let mut token_to_idx = HashMap::with_capacity(obj.len());
                for (tok, idx) in obj {
                    let idx = idx
                        .as_u64()
                        .ok_or_else(|| anyhow::anyhow!("Index for token '{}' is not an integer", tok))?;
                    token_to_idx.insert(tok, idx as usize);
                }
                Ok(Self { token_to_idx })
            }
            _ => anyhow::bail!("Unsupported vocab format"),
        }
    }

    /// Count vocabulary hits in `text`. Unknown tokens are dropped.
    pub fn transform(&self, text: &str) -> SparseCounts {
        let mut counts = SparseCounts::new();
        for token in Tokenizer::tokenize(text) {
            if let Some(&idx) = self.token_to_idx.get(&token) {
                *counts.entry(idx).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn get(&self, token: &str) -> Option<usize> {
        self.token_to_idx.get(token).copied()
    }

    /// One past the largest index, i.e. the dense row width.
    pub fn width(&self) -> usize {
        self.token_to_idx.values().max().map_or(0, |m| m + 1)
    }

    pub fn len(&self) -> usize {
        self.token_to_idx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token_to_idx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<(String, Category)> {
        vec![
            ("Spotify Music com.spotify.music".to_string(), Category::Music),
            ("Ludo King game com.ludo.king".to_string(), Category::Games),
            ("Chess com.chess".to_string(), Category::Games),
        ]
    }

    #[test]
    fn tokenize_emits_unigrams_then_bigrams() {
        let tokens = Tokenizer::tokenize("Spotify Music com.spotify.music");
        assert_eq!(
            tokens,
            vec![
                "spotify", "music", "com", "spotify", "music",
                "spotify_music", "music_com", "com_spotify", "spotify_music",
            ]
        );
    }

    #[test]
    fn tokenize_drops_short_and_empty_segments() {
        let tokens = Tokenizer::tokenize("8 Ball--Pool / a,b");
        assert_eq!(tokens, vec!["ball", "pool", "ball_pool"]);
        assert!(Tokenizer::tokenize("").is_empty());
        assert!(Tokenizer::tokenize(" . _ - ").is_empty());
    }

    #[test]
    fn split_name_keeps_single_characters() {
        assert_eq!(Tokenizer::split_name("Temple Run 2"), vec!["temple", "run", "2"]);
        assert!(Tokenizer::split_name("").is_empty());
    }

    #[test]
    fn fit_skips_stop_words_and_orders_by_frequency() {
        let vocab = Vocabulary::fit(&corpus(), 3000);
        assert_eq!(vocab.get("com"), None);
        // "music" and "spotify" both appear twice, "music" is seen second
        assert_eq!(vocab.get("spotify"), Some(0));
        assert_eq!(vocab.get("music"), Some(1));
        assert!(vocab.get("com_chess").is_some());
        assert_eq!(vocab.width(), vocab.len());
    }

    #[test]
    fn fit_respects_cap() {
        let vocab = Vocabulary::fit(&corpus(), 3);
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.get("spotify"), Some(0));
    }

    #[test]
    fn transform_counts_known_tokens_only() {
        let vocab = Vocabulary::fit(&corpus(), 3000);
        let counts = vocab.transform("spotify spotify unknownthing");
        let spotify = vocab.get("spotify").unwrap();
        assert_eq!(counts.get(&spotify), Some(&2));
        assert!(counts.keys().all(|&i| i < vocab.width()));
        assert_eq!(counts, vocab.transform("spotify spotify unknownthing"));
    }

    #[test]
    fn transform_of_stop_words_is_empty() {
        let vocab = Vocabulary::fit(&corpus(), 3000);
        assert!(vocab.transform("com.android.app").is_empty());
        assert!(vocab.transform("").is_empty());
    }

    #[test]
    fn load_from_json_accepts_array_and_object() {
        let dir = tempfile::tempdir().unwrap();
        let arr = dir.path().join("arr.json");
        std::fs::write(&arr, r#"["pay","game"]"#).unwrap();
        let vocab = Vocabulary::load_from_json(&arr).unwrap();
        assert_eq!(vocab.get("game"), Some(1));

        let obj = dir.path().join("obj.json");
        std::fs::write(&obj, r#"{"pay": 4, "game": 0}"#).unwrap();
        let vocab = Vocabulary::load_from_json(&obj).unwrap();
        assert_eq!(vocab.get("pay"), Some(4));
        assert_eq!(vocab.width(), 5);

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "42").unwrap();
        assert!(Vocabulary::load_from_json(&bad).is_err());
    }
}

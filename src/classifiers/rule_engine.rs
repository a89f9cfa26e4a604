//! Deterministic keyword-overlap scorer.

use std::collections::HashSet;

use lazy_static::lazy_static;

use crate::classifiers::vectorizer::Tokenizer;
use crate::classifiers::{Classifier, ClassifierError};
use crate::generic_types::{Category, ClassificationResult};

/// Minimum normalized score for a category to be assigned.
pub const RULE_THRESHOLD: f32 = 0.30;

const EXACT_NAME_MATCH: f32 = 3.0;
const SUBSTRING_NAME_MATCH: f32 = 1.0;
const EXACT_PACKAGE_MATCH: f32 = 2.0;
const SUBSTRING_PACKAGE_MATCH: f32 = 0.5;
// one exact name hit plus a little package evidence saturates confidence
const NORMALIZATION_CAP: f32 = 4.0;

lazy_static! {
    static ref PACKAGE_STOP_SEGMENTS: HashSet<&'static str> =
        ["com", "org", "net", "app", "android", "google"].into_iter().collect();
}

const DEFAULT_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Payments, &[
        "pay", "upi", "bank", "wallet", "money", "gpay", "phonepe", "paytm", "finance", "credit",
        "debit", "transfer", "transaction", "cash", "bhim",
    ]),
    (Category::Games, &[
        "game", "battle", "racing", "puzzle", "arena", "clash", "craft", "bgmi", "play", "quest",
        "hero", "war", "strike", "shooter", "runner", "adventure", "chess", "ludo", "rummy",
        "casino", "dice",
    ]),
    (Category::Social, &[
        "chat", "message", "social", "whatsapp", "telegram", "instagram", "facebook", "twitter",
        "linkedin", "snapchat", "tiktok", "share", "connect", "meet", "discord", "viber", "signal",
    ]),
    (Category::Shopping, &[
        "shop", "store", "buy", "amazon", "flipkart", "cart", "market", "deal", "sale", "order",
        "meesho", "myntra", "nykaa", "snapdeal", "commerce", "mall", "fashion",
    ]),
    (Category::Music, &[
        "music", "song", "audio", "spotify", "gaana", "radio", "jio", "wynk", "saavn", "tune",
        "beat", "podcast", "fm", "sound", "player", "stream", "mp3",
    ]),
    (Category::Health, &[
        "health", "fit", "fitness", "doctor", "med", "pharmacy", "workout", "yoga", "diet",
        "nutrition", "hospital", "clinic", "pharma", "wellness", "care", "calorie", "pulse",
        "heart",
    ]),
    (Category::Travel, &[
        "travel", "cab", "ride", "flight", "hotel", "train", "ola", "uber", "rapido", "bus",
        "trip", "map", "navigation", "route", "irctc", "booking", "makemytrip", "goibibo",
        "yatra", "ixigo",
    ]),
    (Category::News, &[
        "news", "times", "daily", "feed", "headlines", "media", "press", "live", "report",
        "update", "breaking", "inshorts", "flipboard", "journal", "digest", "current",
    ]),
];

/// Category -> lowercase keywords, in table order. `Others` never appears.
#[derive(Debug, Clone)]
pub struct CategoryKeywordTable {
    entries: Vec<(Category, Vec<String>)>,
}

impl Default for CategoryKeywordTable {
    fn default() -> Self {
        let entries = DEFAULT_KEYWORDS
            .iter()
            .map(|(cat, kws)| (*cat, kws.iter().map(|k| k.to_string()).collect()))
            .collect();
        Self { entries }
    }
}

impl CategoryKeywordTable {
    pub fn keywords(&self, category: Category) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(cat, _)| *cat == category)
            .map(|(_, kws)| kws.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Category, Vec<String>)> {
        self.entries.iter()
    }
}

#[derive(Debug, Clone)]
pub struct RuleEngine {
    table: CategoryKeywordTable,
    threshold: f32,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::with_threshold(RULE_THRESHOLD)
    }
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scores below `threshold` fall back to `Others`.
    pub fn with_threshold(threshold: f32) -> Self {
        Self { table: CategoryKeywordTable::default(), threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn table(&self) -> &CategoryKeywordTable {
        &self.table
    }

    /// Score every category by keyword overlap with the name and package tokens.
    ///
    /// Each (keyword, token) pair contributes at most one weight:
    ///
    /// | match                                   | name | package |
    /// |-----------------------------------------|------|---------|
    /// | token == keyword                        | 3.0  | 2.0     |
    /// | token contains keyword                  | 1.0  | 0.5     |
    /// | keyword contains token (token len >= 3) | 1.0  | 0.5     |
    ///
    /// Overlapping keywords of one category accumulate independently.
    /// The total is divided by 4 and capped at 1; below the threshold
    /// (0.30 by default) the app is `Others`.
    pub fn classify(&self, app_name: &str, package_id: &str) -> ClassificationResult {
        let name_tokens = Tokenizer::split_name(app_name);
        let package_tokens = Self::tokenize_package(package_id);

        let mut best: Option<(Category, f32)> = None;
        for (category, keywords) in self.table.iter() {
            let mut score = 0.0f32;
            for keyword in keywords {
                for token in &name_tokens {
                    score += Self::match_weight(token, keyword, EXACT_NAME_MATCH, SUBSTRING_NAME_MATCH);
                }
                for token in &package_tokens {
                    score += Self::match_weight(token, keyword, EXACT_PACKAGE_MATCH, SUBSTRING_PACKAGE_MATCH);
                }
            }
            if score <= 0.0 {
                continue;
            }
            let normalized = (score / NORMALIZATION_CAP).min(1.0);
            if best.map_or(true, |(_, b)| normalized > b) {
                best = Some((*category, normalized));
            }
        }

        match best {
            Some((category, confidence)) if confidence >= self.threshold => {
                ClassificationResult::new(category, confidence)
            }
            _ => ClassificationResult::unclassified(),
        }
    }

    fn match_weight(token: &str, keyword: &str, exact: f32, partial: f32) -> f32 {
        if token == keyword {
            exact
        } else if token.contains(keyword) {
            partial
        } else if keyword.contains(token) && token.chars().count() >= 3 {
            partial
        } else {
            0.0
        }
    }

    /// Dot-separated segments longer than two chars, minus generic vendor segments.
    fn tokenize_package(package_id: &str) -> Vec<String> {
        package_id
            .to_lowercase()
            .split('.')
            .filter(|s| s.chars().count() > 2 && !PACKAGE_STOP_SEGMENTS.contains(s))
            .map(|s| s.to_string())
            .collect()
    }
}

impl Classifier for RuleEngine {
    fn name(&self) -> &str {
        "rule_engine"
    }

    fn classify(&self, app_name: &str, package_id: &str) -> Result<Option<ClassificationResult>, ClassifierError> {
        Ok(Some(RuleEngine::classify(self, app_name, package_id)))
    }
}

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Closed set of folder categories an app can land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Payments,
    Games,
    Social,
    Shopping,
    Music,
    Health,
    Travel,
    News,
    Others,
}

impl Category {
    /// Every category in table order. `Others` is always last.
    pub const ALL: [Category; 9] = [
        Category::Payments,
        Category::Games,
        Category::Social,
        Category::Shopping,
        Category::Music,
        Category::Health,
        Category::Travel,
        Category::News,
        Category::Others,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Payments" => Some(Category::Payments),
            "Games" => Some(Category::Games),
            "Social" => Some(Category::Social),
            "Shopping" => Some(Category::Shopping),
            "Music" => Some(Category::Music),
            "Health" => Some(Category::Health),
            "Travel" => Some(Category::Travel),
            "News" => Some(Category::News),
            "Others" => Some(Category::Others),
            _ => None,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Category::Payments => "Payments",
            Category::Games => "Games",
            Category::Social => "Social",
            Category::Shopping => "Shopping",
            Category::Music => "Music",
            Category::Health => "Health",
            Category::Travel => "Travel",
            Category::News => "News",
            Category::Others => "Others",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// Outcome of one classification call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub confidence: f32,
}

impl ClassificationResult {
    /// Build a result, clamping confidence into `[0, 1]`. NaN becomes 0.
    pub fn new(category: Category, confidence: f32) -> Self {
        let confidence = if confidence.is_nan() { 0.0 } else { confidence.clamp(0.0, 1.0) };
        Self { category, confidence }
    }

    /// The "no signal" sentinel: `Others` with zero confidence.
    pub fn unclassified() -> Self {
        Self { category: Category::Others, confidence: 0.0 }
    }

    pub fn is_unclassified(&self) -> bool {
        self.category == Category::Others && self.confidence == 0.0
    }
}

/// One installed app as reported by the inventory provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppEntry {
    pub app_name: String,
    pub package_id: String,
}

impl AppEntry {
    pub fn new(app_name: &str, package_id: &str) -> Self {
        Self { app_name: app_name.to_string(), package_id: package_id.to_string() }
    }

    /// Parse a `name<TAB>package` line. Lines without a tab are treated as a bare package id.
    pub fn from_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        if line.trim().is_empty() {
            return None;
        }
        match line.split_once('\t') {
            Some((name, pkg)) => Some(AppEntry::new(name.trim(), pkg.trim())),
            None => Some(AppEntry::new("", line.trim())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names_round_trip() {
        for cat in Category::ALL {
            assert_eq!(Category::from_str(cat.to_str()), Some(cat));
        }
        assert_eq!(Category::from_str("Weather"), None);
    }

    #[test]
    fn result_confidence_is_clamped() {
        assert_eq!(ClassificationResult::new(Category::Games, 1.7).confidence, 1.0);
        assert_eq!(ClassificationResult::new(Category::Games, -0.2).confidence, 0.0);
        assert_eq!(ClassificationResult::new(Category::Games, f32::NAN).confidence, 0.0);
    }

    #[test]
    fn sentinel_is_others_with_zero() {
        let r = ClassificationResult::unclassified();
        assert_eq!(r.category, Category::Others);
        assert_eq!(r.confidence, 0.0);
        assert!(r.is_unclassified());
    }

    #[test]
    fn app_entry_parses_tab_lines() {
        assert_eq!(
            AppEntry::from_line("Spotify\tcom.spotify.music\n"),
            Some(AppEntry::new("Spotify", "com.spotify.music"))
        );
        assert_eq!(AppEntry::from_line("com.chess"), Some(AppEntry::new("", "com.chess")));
        assert_eq!(AppEntry::from_line("   "), None);
    }
}

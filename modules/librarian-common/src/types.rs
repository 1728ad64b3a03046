use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Outcome ---

/// Result of a pipeline step that can legitimately produce nothing.
///
/// `Empty` means the step ran and there was nothing to return (no paragraph
/// text, no labels). `Failed` means the step could not run (network, model
/// or parse error). Neither carries a value, so an error message can never be
/// mistaken for content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    Empty(String),
    Failed(String),
}

impl<T> Outcome<T> {
    pub fn empty(reason: impl Into<String>) -> Self {
        Outcome::Empty(reason.into())
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Outcome::Failed(reason.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(v) => Outcome::Success(f(v)),
            Outcome::Empty(r) => Outcome::Empty(r),
            Outcome::Failed(r) => Outcome::Failed(r),
        }
    }

    /// Reason text for non-success outcomes.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Empty(r) | Outcome::Failed(r) => Some(r),
        }
    }
}

impl<T: Default> Outcome<T> {
    /// Collapse to the value, or `T::default()` for empty/failed.
    pub fn unwrap_or_default(self) -> T {
        self.success().unwrap_or_default()
    }
}

// --- Keys ---

/// Unique key for a Category or Keyword name: trimmed, inner whitespace
/// collapsed to a single space, lowercased.
pub fn normalize_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// --- Bookmarks ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub url: String,
    pub title: String,
}

impl Bookmark {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

// --- Graph records ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageNode {
    pub url: String,
    pub title: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl PageNode {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        summary: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            summary: summary.into(),
            created_at: now,
            last_updated: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub key: String,
    pub name: String,
    /// Summary that most recently produced this category.
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl CategoryNode {
    pub fn new(name: &str, description: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            key: normalize_key(name),
            name: name.trim().to_string(),
            description: description.into(),
            created_at: now,
            last_updated: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordNode {
    pub key: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl KeywordNode {
    pub fn new(name: &str, now: DateTime<Utc>) -> Self {
        Self {
            key: normalize_key(name),
            name: name.trim().to_string(),
            created_at: now,
            last_updated: now,
        }
    }
}

// --- Search ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchLeg {
    TextMatch,
    Vector,
}

impl fmt::Display for SearchLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchLeg::TextMatch => write!(f, "text match"),
            SearchLeg::Vector => write!(f, "vector"),
        }
    }
}

/// One node returned by the knowledge-graph query tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub leg: SearchLeg,
    pub labels: Vec<String>,
    /// Property name/value pairs in a stable order.
    pub properties: Vec<(String, String)>,
    pub score: Option<f64>,
}

impl SearchHit {
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Flat `property: value` rendering, one pair per line.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.properties.len() + 2);
        if !self.labels.is_empty() {
            lines.push(format!("type: {}", self.labels.join(", ")));
        }
        for (k, v) in &self.properties {
            lines.push(format!("{k}: {v}"));
        }
        if let Some(score) = self.score {
            lines.push(format!("score: {score:.3}"));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_ignore_case_and_spacing() {
        assert_eq!(normalize_key("AI"), "ai");
        assert_eq!(normalize_key("  ai "), "ai");
        assert_eq!(normalize_key("Ai"), "ai");
        assert_eq!(normalize_key("Machine   Learning"), "machine learning");
    }

    #[test]
    fn category_keeps_display_name() {
        let now = Utc::now();
        let c = CategoryNode::new("  Pets ", "summary", now);
        assert_eq!(c.name, "Pets");
        assert_eq!(c.key, "pets");
    }

    #[test]
    fn outcome_helpers() {
        let ok: Outcome<Vec<String>> = Outcome::Success(vec!["a".into()]);
        assert!(ok.is_success());
        assert_eq!(ok.clone().map(|v| v.len()), Outcome::Success(1));

        let failed: Outcome<Vec<String>> = Outcome::failed("boom");
        assert_eq!(failed.reason(), Some("boom"));
        assert!(failed.unwrap_or_default().is_empty());
    }

    #[test]
    fn hit_renders_property_lines() {
        let hit = SearchHit {
            leg: SearchLeg::Vector,
            labels: vec!["Page".into()],
            properties: vec![
                ("url".into(), "https://example.com/a".into()),
                ("title".into(), "Cats".into()),
            ],
            score: Some(0.91234),
        };
        assert_eq!(
            hit.render(),
            "type: Page\nurl: https://example.com/a\ntitle: Cats\nscore: 0.912"
        );
        assert_eq!(hit.property("title"), Some("Cats"));
    }
}

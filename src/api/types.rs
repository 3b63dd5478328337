use serde::{Deserialize, Serialize};

/// A classified feed entry as returned by `/api/briefings/{id}/tweets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub author: String,
    #[serde(rename = "content_text", default)]
    pub text: Option<String>,
    #[serde(rename = "tweet_url", default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub category_reason: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub media_urls: Vec<String>,
}

impl Item {
    /// First line of the text, for list rendering.
    pub fn headline(&self) -> &str {
        self.text
            .as_deref()
            .and_then(|t| t.lines().find(|l| !l.trim().is_empty()))
            .map(str::trim)
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl Category {
    fn new(key: &str, label: &str, color: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            color: Some(color.to_string()),
        }
    }
}

/// Categories the server ships with, used until `/api/settings` answers.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("must_read", "Must Read", "#e74c3c"),
        Category::new("stock_ideas", "Stock Ideas", "#3498db"),
        Category::new("viral", "Viral / Trending", "#9b59b6"),
        Category::new("charts", "Charts & Data", "#2ecc71"),
        Category::new("funny", "Funny / Entertainment", "#f39c12"),
        Category::new("skip", "Skip", "#95a5a6"),
    ]
}

/// The subset of `/api/settings` the client cares about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsReply {
    #[serde(default)]
    pub categories: Vec<Category>,
}

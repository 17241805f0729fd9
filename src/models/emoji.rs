//! Emoji catalog models.

use serde::{Deserialize, Serialize};

/// A single emoji in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Emoji {
    pub id: i64,
    pub emoji: String,
    pub name: String,
    pub slug: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub copy_count: i64,
}

impl Emoji {
    /// Case-insensitive substring match against the name and every keyword.
    ///
    /// An empty (or whitespace-only) query matches everything.
    pub fn matches_search(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        self.name.to_lowercase().contains(&needle)
            || self
                .keywords
                .iter()
                .any(|k| k.to_lowercase().contains(&needle))
    }
}

/// Catalog entry as it appears in the embedded seed document.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEmoji {
    pub emoji: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Query parameters for listing emojis.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmojiFilter {
    /// Free-text search over name and keywords.
    #[serde(default)]
    pub search: Option<String>,
    /// Exact category name.
    #[serde(default)]
    pub category: Option<String>,
}

/// A category together with the number of emojis in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub name: String,
    pub count: i64,
}

/// Result of a copy event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyCount {
    pub id: i64,
    pub copy_count: i64,
}

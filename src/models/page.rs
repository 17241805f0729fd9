//! SEO landing page models.

use serde::{Deserialize, Serialize};

/// A generated (or still pending) SEO landing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeoPage {
    pub id: i64,
    pub slug: String,
    pub keyword: String,
    pub title: String,
    pub meta_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_emojis: Option<Vec<String>>,
    pub generated: bool,
    pub created_at: String,
    pub updated_at: String,
    /// Internal version for optimistic concurrency control
    #[serde(default)]
    pub version: i64,
}

/// Insert payload for a page; the slug is derived by the caller.
#[derive(Debug, Clone)]
pub struct NewPage {
    pub slug: String,
    pub keyword: String,
    pub title: String,
    pub meta_description: String,
    pub content: Option<String>,
    pub related_emojis: Option<Vec<String>>,
    pub generated: bool,
}

/// Query parameters for listing pages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageFilter {
    #[serde(default)]
    pub generated: Option<bool>,
}

/// Request body for a manual page edit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePageRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub related_emojis: Option<Vec<String>>,
    #[serde(default)]
    pub generated: Option<bool>,
    /// Expected version for optimistic concurrency control
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// Request body for generating a single page.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub keyword: String,
}

/// Request body for generating a batch of pending pages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateBatchRequest {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Outcome of a batch generation call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBatchResponse {
    pub generated: usize,
    pub remaining: i64,
}

/// Request body for a full backfill run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillRequest {
    #[serde(default)]
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub max_rounds: Option<usize>,
}

/// Outcome of a backfill run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillResponse {
    pub generated: usize,
    pub rounds: usize,
    pub remaining: i64,
}

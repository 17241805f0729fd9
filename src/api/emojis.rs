//! Emoji catalog API endpoints.

use axum::extract::{
    rejection::{PathRejection, QueryRejection},
    Path, Query, State,
};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{CategorySummary, CopyCount, Emoji, EmojiFilter};
use crate::AppState;

/// Trending query parameters.
#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    /// Maximum number of results (default: 10).
    #[serde(default = "default_trending_limit")]
    pub limit: i64,
}

fn default_trending_limit() -> i64 {
    10
}

/// Maximum number of trending results allowed.
const MAX_TRENDING_LIMIT: i64 = 50;

/// GET /api/emojis - List emojis, optionally filtered by search text and category.
pub async fn list_emojis(
    State(state): State<AppState>,
    query: Result<Query<EmojiFilter>, QueryRejection>,
) -> ApiResult<Vec<Emoji>> {
    let Query(filter) = query?;
    let emojis = state.repo.list_emojis(&filter).await?;
    success(emojis)
}

/// GET /api/emojis/categories - List categories with counts.
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<CategorySummary>> {
    success(state.repo.list_categories().await?)
}

/// GET /api/emojis/trending - Most copied emojis.
pub async fn trending_emojis(
    State(state): State<AppState>,
    query: Result<Query<TrendingQuery>, QueryRejection>,
) -> ApiResult<Vec<Emoji>> {
    let Query(params) = query?;
    let limit = params.limit.clamp(1, MAX_TRENDING_LIMIT);
    success(state.repo.trending_emojis(limit).await?)
}

/// GET /api/emojis/:slug - Get a single emoji.
pub async fn get_emoji(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Emoji> {
    let Path(slug) = path?;
    match state.repo.get_emoji_by_slug(&slug).await? {
        Some(emoji) => success(emoji),
        None => Err(AppError::NotFound(format!("Emoji {} not found", slug))),
    }
}

/// POST /api/emojis/:id/copy - Record a copy event.
pub async fn copy_emoji(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<CopyCount> {
    let Path(id) = path?;
    let copy_count = state.repo.increment_copy_count(id).await?;
    tracing::debug!("Emoji {} copied ({} total)", id, copy_count);
    success(CopyCount { id, copy_count })
}

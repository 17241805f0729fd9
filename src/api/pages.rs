//! SEO page API endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};

use super::{json_or_default, success, ApiResult};
use crate::errors::AppError;
use crate::generator::{DEFAULT_BACKFILL_ROUNDS, DEFAULT_BATCH_SIZE};
use crate::models::{
    BackfillRequest, BackfillResponse, GenerateBatchRequest, GenerateBatchResponse,
    GenerateRequest, PageFilter, SeoPage, UpdatePageRequest,
};
use crate::AppState;

/// Upper bound on rounds a single backfill request may run.
const MAX_BACKFILL_ROUNDS: usize = 1_000;

/// Requested batch size, or the default. Zero is rejected.
fn requested_batch_size(requested: Option<usize>) -> Result<usize, AppError> {
    match requested {
        Some(0) => Err(AppError::Validation(
            "Batch size must be at least 1".to_string(),
        )),
        Some(size) => Ok(size),
        None => Ok(DEFAULT_BATCH_SIZE),
    }
}

/// GET /api/pages - List pages.
pub async fn list_pages(
    State(state): State<AppState>,
    query: Result<Query<PageFilter>, QueryRejection>,
) -> ApiResult<Vec<SeoPage>> {
    let Query(filter) = query?;
    success(state.repo.list_pages(filter.generated).await?)
}

/// GET /api/pages/:slug - Get a single page.
pub async fn get_page(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<SeoPage> {
    let Path(slug) = path?;
    match state.repo.get_page_by_slug(&slug).await? {
        Some(page) => success(page),
        None => Err(AppError::NotFound(format!("Page {} not found", slug))),
    }
}

/// PATCH /api/pages/:id - Manually edit a page.
pub async fn update_page(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdatePageRequest>, JsonRejection>,
) -> ApiResult<SeoPage> {
    let Path(id) = path?;
    let Json(request) = payload?;

    if matches!(&request.title, Some(title) if title.trim().is_empty()) {
        return Err(AppError::Validation("Title must not be empty".to_string()));
    }

    let page = state.repo.update_page(id, &request).await?;
    tracing::info!("Page {} edited (version {})", page.slug, page.version);
    success(page)
}

/// POST /api/pages/generate - Generate the page for a keyword.
pub async fn generate_page(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> ApiResult<SeoPage> {
    let Json(request) = payload?;
    success(state.generator.generate_for_keyword(&request.keyword).await?)
}

/// POST /api/pages/generate-batch - Generate the next batch of pending pages.
pub async fn generate_batch(
    State(state): State<AppState>,
    payload: Result<Json<GenerateBatchRequest>, JsonRejection>,
) -> ApiResult<GenerateBatchResponse> {
    let request = json_or_default(payload)?;
    let limit = requested_batch_size(request.limit)?;

    let generated = state.generator.generate_batch(limit).await?;
    let remaining = state.repo.count_ungenerated_pages().await?;

    success(GenerateBatchResponse {
        generated,
        remaining,
    })
}

/// POST /api/pages/backfill - Generate batches until no pending page is left.
pub async fn backfill_pages(
    State(state): State<AppState>,
    payload: Result<Json<BackfillRequest>, JsonRejection>,
) -> ApiResult<BackfillResponse> {
    let request = json_or_default(payload)?;
    let batch_size = requested_batch_size(request.batch_size)?;
    let max_rounds = request
        .max_rounds
        .unwrap_or(DEFAULT_BACKFILL_ROUNDS)
        .min(MAX_BACKFILL_ROUNDS);

    let summary = state.generator.backfill(batch_size, max_rounds).await?;
    let remaining = state.repo.count_ungenerated_pages().await?;

    success(BackfillResponse {
        generated: summary.generated,
        rounds: summary.rounds,
        remaining,
    })
}

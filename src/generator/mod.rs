//! SEO page generation.
//!
//! Pages are keyed by the slug of their keyword. A page is generated at most
//! once: regeneration requests for a generated page return it untouched, and
//! the batch path only ever claims pages that are still pending.

mod content;

pub use content::*;

use std::sync::Arc;

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{Emoji, EmojiFilter, NewPage, SeoPage};

/// Maximum number of related emojis stored on a page.
pub const RELATED_EMOJI_LIMIT: usize = 20;

/// Pages generated per batch call unless the caller asks otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Upper bound on a single batch call.
pub const MAX_BATCH_SIZE: usize = 25;

/// Slugs taken by the page admin routes; a page under one could never be fetched.
pub const RESERVED_PAGE_SLUGS: [&str; 3] = ["generate", "generate-batch", "backfill"];

/// Round cap for a backfill run.
pub const DEFAULT_BACKFILL_ROUNDS: usize = 100;

/// Totals of a backfill run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackfillSummary {
    pub generated: usize,
    pub rounds: usize,
}

/// Orchestrates page generation on top of the repository.
#[derive(Clone)]
pub struct PageGenerator {
    repo: Arc<Repository>,
}

impl PageGenerator {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Generate (or fetch) the page for a keyword.
    pub async fn generate_for_keyword(&self, keyword: &str) -> Result<SeoPage, AppError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(AppError::Validation("Keyword is required".to_string()));
        }

        let slug = slugify(keyword);
        if slug.is_empty() {
            return Err(AppError::Validation(
                "Keyword must contain at least one letter or digit".to_string(),
            ));
        }
        if RESERVED_PAGE_SLUGS.contains(&slug.as_str()) {
            return Err(AppError::Validation(format!(
                "Keyword {:?} is reserved",
                keyword
            )));
        }

        match self.repo.get_page_by_slug(&slug).await? {
            Some(page) if page.generated => {
                tracing::debug!("Page {} already generated", slug);
                Ok(page)
            }
            Some(page) => {
                if !self.fill_page(&page).await? {
                    tracing::debug!("Page {} was generated concurrently", slug);
                }
                self.repo
                    .get_page(page.id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Page {} not found", page.id)))
            }
            None => {
                let related = self.related_emojis(keyword).await?;
                let page = NewPage {
                    slug: slug.clone(),
                    keyword: keyword.to_string(),
                    title: page_title(keyword),
                    meta_description: meta_description(keyword),
                    content: Some(render_markdown(keyword, &related)),
                    related_emojis: Some(glyphs(&related)),
                    generated: true,
                };

                if self.repo.insert_page(&page).await? {
                    tracing::info!("Created page {} for keyword {:?}", slug, keyword);
                } else {
                    tracing::debug!("Page {} was created concurrently", slug);
                }

                self.repo
                    .get_page_by_slug(&slug)
                    .await?
                    .ok_or_else(|| AppError::Internal(format!("Page {} vanished after insert", slug)))
            }
        }
    }

    /// Generate up to `limit` pending pages; returns how many this call generated.
    ///
    /// A page that fails is logged and skipped so one bad row cannot stall the batch.
    pub async fn generate_batch(&self, limit: usize) -> Result<usize, AppError> {
        if limit == 0 {
            return Ok(0);
        }
        let limit = limit.min(MAX_BATCH_SIZE);
        let pending = self.repo.list_ungenerated_pages(limit as i64).await?;

        let mut generated = 0;
        for page in &pending {
            match self.fill_page(page).await {
                Ok(true) => generated += 1,
                Ok(false) => tracing::debug!("Page {} already claimed", page.slug),
                Err(e) => tracing::warn!("Failed to generate page {}: {}", page.slug, e),
            }
        }

        tracing::info!(
            "Batch generated {} of {} pending pages",
            generated,
            pending.len()
        );
        Ok(generated)
    }

    /// Repeat batches until one generates nothing or `max_rounds` is reached.
    pub async fn backfill(
        &self,
        batch_size: usize,
        max_rounds: usize,
    ) -> Result<BackfillSummary, AppError> {
        let mut summary = BackfillSummary {
            generated: 0,
            rounds: 0,
        };

        let mut drained = false;
        while summary.rounds < max_rounds {
            let generated = self.generate_batch(batch_size).await?;
            summary.rounds += 1;
            if generated == 0 {
                drained = true;
                break;
            }
            summary.generated += generated;
        }

        if !drained {
            tracing::warn!("Backfill stopped at the {} round cap", max_rounds);
        }

        tracing::info!(
            "Backfill generated {} pages in {} rounds",
            summary.generated,
            summary.rounds
        );
        Ok(summary)
    }

    /// Emojis related to a keyword, capped at [`RELATED_EMOJI_LIMIT`].
    async fn related_emojis(&self, keyword: &str) -> Result<Vec<Emoji>, AppError> {
        let filter = EmojiFilter {
            search: Some(strip_emoji_suffix(keyword).to_string()),
            category: None,
        };

        let mut emojis = self.repo.list_emojis(&filter).await?;
        emojis.truncate(RELATED_EMOJI_LIMIT);
        Ok(emojis)
    }

    /// Render and store content for a pending page. Returns whether this call claimed it.
    async fn fill_page(&self, page: &SeoPage) -> Result<bool, AppError> {
        let related = self.related_emojis(&page.keyword).await?;
        let content = render_markdown(&page.keyword, &related);

        self.repo
            .store_generated_content(page.id, &content, &glyphs(&related))
            .await
    }
}

fn glyphs(emojis: &[Emoji]) -> Vec<String> {
    emojis.iter().map(|e| e.emoji.clone()).collect()
}

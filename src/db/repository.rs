//! Database repository for catalog and page operations.
//!
//! Uses prepared statements and transactions for data integrity.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::generator::slugify;
use crate::models::{
    CategorySummary, Emoji, EmojiFilter, NewPage, SeedEmoji, SeoPage, UpdatePageRequest,
};

const EMOJI_COLUMNS: &str =
    "id, emoji, name, slug, category, subcategory, description, keywords, copy_count";

const PAGE_COLUMNS: &str = "id, slug, keyword, title, meta_description, content, related_emojis, generated, created_at, updated_at, version";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== EMOJI OPERATIONS ====================

    /// Count the emojis in the catalog.
    pub async fn count_emojis(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM emojis")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }

    /// Insert seed emojis in one transaction, skipping slugs that already exist.
    ///
    /// Returns the number of rows actually inserted.
    pub async fn seed_emojis(&self, emojis: &[SeedEmoji]) -> Result<usize, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for seed in emojis {
            let keywords_json = serde_json::to_string(&seed.keywords).unwrap_or_default();
            let result = sqlx::query(
                "INSERT OR IGNORE INTO emojis (emoji, name, slug, category, subcategory, description, keywords, copy_count) VALUES (?, ?, ?, ?, ?, ?, ?, 0)"
            )
            .bind(&seed.emoji)
            .bind(&seed.name)
            .bind(slugify(&seed.name))
            .bind(&seed.category)
            .bind(&seed.subcategory)
            .bind(&seed.description)
            .bind(&keywords_json)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() > 0 {
                inserted += 1;
            }
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// List emojis ordered by id, filtered by exact category and free-text search.
    pub async fn list_emojis(&self, filter: &EmojiFilter) -> Result<Vec<Emoji>, AppError> {
        let category = filter
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());

        let rows = sqlx::query(&format!(
            "SELECT {EMOJI_COLUMNS} FROM emojis WHERE (?1 IS NULL OR category = ?1) ORDER BY id"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        // SQLite LOWER() only folds ASCII, so the text match runs here.
        let search = filter.search.as_deref().unwrap_or_default();
        Ok(rows
            .iter()
            .map(emoji_from_row)
            .filter(|emoji| emoji.matches_search(search))
            .collect())
    }

    /// Get an emoji by slug.
    pub async fn get_emoji_by_slug(&self, slug: &str) -> Result<Option<Emoji>, AppError> {
        let row = sqlx::query(&format!("SELECT {EMOJI_COLUMNS} FROM emojis WHERE slug = ?"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(emoji_from_row))
    }

    /// List categories with their emoji counts, in catalog order.
    pub async fn list_categories(&self) -> Result<Vec<CategorySummary>, AppError> {
        let rows = sqlx::query(
            "SELECT category, COUNT(*) AS count, MIN(id) AS first_id FROM emojis GROUP BY category ORDER BY first_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| CategorySummary {
                name: row.get("category"),
                count: row.get("count"),
            })
            .collect())
    }

    /// Top emojis by copy count; ties go to the lower id.
    pub async fn trending_emojis(&self, limit: i64) -> Result<Vec<Emoji>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {EMOJI_COLUMNS} FROM emojis ORDER BY copy_count DESC, id ASC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(emoji_from_row).collect())
    }

    /// Record a copy event and return the new count.
    pub async fn increment_copy_count(&self, id: i64) -> Result<i64, AppError> {
        let row = sqlx::query(
            "UPDATE emojis SET copy_count = copy_count + 1 WHERE id = ? RETURNING copy_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.get("copy_count"))
            .ok_or_else(|| AppError::NotFound(format!("Emoji {} not found", id)))
    }

    // ==================== PAGE OPERATIONS ====================

    /// List pages ordered by id, optionally only generated or only pending ones.
    pub async fn list_pages(&self, generated: Option<bool>) -> Result<Vec<SeoPage>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {PAGE_COLUMNS} FROM seo_pages WHERE (?1 IS NULL OR generated = ?1) ORDER BY id"
        ))
        .bind(generated.map(|g| g as i32))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(page_from_row).collect())
    }

    /// Get a page by ID.
    pub async fn get_page(&self, id: i64) -> Result<Option<SeoPage>, AppError> {
        let row = sqlx::query(&format!("SELECT {PAGE_COLUMNS} FROM seo_pages WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(page_from_row))
    }

    /// Get a page by slug.
    pub async fn get_page_by_slug(&self, slug: &str) -> Result<Option<SeoPage>, AppError> {
        let row = sqlx::query(&format!("SELECT {PAGE_COLUMNS} FROM seo_pages WHERE slug = ?"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(page_from_row))
    }

    /// Insert a page. A duplicate slug is ignored and reported as `false`.
    pub async fn insert_page(&self, page: &NewPage) -> Result<bool, AppError> {
        let now = Utc::now().to_rfc3339();
        let related_json = page
            .related_emojis
            .as_ref()
            .map(|r| serde_json::to_string(r).unwrap_or_default());

        let result = sqlx::query(
            "INSERT OR IGNORE INTO seo_pages (slug, keyword, title, meta_description, content, related_emojis, generated, created_at, updated_at, version) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1)"
        )
        .bind(&page.slug)
        .bind(&page.keyword)
        .bind(&page.title)
        .bind(&page.meta_description)
        .bind(&page.content)
        .bind(&related_json)
        .bind(page.generated as i32)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Write generated content into a pending page.
    ///
    /// The update only applies while the page is still pending, so two callers
    /// racing on the same page cannot both claim it. Returns whether this call won.
    pub async fn store_generated_content(
        &self,
        id: i64,
        content: &str,
        related_emojis: &[String],
    ) -> Result<bool, AppError> {
        let now = Utc::now().to_rfc3339();
        let related_json = serde_json::to_string(related_emojis).unwrap_or_default();

        let result = sqlx::query(
            "UPDATE seo_pages SET content = ?, related_emojis = ?, generated = 1, updated_at = ?, version = version + 1 WHERE id = ? AND generated = 0"
        )
        .bind(content)
        .bind(&related_json)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Apply a manual edit with optimistic concurrency control.
    pub async fn update_page(
        &self,
        id: i64,
        request: &UpdatePageRequest,
    ) -> Result<SeoPage, AppError> {
        let existing = self
            .get_page(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Page {} not found", id)))?;

        if let Some(expected) = request.expected_version {
            if existing.version != expected {
                return Err(AppError::Conflict {
                    message: format!(
                        "Version mismatch: expected {}, current {}",
                        expected, existing.version
                    ),
                    current_version: existing.version,
                });
            }
        }

        let now = Utc::now().to_rfc3339();
        let new_version = existing.version + 1;

        let title = request.title.clone().unwrap_or(existing.title);
        let meta_description = request
            .meta_description
            .clone()
            .unwrap_or(existing.meta_description);
        let content = request.content.clone().or(existing.content);
        let related_emojis = request.related_emojis.clone().or(existing.related_emojis);
        // Hand-written content is final unless the caller says otherwise.
        let generated = request
            .generated
            .unwrap_or(existing.generated || request.content.is_some());
        let related_json = related_emojis
            .as_ref()
            .map(|r| serde_json::to_string(r).unwrap_or_default());

        let result = sqlx::query(
            "UPDATE seo_pages SET title = ?, meta_description = ?, content = ?, related_emojis = ?, generated = ?, updated_at = ?, version = ? WHERE id = ? AND version = ?"
        )
        .bind(&title)
        .bind(&meta_description)
        .bind(&content)
        .bind(&related_json)
        .bind(generated as i32)
        .bind(&now)
        .bind(new_version)
        .bind(id)
        .bind(existing.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current = self.get_page(id).await?;
            return Err(AppError::Conflict {
                message: "Concurrent modification detected".to_string(),
                current_version: current.map(|p| p.version).unwrap_or(0),
            });
        }

        Ok(SeoPage {
            id,
            slug: existing.slug,
            keyword: existing.keyword,
            title,
            meta_description,
            content,
            related_emojis,
            generated,
            created_at: existing.created_at,
            updated_at: now,
            version: new_version,
        })
    }

    /// Pending pages in id order, at most `limit`.
    pub async fn list_ungenerated_pages(&self, limit: i64) -> Result<Vec<SeoPage>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {PAGE_COLUMNS} FROM seo_pages WHERE generated = 0 ORDER BY id LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(page_from_row).collect())
    }

    /// Count pages still awaiting generation.
    pub async fn count_ungenerated_pages(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM seo_pages WHERE generated = 0")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }
}

// Helper functions for row conversion

fn emoji_from_row(row: &sqlx::sqlite::SqliteRow) -> Emoji {
    let keywords_str: String = row.get("keywords");
    Emoji {
        id: row.get("id"),
        emoji: row.get("emoji"),
        name: row.get("name"),
        slug: row.get("slug"),
        category: row.get("category"),
        subcategory: row.get("subcategory"),
        description: row.get("description"),
        keywords: parse_json_array(&keywords_str),
        copy_count: row.get("copy_count"),
    }
}

fn page_from_row(row: &sqlx::sqlite::SqliteRow) -> SeoPage {
    let generated: i32 = row.get("generated");
    let related_str: Option<String> = row.get("related_emojis");
    SeoPage {
        id: row.get("id"),
        slug: row.get("slug"),
        keyword: row.get("keyword"),
        title: row.get("title"),
        meta_description: row.get("meta_description"),
        content: row.get("content"),
        related_emojis: related_str.map(|s| parse_json_array(&s)),
        generated: generated != 0,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    }
}

fn parse_json_array(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}

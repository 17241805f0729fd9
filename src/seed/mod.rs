//! Startup seeding for the emoji catalog and the SEO page stubs.

use crate::db::Repository;
use crate::errors::AppError;
use crate::generator::{meta_description, page_title, slugify};
use crate::models::{NewPage, SeedEmoji};

/// Catalog shipped with the binary.
const SEED_EMOJIS: &str = include_str!("emojis.json");

/// Keywords that get a landing page stub on startup.
pub const PAGE_KEYWORDS: &[&str] = &[
    "heart emoji",
    "fire emoji",
    "smile emoji",
    "laughing emoji",
    "crying emoji",
    "skull emoji",
    "thumbs up emoji",
    "sparkles emoji",
    "star emoji",
    "moon emoji",
    "sun emoji",
    "flower emoji",
    "cat emoji",
    "dog emoji",
    "party emoji",
    "birthday emoji",
    "food emoji",
    "love emoji",
    "cute emoji",
    "aesthetic emoji",
];

/// Outcome of a seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub emojis_inserted: usize,
    pub pages_inserted: usize,
}

/// Parse the embedded catalog.
pub fn catalog() -> Result<Vec<SeedEmoji>, AppError> {
    Ok(serde_json::from_str(SEED_EMOJIS)?)
}

/// Seed the catalog (only when empty) and insert any missing page stubs.
pub async fn run(repo: &Repository) -> Result<SeedReport, AppError> {
    let mut report = SeedReport::default();

    let existing = repo.count_emojis().await?;
    if existing == 0 {
        report.emojis_inserted = repo.seed_emojis(&catalog()?).await?;
        tracing::info!("Seeded {} emojis", report.emojis_inserted);
    } else {
        tracing::debug!("Catalog already holds {} emojis, skipping", existing);
    }

    for keyword in PAGE_KEYWORDS {
        if repo.insert_page(&page_stub(keyword)).await? {
            report.pages_inserted += 1;
        }
    }
    if report.pages_inserted > 0 {
        tracing::info!("Inserted {} page stubs", report.pages_inserted);
    }

    Ok(report)
}

/// A pending page for a keyword.
pub fn page_stub(keyword: &str) -> NewPage {
    NewPage {
        slug: slugify(keyword),
        keyword: keyword.to_string(),
        title: page_title(keyword),
        meta_description: meta_description(keyword),
        content: None,
        related_emojis: None,
        generated: false,
    }
}

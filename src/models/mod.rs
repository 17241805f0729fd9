//! Data models for the emoji catalog and its SEO pages.
//!
//! Field names serialize as camelCase to match the frontend.

mod emoji;
mod page;

pub use emoji::*;
pub use page::*;

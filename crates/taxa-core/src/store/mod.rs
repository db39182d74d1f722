//! Catalog storage abstraction.
//!
//! The [`CatalogStore`] trait covers the read path the engine needs:
//! fetching the active category snapshot and individual articles. The write
//! path (persisting assignments, category embeddings, recomputed hierarchy
//! paths) belongs to the caller, which receives those values from the engine
//! and hierarchy functions.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Article, Category};

/// Abstract read-only catalog backend.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// The active categories, ordered by display order then name.
    async fn active_categories(&self) -> Result<Vec<Category>>;

    /// Retrieve one article by id.
    async fn article(&self, id: Uuid) -> Result<Option<Article>>;
}

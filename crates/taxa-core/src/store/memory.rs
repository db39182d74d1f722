//! In-memory [`CatalogStore`] implementation for tests and embedded use.
//!
//! Uses `HashMap` behind `std::sync::RwLock` for thread safety.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Article, Category};

use super::CatalogStore;

/// In-memory catalog for tests and embedded environments.
#[derive(Default)]
pub struct InMemoryCatalog {
    categories: RwLock<HashMap<Uuid, Category>>,
    articles: RwLock<HashMap<Uuid, Article>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_category(&self, category: Category) {
        self.categories
            .write()
            .unwrap()
            .insert(category.id, category);
    }

    pub fn insert_article(&self, article: Article) {
        self.articles.write().unwrap().insert(article.id, article);
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn active_categories(&self) -> Result<Vec<Category>> {
        let categories = self.categories.read().unwrap();
        let mut active: Vec<Category> = categories
            .values()
            .filter(|c| c.active)
            .cloned()
            .collect();
        active.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(active)
    }

    async fn article(&self, id: Uuid) -> Result<Option<Article>> {
        Ok(self.articles.read().unwrap().get(&id).cloned())
    }
}

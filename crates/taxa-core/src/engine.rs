//! Classification engine: runs the three scorers and aggregates the results.
//!
//! The engine is stateless between calls. It borrows read-only snapshots of
//! the catalog, returns suggestion values for the caller to persist, and
//! writes nothing itself.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::aggregate;
use crate::error::EngineError;
use crate::generative::{self, GenerativeClient, GENERATIVE_SUGGESTION_LIMIT};
use crate::hierarchy::HierarchyIndex;
use crate::keyword;
use crate::models::{Article, Category, CategorySuggestion, ClassificationOptions};
use crate::semantic;
use crate::store::CatalogStore;

/// Per-article outcome within a batch. One article's failure never aborts
/// the remaining articles.
#[derive(Debug)]
pub enum ArticleOutcome {
    Classified {
        suggestions: Vec<CategorySuggestion>,
        /// Category ids whose suggestions cleared the auto threshold, for the
        /// caller to persist. Empty when auto-classification is disabled.
        auto_assigned: Vec<Uuid>,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug)]
pub struct BatchItem {
    pub article_id: Uuid,
    pub outcome: ArticleOutcome,
}

/// Orchestrates keyword, semantic, and generative scoring for one article at
/// a time.
#[derive(Default)]
pub struct ClassificationEngine {
    generative: Option<Arc<dyn GenerativeClient>>,
}

impl ClassificationEngine {
    /// Engine without a generative backend: keyword + semantic evidence only.
    pub fn new() -> Self {
        Self { generative: None }
    }

    pub fn with_generative(client: Arc<dyn GenerativeClient>) -> Self {
        Self {
            generative: Some(client),
        }
    }

    /// Whether a generative backend is configured. When false the engine
    /// degrades to keyword + semantic evidence; this is not an error state.
    pub fn is_generative_enabled(&self) -> bool {
        self.generative.is_some()
    }

    /// Classify one article against the catalog snapshot.
    ///
    /// Keyword and semantic scores are weighted per `options` before merging;
    /// the generative opinion merges at face value. Merge order is keyword,
    /// semantic, generative. Returns a ranked list capped at
    /// `options.max_suggestions_per_article`; an empty catalog yields an
    /// empty list, not an error.
    pub async fn classify(
        &self,
        article: &Article,
        categories: &[Category],
        options: &ClassificationOptions,
    ) -> Result<Vec<CategorySuggestion>, EngineError> {
        if categories.is_empty() {
            return Ok(Vec::new());
        }

        let index = HierarchyIndex::new(categories);

        // Keyword and semantic evidence is synchronous CPU work over the
        // snapshot; the generative call is the only suspension point.
        let mut keyword_scores = keyword::score(article, categories, &index)?;
        let mut semantic_scores = semantic::score(article, categories)?;
        let generative_scores =
            generative::score(self.generative.as_deref(), article, categories)
                .await
                .into_suggestions();

        for suggestion in &mut keyword_scores {
            suggestion.confidence_score *= options.keyword_match_weight;
        }
        for suggestion in &mut semantic_scores {
            suggestion.confidence_score *= options.semantic_similarity_weight;
        }

        debug!(
            article_id = %article.id,
            keyword = keyword_scores.len(),
            semantic = semantic_scores.len(),
            generative = generative_scores.len(),
            "scorer candidates collected"
        );

        let merged = aggregate::merge(vec![keyword_scores, semantic_scores, generative_scores]);
        aggregate::finalize(
            merged,
            &index,
            options,
            options.max_suggestions_per_article,
        )
    }

    /// Direct AI-classification entry point: the generative opinion alone,
    /// gated and ranked by the aggregator, capped at
    /// [`GENERATIVE_SUGGESTION_LIMIT`]. Returns an empty list when no
    /// generative backend is configured.
    pub async fn suggest_with_generative(
        &self,
        article: &Article,
        categories: &[Category],
    ) -> Result<Vec<CategorySuggestion>, EngineError> {
        if categories.is_empty() {
            return Ok(Vec::new());
        }
        let index = HierarchyIndex::new(categories);
        let suggestions = generative::score(self.generative.as_deref(), article, categories)
            .await
            .into_suggestions();
        aggregate::finalize(
            suggestions,
            &index,
            &ClassificationOptions::default(),
            GENERATIVE_SUGGESTION_LIMIT,
        )
    }

    /// Classify and return only the ids that cleared the auto threshold, for
    /// the caller to persist. Returns no ids when auto-classification is
    /// disabled in `options`.
    pub async fn auto_assign(
        &self,
        article: &Article,
        categories: &[Category],
        options: &ClassificationOptions,
    ) -> Result<Vec<Uuid>, EngineError> {
        if !options.enable_auto_classification {
            return Ok(Vec::new());
        }
        let suggestions = self.classify(article, categories, options).await?;
        Ok(suggestions
            .into_iter()
            .filter(|s| s.exceeds_auto_threshold)
            .map(|s| s.category_id)
            .collect())
    }

    /// Classify a batch of articles sequentially.
    ///
    /// Each article traps its own error into a [`ArticleOutcome::Failed`]
    /// entry; the batch never aborts on one article. The cancellation token
    /// is observed between articles — results accumulated up to that point
    /// are returned, not discarded.
    pub async fn classify_batch(
        &self,
        articles: &[Article],
        categories: &[Category],
        options: &ClassificationOptions,
        cancel: &CancellationToken,
    ) -> Vec<BatchItem> {
        let mut results = Vec::with_capacity(articles.len());

        for article in articles {
            if cancel.is_cancelled() {
                debug!(
                    processed = results.len(),
                    total = articles.len(),
                    "batch classification cancelled"
                );
                break;
            }

            let outcome = match self.classify(article, categories, options).await {
                Ok(suggestions) => {
                    let auto_assigned = if options.enable_auto_classification {
                        suggestions
                            .iter()
                            .filter(|s| s.exceeds_auto_threshold)
                            .map(|s| s.category_id)
                            .collect()
                    } else {
                        Vec::new()
                    };
                    ArticleOutcome::Classified {
                        suggestions,
                        auto_assigned,
                    }
                }
                Err(e) => {
                    warn!(article_id = %article.id, error = %e, "article classification failed");
                    ArticleOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };

            results.push(BatchItem {
                article_id: article.id,
                outcome,
            });
        }

        results
    }

    /// Read-path convenience over a [`CatalogStore`]: fetch the article and
    /// the active catalog, then classify.
    pub async fn classify_from_store<S: CatalogStore>(
        &self,
        store: &S,
        article_id: Uuid,
        options: &ClassificationOptions,
    ) -> Result<Vec<CategorySuggestion>, EngineError> {
        let article = store
            .article(article_id)
            .await?
            .ok_or(EngineError::ArticleNotFound(article_id))?;
        let categories = store.active_categories().await?;
        self.classify(&article, &categories, options).await
    }
}

//! Semantic evidence: cosine similarity between article and category vectors.

use crate::embedding::{combine_embeddings, cosine_similarity, remap_to_unit};
use crate::error::EngineError;
use crate::models::{Article, Category, CategorySuggestion};

/// Raw-cosine floor below which a category is not emitted as a candidate.
/// Trades recall for a quieter aggregator.
pub const MIN_RAW_SIMILARITY: f32 = 0.75;

/// Score the article's combined embedding against each category embedding.
///
/// Categories lacking an embedding are skipped; an article with no embedding
/// at all yields an empty result (degraded, not an error). Raw cosine is
/// remapped from `[-1, 1]` to `[0, 1]` before being treated as a confidence.
/// A length mismatch between the article and a category vector is an error —
/// truncating or padding would corrupt the similarity.
pub fn score(
    article: &Article,
    categories: &[Category],
) -> Result<Vec<CategorySuggestion>, EngineError> {
    let Some(article_vec) = combine_embeddings(
        article.head_embedding.as_deref(),
        article.body_embedding.as_deref(),
    )?
    else {
        return Ok(Vec::new());
    };

    let mut suggestions = Vec::new();

    for category in categories.iter().filter(|c| c.active) {
        let Some(category_vec) = category.embedding.as_deref() else {
            continue;
        };
        if category_vec.len() != article_vec.len() {
            return Err(EngineError::DimensionMismatch {
                expected: article_vec.len(),
                actual: category_vec.len(),
                context: format!("category '{}' embedding", category.name),
            });
        }

        let raw = cosine_similarity(&article_vec, category_vec);
        if raw < MIN_RAW_SIMILARITY {
            continue;
        }

        let score = remap_to_unit(raw);
        suggestions.push(CategorySuggestion {
            category_id: category.id,
            category_name: category.name.clone(),
            confidence_score: score,
            reason: format!("Semantic similarity: {:.1}%", score * 100.0),
            exceeds_auto_threshold: score >= category.auto_threshold,
            exceeds_manual_threshold: score >= category.manual_threshold,
        });
    }

    Ok(suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_category(name: &str, embedding: Option<Vec<f32>>) -> Category {
        let mut category = Category::new(name);
        category.embedding = embedding;
        category
    }

    fn make_article(body_embedding: Vec<f32>) -> Article {
        let mut article = Article::new("t", "s");
        article.body_embedding = Some(body_embedding);
        article
    }

    #[test]
    fn test_identical_vectors_score_one() {
        let v = vec![0.1, 0.2, 0.3];
        let categories = vec![make_category("A", Some(v.clone()))];
        let article = make_article(v);
        let suggestions = score(&article, &categories).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert!((suggestions[0].confidence_score - 1.0).abs() < 1e-6);
        assert!(suggestions[0].reason.contains("100.0%"));
    }

    #[test]
    fn test_below_floor_omitted() {
        // Orthogonal: raw 0.0 < floor.
        let categories = vec![make_category("A", Some(vec![1.0, 0.0]))];
        let article = make_article(vec![0.0, 1.0]);
        assert!(score(&article, &categories).unwrap().is_empty());
    }

    #[test]
    fn test_missing_category_embedding_skipped() {
        let categories = vec![make_category("A", None)];
        let article = make_article(vec![1.0, 0.0]);
        assert!(score(&article, &categories).unwrap().is_empty());
    }

    #[test]
    fn test_article_without_embeddings_degrades() {
        let categories = vec![make_category("A", Some(vec![1.0, 0.0]))];
        let article = Article::new("t", "s");
        assert!(score(&article, &categories).unwrap().is_empty());
    }

    #[test]
    fn test_dimension_mismatch_errors() {
        let categories = vec![make_category("A", Some(vec![1.0, 0.0, 0.0]))];
        let article = make_article(vec![1.0, 0.0]);
        let err = score(&article, &categories).unwrap_err();
        assert!(matches!(err, EngineError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_head_body_combination_feeds_similarity() {
        let mut article = Article::new("t", "s");
        article.head_embedding = Some(vec![1.0, 0.0]);
        article.body_embedding = Some(vec![1.0, 0.0]);
        let categories = vec![make_category("A", Some(vec![1.0, 0.0]))];
        let suggestions = score(&article, &categories).unwrap();
        // 0.3h + 0.7b keeps the direction, so similarity stays 1.0.
        assert!((suggestions[0].confidence_score - 1.0).abs() < 1e-6);
    }
}

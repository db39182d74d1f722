//! Lexical evidence: keyword matching against article text.

use crate::error::EngineError;
use crate::hierarchy::HierarchyIndex;
use crate::models::{Article, Category, CategorySuggestion};

/// Lexical evidence alone never reaches full confidence.
pub const KEYWORD_SCORE_CAP: f64 = 0.9;

/// Score every active category's effective keyword set against the article.
///
/// A keyword matches when it appears case-insensitively as a substring of the
/// concatenated title, summary, and tags. The score is the matched fraction
/// of the effective keyword set, capped at [`KEYWORD_SCORE_CAP`]. Categories
/// with an empty effective keyword set or zero matches are omitted.
pub fn score(
    article: &Article,
    categories: &[Category],
    index: &HierarchyIndex<'_>,
) -> Result<Vec<CategorySuggestion>, EngineError> {
    let haystack = format!(
        "{} {} {}",
        article.title,
        article.summary,
        article.tags.join(" ")
    )
    .to_lowercase();

    let mut suggestions = Vec::new();

    for category in categories.iter().filter(|c| c.active) {
        let keywords = index.effective_keywords(category)?;
        if keywords.is_empty() {
            continue;
        }

        let matched: Vec<&str> = keywords
            .iter()
            .filter(|kw| haystack.contains(&kw.to_lowercase()))
            .map(|kw| kw.as_str())
            .collect();
        if matched.is_empty() {
            continue;
        }

        let score = (matched.len() as f64 / keywords.len() as f64).min(KEYWORD_SCORE_CAP);
        suggestions.push(CategorySuggestion {
            category_id: category.id,
            category_name: category.name.clone(),
            confidence_score: score,
            reason: format!("Matched keywords: {}", matched.join(", ")),
            exceeds_auto_threshold: score >= category.auto_threshold,
            exceeds_manual_threshold: score >= category.manual_threshold,
        });
    }

    Ok(suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_category(name: &str, keywords: &[&str]) -> Category {
        let mut category = Category::new(name);
        category.keywords = keywords.iter().map(|s| s.to_string()).collect();
        category
    }

    fn make_article(title: &str, summary: &str, tags: &[&str]) -> Article {
        let mut article = Article::new(title, summary);
        article.tags = tags.iter().map(|s| s.to_string()).collect();
        article
    }

    #[test]
    fn test_all_keywords_matched_capped() {
        let categories = vec![make_category("Cloud", &["dotnet", "azure"])];
        let index = HierarchyIndex::new(&categories);
        let article = make_article("Deploying dotnet apps", "Running on Azure App Service", &[]);
        let suggestions = score(&article, &categories, &index).unwrap();
        assert_eq!(suggestions.len(), 1);
        // 2/2 matched, capped below full confidence.
        assert!((suggestions[0].confidence_score - KEYWORD_SCORE_CAP).abs() < 1e-9);
        assert!(suggestions[0].reason.contains("azure"));
        assert!(suggestions[0].reason.contains("dotnet"));
    }

    #[test]
    fn test_partial_match_fraction() {
        let categories = vec![make_category("Cloud", &["dotnet", "azure", "kubernetes", "aws"])];
        let index = HierarchyIndex::new(&categories);
        let article = make_article("Azure notes", "", &[]);
        let suggestions = score(&article, &categories, &index).unwrap();
        assert!((suggestions[0].confidence_score - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_empty_keyword_set_never_emits() {
        let categories = vec![make_category("Empty", &[])];
        let index = HierarchyIndex::new(&categories);
        let article = make_article("Anything", "at all", &[]);
        assert!(score(&article, &categories, &index).unwrap().is_empty());
    }

    #[test]
    fn test_zero_matches_omitted() {
        let categories = vec![make_category("Cloud", &["azure"])];
        let index = HierarchyIndex::new(&categories);
        let article = make_article("Gardening", "Tomatoes and soil", &[]);
        assert!(score(&article, &categories, &index).unwrap().is_empty());
    }

    #[test]
    fn test_inactive_category_skipped() {
        let mut category = make_category("Cloud", &["azure"]);
        category.active = false;
        let categories = vec![category];
        let index = HierarchyIndex::new(&categories);
        let article = make_article("Azure notes", "", &[]);
        assert!(score(&article, &categories, &index).unwrap().is_empty());
    }

    #[test]
    fn test_tags_count_as_text() {
        let categories = vec![make_category("Cloud", &["azure"])];
        let index = HierarchyIndex::new(&categories);
        let article = make_article("Untitled", "no body", &["Azure"]);
        let suggestions = score(&article, &categories, &index).unwrap();
        assert_eq!(suggestions.len(), 1);
    }

    #[test]
    fn test_inherited_keywords_participate() {
        let parent = make_category("Technology", &["tech"]);
        let child = {
            let mut c = Category::child_of(&parent, "Cloud");
            c.keywords = ["azure".to_string()].into();
            c
        };
        let categories = vec![parent, child];
        let index = HierarchyIndex::new(&categories);
        let article = make_article("tech azure roundup", "", &[]);
        let suggestions = score(&article, &categories, &index).unwrap();
        let child_suggestion = suggestions
            .iter()
            .find(|s| s.category_name == "Cloud")
            .unwrap();
        // 2/2 of the effective set {azure, tech}, capped.
        assert!((child_suggestion.confidence_score - KEYWORD_SCORE_CAP).abs() < 1e-9);
    }
}

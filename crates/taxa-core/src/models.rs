//! Core data models used throughout Taxa.
//!
//! These types represent the categories, articles, and suggestions that flow
//! through the classification pipeline. Categories and articles are owned by
//! the external store; the engine borrows read-only snapshots and returns
//! [`CategorySuggestion`] values for the caller to persist or discard.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A node in the category tree.
///
/// `hierarchy_path` and `hierarchy_level` are caches derived from the parent
/// pointers; [`crate::hierarchy::recompute_paths`] keeps them consistent after
/// a rename or reparent.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: Uuid,
    /// Unique within the tree.
    pub name: String,
    pub description: Option<String>,
    pub keywords: BTreeSet<String>,
    pub parent_id: Option<Uuid>,
    pub active: bool,
    /// Per-category override for the auto-classification cutoff. When unset,
    /// the threshold is inherited (see [`crate::hierarchy::HierarchyIndex`]).
    pub confidence_threshold: Option<f64>,
    pub auto_threshold: f64,
    pub manual_threshold: f64,
    pub inherit_from_parent: bool,
    pub display_order: i32,
    /// Embedding of the category's name/description/keywords, if computed.
    pub embedding: Option<Vec<f32>>,
    /// Slash-joined ancestor names, root to self.
    pub hierarchy_path: String,
    /// 0 = root.
    pub hierarchy_level: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Create a root category with default thresholds and no keywords.
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            keywords: BTreeSet::new(),
            parent_id: None,
            active: true,
            confidence_threshold: None,
            auto_threshold: DEFAULT_AUTO_THRESHOLD,
            manual_threshold: DEFAULT_MANUAL_THRESHOLD,
            inherit_from_parent: true,
            display_order: 0,
            embedding: None,
            hierarchy_path: name.to_string(),
            hierarchy_level: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Create a child of `parent`, with the cached path/level filled in.
    pub fn child_of(parent: &Category, name: &str) -> Self {
        let mut category = Self::new(name);
        category.parent_id = Some(parent.id);
        category.hierarchy_path = format!("{}/{}", parent.hierarchy_path, name);
        category.hierarchy_level = parent.hierarchy_level + 1;
        category
    }
}

/// Default cutoff above which a suggestion is auto-applied.
pub const DEFAULT_AUTO_THRESHOLD: f64 = 0.8;
/// Default cutoff above which a suggestion is surfaced for human review.
pub const DEFAULT_MANUAL_THRESHOLD: f64 = 0.6;

/// A free-text document to classify.
#[derive(Debug, Clone)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    /// Embedding of the title, if computed.
    pub head_embedding: Option<Vec<f32>>,
    /// Embedding of the body text, if computed.
    pub body_embedding: Option<Vec<f32>>,
    pub created_at: DateTime<Utc>,
}

impl Article {
    pub fn new(title: &str, summary: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            summary: summary.to_string(),
            tags: Vec::new(),
            head_embedding: None,
            body_embedding: None,
            created_at: Utc::now(),
        }
    }
}

/// A ranked classification suggestion for one category.
///
/// Serialized as camelCase: this is also the JSON shape the generative
/// client is asked to produce, so the same type deserializes its output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySuggestion {
    pub category_id: Uuid,
    pub category_name: String,
    /// Confidence in `[0.0, 1.0]`.
    pub confidence_score: f64,
    /// Human-readable evidence trail; merged contributions are joined with `"; "`.
    pub reason: String,
    pub exceeds_auto_threshold: bool,
    pub exceeds_manual_threshold: bool,
}

/// Tuning knobs for a classification run.
///
/// All fields carry serde defaults so a partial `[classification]` TOML
/// section deserializes cleanly.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationOptions {
    /// Final confidence at or above which a suggestion may be auto-applied,
    /// unless the category (or an inheriting ancestor) carries its own cutoff.
    #[serde(default = "default_min_auto_score")]
    pub min_auto_classification_score: f64,
    /// Suggestions below this final confidence are dropped entirely.
    #[serde(default = "default_min_suggestion_score")]
    pub min_suggestion_score: f64,
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions_per_article: usize,
    /// Applied to keyword scores before merging.
    #[serde(default = "default_keyword_weight")]
    pub keyword_match_weight: f64,
    /// Applied to semantic scores before merging.
    #[serde(default = "default_semantic_weight")]
    pub semantic_similarity_weight: f64,
    #[serde(default = "default_enable_auto")]
    pub enable_auto_classification: bool,
}

fn default_min_auto_score() -> f64 {
    0.7
}
fn default_min_suggestion_score() -> f64 {
    0.5
}
fn default_max_suggestions() -> usize {
    5
}
fn default_keyword_weight() -> f64 {
    0.3
}
fn default_semantic_weight() -> f64 {
    0.7
}
fn default_enable_auto() -> bool {
    true
}

impl Default for ClassificationOptions {
    fn default() -> Self {
        Self {
            min_auto_classification_score: default_min_auto_score(),
            min_suggestion_score: default_min_suggestion_score(),
            max_suggestions_per_article: default_max_suggestions(),
            keyword_match_weight: default_keyword_weight(),
            semantic_similarity_weight: default_semantic_weight(),
            enable_auto_classification: default_enable_auto(),
        }
    }
}

/// A proposal for a brand-new category, produced by the discovery pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategorySuggestion {
    pub suggested_name: String,
    pub justification: String,
    /// Relevance in `[0.0, 1.0]`.
    pub relevance_score: f64,
    /// Articles that motivated the proposal.
    #[serde(default)]
    pub example_article_ids: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let opts = ClassificationOptions::default();
        assert_eq!(opts.min_auto_classification_score, 0.7);
        assert_eq!(opts.min_suggestion_score, 0.5);
        assert_eq!(opts.max_suggestions_per_article, 5);
        assert_eq!(opts.keyword_match_weight, 0.3);
        assert_eq!(opts.semantic_similarity_weight, 0.7);
        assert!(opts.enable_auto_classification);
    }

    #[test]
    fn test_child_of_fills_cached_path() {
        let root = Category::new("Technology");
        let child = Category::child_of(&root, "Cloud");
        assert_eq!(child.parent_id, Some(root.id));
        assert_eq!(child.hierarchy_path, "Technology/Cloud");
        assert_eq!(child.hierarchy_level, 1);
    }

    #[test]
    fn test_suggestion_wire_shape_is_camel_case() {
        let s = CategorySuggestion {
            category_id: Uuid::nil(),
            category_name: "Cloud".to_string(),
            confidence_score: 0.9,
            reason: "test".to_string(),
            exceeds_auto_threshold: true,
            exceeds_manual_threshold: true,
        };
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("categoryId"));
        assert!(json.contains("confidenceScore"));
        assert!(json.contains("exceedsAutoThreshold"));
    }
}

//! Merging, threshold gating, and ranking of per-scorer suggestions.
//!
//! The aggregator is the single source of truth for threshold decisions:
//! whatever flags the scorers set are overridden here from each category's
//! effective threshold.

use std::collections::HashMap;

use uuid::Uuid;

use crate::error::EngineError;
use crate::hierarchy::HierarchyIndex;
use crate::models::{CategorySuggestion, ClassificationOptions};

/// Merge per-scorer suggestion lists, in order.
///
/// When a category already has an entry, the new confidence is averaged
/// against the accumulated value — `(existing + new) / 2` — and the reasons
/// are joined with `"; "`. Later merges therefore average against the running
/// average, not the original per-scorer scores. That asymmetry is intentional
/// and preserved; merging a single list is a no-op.
pub fn merge(lists: Vec<Vec<CategorySuggestion>>) -> Vec<CategorySuggestion> {
    let mut order: Vec<Uuid> = Vec::new();
    let mut by_category: HashMap<Uuid, CategorySuggestion> = HashMap::new();

    for list in lists {
        for suggestion in list {
            match by_category.get_mut(&suggestion.category_id) {
                Some(existing) => {
                    existing.confidence_score =
                        (existing.confidence_score + suggestion.confidence_score) / 2.0;
                    existing.reason = format!("{}; {}", existing.reason, suggestion.reason);
                }
                None => {
                    order.push(suggestion.category_id);
                    by_category.insert(suggestion.category_id, suggestion);
                }
            }
        }
    }

    order
        .into_iter()
        .filter_map(|id| by_category.remove(&id))
        .collect()
}

/// Gate, rank, and cap merged suggestions.
///
/// Recomputes both threshold flags per category: the auto flag against the
/// category's own or inherited confidence cutoff (falling back to
/// `options.min_auto_classification_score`), the manual flag against the
/// category's manual threshold. Suggestions below `min_suggestion_score` are
/// dropped, the rest sorted by confidence descending and truncated to `cap`.
pub fn finalize(
    merged: Vec<CategorySuggestion>,
    index: &HierarchyIndex<'_>,
    options: &ClassificationOptions,
    cap: usize,
) -> Result<Vec<CategorySuggestion>, EngineError> {
    let mut suggestions = Vec::with_capacity(merged.len());

    for mut suggestion in merged {
        let Some(category) = index.get(suggestion.category_id) else {
            continue;
        };
        let auto_cutoff = index
            .inherited_threshold(category)?
            .unwrap_or(options.min_auto_classification_score);
        suggestion.exceeds_auto_threshold = suggestion.confidence_score >= auto_cutoff;
        suggestion.exceeds_manual_threshold =
            suggestion.confidence_score >= category.manual_threshold;

        if suggestion.confidence_score >= options.min_suggestion_score {
            suggestions.push(suggestion);
        }
    }

    suggestions.sort_by(|a, b| {
        b.confidence_score
            .partial_cmp(&a.confidence_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category_name.cmp(&b.category_name))
            .then_with(|| a.category_id.cmp(&b.category_id))
    });
    suggestions.truncate(cap);

    Ok(suggestions)
}

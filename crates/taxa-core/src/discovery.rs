//! New-category discovery over a pool of uncategorized articles.
//!
//! Two independent passes: exact-tag frequency clustering, and an optional
//! free-form generative pass over raw article text. Candidates from both are
//! consolidated by case-insensitive name.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::generative::GenerativeClient;
use crate::models::{Article, Category, NewCategorySuggestion};

/// A tag must appear on at least this many pooled articles to become a
/// candidate.
pub const MIN_TAG_FREQUENCY: usize = 3;
/// Frequency divisor for tag relevance: `min(1, frequency / 10)`.
pub const TAG_RELEVANCE_DIVISOR: f64 = 10.0;
/// Consolidated suggestions are capped to this many, by relevance.
pub const MAX_DISCOVERY_SUGGESTIONS: usize = 20;

/// How many pooled articles the generative pass sees at most.
const GENERATIVE_POOL_LIMIT: usize = 25;

/// Proposes brand-new categories from a pool of uncategorized or
/// low-confidence articles.
#[derive(Default)]
pub struct CategoryDiscovery {
    generative: Option<Arc<dyn GenerativeClient>>,
}

impl CategoryDiscovery {
    pub fn new() -> Self {
        Self { generative: None }
    }

    pub fn with_generative(client: Arc<dyn GenerativeClient>) -> Self {
        Self {
            generative: Some(client),
        }
    }

    /// Run both passes and consolidate. Best-effort throughout: the
    /// generative pass degrades to nothing on absence, failure, or garbage.
    pub async fn discover(
        &self,
        pool: &[Article],
        existing: &[Category],
    ) -> Vec<NewCategorySuggestion> {
        let existing_names: Vec<String> = existing.iter().map(|c| c.name.to_lowercase()).collect();

        let mut candidates = suggest_from_tags(pool, &existing_names);
        if let Some(client) = self.generative.as_deref() {
            candidates.extend(suggest_from_generative(client, pool, &existing_names).await);
        }

        consolidate(candidates)
    }
}

/// Tag-frequency pass: tags appearing on at least [`MIN_TAG_FREQUENCY`]
/// pooled articles become candidates named from the capitalized tag, with
/// the articles that carried the tag attached as examples.
fn suggest_from_tags(pool: &[Article], existing_names: &[String]) -> Vec<NewCategorySuggestion> {
    let mut by_tag: HashMap<String, (String, Vec<uuid::Uuid>)> = HashMap::new();

    for article in pool {
        for tag in &article.tags {
            let normalized = tag.trim().to_lowercase();
            if normalized.is_empty() {
                continue;
            }
            let entry = by_tag
                .entry(normalized)
                .or_insert_with(|| (tag.trim().to_string(), Vec::new()));
            if !entry.1.contains(&article.id) {
                entry.1.push(article.id);
            }
        }
    }

    let mut suggestions = Vec::new();
    for (normalized, (original, article_ids)) in by_tag {
        if article_ids.len() < MIN_TAG_FREQUENCY {
            continue;
        }
        if existing_names.contains(&normalized) {
            continue;
        }
        let frequency = article_ids.len();
        suggestions.push(NewCategorySuggestion {
            suggested_name: capitalize(&original),
            justification: format!("Tag '{}' appears on {} articles", original, frequency),
            relevance_score: (frequency as f64 / TAG_RELEVANCE_DIVISOR).min(1.0),
            example_article_ids: article_ids,
        });
    }
    suggestions
}

/// Generative pass: free-form proposals from raw article text, independent
/// of the tag path. Tolerates the same JSON fallback as classification.
async fn suggest_from_generative(
    client: &dyn GenerativeClient,
    pool: &[Article],
    existing_names: &[String],
) -> Vec<NewCategorySuggestion> {
    if pool.is_empty() {
        return Vec::new();
    }

    let system = "You suggest new categories for a document taxonomy. Given document \
                  titles and summaries plus the names of existing categories, propose \
                  up to five genuinely new categories. Respond ONLY with a JSON array \
                  of objects shaped as {\"suggestedName\": \"...\", \"justification\": \
                  \"...\", \"relevanceScore\": 0.0}. No markdown."
        .to_string();

    let mut user = String::from("Existing categories:\n");
    for name in existing_names {
        user.push_str(&format!("- {}\n", name));
    }
    user.push_str("\nDocuments:\n");
    for article in pool.iter().take(GENERATIVE_POOL_LIMIT) {
        user.push_str(&format!("- {}: {}\n", article.title, article.summary));
    }

    let raw = match client.complete(&system, &user).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "generative discovery call failed");
            return Vec::new();
        }
    };

    parse_discovery_payload(&raw, existing_names)
}

fn parse_discovery_payload(raw: &str, existing_names: &[String]) -> Vec<NewCategorySuggestion> {
    let trimmed = raw.trim();
    let text = if trimmed.starts_with("```") {
        trimmed
            .lines()
            .skip(1)
            .take_while(|l| !l.starts_with("```"))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        trimmed.to_string()
    };

    let parsed: Vec<NewCategorySuggestion> =
        match serde_json::from_str::<Vec<NewCategorySuggestion>>(&text) {
            Ok(list) => list,
            Err(_) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(_)) => match serde_json::from_str::<NewCategorySuggestion>(&text) {
                    Ok(single) => vec![single],
                    Err(_) => {
                        warn!("generative discovery payload was not valid suggestion JSON");
                        return Vec::new();
                    }
                },
                _ => {
                    warn!("generative discovery payload was not valid suggestion JSON");
                    return Vec::new();
                }
            },
        };

    parsed
        .into_iter()
        .filter(|s| !s.suggested_name.trim().is_empty())
        .filter(|s| !existing_names.contains(&s.suggested_name.to_lowercase()))
        .map(|mut s| {
            s.relevance_score = s.relevance_score.clamp(0.0, 1.0);
            s
        })
        .collect()
}

/// Group candidates by case-insensitive name: average their relevance,
/// concatenate justifications, union example ids; then rank and cap.
fn consolidate(candidates: Vec<NewCategorySuggestion>) -> Vec<NewCategorySuggestion> {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, (NewCategorySuggestion, usize)> = HashMap::new();

    for candidate in candidates {
        let key = candidate.suggested_name.to_lowercase();
        match grouped.get_mut(&key) {
            Some((merged, count)) => {
                *count += 1;
                merged.relevance_score = (merged.relevance_score * (*count - 1) as f64
                    + candidate.relevance_score)
                    / *count as f64;
                merged.justification =
                    format!("{}; {}", merged.justification, candidate.justification);
                for id in candidate.example_article_ids {
                    if !merged.example_article_ids.contains(&id) {
                        merged.example_article_ids.push(id);
                    }
                }
            }
            None => {
                order.push(key.clone());
                grouped.insert(key, (candidate, 1));
            }
        }
    }

    let mut result: Vec<NewCategorySuggestion> = order
        .into_iter()
        .filter_map(|key| grouped.remove(&key).map(|(s, _)| s))
        .collect();
    result.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.suggested_name.cmp(&b.suggested_name))
    });
    result.truncate(MAX_DISCOVERY_SUGGESTIONS);
    result
}

fn capitalize(tag: &str) -> String {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

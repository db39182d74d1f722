//! Generative evidence: a structured prompt to an external chat model.
//!
//! This scorer is best-effort end to end. The client may be absent, the call
//! may fail, and the returned payload may be garbage; none of those conditions
//! propagate as errors. Hallucinated category ids are dropped against the
//! supplied catalog.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::models::{Article, Category, CategorySuggestion};

/// Cap for the direct AI-classification entry point.
pub const GENERATIVE_SUGGESTION_LIMIT: usize = 10;

/// Trait for generative (chat-completion) backends.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Complete a prompt, returning the raw text payload.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Result of the generative scorer: either no backend is configured, or a
/// (possibly empty) list of catalog-validated suggestions.
#[derive(Debug)]
pub enum GenerativeOutcome {
    Disabled,
    Scored(Vec<CategorySuggestion>),
}

impl GenerativeOutcome {
    pub fn into_suggestions(self) -> Vec<CategorySuggestion> {
        match self {
            GenerativeOutcome::Disabled => Vec::new(),
            GenerativeOutcome::Scored(suggestions) => suggestions,
        }
    }
}

/// Result of the tolerant parse pipeline: array shape, then single-object
/// shape, then give up.
#[derive(Debug)]
pub enum ParsedSuggestions {
    Parsed(Vec<CategorySuggestion>),
    Empty,
}

/// Build the deterministic prompt pair (system instruction, user payload).
///
/// The catalog is enumerated in snapshot order so the same inputs always
/// produce the same prompt.
pub fn build_prompt(article: &Article, categories: &[Category]) -> (String, String) {
    let system = "You are a document classification assistant. Given a document and a \
                  list of categories, rate how well the document fits each relevant \
                  category. Respond ONLY with a JSON array of objects shaped as \
                  {\"categoryId\": \"...\", \"categoryName\": \"...\", \"confidenceScore\": 0.0, \
                  \"reason\": \"...\", \"exceedsAutoThreshold\": false, \
                  \"exceedsManualThreshold\": false}. Omit categories that do not fit. \
                  No markdown, no commentary."
        .to_string();

    let mut user = String::from("Categories:\n");
    for category in categories.iter().filter(|c| c.active) {
        user.push_str(&format!(
            "- id: {} | name: {} | description: {} | keywords: {}\n",
            category.id,
            category.name,
            category.description.as_deref().unwrap_or("(none)"),
            category
                .keywords
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
        ));
    }
    user.push_str(&format!(
        "\nDocument title: {}\nDocument text: {}\nTags: {}\n",
        article.title,
        article.summary,
        article.tags.join(", ")
    ));

    (system, user)
}

/// Parse the client's text payload into suggestions.
///
/// Markdown code fences are stripped first. The array shape is tried, then
/// the single-object shape; anything else is `Empty`.
pub fn parse_suggestions(raw: &str) -> ParsedSuggestions {
    let stripped = strip_code_fence(raw);
    let text = stripped.trim();

    if let Ok(list) = serde_json::from_str::<Vec<CategorySuggestion>>(text) {
        return ParsedSuggestions::Parsed(list);
    }
    if let Ok(single) = serde_json::from_str::<CategorySuggestion>(text) {
        return ParsedSuggestions::Parsed(vec![single]);
    }
    ParsedSuggestions::Empty
}

fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        trimmed
            .lines()
            .skip(1)
            .take_while(|l| !l.starts_with("```"))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        trimmed.to_string()
    }
}

/// Run the generative scorer against the article and catalog.
///
/// Returns [`GenerativeOutcome::Disabled`] when no client is configured. A
/// failed call or unparseable payload yields `Scored(vec![])` — the scorer
/// contributed nothing, which is not an error.
pub async fn score(
    client: Option<&dyn GenerativeClient>,
    article: &Article,
    categories: &[Category],
) -> GenerativeOutcome {
    let Some(client) = client else {
        return GenerativeOutcome::Disabled;
    };

    let (system, user) = build_prompt(article, categories);
    let raw = match client.complete(&system, &user).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(article_id = %article.id, error = %e, "generative client call failed");
            return GenerativeOutcome::Scored(Vec::new());
        }
    };

    let parsed = match parse_suggestions(&raw) {
        ParsedSuggestions::Parsed(list) => list,
        ParsedSuggestions::Empty => {
            warn!(article_id = %article.id, "generative payload was not valid suggestion JSON");
            return GenerativeOutcome::Scored(Vec::new());
        }
    };

    let known_ids: HashSet<_> = categories.iter().map(|c| c.id).collect();
    let before = parsed.len();
    let suggestions: Vec<CategorySuggestion> = parsed
        .into_iter()
        .filter(|s| known_ids.contains(&s.category_id))
        .map(|mut s| {
            s.confidence_score = s.confidence_score.clamp(0.0, 1.0);
            s
        })
        .collect();
    if suggestions.len() < before {
        debug!(
            dropped = before - suggestions.len(),
            "dropped generative suggestions for unknown category ids"
        );
    }

    GenerativeOutcome::Scored(suggestions)
}

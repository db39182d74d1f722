//! OpenAI-backed [`EmbeddingClient`] implementation.
//!
//! Calls the `POST /v1/embeddings` endpoint with the configured model.
//! Requires the `OPENAI_API_KEY` environment variable to be set.
//!
//! # Retry Strategy
//!
//! Transient errors use exponential backoff:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::time::Duration;

use taxa_core::embedding::EmbeddingClient;

use crate::config::EmbeddingConfig;

/// Embedding client for the OpenAI embeddings API.
pub struct OpenAiEmbeddingClient {
    model: String,
    dims: usize,
    max_retries: u32,
    timeout: Duration,
    api_key: String,
}

impl OpenAiEmbeddingClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `model` or `dims` is not set in config, or if
    /// `OPENAI_API_KEY` is not in the environment.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("embedding.model required for OpenAI provider"))?;
        let dims = config
            .dims
            .ok_or_else(|| anyhow::anyhow!("embedding.dims required for OpenAI provider"))?;
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;

        Ok(Self {
            model,
            dims,
            max_retries: config.max_retries,
            timeout: Duration::from_secs(config.timeout_secs),
            api_key,
        })
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbeddingClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;

        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, 8s, ...
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = client
                .post("https://api.openai.com/v1/embeddings")
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return parse_embeddings_response(&json);
                    }

                    // Rate limited or server error — retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        tracing::warn!(%status, attempt, "retrying OpenAI embeddings request");
                        last_err =
                            Some(anyhow::anyhow!("OpenAI API error {}: {}", status, body_text));
                        continue;
                    }

                    // Client error (not 429) — don't retry
                    let body_text = response.text().await.unwrap_or_default();
                    bail!("OpenAI API error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Embedding failed after retries")))
    }
}

/// Extract the `data[].embedding` arrays in input order.
fn parse_embeddings_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing data array"))?;

    let mut embeddings = Vec::with_capacity(data.len());

    for item in data {
        let embedding = item
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing embedding"))?;

        let vec: Vec<f32> = embedding
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();

        embeddings.push(vec);
    }

    Ok(embeddings)
}

/// Create the configured embedding client, or `None` for the `disabled`
/// provider — the engine degrades to keyword and generative evidence.
pub fn create_embedding_client(
    config: &EmbeddingConfig,
) -> Result<Option<Box<dyn EmbeddingClient>>> {
    match config.provider.as_str() {
        "disabled" => Ok(None),
        "openai" => Ok(Some(Box::new(OpenAiEmbeddingClient::new(config)?))),
        other => bail!("Unknown embedding provider: {}", other),
    }
}

/// Embed an article's title and body, returning `(head, body)` vectors for
/// the caller to persist on the article.
pub async fn embed_article(
    client: &dyn EmbeddingClient,
    title: &str,
    body: &str,
) -> Result<(Vec<f32>, Vec<f32>)> {
    let texts = vec![title.to_string(), body.to_string()];
    let mut vectors = client.embed(&texts).await?;
    if vectors.len() != 2 {
        bail!("Expected 2 embeddings, got {}", vectors.len());
    }
    let body_vec = vectors.pop().expect("length checked");
    let head_vec = vectors.pop().expect("length checked");
    Ok((head_vec, body_vec))
}

/// Embed a category's name, description, and keywords as one text, for the
/// caller to persist on the category.
pub async fn embed_category(
    client: &dyn EmbeddingClient,
    name: &str,
    description: Option<&str>,
    keywords: &[String],
) -> Result<Vec<f32>> {
    let text = format!(
        "{}. {}. Keywords: {}",
        name,
        description.unwrap_or(""),
        keywords.join(", ")
    );
    let vectors = client.embed(&[text]).await?;
    vectors
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("Empty embedding response"))
}

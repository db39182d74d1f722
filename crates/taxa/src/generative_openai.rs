//! OpenAI-backed [`GenerativeClient`] implementation.
//!
//! Calls the `POST /v1/chat/completions` endpoint with a system instruction
//! and user payload, using the same retry/backoff envelope as the embedding
//! client. The engine tolerates arbitrary text coming back; this client only
//! guarantees delivery, not shape.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use taxa_core::generative::GenerativeClient;

use crate::config::GenerativeConfig;

/// Generative client for the OpenAI chat completions API.
pub struct OpenAiGenerativeClient {
    model: String,
    max_tokens: u32,
    max_retries: u32,
    timeout: Duration,
    api_key: String,
}

impl OpenAiGenerativeClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `model` is not set in config, or if
    /// `OPENAI_API_KEY` is not in the environment.
    pub fn new(config: &GenerativeConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("generative.model required for OpenAI provider"))?;
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;

        Ok(Self {
            model,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
            timeout: Duration::from_secs(config.timeout_secs),
            api_key,
        })
    }
}

#[async_trait]
impl GenerativeClient for OpenAiGenerativeClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = client
                .post("https://api.openai.com/v1/chat/completions")
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
                        return parse_completion_response(&json);
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        tracing::warn!(%status, attempt, "retrying OpenAI completion request");
                        last_err =
                            Some(anyhow::anyhow!("OpenAI API error {}: {}", status, body_text));
                        continue;
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    bail!("OpenAI API error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Completion failed after retries")))
    }
}

/// Extract `choices[0].message.content` from the completions response.
fn parse_completion_response(json: &serde_json::Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
        .map(|t| t.to_string())
        .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing message content"))
}

/// Create the configured generative client, or `None` for the `disabled`
/// provider — the engine degrades to keyword and semantic evidence.
pub fn create_generative_client(
    config: &GenerativeConfig,
) -> Result<Option<Arc<dyn GenerativeClient>>> {
    match config.provider.as_str() {
        "disabled" => Ok(None),
        "openai" => Ok(Some(Arc::new(OpenAiGenerativeClient::new(config)?))),
        other => bail!("Unknown generative provider: {}", other),
    }
}

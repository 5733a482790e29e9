//! Text-generation backend abstraction
//!
//! Provides a unified interface over chat-completion providers so the
//! pipeline stays a pure function of its inputs and tests can substitute
//! a deterministic stub.

use crate::config::GenerationConfig;
use crate::errors::{PipelineError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Trait for text generation
///
/// Implementations must be cancellation-safe: dropping the returned
/// future must abandon the underlying request without side effects.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Complete a prompt into generated text
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// OpenAI-compatible chat-completions client
pub struct OpenAiBackend {
    client: reqwest::Client,
    config: GenerationConfig,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

impl OpenAiBackend {
    /// Create a new backend from configuration
    pub fn new(config: GenerationConfig) -> Result<Self> {
        if config.api_key.as_deref().unwrap_or("").is_empty() {
            return Err(PipelineError::Configuration {
                message: "generation backend requires an API key".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::Configuration {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    /// Make a request with one bounded internal retry on transient failure
    async fn request_with_retry(&self, prompt: &str) -> Result<String> {
        let attempts = self.config.max_retries + 1;
        let mut last_error = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                // Exponential backoff
                let delay = Duration::from_millis(100 * 2_u64.pow(attempt));
                tokio::time::sleep(delay).await;
            }

            match self.make_request(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt + 1 < attempts => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        attempts,
                        error = %e,
                        "Generation request failed, retrying"
                    );
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| PipelineError::Generation {
            message: "unknown error after retries".to_string(),
        }))
    }

    async fn make_request(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.as_deref().unwrap_or("")),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PipelineError::GenerationTimeout {
                        timeout_ms: self.config.timeout_secs * 1000,
                    }
                } else {
                    PipelineError::Generation {
                        message: format!("request failed: {}", e),
                    }
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Upstream {
                status,
                message: body.chars().take(500).collect(),
            });
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            PipelineError::UnusableOutput {
                message: format!("failed to parse completion response: {}", e),
            }
        })?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| PipelineError::UnusableOutput {
                message: "completion response contained no choices".to_string(),
            })?;

        if content.trim().is_empty() {
            return Err(PipelineError::UnusableOutput {
                message: "completion response was empty".to_string(),
            });
        }

        Ok(content)
    }
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let started = std::time::Instant::now();
        let text = self.request_with_retry(prompt).await?;
        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            response_len = text.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Generation complete"
        );
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_requires_api_key() {
        let config = GenerationConfig::default();
        assert!(OpenAiBackend::new(config).is_err());

        let config = GenerationConfig {
            api_key: Some("sk-test".to_string()),
            ..GenerationConfig::default()
        };
        let backend = OpenAiBackend::new(config).unwrap();
        assert_eq!(backend.model_name(), "gpt-4o-mini");
    }
}

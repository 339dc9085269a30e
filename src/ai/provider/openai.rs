//! OpenAI Provider
//!
//! Chat-completions client for OpenAI-compatible endpoints, including
//! Azure-style gateways via a custom `api_base`. Non-success HTTP statuses
//! go through the error classifier, so a 429 surfaces as a distinguishable
//! rate-limit error carrying the server's Retry-After hint.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::{ChatOutcome, LlmProvider, ProviderConfig, ResponseTiming};
use crate::types::{ErrorClassifier, PaperLensError, Result, TokenUsage};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const PROVIDER_NAME: &str = "openai";

/// Provider for OpenAI-compatible chat-completion endpoints
pub struct OpenAiProvider {
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .map(SecretString::from)
            .ok_or_else(|| {
                PaperLensError::Config(
                    "OpenAI API key not found. Set OPENAI_API_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        url::Url::parse(&api_base).map_err(|e| {
            PaperLensError::Config(format!("Invalid api_base '{}': {}", api_base, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PaperLensError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            api_base,
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn build_request(&self, system: &str, user: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
            response_format: Some(ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, system: &str, user: &str) -> Result<ChatOutcome> {
        let started = Instant::now();
        let url = format!("{}/chat/completions", self.api_base);

        debug!(model = %self.model, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&self.build_request(system, user))
            .send()
            .await
            .map_err(|e| {
                ErrorClassifier::classify(&format!("request failed: {}", e), PROVIDER_NAME)
            })?;

        let elapsed = started.elapsed();
        let status = response.status();

        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let body = response.text().await.unwrap_or_default();

            let mut err = ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("OpenAI API error ({}): {}", status.as_u16(), body),
                PROVIDER_NAME,
            );
            if let Some(wait) = retry_after {
                err = err.retry_after(wait);
            }
            warn!(status = status.as_u16(), category = %err.category, "Chat completion failed");
            return Err(err.into());
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|e| {
            PaperLensError::LlmApi(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let usage = body
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens));

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| PaperLensError::LlmApi("No content in OpenAI response".to_string()))?;

        debug!(
            elapsed_ms = elapsed.as_millis() as u64,
            usage_present = usage.is_some(),
            "Chat completion succeeded"
        );

        Ok(ChatOutcome {
            content,
            usage,
            timing: ResponseTiming::from_duration(elapsed),
        })
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Parse a Retry-After header (delta-seconds form only), capped at 5 minutes
fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(|secs| Duration::from_secs(secs.min(300)))
}

// Wire types for the chat-completions endpoint

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_api_base() {
        let config = ProviderConfig {
            api_key: Some("key".to_string()),
            api_base: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(OpenAiProvider::new(config).is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ProviderConfig {
            api_key: Some("sk-super-secret".to_string()),
            ..Default::default()
        };
        let provider = OpenAiProvider::new(config).unwrap();
        let debug = format!("{:?}", provider);
        assert!(!debug.contains("sk-super-secret"));
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::RETRY_AFTER, "12".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(12)));

        headers.insert(reqwest::header::RETRY_AFTER, "9000".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(300)));

        headers.insert(reqwest::header::RETRY_AFTER, "soon".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn test_response_deserializes_without_usage() {
        let body = r#"{"choices":[{"message":{"content":"{}"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.usage.is_none());
        assert_eq!(parsed.choices.len(), 1);
    }
}

//! LLM Provider Abstraction
//!
//! The `LlmProvider` trait is the transport boundary: one system + user
//! message pair in, the raw text payload and billing envelope out. Payload
//! parsing and schema validation belong to the analyzer, not here.

mod openai;

pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::types::{PaperLensError, Result, paper::TokenUsage};

/// One completed chat call: the raw text payload plus billing metadata.
///
/// `usage` is `None` when the service omitted the usage envelope. Callers
/// accumulating token totals must treat that case explicitly rather than
/// assuming zeros.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// Raw text payload from the first choice
    pub content: String,
    /// Token usage from the response envelope, when reported
    pub usage: Option<TokenUsage>,
    /// Response timing
    pub timing: ResponseTiming,
}

/// Wall-clock timing of one call
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseTiming {
    pub total_ms: u64,
}

impl ResponseTiming {
    pub fn from_duration(duration: std::time::Duration) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
        }
    }
}

/// Shared provider handle, injected into the analyzer rather than created per
/// call.
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

/// Provider settings from the `[llm]` config section.
///
/// The API key never serializes back out and is redacted in Debug output;
/// the provider wraps it in a SecretString at construction.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider type: "openai"
    pub provider: String,
    /// Model or deployment name
    pub model: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature (0.0 = deterministic)
    pub temperature: f32,
    /// API key; never serialized back out
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL (custom/Azure-style gateways)
    pub api_base: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            timeout_secs: 120,
            temperature: 0.0,
            api_key: None,
            api_base: None,
            max_tokens: 2048,
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Chat-completion provider boundary.
///
/// `complete` performs exactly one remote call; the retry policy lives in
/// the caller so it can be tested without a network.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one system + user message pair and return the raw outcome
    async fn complete(&self, system: &str, user: &str) -> Result<ChatOutcome>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;
}

/// Build a shared provider handle from configuration
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiProvider::new(config.clone())?)),
        other => Err(PaperLensError::Config(format!(
            "Unknown provider: {}. Supported: openai",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_usage_total() {
        let usage = TokenUsage::new(100, 50);
        assert_eq!(usage.total(), 150);
    }

    #[test]
    fn test_provider_config_debug_redacts_key() {
        let config = ProviderConfig {
            api_key: Some("sk-secret".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_create_provider_rejects_unknown() {
        let config = ProviderConfig {
            provider: "mystery".to_string(),
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        assert!(create_provider(&config).is_err());
    }
}

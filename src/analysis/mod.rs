//! Review Analyzer
//!
//! Sends one paper record to the completion service and turns the reply into
//! parsed analysis fields. Rate limits are retried internally under the
//! injected `RetryPolicy`; every other failure becomes a `RecordFailure`
//! value for the batch loop, never an error that aborts the run.

pub mod prompt;

pub use prompt::{REQUIRED_KEYS, SYSTEM_PROMPT, build_prompt};

use serde_json::Value;
use tracing::{debug, warn};

use crate::ai::{RetryPolicy, SharedProvider};
use crate::types::{AnalysisFields, PaperRecord, RecordFailure, TokenUsage};

/// A successful analysis of one record.
///
/// `usage` mirrors the response envelope: `None` means the service did not
/// report token counts for the successful attempt. The batch loop decides
/// what that means; the analyzer does not paper over it with zeros.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub usage: Option<TokenUsage>,
    pub fields: AnalysisFields,
}

/// Per-record analyzer over an injected provider handle
pub struct ReviewAnalyzer {
    provider: SharedProvider,
    retry: RetryPolicy,
    enforce_schema: bool,
}

impl ReviewAnalyzer {
    pub fn new(provider: SharedProvider, retry: RetryPolicy, enforce_schema: bool) -> Self {
        Self {
            provider,
            retry,
            enforce_schema,
        }
    }

    /// Analyze one record: one logical remote call (rate limits retried
    /// inside), strict JSON parse, optional schema-key validation.
    pub async fn analyze(&self, record: &PaperRecord) -> Result<Analysis, RecordFailure> {
        let user_prompt = build_prompt(record);

        let outcome = self
            .retry
            .run(|| self.provider.complete(SYSTEM_PROMPT, &user_prompt))
            .await
            .map_err(|err| {
                warn!(paper_id = %record.paper_id, error = %err, "Completion call failed");
                RecordFailure::upstream(err.to_string())
            })?;

        let payload = outcome.content.trim();

        // Malformed replies keep their usage envelope: the tokens were billed
        // even though the payload is unusable.
        let value: Value = serde_json::from_str(payload).map_err(|err| {
            debug!(paper_id = %record.paper_id, %err, "Payload is not valid JSON");
            RecordFailure::malformed(format!("JSON decode error: {}", err), payload)
                .with_usage(outcome.usage)
        })?;

        let fields = parse_fields(&value, self.enforce_schema)
            .map_err(|msg| RecordFailure::malformed(msg, payload).with_usage(outcome.usage))?;

        Ok(Analysis {
            usage: outcome.usage,
            fields,
        })
    }
}

/// Extract the four analysis fields from a parsed payload.
///
/// With `enforce_schema`, every required key must be present with the right
/// shape. Without it, any JSON object is accepted and missing or mis-typed
/// keys collapse to empty values (the lenient behavior of only requiring
/// JSON-decodability).
fn parse_fields(value: &Value, enforce_schema: bool) -> Result<AnalysisFields, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| "payload is not a JSON object".to_string())?;

    if enforce_schema {
        for key in REQUIRED_KEYS {
            if !obj.contains_key(key) {
                return Err(format!("missing required key '{}'", key));
            }
        }
        if !obj["concise_summary"].is_string() || !obj["research_methodology"].is_string() {
            return Err("summary/methodology must be strings".to_string());
        }
        for key in ["key_research_questions", "future_research_directions"] {
            if !obj[key].is_array() {
                return Err(format!("'{}' must be an array", key));
            }
        }
    }

    Ok(AnalysisFields {
        concise_summary: json_string(obj.get("concise_summary")),
        research_methodology: json_string(obj.get("research_methodology")),
        key_research_questions: json_string_array(obj.get("key_research_questions")),
        future_research_directions: json_string_array(obj.get("future_research_directions")),
    })
}

fn json_string(value: Option<&Value>) -> String {
    value
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_default()
}

fn json_string_array(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{ChatOutcome, LlmProvider, ResponseTiming};
    use crate::types::error::{ErrorCategory, FailureKind, LlmError};
    use crate::types::{PaperLensError, Result};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    const GOOD_PAYLOAD: &str = r#"{
        "concise_summary": "a summary",
        "research_methodology": "a survey",
        "key_research_questions": ["q1", "q2"],
        "future_research_directions": ["d1"]
    }"#;

    /// Scripted fake provider: pops one canned response per call
    struct FakeProvider {
        responses: std::sync::Mutex<Vec<Result<ChatOutcome>>>,
        calls: AtomicU32,
    }

    impl FakeProvider {
        fn new(responses: Vec<Result<ChatOutcome>>) -> Arc<Self> {
            Arc::new(Self {
                responses: std::sync::Mutex::new(responses),
                calls: AtomicU32::new(0),
            })
        }

        fn ok(content: &str, usage: Option<TokenUsage>) -> Result<ChatOutcome> {
            Ok(ChatOutcome {
                content: content.to_string(),
                usage,
                timing: ResponseTiming::default(),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for FakeProvider {
        async fn complete(&self, _system: &str, _user: &str) -> Result<ChatOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(PaperLensError::LlmApi("script exhausted".to_string()));
            }
            responses.remove(0)
        }

        fn name(&self) -> &str {
            "fake"
        }

        fn model(&self) -> &str {
            "fake-model"
        }
    }

    fn analyzer(provider: Arc<FakeProvider>, enforce_schema: bool) -> ReviewAnalyzer {
        ReviewAnalyzer::new(provider, RetryPolicy::default(), enforce_schema)
    }

    fn record() -> PaperRecord {
        PaperRecord::new("p-1").with_title("T").with_year(2020)
    }

    #[tokio::test]
    async fn test_parses_valid_payload_with_usage() {
        let provider = FakeProvider::new(vec![FakeProvider::ok(
            GOOD_PAYLOAD,
            Some(TokenUsage::new(120, 80)),
        )]);
        let analysis = analyzer(provider, true).analyze(&record()).await.unwrap();

        assert_eq!(analysis.fields.concise_summary, "a summary");
        assert_eq!(analysis.fields.key_research_questions.len(), 2);
        let usage = analysis.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 120);
        assert_eq!(usage.completion_tokens, 80);
    }

    #[tokio::test]
    async fn test_non_json_payload_is_malformed() {
        let provider = FakeProvider::new(vec![FakeProvider::ok(
            "Sorry, I cannot help with that.",
            Some(TokenUsage::new(10, 5)),
        )]);
        let failure = analyzer(provider, true)
            .analyze(&record())
            .await
            .unwrap_err();

        assert_eq!(failure.kind, FailureKind::MalformedResponse);
        assert_eq!(
            failure.raw_payload.as_deref(),
            Some("Sorry, I cannot help with that.")
        );
        // The unusable reply was still billed
        assert_eq!(failure.usage.unwrap().prompt_tokens, 10);
    }

    #[tokio::test]
    async fn test_missing_key_rejected_when_schema_enforced() {
        let payload = r#"{"concise_summary": "only one key"}"#;
        let provider = FakeProvider::new(vec![FakeProvider::ok(payload, None)]);
        let failure = analyzer(provider, true)
            .analyze(&record())
            .await
            .unwrap_err();

        assert_eq!(failure.kind, FailureKind::MalformedResponse);
        assert!(failure.message.contains("research_methodology"));
    }

    #[tokio::test]
    async fn test_missing_key_tolerated_when_schema_not_enforced() {
        let payload = r#"{"concise_summary": "only one key"}"#;
        let provider = FakeProvider::new(vec![FakeProvider::ok(payload, None)]);
        let analysis = analyzer(provider, false).analyze(&record()).await.unwrap();

        assert_eq!(analysis.fields.concise_summary, "only one key");
        assert!(analysis.fields.key_research_questions.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_then_success_uses_final_usage_only() {
        let rate_limited: Result<ChatOutcome> = Err(LlmError::new(
            ErrorCategory::RateLimit,
            "429 too many requests",
        )
        .retry_after(Duration::from_millis(5))
        .into());

        let provider = FakeProvider::new(vec![
            rate_limited,
            FakeProvider::ok(GOOD_PAYLOAD, Some(TokenUsage::new(100, 50))),
        ]);
        let analysis = analyzer(provider.clone(), true)
            .analyze(&record())
            .await
            .unwrap();

        // Counts come from the successful attempt only, not summed
        let usage = analysis.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 100);
        assert_eq!(usage.completion_tokens, 50);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_upstream_error_is_recorded_not_raised() {
        let provider = FakeProvider::new(vec![Err(LlmError::new(
            ErrorCategory::Auth,
            "invalid api key",
        )
        .into())]);
        let failure = analyzer(provider, true)
            .analyze(&record())
            .await
            .unwrap_err();

        assert_eq!(failure.kind, FailureKind::Upstream);
        assert!(failure.message.contains("invalid api key"));
    }

    #[test]
    fn test_parse_fields_rejects_non_object() {
        let value = serde_json::json!(["not", "an", "object"]);
        assert!(parse_fields(&value, false).is_err());
    }
}

//! Error Taxonomy
//!
//! Three tiers, matching the propagation policy: `PaperLensError` for
//! batch-wide fatal conditions, `LlmError` for classified provider failures
//! that drive retry decisions, and `RecordFailure` for per-record outcomes
//! that are written to the failure file and never abort the batch.

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Provider Error Classification
// =============================================================================

/// Category of a provider failure. The retry policy only looks at this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Backpressure from the service; wait and retry
    RateLimit,
    /// Bad or missing credentials; retrying cannot help
    Auth,
    /// Connectivity problems; retry with backoff
    Network,
    /// The request itself was rejected; retrying sends the same request
    BadRequest,
    /// The response envelope could not be decoded
    ParseError,
    /// Server-side hiccup that may clear on its own
    Transient,
    /// Anything unrecognized; treated as non-retryable
    Unknown,
}

impl ErrorCategory {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimit | Self::Network | Self::Transient)
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::RateLimit => "RATE_LIMIT",
            Self::Auth => "AUTH",
            Self::Network => "NETWORK",
            Self::BadRequest => "BAD_REQUEST",
            Self::ParseError => "PARSE_ERROR",
            Self::Transient => "TRANSIENT",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// A classified provider failure, with an optional server wait hint
#[derive(Debug, Clone)]
pub struct LlmError {
    pub category: ErrorCategory,
    pub message: String,
    pub provider: Option<String>,
    /// Wait suggested by the service (Retry-After), honored for rate limits
    pub retry_after: Option<Duration>,
}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
            retry_after: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            provider: Some(provider.into()),
            ..Self::new(category, message)
        }
    }

    pub fn retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.provider {
            Some(provider) => write!(f, "[{}:{}] {}", provider, self.category, self.message),
            None => write!(f, "[{}] {}", self.category, self.message),
        }
    }
}

impl std::error::Error for LlmError {}

/// Message substrings mapped to categories, checked in order. Used when no
/// HTTP status is available (e.g. the request never left the client).
const MESSAGE_PATTERNS: &[(&[&str], ErrorCategory)] = &[
    (
        &["rate limit", "429", "too many requests", "quota exceeded"],
        ErrorCategory::RateLimit,
    ),
    (
        &["auth", "401", "403", "api key", "invalid key", "unauthorized"],
        ErrorCategory::Auth,
    ),
    (
        &["network", "connection", "dns", "timeout", "timed out", "unreachable"],
        ErrorCategory::Network,
    ),
    (
        &["400", "bad request", "malformed"],
        ErrorCategory::BadRequest,
    ),
    (
        &["parse", "json", "unexpected token"],
        ErrorCategory::ParseError,
    ),
    (
        &["500", "502", "503", "overloaded", "temporary", "server error"],
        ErrorCategory::Transient,
    ),
];

/// Maps raw failures onto `ErrorCategory`
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify from the error message alone
    pub fn classify(message: &str, provider: &str) -> LlmError {
        let lower = message.to_lowercase();
        let category = MESSAGE_PATTERNS
            .iter()
            .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
            .map(|(_, category)| *category)
            .unwrap_or(ErrorCategory::Unknown);

        let err = LlmError::with_provider(category, message, provider);
        match category {
            ErrorCategory::RateLimit => err.retry_after(Duration::from_secs(30)),
            ErrorCategory::Network => err.retry_after(Duration::from_secs(5)),
            ErrorCategory::Transient => err.retry_after(Duration::from_secs(2)),
            _ => err,
        }
    }

    /// Classify from the HTTP status; preferred when a response was received
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        let category = match status {
            429 => ErrorCategory::RateLimit,
            401 | 403 => ErrorCategory::Auth,
            400 | 404 | 422 => ErrorCategory::BadRequest,
            500..=504 => ErrorCategory::Transient,
            _ => ErrorCategory::Unknown,
        };

        let err = LlmError::with_provider(category, message, provider);
        match category {
            ErrorCategory::RateLimit => err.retry_after(Duration::from_secs(30)),
            ErrorCategory::Transient => err.retry_after(Duration::from_secs(5)),
            _ => err,
        }
    }
}

// =============================================================================
// Per-Record Failures
// =============================================================================

/// Kinds of per-record failures recorded in the failure output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Response payload was not valid JSON, or required keys were missing
    MalformedResponse,
    /// Transport/service failure, or retry budget exhausted
    Upstream,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedResponse => f.write_str("malformed response"),
            Self::Upstream => f.write_str("upstream error"),
        }
    }
}

/// A per-record failure value. Converted into a `FailureRecord` by the batch
/// loop; never propagated as an error across the batch boundary.
#[derive(Debug, Clone)]
pub struct RecordFailure {
    pub kind: FailureKind,
    pub message: String,
    /// Raw response payload kept for diagnostics on malformed responses
    pub raw_payload: Option<String>,
    /// Usage envelope of the failed call, when a response was received.
    /// Malformed replies still cost tokens; those counts feed the totals.
    pub usage: Option<crate::types::paper::TokenUsage>,
}

impl RecordFailure {
    /// Malformed-response failure carrying the raw payload for diagnostics
    pub fn malformed(message: impl Into<String>, raw_payload: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::MalformedResponse,
            message: message.into(),
            raw_payload: Some(raw_payload.into()),
            usage: None,
        }
    }

    /// Upstream transport/service failure
    pub fn upstream(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Upstream,
            message: message.into(),
            raw_payload: None,
            usage: None,
        }
    }

    /// Attach the usage envelope of the failed call
    pub fn with_usage(mut self, usage: Option<crate::types::paper::TokenUsage>) -> Self {
        self.usage = usage;
        self
    }
}

impl std::fmt::Display for RecordFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl From<LlmError> for RecordFailure {
    fn from(err: LlmError) -> Self {
        RecordFailure::upstream(err.to_string())
    }
}

// =============================================================================
// Application Error
// =============================================================================

/// Batch-wide fatal errors. Per-record conditions never reach this type.
#[derive(Debug, Error)]
pub enum PaperLensError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Classified provider error with retry hints
    #[error("LLM error: {0}")]
    Llm(LlmError),

    /// Unclassified provider error (use Llm where a category is known)
    #[error("LLM API error: {0}")]
    LlmApi(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl From<LlmError> for PaperLensError {
    fn from(err: LlmError) -> Self {
        PaperLensError::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, PaperLensError>;

// =============================================================================
// Tests
// =============================================================================

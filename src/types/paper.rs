//! Paper Data Model
//!
//! Input records, parsed analysis results, and per-record failure rows.
//! All types are serde-serializable so they round-trip through the CSV and
//! JSON output writers without hand-written mapping.

use serde::{Deserialize, Serialize};

use crate::types::error::RecordFailure;

/// One row of input paper metadata. Immutable once read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperRecord {
    pub paper_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub publication_year: Option<i32>,
}

impl PaperRecord {
    pub fn new(paper_id: impl Into<String>) -> Self {
        Self {
            paper_id: paper_id.into(),
            title: String::new(),
            abstract_text: String::new(),
            publication_year: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_abstract(mut self, abstract_text: impl Into<String>) -> Self {
        self.abstract_text = abstract_text.into();
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.publication_year = Some(year);
        self
    }
}

/// The four analysis fields requested from the completion service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisFields {
    #[serde(default)]
    pub concise_summary: String,
    #[serde(default)]
    pub research_methodology: String,
    #[serde(default)]
    pub key_research_questions: Vec<String>,
    #[serde(default)]
    pub future_research_directions: Vec<String>,
}

/// A successfully analyzed record, tagged with its paper id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub paper_id: String,
    #[serde(flatten)]
    pub fields: AnalysisFields,
}

impl AnalysisResult {
    pub fn new(paper_id: impl Into<String>, fields: AnalysisFields) -> Self {
        Self {
            paper_id: paper_id.into(),
            fields,
        }
    }
}

/// A failed record, tagged with its paper id and the failure message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    pub paper_id: String,
    pub error: String,
}

impl FailureRecord {
    pub fn new(paper_id: impl Into<String>, failure: &RecordFailure) -> Self {
        Self {
            paper_id: paper_id.into(),
            error: failure.to_string(),
        }
    }
}

/// Token usage reported by one completion call's response envelope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens (prompt)
    pub prompt_tokens: u64,
    /// Output tokens (completion)
    pub completion_tokens: u64,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    /// Total tokens used (prompt + completion)
    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Running prompt/completion token totals, owned by the batch loop and read
/// once at the end by the cost estimator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageTotals {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl UsageTotals {
    pub fn add(&mut self, usage: TokenUsage) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(usage.prompt_tokens);
        self.completion_tokens = self
            .completion_tokens
            .saturating_add(usage.completion_tokens);
    }

    pub fn total(&self) -> u64 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

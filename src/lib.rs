//! PaperLens - Batch Academic Paper Analyzer
//!
//! Sends rows of paper metadata to an LLM completion service for structured
//! analysis, aggregates token usage into a cost estimate, and partitions the
//! results into success/failure output files.
//!
//! ## Quick Start
//!
//! ```ignore
//! use paperlens::ai::{RetryPolicy, create_provider};
//! use paperlens::analysis::ReviewAnalyzer;
//! use paperlens::batch::{BatchOptions, BatchProcessor};
//! use paperlens::config::ConfigLoader;
//!
//! let config = ConfigLoader::load()?;
//! let provider = create_provider(&config.llm)?;
//! let analyzer = ReviewAnalyzer::new(provider, RetryPolicy::from(&config.retry), true);
//! let processor = BatchProcessor::new(analyzer, BatchOptions::from(&config.batch));
//! let outcome = processor.process(records).await;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: LLM provider abstraction and the bounded retry policy
//! - [`analysis`]: prompt construction and response parsing per record
//! - [`batch`]: ordered batch orchestration with usage accumulation
//! - [`cost`]: per-1k-token cost estimation
//! - [`io`]: CSV input and result persistence
//! - [`config`]: layered configuration (defaults, files, env)

pub mod ai;
pub mod analysis;
pub mod batch;
pub mod cli;
pub mod config;
pub mod cost;
pub mod io;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{Config, ConfigLoader};

pub use types::error::{
    ErrorCategory, FailureKind, LlmError, PaperLensError, RecordFailure, Result,
};
pub use types::paper::{
    AnalysisFields, AnalysisResult, FailureRecord, PaperRecord, TokenUsage, UsageTotals,
};

pub use ai::{LlmProvider, OpenAiProvider, RetryPolicy, SharedProvider, create_provider};
pub use analysis::ReviewAnalyzer;
pub use batch::{BatchOptions, BatchOutcome, BatchProcessor};
pub use cost::{CostBreakdown, CostEstimator};
pub use io::{ResultWriter, read_records};

pub mod error;
pub mod paper;

pub use error::{
    ErrorCategory, ErrorClassifier, FailureKind, LlmError, PaperLensError, RecordFailure, Result,
};
pub use paper::{
    AnalysisFields, AnalysisResult, FailureRecord, PaperRecord, TokenUsage, UsageTotals,
};

//! AI Layer
//!
//! Provider abstraction over chat-completion endpoints, plus the bounded
//! retry policy applied to every remote call.

pub mod provider;
pub mod retry;

pub use provider::{
    ChatOutcome, LlmProvider, OpenAiProvider, ProviderConfig, ResponseTiming, SharedProvider,
    create_provider,
};
pub use retry::RetryPolicy;

//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/paperlens/) and project (paperlens.toml)
//! level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::ai::{ProviderConfig, RetryPolicy};
use crate::batch::BatchOptions;
use crate::cost::{CostEstimator, DEFAULT_INPUT_RATE_PER_1K, DEFAULT_OUTPUT_RATE_PER_1K};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider settings
    pub llm: ProviderConfig,

    /// Retry policy for provider calls
    pub retry: RetryConfig,

    /// Batch execution settings
    pub batch: BatchConfig,

    /// Cost estimation rates
    pub cost: CostConfig,

    /// Response parsing settings
    pub analysis: AnalysisConfig,

    /// Output file settings
    pub output: OutputConfig,
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `PaperLensError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(crate::types::PaperLensError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(crate::types::PaperLensError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(crate::types::PaperLensError::Config(
                "retry max_attempts must be at least 1".to_string(),
            ));
        }

        if self.retry.backoff_factor < 1.0 {
            return Err(crate::types::PaperLensError::Config(format!(
                "retry backoff_factor must be >= 1.0, got {}",
                self.retry.backoff_factor
            )));
        }

        if self.batch.concurrency == 0 {
            return Err(crate::types::PaperLensError::Config(
                "batch concurrency must be at least 1".to_string(),
            ));
        }

        if self.cost.input_rate_per_1k < 0.0 || self.cost.output_rate_per_1k < 0.0 {
            return Err(crate::types::PaperLensError::Config(
                "cost rates must be non-negative".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Retry Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum attempts per record, including the first
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds
    pub base_delay_ms: u64,
    /// Cap on any single delay, in seconds
    pub max_delay_secs: u64,
    /// Backoff multiplier per attempt
    pub backoff_factor: f64,
    /// Budget on total wait per record, in seconds
    pub max_total_wait_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 500,
            max_delay_secs: 30,
            backoff_factor: 2.0,
            max_total_wait_secs: 120,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_secs(config.max_delay_secs),
            backoff_factor: config.backoff_factor,
            max_total_wait: Duration::from_secs(config.max_total_wait_secs),
        }
    }
}

// =============================================================================
// Batch Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Concurrent in-flight requests (1 = sequential)
    pub concurrency: usize,
    /// Optional wall-clock budget for the whole batch, in seconds
    pub deadline_secs: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            deadline_secs: None,
        }
    }
}

impl From<&BatchConfig> for BatchOptions {
    fn from(config: &BatchConfig) -> Self {
        Self {
            concurrency: config.concurrency,
            deadline: config.deadline_secs.map(Duration::from_secs),
        }
    }
}

// =============================================================================
// Cost Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// USD per 1k prompt tokens
    pub input_rate_per_1k: f64,
    /// USD per 1k completion tokens
    pub output_rate_per_1k: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            input_rate_per_1k: DEFAULT_INPUT_RATE_PER_1K,
            output_rate_per_1k: DEFAULT_OUTPUT_RATE_PER_1K,
        }
    }
}

impl From<&CostConfig> for CostEstimator {
    fn from(config: &CostConfig) -> Self {
        CostEstimator::new(config.input_rate_per_1k, config.output_rate_per_1k)
    }
}

// =============================================================================
// Analysis Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Require all four analysis keys with the right shapes.
    /// When false, any JSON object is accepted and missing keys collapse to
    /// empty values.
    pub enforce_schema: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            enforce_schema: true,
        }
    }
}

// =============================================================================
// Output Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for result files
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("results"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_negative_rates() {
        let mut config = Config::default();
        config.cost.input_rate_per_1k = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.batch.concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_temperature() {
        let mut config = Config::default();
        config.llm.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retry_config_converts_to_policy() {
        let config = RetryConfig {
            max_attempts: 3,
            base_delay_ms: 250,
            max_delay_secs: 10,
            backoff_factor: 3.0,
            max_total_wait_secs: 60,
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
        assert_eq!(policy.max_total_wait, Duration::from_secs(60));
    }
}

//! Cost Estimation
//!
//! Pure per-1k-token cost arithmetic over the batch's accumulated usage
//! totals. Rates come from configuration so price changes never require a
//! code change.

use serde::{Deserialize, Serialize};

use crate::types::UsageTotals;

/// Default USD rate per 1k prompt tokens
pub const DEFAULT_INPUT_RATE_PER_1K: f64 = 0.00015;
/// Default USD rate per 1k completion tokens
pub const DEFAULT_OUTPUT_RATE_PER_1K: f64 = 0.00060;

/// Cost breakdown for one batch, in USD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
}

/// Deterministic cost estimator with fixed per-1k-token rates
#[derive(Debug, Clone, Copy)]
pub struct CostEstimator {
    input_rate_per_1k: f64,
    output_rate_per_1k: f64,
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self {
            input_rate_per_1k: DEFAULT_INPUT_RATE_PER_1K,
            output_rate_per_1k: DEFAULT_OUTPUT_RATE_PER_1K,
        }
    }
}

impl CostEstimator {
    /// Create an estimator with explicit rates (USD per 1k tokens).
    /// Rates are validated non-negative at config load time.
    pub fn new(input_rate_per_1k: f64, output_rate_per_1k: f64) -> Self {
        Self {
            input_rate_per_1k,
            output_rate_per_1k,
        }
    }

    /// Estimate the cost of the given token counts
    pub fn estimate(&self, prompt_tokens: u64, completion_tokens: u64) -> CostBreakdown {
        let input_cost = (prompt_tokens as f64 / 1000.0) * self.input_rate_per_1k;
        let output_cost = (completion_tokens as f64 / 1000.0) * self.output_rate_per_1k;
        CostBreakdown {
            input_cost,
            output_cost,
            total_cost: input_cost + output_cost,
        }
    }

    /// Estimate from accumulated batch totals
    pub fn estimate_totals(&self, totals: &UsageTotals) -> CostBreakdown {
        self.estimate(totals.prompt_tokens, totals.completion_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_tokens_cost_nothing() {
        let cost = CostEstimator::default().estimate(0, 0);
        assert_eq!(cost.input_cost, 0.0);
        assert_eq!(cost.output_cost, 0.0);
        assert_eq!(cost.total_cost, 0.0);
    }

    #[test]
    fn test_default_rates_at_1k_each() {
        let cost = CostEstimator::default().estimate(1000, 1000);
        assert!((cost.input_cost - 0.00015).abs() < 1e-12);
        assert!((cost.output_cost - 0.00060).abs() < 1e-12);
        assert!((cost.total_cost - 0.00075).abs() < 1e-12);
    }

    #[test]
    fn test_estimate_from_totals() {
        let totals = UsageTotals {
            prompt_tokens: 2000,
            completion_tokens: 500,
        };
        let cost = CostEstimator::default().estimate_totals(&totals);
        assert!((cost.input_cost - 0.00030).abs() < 1e-12);
        assert!((cost.output_cost - 0.00030).abs() < 1e-12);
    }

    #[test]
    fn test_custom_rates() {
        let cost = CostEstimator::new(3.0, 15.0).estimate(1000, 500);
        assert!((cost.input_cost - 3.0).abs() < 1e-9);
        assert!((cost.output_cost - 7.5).abs() < 1e-9);
        assert!((cost.total_cost - 10.5).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_input_cost_is_additive(a in 0u64..1_000_000, b in 0u64..1_000_000, c in 0u64..1_000_000) {
            let est = CostEstimator::default();
            let combined = est.estimate(a + b, c).input_cost;
            let split = est.estimate(a, c).input_cost + est.estimate(b, 0).input_cost;
            prop_assert!((combined - split).abs() < 1e-9);
        }

        #[test]
        fn prop_total_is_sum_of_parts(p in 0u64..10_000_000, c in 0u64..10_000_000) {
            let cost = CostEstimator::default().estimate(p, c);
            prop_assert!((cost.total_cost - (cost.input_cost + cost.output_cost)).abs() < 1e-12);
        }
    }
}

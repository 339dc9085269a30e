//! Estimate Command
//!
//! Pure cost arithmetic over given token counts, using the configured rates.

use crate::cli::output::Output;
use crate::config::ConfigLoader;
use crate::cost::CostEstimator;
use crate::types::Result;

pub fn run(prompt_tokens: u64, completion_tokens: u64) -> Result<()> {
    let config = ConfigLoader::load()?;
    let estimator = CostEstimator::from(&config.cost);
    let cost = estimator.estimate(prompt_tokens, completion_tokens);

    let out = Output::new();
    out.section("Cost estimate");
    out.kv("Prompt tokens", &prompt_tokens.to_string());
    out.kv("Completion tokens", &completion_tokens.to_string());
    out.kv("Input cost", &format!("${:.5}", cost.input_cost));
    out.kv("Output cost", &format!("${:.5}", cost.output_cost));
    out.kv("Total cost", &format!("${:.5}", cost.total_cost));

    Ok(())
}

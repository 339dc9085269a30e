//! Run Command
//!
//! The batch driver: reads the input table, processes every record against
//! the completion service, writes the success/failure partitions, and prints
//! the usage and cost summary.

use std::path::PathBuf;
use std::time::Instant;

use chrono::Local;
use tracing::info;

use crate::ai::{RetryPolicy, create_provider};
use crate::analysis::ReviewAnalyzer;
use crate::batch::{BatchOptions, BatchOutcome, BatchProcessor};
use crate::cli::output::Output;
use crate::config::{Config, ConfigLoader};
use crate::cost::{CostBreakdown, CostEstimator};
use crate::io::{ResultWriter, read_records};
use crate::types::Result;

/// CLI overrides applied on top of the resolved config
#[derive(Debug, Default)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub concurrency: Option<usize>,
    pub deadline_secs: Option<u64>,
}

pub fn run(options: RunOptions) -> Result<()> {
    let mut config = ConfigLoader::load()?;
    apply_overrides(&mut config, &options);
    config.validate()?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_batch(config, &options.input))
}

fn apply_overrides(config: &mut Config, options: &RunOptions) {
    if let Some(provider) = &options.provider {
        config.llm.provider = provider.clone();
    }
    if let Some(model) = &options.model {
        config.llm.model = Some(model.clone());
    }
    if let Some(output) = &options.output {
        config.output.dir = output.clone();
    }
    if let Some(concurrency) = options.concurrency {
        config.batch.concurrency = concurrency;
    }
    if let Some(deadline) = options.deadline_secs {
        config.batch.deadline_secs = Some(deadline);
    }
}

async fn run_batch(config: Config, input: &PathBuf) -> Result<()> {
    let out = Output::new();
    let started = Instant::now();

    info!(started_at = %Local::now().to_rfc3339(), input = %input.display(), "Starting run");

    let records = read_records(input)?;
    if records.is_empty() {
        out.warning("Input table has no records, nothing to do");
        return Ok(());
    }

    let provider = create_provider(&config.llm)?;
    out.info(&format!(
        "Analyzing {} records with {} ({})",
        records.len(),
        provider.name(),
        provider.model()
    ));

    let analyzer = ReviewAnalyzer::new(
        provider,
        RetryPolicy::from(&config.retry),
        config.analysis.enforce_schema,
    );
    let processor = BatchProcessor::new(analyzer, BatchOptions::from(&config.batch));

    let outcome = processor
        .process_with_progress(records, |done, total| out.progress(done, total))
        .await;
    out.progress_done();

    let estimator = CostEstimator::from(&config.cost);
    let cost = estimator.estimate_totals(&outcome.totals);

    let writer = ResultWriter::new(&config.output.dir);
    let files = writer.write(&outcome.successes, &outcome.failures)?;

    render_summary(&out, &outcome, &cost, started.elapsed().as_secs_f64() / 60.0);

    out.success(&format!(
        "Results written to {}",
        config.output.dir.display()
    ));
    if !outcome.failures.is_empty() {
        out.warning(&format!(
            "{} records failed, details in {}",
            outcome.failures.len(),
            files.failures_csv.display()
        ));
    }

    Ok(())
}

fn render_summary(out: &Output, outcome: &BatchOutcome, cost: &CostBreakdown, minutes: f64) {
    out.section("Batch summary");
    out.kv("Records processed", &outcome.len().to_string());
    out.kv("Successes", &outcome.successes.len().to_string());
    out.kv("Failures", &outcome.failures.len().to_string());
    out.kv("Prompt tokens", &outcome.totals.prompt_tokens.to_string());
    out.kv(
        "Completion tokens",
        &outcome.totals.completion_tokens.to_string(),
    );
    out.kv("Total tokens", &outcome.totals.total().to_string());
    out.kv("Input cost", &format!("${:.5}", cost.input_cost));
    out.kv("Output cost", &format!("${:.5}", cost.output_cost));
    out.kv("Total cost", &format!("${:.5}", cost.total_cost));
    out.kv("Duration", &format!("{:.2} mins", minutes));
}

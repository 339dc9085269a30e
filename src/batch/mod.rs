//! Batch Processor
//!
//! Drives the analyzer over every input record, accumulating token totals and
//! partitioning results into successes and failures. Every record yields
//! exactly one output row; per-record failures never abort the batch.
//!
//! Concurrency is a bounded fan-out over `futures::stream::buffered`, which
//! preserves input order in the output collections. An optional per-batch
//! deadline converts unfinished records into failures instead of hanging.

use std::time::Duration;

use futures::StreamExt;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::analysis::ReviewAnalyzer;
use crate::types::{AnalysisResult, FailureRecord, PaperRecord, RecordFailure, UsageTotals};

/// Batch execution options
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Concurrent in-flight requests (1 = sequential)
    pub concurrency: usize,
    /// Wall-clock budget for the whole batch
    pub deadline: Option<Duration>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            deadline: None,
        }
    }
}

/// Result of one batch run
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub totals: UsageTotals,
    pub successes: Vec<AnalysisResult>,
    pub failures: Vec<FailureRecord>,
}

impl BatchOutcome {
    /// Total rows produced (always equals the input size)
    pub fn len(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Batch orchestrator over an analyzer
pub struct BatchProcessor {
    analyzer: ReviewAnalyzer,
    options: BatchOptions,
}

impl BatchProcessor {
    pub fn new(analyzer: ReviewAnalyzer, options: BatchOptions) -> Self {
        Self { analyzer, options }
    }

    /// Process all records in input order
    pub async fn process(&self, records: Vec<PaperRecord>) -> BatchOutcome {
        self.process_with_progress(records, |_, _| {}).await
    }

    /// Process all records, invoking `progress(done, total)` as each record
    /// completes (in input order).
    pub async fn process_with_progress<F>(
        &self,
        records: Vec<PaperRecord>,
        mut progress: F,
    ) -> BatchOutcome
    where
        F: FnMut(usize, usize),
    {
        let total = records.len();
        let deadline = self.options.deadline.map(|d| Instant::now() + d);
        let concurrency = self.options.concurrency.max(1);

        info!(total, concurrency, "Starting batch");

        let analyzer = &self.analyzer;
        let mut stream = futures::stream::iter(records.into_iter().map(move |record| {
            async move {
                let paper_id = record.paper_id.clone();
                let result = match deadline {
                    Some(at) => match tokio::time::timeout_at(at, analyzer.analyze(&record)).await
                    {
                        Ok(result) => result,
                        Err(_) => Err(RecordFailure::upstream("batch deadline exceeded")),
                    },
                    None => analyzer.analyze(&record).await,
                };
                (paper_id, result)
            }
        }))
        .buffered(concurrency);

        let mut outcome = BatchOutcome::default();

        while let Some((paper_id, result)) = stream.next().await {
            match result {
                Ok(analysis) => match analysis.usage {
                    Some(usage) => {
                        outcome.totals.add(usage);
                        debug!(%paper_id, prompt = usage.prompt_tokens, completion = usage.completion_tokens, "Record analyzed");
                        outcome
                            .successes
                            .push(AnalysisResult::new(&paper_id, analysis.fields));
                    }
                    None => {
                        // A successful parse without a usage envelope means the
                        // service broke its contract; record it, don't crash.
                        warn!(%paper_id, "Success without usage envelope, recording as failure");
                        let failure =
                            RecordFailure::upstream("usage envelope missing from response");
                        outcome
                            .failures
                            .push(FailureRecord::new(&paper_id, &failure));
                    }
                },
                Err(failure) => {
                    if let Some(usage) = failure.usage {
                        outcome.totals.add(usage);
                    }
                    warn!(%paper_id, error = %failure, "Record failed");
                    outcome
                        .failures
                        .push(FailureRecord::new(&paper_id, &failure));
                }
            }
            progress(outcome.len(), total);
        }

        info!(
            successes = outcome.successes.len(),
            failures = outcome.failures.len(),
            prompt_tokens = outcome.totals.prompt_tokens,
            completion_tokens = outcome.totals.completion_tokens,
            "Batch finished"
        );

        outcome
    }
}

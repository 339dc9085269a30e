//! Result Writer
//!
//! Persists the success/failure partitions: CSV for both sets plus a pretty,
//! record-oriented JSON file for successes. Empty collections still produce
//! valid files (header-only CSV, `[]` JSON).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::types::{AnalysisResult, FailureRecord, PaperLensError, Result};

/// Paths of the files produced by one write
#[derive(Debug, Clone)]
pub struct WrittenFiles {
    pub successes_csv: PathBuf,
    pub successes_json: PathBuf,
    pub failures_csv: PathBuf,
}

/// Writes both result sets under a single output directory
pub struct ResultWriter {
    output_dir: PathBuf,
}

/// Flattened success row for the tabular output; list fields are joined
/// so each record stays one CSV line.
#[derive(Serialize)]
struct SuccessRow<'a> {
    paper_id: &'a str,
    concise_summary: &'a str,
    research_methodology: &'a str,
    key_research_questions: String,
    future_research_directions: String,
}

impl ResultWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Persist both partitions. Any I/O or serialization failure aborts with
    /// an error; no partial silent output.
    pub fn write(
        &self,
        successes: &[AnalysisResult],
        failures: &[FailureRecord],
    ) -> Result<WrittenFiles> {
        fs::create_dir_all(&self.output_dir).map_err(|e| {
            PaperLensError::Output(format!(
                "cannot create output directory '{}': {}",
                self.output_dir.display(),
                e
            ))
        })?;

        let files = WrittenFiles {
            successes_csv: self.output_dir.join("successful_responses.csv"),
            successes_json: self.output_dir.join("successful_responses.json"),
            failures_csv: self.output_dir.join("failed_responses.csv"),
        };

        self.write_successes_csv(&files.successes_csv, successes)?;
        self.write_successes_json(&files.successes_json, successes)?;
        self.write_failures_csv(&files.failures_csv, failures)?;

        info!(
            successes = successes.len(),
            failures = failures.len(),
            dir = %self.output_dir.display(),
            "Wrote result files"
        );
        Ok(files)
    }

    fn write_successes_csv(&self, path: &Path, successes: &[AnalysisResult]) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .map_err(|e| output_error(path, e))?;

        if successes.is_empty() {
            // Serde-based header inference needs at least one record, so the
            // header row is written explicitly for the empty case.
            writer
                .write_record([
                    "paper_id",
                    "concise_summary",
                    "research_methodology",
                    "key_research_questions",
                    "future_research_directions",
                ])
                .map_err(|e| output_error(path, e))?;
        }

        for result in successes {
            let row = SuccessRow {
                paper_id: &result.paper_id,
                concise_summary: &result.fields.concise_summary,
                research_methodology: &result.fields.research_methodology,
                key_research_questions: result.fields.key_research_questions.join("; "),
                future_research_directions: result.fields.future_research_directions.join("; "),
            };
            writer.serialize(row).map_err(|e| output_error(path, e))?;
        }

        writer.flush().map_err(|e| output_error(path, e))?;
        Ok(())
    }

    fn write_successes_json(&self, path: &Path, successes: &[AnalysisResult]) -> Result<()> {
        let json = serde_json::to_string_pretty(successes)?;
        fs::write(path, json).map_err(|e| output_error(path, e))?;
        Ok(())
    }

    fn write_failures_csv(&self, path: &Path, failures: &[FailureRecord]) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .map_err(|e| output_error(path, e))?;

        if failures.is_empty() {
            writer
                .write_record(["paper_id", "error"])
                .map_err(|e| output_error(path, e))?;
        }

        for failure in failures {
            writer.serialize(failure).map_err(|e| output_error(path, e))?;
        }

        writer.flush().map_err(|e| output_error(path, e))?;
        Ok(())
    }
}

fn output_error(path: &Path, err: impl std::fmt::Display) -> PaperLensError {
    PaperLensError::Output(format!("cannot write '{}': {}", path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnalysisFields;
    use tempfile::TempDir;

    fn success(id: &str) -> AnalysisResult {
        AnalysisResult::new(
            id,
            AnalysisFields {
                concise_summary: "summary".to_string(),
                research_methodology: "method".to_string(),
                key_research_questions: vec!["q1".to_string(), "q2".to_string()],
                future_research_directions: vec!["d1".to_string()],
            },
        )
    }

    #[test]
    fn test_writes_all_three_files() {
        let dir = TempDir::new().unwrap();
        let writer = ResultWriter::new(dir.path());
        let failures = vec![FailureRecord {
            paper_id: "p2".to_string(),
            error: "upstream error: 503".to_string(),
        }];

        let files = writer.write(&[success("p1")], &failures).unwrap();

        let csv_content = fs::read_to_string(&files.successes_csv).unwrap();
        assert!(csv_content.contains("p1"));
        assert!(csv_content.contains("q1; q2"));

        let json: Vec<serde_json::Value> =
            serde_json::from_str(&fs::read_to_string(&files.successes_json).unwrap()).unwrap();
        assert_eq!(json[0]["paper_id"], "p1");
        assert_eq!(json[0]["key_research_questions"][0], "q1");

        let failures_content = fs::read_to_string(&files.failures_csv).unwrap();
        assert!(failures_content.contains("p2"));
        assert!(failures_content.contains("503"));
    }

    #[test]
    fn test_empty_collections_produce_valid_files() {
        let dir = TempDir::new().unwrap();
        let files = ResultWriter::new(dir.path()).write(&[], &[]).unwrap();

        let csv_content = fs::read_to_string(&files.successes_csv).unwrap();
        assert!(csv_content.starts_with("paper_id,"));

        let json_content = fs::read_to_string(&files.successes_json).unwrap();
        assert_eq!(json_content.trim(), "[]");

        let failures_content = fs::read_to_string(&files.failures_csv).unwrap();
        assert_eq!(failures_content.trim(), "paper_id,error");
    }

    #[test]
    fn test_unwritable_directory_is_an_error() {
        let writer = ResultWriter::new("/proc/paperlens-cannot-write-here");
        assert!(writer.write(&[], &[]).is_err());
    }

    #[test]
    fn test_creates_nested_output_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b/results");
        let files = ResultWriter::new(&nested).write(&[success("p1")], &[]).unwrap();
        assert!(files.successes_json.exists());
    }
}

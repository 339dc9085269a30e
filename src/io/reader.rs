//! Input Table Reader
//!
//! Reads paper records from a CSV file with the required columns
//! `paper_id`, `title`, `abstract`, `publication_year`.

use std::path::Path;

use tracing::info;

use crate::types::{PaperLensError, PaperRecord, Result};

const REQUIRED_COLUMNS: [&str; 4] = ["paper_id", "title", "abstract", "publication_year"];

/// Read all records from the input table, in source order.
///
/// Missing columns or undecodable rows abort the run; there is no partial
/// batch from a broken table.
pub fn read_records(path: &Path) -> Result<Vec<PaperRecord>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        PaperLensError::Input(format!("cannot read input table '{}': {}", path.display(), e))
    })?;

    let headers = reader
        .headers()
        .map_err(|e| PaperLensError::Input(format!("cannot read header row: {}", e)))?;

    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(PaperLensError::Input(format!(
                "input table is missing required column '{}'",
                column
            )));
        }
    }

    let mut records = Vec::new();
    for (idx, row) in reader.deserialize::<PaperRecord>().enumerate() {
        let record = row.map_err(|e| {
            PaperLensError::Input(format!("row {}: {}", idx + 2, e)) // +2: header and 1-based
        })?;
        records.push(record);
    }

    info!(count = records.len(), path = %path.display(), "Read input records");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_records_in_order() {
        let file = write_csv(
            "paper_id,title,abstract,publication_year\n\
             p1,First,About first,2020\n\
             p2,Second,About second,2021\n",
        );
        let records = read_records(file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].paper_id, "p1");
        assert_eq!(records[0].abstract_text, "About first");
        assert_eq!(records[1].publication_year, Some(2021));
    }

    #[test]
    fn test_empty_fields_allowed() {
        let file = write_csv(
            "paper_id,title,abstract,publication_year\n\
             p1,,,\n",
        );
        let records = read_records(file.path()).unwrap();

        assert_eq!(records[0].title, "");
        assert_eq!(records[0].publication_year, None);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let file = write_csv("paper_id,title\np1,Only two columns\n");
        let err = read_records(file.path()).unwrap_err();
        assert!(err.to_string().contains("abstract"));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = read_records(Path::new("/nonexistent/input.csv")).unwrap_err();
        assert!(matches!(err, PaperLensError::Input(_)));
    }
}

//! Output formatting and persistence for derived records.
//!
//! Supports pretty-printing, JSON logging, and CSV tables.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use csv::WriterBuilder;
use std::fmt::Debug;
use std::fs::OpenOptions;
use std::path::Path;

/// Logs a record using Rust's debug pretty-print format.
pub fn print_pretty<T: Debug>(record: &T) {
    debug!("{:#?}", record);
}

/// Logs a record as pretty-printed JSON.
pub fn print_json<T: Serialize>(record: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}

/// Appends a record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV record");

    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}

/// Writes `rows` under `headers`, replacing any existing file.
pub fn write_table(path: &Path, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
    debug!(path = %path.display(), rows = rows.len(), "Writing CSV table");

    let mut writer = WriterBuilder::new()
        .flexible(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::types::YearSummary;
    use std::fs;

    fn summary() -> YearSummary {
        YearSummary {
            year: Some(2024),
            total_constituencies: 543,
            leading_party: Some("Bharatiya Janta Party".to_string()),
            leading_seats: 240,
            avg_turnout: Some(65.79),
        }
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&summary());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&summary()).unwrap();
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");

        append_record(&path, &summary()).unwrap();
        append_record(&path, &summary()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        // 1 header + 2 data rows
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "year,total_constituencies,leading_party,leading_seats,avg_turnout"
        );
        assert_eq!(lines[1], "2024,543,Bharatiya Janta Party,240,65.79");
    }

    #[test]
    fn test_write_table_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        let headers = vec!["Party".to_string(), "2019".to_string()];

        write_table(&path, &headers, &[vec!["P".to_string(), "3".to_string()]]).unwrap();
        write_table(&path, &headers, &[vec!["Q, R".to_string(), "1".to_string()]]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Party,2019\n\"Q, R\",1\n");
    }

    #[test]
    fn test_write_table_rejects_ragged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragged.csv");
        let headers = vec!["a".to_string(), "b".to_string()];
        assert!(write_table(&path, &headers, &[vec!["1".to_string()]]).is_err());
    }
}

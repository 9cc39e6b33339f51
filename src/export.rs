//! JSON export of an assembled result set
//!
//! One document per run, per-term records plus named failures, for external
//! charting or spreadsheet tooling.

use crate::analysis_core::SearchResultSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Serialization(err)
    }
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "IO error: {}", e),
            ExportError::Serialization(e) => write!(f, "serialization error: {}", e),
        }
    }
}

impl std::error::Error for ExportError {}

pub fn write_result_set(path: &Path, set: &SearchResultSet) -> Result<(), ExportError> {
    let document: Vec<serde_json::Value> = set
        .reports
        .iter()
        .map(|report| match &report.outcome {
            Ok(result) => serde_json::json!({
                "term": report.term,
                "result": result,
            }),
            Err(e) => serde_json::json!({
                "term": report.term,
                "error": e.to_string(),
            }),
        })
        .collect();

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &document)?;
    writer.flush()?;
    log::info!("Wrote result set to {}", path.display());
    Ok(())
}

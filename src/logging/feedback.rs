// Feedback log for fine-tuning data collection
//
// Each verdict or correction appends an immutable snapshot of the exchange.
// The log lives in memory; `export` writes the whole log as CSV on demand.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Clinician verdict on a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Correct => write!(f, "Correct"),
            Verdict::Incorrect => write!(f, "Incorrect"),
        }
    }
}

/// Snapshot of one exchange at the moment feedback was given
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub question: String,
    pub response: String,
    /// Label of the model that produced the response
    pub model: String,
    /// Always exported, blank until a verdict is given
    pub feedback: Option<Verdict>,
    /// Only exported once some record carries a correction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_response: Option<String>,
}

/// Append-only sequence of feedback snapshots
#[derive(Debug, Clone, Default)]
pub struct FeedbackLog {
    records: Vec<FeedbackRecord>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: FeedbackRecord) -> &FeedbackRecord {
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[FeedbackRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column set: union of serialized fields, in order of first appearance
    pub fn columns(&self) -> Result<Vec<String>> {
        let mut columns: Vec<String> = Vec::new();
        for row in self.rows()? {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        Ok(columns)
    }

    fn rows(&self) -> Result<Vec<Map<String, Value>>> {
        self.records
            .iter()
            .map(|record| match serde_json::to_value(record)? {
                Value::Object(map) => Ok(map),
                other => anyhow::bail!("feedback record serialized as {other}"),
            })
            .collect()
    }

    /// Write every record as one CSV row, replacing `path`.
    ///
    /// Returns the number of data rows written. An empty log produces an
    /// empty file.
    pub fn export(&self, path: &Path) -> Result<usize> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create export directory: {}", parent.display())
            })?;
        }

        let rows = self.rows()?;
        let columns = self.columns()?;

        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        if !columns.is_empty() {
            writer
                .write_record(&columns)
                .context("Failed to write header")?;
        }

        for row in &rows {
            let cells = columns.iter().map(|column| cell(row.get(column)));
            writer
                .write_record(cells)
                .context("Failed to write feedback row")?;
        }

        writer.flush().context("Failed to flush feedback export")?;
        debug!("Exported {} feedback records to {}", rows.len(), path.display());

        Ok(rows.len())
    }
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(
        question: &str,
        feedback: Option<Verdict>,
        correction: Option<&str>,
    ) -> FeedbackRecord {
        FeedbackRecord {
            question: question.to_string(),
            response: format!("answer to {question}"),
            model: "BitFit".to_string(),
            feedback,
            corrected_response: correction.map(str::to_string),
        }
    }

    fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = csv::Reader::from_path(path).unwrap();
        let header = reader.headers().unwrap().iter().map(str::to_string).collect();
        let rows = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();
        (header, rows)
    }

    #[test]
    fn test_columns_without_corrections() {
        let mut log = FeedbackLog::new();
        log.append(record("q1", Some(Verdict::Correct), None));
        assert_eq!(
            log.columns().unwrap(),
            vec!["question", "response", "model", "feedback"]
        );
    }

    #[test]
    fn test_columns_union_includes_correction() {
        let mut log = FeedbackLog::new();
        log.append(record("q1", Some(Verdict::Correct), None));
        log.append(record("q2", None, Some("better answer")));
        assert_eq!(
            log.columns().unwrap(),
            vec!["question", "response", "model", "feedback", "corrected_response"]
        );
    }

    #[test]
    fn test_export_blank_cells_for_missing_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feedback_data.csv");

        let mut log = FeedbackLog::new();
        log.append(record("q1", Some(Verdict::Incorrect), None));
        log.append(record("q1", Some(Verdict::Incorrect), Some("use amlodipine")));

        assert_eq!(log.export(&path).unwrap(), 2);

        let (header, rows) = read_csv(&path);
        assert_eq!(header.len(), 5);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["q1", "answer to q1", "BitFit", "Incorrect", ""]);
        assert_eq!(rows[1][4], "use amlodipine");
    }

    #[test]
    fn test_export_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feedback_data.csv");
        std::fs::write(&path, "stale,content\n1,2\n3,4\n5,6\n").unwrap();

        let mut log = FeedbackLog::new();
        log.append(record("q1", None, Some("fix")));
        log.export(&path).unwrap();

        let (header, rows) = read_csv(&path);
        assert_eq!(header[0], "question");
        assert_eq!(rows.len(), 1);
        // verdict column present but blank
        assert_eq!(rows[0][3], "");
    }

    #[test]
    fn test_export_empty_log_writes_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.csv");

        assert_eq!(FeedbackLog::new().export(&path).unwrap(), 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_export_preserves_embedded_delimiters() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        let mut log = FeedbackLog::new();
        log.append(record("BP, in \"adolescents\"\nwith CKD", Some(Verdict::Correct), None));
        log.export(&path).unwrap();

        let (_, rows) = read_csv(&path);
        assert_eq!(rows[0][0], "BP, in \"adolescents\"\nwith CKD");
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::Correct.to_string(), "Correct");
        assert_eq!(Verdict::Incorrect.to_string(), "Incorrect");
    }
}

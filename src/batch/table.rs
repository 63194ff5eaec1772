//! In-memory CSV table with a header row.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::models::AggregateResult;

/// Column names whose presence marks a likely free-text column.
const TEXT_COLUMN_KEYWORDS: [&str; 7] = [
    "feedback",
    "comment",
    "review",
    "response",
    "text",
    "message",
    "description",
];

/// Sample values at most this long are not considered free text.
const MIN_TEXT_SAMPLE_CHARS: usize = 5;

/// A CSV file loaded into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Read a CSV file. Short rows are padded with empty cells; rows wider
    /// than the header are an error.
    pub fn read(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
        Self::from_reader(&mut reader)
            .with_context(|| format!("Failed to read CSV file: {}", path.display()))
    }

    fn from_reader<R: std::io::Read>(reader: &mut csv::Reader<R>) -> Result<Self> {
        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        if headers.is_empty() {
            bail!("CSV file has no header row");
        }

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() > headers.len() {
                bail!(
                    "Row {} has {} fields but the header has only {}",
                    i + 1,
                    record.len(),
                    headers.len()
                );
            }
            let mut row: Vec<String> = record.iter().map(String::from).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    /// Parse CSV data from a string.
    #[cfg(test)]
    pub fn parse(data: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(data.as_bytes());
        Self::from_reader(&mut reader)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Pick the column most likely to hold free text.
    ///
    /// Candidates are columns whose first non-empty value is longer than
    /// five characters; a candidate named like "feedback" or "comment" wins,
    /// otherwise the first candidate.
    pub fn detect_text_column(&self) -> Option<usize> {
        let candidates: Vec<usize> = (0..self.headers.len())
            .filter(|&col| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .find(|v| !v.trim().is_empty())
                    .is_some_and(|v| v.trim().chars().count() > MIN_TEXT_SAMPLE_CHARS)
            })
            .collect();

        candidates
            .iter()
            .copied()
            .find(|&col| {
                let name = self.headers[col].to_lowercase();
                TEXT_COLUMN_KEYWORDS.iter().any(|k| name.contains(k))
            })
            .or_else(|| candidates.first().copied())
    }

    /// All values of a column; missing cells read as empty text.
    pub fn column_values(&self, col: usize) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.get(col).cloned().unwrap_or_default())
            .collect()
    }

    /// Write results into `<prefix>`, `<prefix>_confidence` and
    /// `<prefix>_method` columns.
    ///
    /// Existing columns with those names are an error unless `overwrite`
    /// is set, in which case they are replaced in place.
    pub fn apply_results(
        &mut self,
        prefix: &str,
        results: &[AggregateResult],
        overwrite: bool,
    ) -> Result<()> {
        if results.len() != self.rows.len() {
            bail!(
                "Result count {} does not match row count {}",
                results.len(),
                self.rows.len()
            );
        }

        let names = output_column_names(prefix);
        let existing: Vec<&String> = names
            .iter()
            .filter(|n| self.column_index(n).is_some())
            .collect();
        if !existing.is_empty() && !overwrite {
            bail!(
                "Output column '{}' already exists; use --overwrite or choose another --output-column",
                existing[0]
            );
        }

        let indices: Vec<usize> = names.iter().map(|n| self.ensure_column(n)).collect();

        for (row, result) in self.rows.iter_mut().zip(results) {
            row[indices[0]] = result.label.to_string();
            row[indices[1]] = format!("{:.3}", result.confidence);
            row[indices[2]] = result.method.clone();
        }

        Ok(())
    }

    /// Index of `name`, appending an empty column if it is missing.
    fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.headers.push(name.to_string());
        let width = self.headers.len();
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
        width - 1
    }

    /// Write the table as CSV.
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;

        Ok(())
    }
}

/// The three result column names for a prefix.
pub fn output_column_names(prefix: &str) -> [String; 3] {
    [
        prefix.to_string(),
        format!("{}_confidence", prefix),
        format!("{}_method", prefix),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SentimentLabel;
    use tempfile::TempDir;

    fn result(label: SentimentLabel, confidence: f64) -> AggregateResult {
        AggregateResult {
            label,
            confidence,
            method: "ensemble(valence)".to_string(),
        }
    }

    #[test]
    fn test_parse_pads_short_rows() {
        let table = CsvTable::parse("id,comment,agent\n1,Great help\n2,Slow,Bob\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0], vec!["1", "Great help", ""]);
    }

    #[test]
    fn test_parse_rejects_rows_wider_than_header() {
        let err = CsvTable::parse("id,comment\n1,Great help\n2,Slow,EXTRA\n").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Row 2"));
        assert!(message.contains("3 fields"));
    }

    #[test]
    fn test_detect_prefers_keyword_column() {
        let table = CsvTable::parse(
            "agent_name,customer_feedback,ticket\nJulie Smith,Very helpful and quick,T-1\n",
        )
        .unwrap();
        assert_eq!(table.detect_text_column(), Some(1));
    }

    #[test]
    fn test_detect_falls_back_to_first_text_column() {
        let table = CsvTable::parse("id,notes,body\n1,short,Long enough body text\n").unwrap();
        assert_eq!(table.detect_text_column(), Some(2));
    }

    #[test]
    fn test_detect_skips_empty_leading_cells() {
        let table = CsvTable::parse("id,remarks\n1,\n2,The agent was rude to me\n").unwrap();
        assert_eq!(table.detect_text_column(), Some(1));
    }

    #[test]
    fn test_detect_none_for_numeric_table() {
        let table = CsvTable::parse("a,b\n1,2\n3,4\n").unwrap();
        assert_eq!(table.detect_text_column(), None);
    }

    #[test]
    fn test_apply_results_appends_columns() {
        let mut table = CsvTable::parse("id,comment\n1,Great help\n2,Slow\n").unwrap();
        let results = vec![
            result(SentimentLabel::Positive, 0.8123),
            result(SentimentLabel::Negative, 0.4),
        ];

        table.apply_results("comment_sentiment", &results, false).unwrap();

        assert_eq!(
            table.headers,
            vec![
                "id",
                "comment",
                "comment_sentiment",
                "comment_sentiment_confidence",
                "comment_sentiment_method"
            ]
        );
        assert_eq!(table.rows[0][2], "Positive");
        assert_eq!(table.rows[0][3], "0.812");
        assert_eq!(table.rows[1][2], "Negative");
    }

    #[test]
    fn test_existing_output_column_requires_overwrite() {
        let mut table = CsvTable::parse("comment,comment_sentiment\nGreat help,old\n").unwrap();
        let results = vec![result(SentimentLabel::Positive, 0.9)];

        assert!(table.apply_results("comment_sentiment", &results, false).is_err());

        table.apply_results("comment_sentiment", &results, true).unwrap();
        assert_eq!(table.headers.len(), 4);
        assert_eq!(table.rows[0][1], "Positive");
    }

    #[test]
    fn test_result_count_mismatch() {
        let mut table = CsvTable::parse("comment\nGreat help\n").unwrap();
        assert!(table.apply_results("s", &[], false).is_err());
    }

    #[test]
    fn test_write_and_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        let table = CsvTable::parse("id,comment\n1,\"Hello, world\"\n").unwrap();

        table.write(&path).unwrap();
        let loaded = CsvTable::read(&path).unwrap();

        assert_eq!(loaded, table);
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(CsvTable::read(&temp_dir.path().join("missing.csv")).is_err());
    }
}

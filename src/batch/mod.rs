//! Batch analysis of CSV files.
//!
//! Rows are independent, so they are analysed with bounded concurrency;
//! results always come back in input order.

pub mod progress;
pub mod table;

pub use progress::BatchProgress;
pub use table::CsvTable;

use crate::analysis::Ensemble;
use crate::models::{AggregateResult, AnalyzedRecord};
use anyhow::{anyhow, Result};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Text column; auto-detected when `None`.
    pub column: Option<String>,
    /// Result column prefix; `<column>_sentiment` when `None`.
    pub output_column: Option<String>,
    /// Destination CSV; `<input stem>_sentiment.csv` when `None`.
    pub output: Option<PathBuf>,
    pub overwrite: bool,
    pub concurrency: usize,
    pub progress_interval: usize,
    pub show_progress: bool,
}

/// What a batch run produced.
#[derive(Debug)]
pub struct BatchOutcome {
    pub column: String,
    pub output_column: String,
    pub output: PathBuf,
    pub records: Vec<AnalyzedRecord>,
    pub duration_seconds: f64,
}

/// Analyse texts in order with at most `concurrency` in flight.
pub async fn analyze_texts(
    ensemble: &Ensemble,
    texts: &[String],
    concurrency: usize,
    progress: &mut BatchProgress,
) -> Vec<AggregateResult> {
    let mut results = Vec::with_capacity(texts.len());

    let mut stream = stream::iter(texts.iter())
        .map(|text| ensemble.analyze(text))
        .buffered(concurrency.max(1));

    while let Some(result) = stream.next().await {
        results.push(result);
        progress.tick();
    }

    results
}

/// Default CSV destination next to the input file.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "results".to_string());
    input.with_file_name(format!("{}_sentiment.csv", stem))
}

/// Resolve which column holds the text to analyse.
fn resolve_column(table: &CsvTable, requested: Option<&str>) -> Result<usize> {
    match requested {
        Some(name) => table.column_index(name).ok_or_else(|| {
            anyhow!(
                "Column '{}' not found. Available columns: {}",
                name,
                table.headers.join(", ")
            )
        }),
        None => table.detect_text_column().ok_or_else(|| {
            anyhow!("No text column found; pass --column to choose one explicitly")
        }),
    }
}

/// Analyse one CSV file and write the annotated copy.
pub async fn run_batch(ensemble: &Ensemble, input: &Path, options: &BatchOptions) -> Result<BatchOutcome> {
    let mut table = CsvTable::read(input)?;
    info!(
        "Loaded {}: {} rows, {} columns",
        input.display(),
        table.len(),
        table.headers.len()
    );

    if table.is_empty() {
        warn!("{} has no data rows", input.display());
    }

    let col = resolve_column(&table, options.column.as_deref())?;
    let column = table.headers[col].clone();
    let output_column = options
        .output_column
        .clone()
        .unwrap_or_else(|| format!("{}_sentiment", column));
    info!("Analysing column '{}' into '{}'", column, output_column);

    let texts = table.column_values(col);

    let mut progress = BatchProgress::new(
        texts.len(),
        options.progress_interval,
        options.show_progress,
    );
    let results = analyze_texts(ensemble, &texts, options.concurrency, &mut progress).await;
    let duration_seconds = progress.finish();

    table.apply_results(&output_column, &results, options.overwrite)?;

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input));
    table.write(&output)?;
    info!("Wrote {} rows to {}", table.len(), output.display());

    let records = texts
        .into_iter()
        .zip(results)
        .enumerate()
        .map(|(row, (text, result))| AnalyzedRecord { row, text, result })
        .collect();

    Ok(BatchOutcome {
        column,
        output_column,
        output,
        records,
        duration_seconds,
    })
}

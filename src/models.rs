//! Data models for the sentiment classifier.
//!
//! This module contains the core data structures used throughout the
//! application for representing judgments, ensemble results and reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sentiment label assigned to a text.
///
/// The declaration order is the tie-break order used by the ensemble:
/// Positive wins over Negative, Negative wins over Neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// All labels in tie-break order.
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    /// Returns an emoji representation of the label.
    pub fn emoji(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "😊",
            SentimentLabel::Negative => "😞",
            SentimentLabel::Neutral => "😐",
        }
    }

    /// Position in [`SentimentLabel::ALL`], used to index score arrays.
    pub fn index(&self) -> usize {
        match self {
            SentimentLabel::Positive => 0,
            SentimentLabel::Negative => 1,
            SentimentLabel::Neutral => 2,
        }
    }

    /// Parse a one-word verdict such as `"positive"` or `" Negative."`.
    pub fn from_verdict(s: &str) -> Option<Self> {
        let word = s
            .trim()
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        match word.as_str() {
            "positive" => Some(SentimentLabel::Positive),
            "negative" => Some(SentimentLabel::Negative),
            "neutral" => Some(SentimentLabel::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "Positive"),
            SentimentLabel::Negative => write!(f, "Negative"),
            SentimentLabel::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Priority tier of a judgment source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTier {
    /// Model-based source (transformer, LLM); takes the primary weight.
    Model,
    /// Lexicon or keyword based source.
    Lexicon,
}

/// A single classifier's verdict for one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    pub label: SentimentLabel,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Identifier of the classifier that produced this judgment.
    pub source: String,
    pub tier: SourceTier,
}

impl Judgment {
    /// Create a judgment, clamping confidence into [0, 1].
    pub fn new(
        label: SentimentLabel,
        confidence: f64,
        source: impl Into<String>,
        tier: SourceTier,
    ) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            label,
            confidence,
            source: source.into(),
            tier,
        }
    }

    /// Shorthand for a lexicon-tier judgment.
    pub fn lexicon(label: SentimentLabel, confidence: f64, source: impl Into<String>) -> Self {
        Self::new(label, confidence, source, SourceTier::Lexicon)
    }

    /// Shorthand for a model-tier judgment.
    pub fn model(label: SentimentLabel, confidence: f64, source: impl Into<String>) -> Self {
        Self::new(label, confidence, source, SourceTier::Model)
    }
}

/// Final ensemble decision for one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub label: SentimentLabel,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Provenance: which sources contributed.
    pub method: String,
}

impl AggregateResult {
    /// Neutral result with confidence 0.5 and the given provenance.
    pub fn neutral(method: &str) -> Self {
        Self {
            label: SentimentLabel::Neutral,
            confidence: 0.5,
            method: method.to_string(),
        }
    }
}

/// One analysed text from a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedRecord {
    /// Zero-based row index in the input.
    pub row: usize,
    pub text: String,
    pub result: AggregateResult,
}

/// Distribution statistics over a batch of results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    /// Mean confidence over all results.
    pub average_confidence: f64,
    /// Results with confidence above 0.7.
    pub high_confidence: usize,
    /// Count of results per provenance string.
    pub by_method: BTreeMap<String, usize>,
}

/// Threshold above which a result counts as high confidence.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.7;

impl BatchSummary {
    /// Compute summary statistics from a list of results.
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a AggregateResult>) -> Self {
        let mut summary = BatchSummary::default();
        let mut confidence_sum = 0.0;

        for result in results {
            summary.total += 1;
            match result.label {
                SentimentLabel::Positive => summary.positive += 1,
                SentimentLabel::Negative => summary.negative += 1,
                SentimentLabel::Neutral => summary.neutral += 1,
            }
            confidence_sum += result.confidence;
            if result.confidence > HIGH_CONFIDENCE_THRESHOLD {
                summary.high_confidence += 1;
            }
            *summary.by_method.entry(result.method.clone()).or_default() += 1;
        }

        if summary.total > 0 {
            summary.average_confidence = confidence_sum / summary.total as f64;
        }

        summary
    }

    /// Number of results with the given label.
    pub fn count(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }

    /// Share of `count` in the total, as a percentage.
    pub fn percentage(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }
}

/// Metadata about a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Input file (or "samples" for the built-in texts).
    pub input: String,
    /// Text column analysed.
    pub column: String,
    /// Output column prefix written to the CSV.
    pub output_column: String,
    pub analysis_date: DateTime<Utc>,
    /// Classifiers that were configured for the run.
    pub classifiers: Vec<String>,
    pub records_analyzed: usize,
    pub duration_seconds: f64,
}

impl ReportMetadata {
    /// Throughput in texts per second.
    pub fn texts_per_second(&self) -> f64 {
        if self.duration_seconds > 0.0 {
            self.records_analyzed as f64 / self.duration_seconds
        } else {
            0.0
        }
    }
}

/// Complete batch report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub summary: BatchSummary,
    /// Negative results, most confident first, for follow-up.
    pub attention: Vec<AnalyzedRecord>,
    pub recommendations: Vec<String>,
}

impl Report {
    /// Build a report from batch records.
    pub fn new(metadata: ReportMetadata, records: &[AnalyzedRecord], attention_limit: usize) -> Self {
        let summary = BatchSummary::from_results(records.iter().map(|r| &r.result));

        let mut attention: Vec<AnalyzedRecord> = records
            .iter()
            .filter(|r| r.result.label == SentimentLabel::Negative)
            .cloned()
            .collect();
        attention.sort_by(|a, b| {
            b.result
                .confidence
                .total_cmp(&a.result.confidence)
                .then_with(|| a.row.cmp(&b.row))
        });
        attention.truncate(attention_limit);

        let mut recommendations = Vec::new();
        if summary.negative > 0 {
            recommendations.push("Negative sentiment items may need priority attention.".to_string());
        }
        let low_confidence = summary.total - summary.high_confidence;
        if low_confidence > 0 {
            recommendations.push(format!(
                "{} low-confidence items may need manual review.",
                low_confidence
            ));
        }

        Self {
            metadata,
            summary,
            attention,
            recommendations,
        }
    }
}

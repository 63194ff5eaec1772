//! Markdown and JSON report generation.
//!
//! This module turns a batch [`Report`] into a human-readable Markdown
//! summary or pretty-printed JSON.

use crate::models::{BatchSummary, Report, ReportMetadata, SentimentLabel, HIGH_CONFIDENCE_THRESHOLD};
use anyhow::Result;

/// Texts in the attention table are shortened to this many characters.
const EXCERPT_CHARS: usize = 80;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# Sentiment Analysis Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_distribution_section(&report.summary));
    output.push_str(&generate_confidence_section(&report.summary));
    output.push_str(&generate_method_section(&report.summary));
    output.push_str(&generate_attention_section(report));
    output.push_str(&generate_recommendations_section(&report.recommendations));
    output.push_str(&generate_footer());

    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Input:** {}\n", metadata.input));
    section.push_str(&format!("- **Text Column:** `{}`\n", metadata.column));
    section.push_str(&format!(
        "- **Output Column:** `{}`\n",
        metadata.output_column
    ));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Classifiers:** {}\n",
        metadata.classifiers.join(", ")
    ));
    section.push_str(&format!(
        "- **Records Analyzed:** {}\n",
        metadata.records_analyzed
    ));
    section.push_str(&format!(
        "- **Duration:** {:.2}s ({:.1} texts/sec)\n",
        metadata.duration_seconds,
        metadata.texts_per_second()
    ));
    section.push('\n');

    section
}

fn generate_distribution_section(summary: &BatchSummary) -> String {
    let mut section = String::new();

    section.push_str("## Distribution\n\n");
    section.push_str("| Sentiment | Count | Share |\n");
    section.push_str("|:---|:---:|:---:|\n");

    for label in SentimentLabel::ALL {
        let count = summary.count(label);
        section.push_str(&format!(
            "| {} {} | {} | {:.1}% |\n",
            label.emoji(),
            label,
            count,
            summary.percentage(count)
        ));
    }
    section.push_str(&format!("| **Total** | **{}** | |\n\n", summary.total));

    section
}

fn generate_confidence_section(summary: &BatchSummary) -> String {
    let mut section = String::new();

    section.push_str("## Confidence\n\n");
    section.push_str(&format!(
        "- **Average Confidence:** {:.3}\n",
        summary.average_confidence
    ));
    section.push_str(&format!(
        "- **High Confidence (>{}):** {} ({:.1}%)\n\n",
        HIGH_CONFIDENCE_THRESHOLD,
        summary.high_confidence,
        summary.percentage(summary.high_confidence)
    ));

    section
}

fn generate_method_section(summary: &BatchSummary) -> String {
    if summary.by_method.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Methods\n\n");
    section.push_str("| Method | Results |\n");
    section.push_str("|:---|:---:|\n");

    let mut methods: Vec<_> = summary.by_method.iter().collect();
    methods.sort_by_key(|(_, count)| std::cmp::Reverse(*count));

    for (method, count) in methods {
        section.push_str(&format!("| `{}` | {} |\n", method, count));
    }
    section.push('\n');

    section
}

fn generate_attention_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("## Needs Attention\n\n");

    if report.attention.is_empty() {
        section.push_str("No negative feedback was found. 🎉\n\n");
        return section;
    }

    section.push_str("| Row | Confidence | Text |\n");
    section.push_str("|:---:|:---:|:---|\n");

    for record in &report.attention {
        section.push_str(&format!(
            "| {} | {:.3} | {} |\n",
            record.row + 1,
            record.result.confidence,
            excerpt(&record.text)
        ));
    }
    section.push('\n');

    section
}

/// Single-line, table-safe excerpt of a text.
fn excerpt(text: &str) -> String {
    let flat: String = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|");

    if flat.chars().count() > EXCERPT_CHARS {
        let cut: String = flat.chars().take(EXCERPT_CHARS).collect();
        format!("{}…", cut)
    } else {
        flat
    }
}

fn generate_recommendations_section(recommendations: &[String]) -> String {
    if recommendations.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Recommendations\n\n");
    for (i, rec) in recommendations.iter().enumerate() {
        section.push_str(&format!("{}. {}\n", i + 1, rec));
    }
    section.push('\n');

    section
}

fn generate_footer() -> String {
    "---\n\n*Report generated by SentiVote*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

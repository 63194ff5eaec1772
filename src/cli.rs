//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::classifiers::ClassifierKind;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// SentiVote - ensemble sentiment analysis for customer-service feedback
///
/// Combines transformer, LLM and lexicon classifiers with weighted voting
/// to label texts Positive, Negative or Neutral.
///
/// Examples:
///   sentivote --text "The agent was rude and unhelpful"
///   sentivote --input feedback.csv --column comment --report report.md
///   sentivote --input feedback.csv --classifiers valence,domain,polarity
///   sentivote --samples
///   sentivote --list-classifiers
///   sentivote --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["text", "input", "samples", "list_classifiers", "init_config"])
))]
pub struct Args {
    /// Analyse a single text and print the result
    #[arg(short, long, value_name = "TEXT")]
    pub text: Option<String>,

    /// CSV file to analyse in batch
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Column holding the text (auto-detected if omitted)
    #[arg(long, value_name = "NAME")]
    pub column: Option<String>,

    /// Prefix for the result columns (default: <column>_sentiment)
    #[arg(long, value_name = "NAME")]
    pub output_column: Option<String>,

    /// Destination CSV (default: <input>_sentiment.csv)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Replace result columns that already exist in the input
    #[arg(long)]
    pub overwrite: bool,

    /// Write a summary report to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Report format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Analyse the built-in customer-service sample texts
    #[arg(long)]
    pub samples: bool,

    /// Classifiers to use (comma-separated)
    ///
    /// Example: --classifiers transformer,valence,domain
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub classifiers: Option<Vec<ClassifierKind>>,

    /// Probe every classifier and list its availability
    #[arg(long)]
    pub list_classifiers: bool,

    /// Transformer inference API base URL
    #[arg(long, value_name = "URL", env = "SENTIVOTE_TRANSFORMER_URL")]
    pub transformer_url: Option<String>,

    /// Transformer model identifier
    #[arg(long, value_name = "MODEL")]
    pub transformer_model: Option<String>,

    /// Bearer token for the transformer API
    #[arg(long, value_name = "TOKEN", env = "HF_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Ollama API endpoint URL
    #[arg(long, value_name = "URL", env = "OLLAMA_URL")]
    pub ollama_url: Option<String>,

    /// Ollama model for the llm classifier
    #[arg(long, value_name = "MODEL")]
    pub llm_model: Option<String>,

    /// Request timeout in seconds for remote classifiers
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of texts analysed concurrently
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Log a progress line every this many rows (0 disables)
    #[arg(long, value_name = "ROWS")]
    pub progress_interval: Option<usize>,

    /// Keep model classifiers even if they fail the startup probe
    #[arg(long)]
    pub no_probe: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .sentivote.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .sentivote.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        for (flag, url) in [
            ("Transformer URL", &self.transformer_url),
            ("Ollama URL", &self.ollama_url),
        ] {
            if let Some(url) = url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(format!("{} must start with 'http://' or 'https://'", flag));
                }
            }
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref classifiers) = self.classifiers {
            if classifiers.is_empty() {
                return Err("At least one classifier must be selected".to_string());
            }
        }

        if self.input.is_none() {
            let batch_flags = [
                ("--column", self.column.is_some()),
                ("--output-column", self.output_column.is_some()),
                ("--output", self.output.is_some()),
                ("--overwrite", self.overwrite),
            ];
            if let Some((flag, _)) = batch_flags.iter().find(|(_, given)| *given) {
                return Err(format!("{} requires --input", flag));
            }
        }

        if self.report.is_some() && self.input.is_none() && !self.samples {
            return Err("--report requires --input or --samples".to_string());
        }

        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
            if !input.is_file() {
                return Err(format!("Input path is not a file: {}", input.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_args() -> Args {
        Args::parse_from(["sentivote", "--text", "The agent was helpful"])
    }

    #[test]
    fn test_mode_is_required() {
        assert!(Args::try_parse_from(["sentivote"]).is_err());
    }

    #[test]
    fn test_modes_are_exclusive() {
        assert!(Args::try_parse_from(["sentivote", "--text", "hi", "--samples"]).is_err());
    }

    #[test]
    fn test_batch_flags_require_input() {
        for extra in [
            vec!["--column", "comment"],
            vec!["--output-column", "mood"],
            vec!["--output", "out.csv"],
            vec!["--overwrite"],
        ] {
            let mut argv = vec!["sentivote", "--text", "hello there"];
            argv.extend(extra);
            let args = Args::parse_from(argv);
            let err = args.validate().unwrap_err();
            assert!(err.contains("requires --input"));
        }
    }

    #[test]
    fn test_classifier_list_parsing() {
        let args = Args::parse_from(["sentivote", "--samples", "--classifiers", "llm,domain"]);
        assert_eq!(
            args.classifiers,
            Some(vec![ClassifierKind::Llm, ClassifierKind::Domain])
        );
        assert!(Args::try_parse_from(["sentivote", "--samples", "--classifiers", "vader"]).is_err());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.ollama_url = Some("localhost:11434".to_string());
        assert!(args.validate().is_err());

        args.ollama_url = Some("http://localhost:11434".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_values() {
        let mut args = make_args();
        args.concurrency = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_report_needs_batch() {
        let mut args = make_args();
        args.report = Some(PathBuf::from("report.md"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_input_must_exist() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.csv");
        let args = Args::parse_from(["sentivote", "--input", missing.to_str().unwrap()]);
        assert!(args.validate().is_err());

        let present = temp_dir.path().join("feedback.csv");
        std::fs::write(&present, "comment\nGreat\n").unwrap();
        let args = Args::parse_from(["sentivote", "--input", present.to_str().unwrap()]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}

//! SentiVote - ensemble sentiment analysis for customer-service text
//!
//! A CLI tool that combines model-based and lexicon-based classifiers
//! with weighted voting and labels texts Positive, Negative or Neutral,
//! one at a time or in CSV batches.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unreadable input, bad config, unwritable output, etc.)

mod analysis;
mod batch;
mod classifiers;
mod cli;
mod config;
mod models;
mod report;

use analysis::Ensemble;
use anyhow::{bail, Context, Result};
use batch::{BatchOptions, BatchProgress};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use models::{AggregateResult, AnalyzedRecord, BatchSummary, Report, ReportMetadata};
use std::path::Path;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

/// Customer-service texts analysed by `--samples`.
const SAMPLE_TEXTS: [&str; 8] = [
    "The customer service representative was extremely helpful and resolved my issue quickly!",
    "I waited 2 hours and the agent was rude. Terrible experience.",
    "The issue was resolved. Standard service.",
    "Outstanding support! Julie went above and beyond to help me.",
    "System keeps crashing and nobody can fix it. Very frustrated.",
    "Quick response and professional handling of my request.",
    "Not satisfied with the resolution provided.",
    "Perfect service, highly recommend!",
];

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("SentiVote v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Analysis failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .sentivote.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize classifiers, weights, endpoints, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    match args.config {
        Some(ref config_path) => info!("Loading config from: {}", config_path.display()),
        None => debug!("Looking for {} in the working directory", CONFIG_FILE_NAME),
    }

    Config::resolve(args.config.as_deref(), Path::new("."))
}

/// Dispatch to the selected mode.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let mut ensemble = Ensemble::new(
        classifiers::build_classifiers(&config)?,
        config.ensemble.clone(),
    );

    if args.list_classifiers {
        return list_classifiers(&ensemble).await;
    }

    if config.classifiers.probe_on_start {
        let removed = ensemble.retain_available().await;
        if !removed.is_empty() && !args.quiet {
            println!("⚠️  Skipping unavailable classifiers: {}", removed.join(", "));
        }
    }

    if ensemble.is_empty() {
        bail!("No classifiers available; check --classifiers or the model endpoints");
    }

    if !args.quiet {
        println!(
            "🤖 Classifiers: {}",
            ensemble.classifier_names().join(", ")
        );
    }

    if let Some(ref text) = args.text {
        analyze_single(&ensemble, text).await;
        Ok(())
    } else if args.samples {
        analyze_samples(&ensemble, &config, &args).await
    } else if let Some(ref input) = args.input {
        analyze_file(&ensemble, &config, &args, input).await
    } else {
        bail!("No mode selected; use --text, --input, --samples or --list-classifiers")
    }
}

/// Handle --list-classifiers: probe every configured classifier.
async fn list_classifiers(ensemble: &Ensemble) -> Result<()> {
    println!("🔍 Probing classifiers...\n");

    let probes = ensemble.probe_all().await;
    let available = probes.iter().filter(|(_, _, a)| a.is_available()).count();

    for (name, description, availability) in probes {
        match availability {
            classifiers::Availability::Available => {
                println!("   ✅ {:<12} {}", name, description);
            }
            classifiers::Availability::Unavailable(reason) => {
                println!("   ❌ {:<12} {} ({})", name, description, reason);
            }
        }
    }

    println!("\n   {} of {} classifiers available", available, ensemble.classifier_names().len());

    Ok(())
}

/// Handle --text: analyse one text and print the verdict.
async fn analyze_single(ensemble: &Ensemble, text: &str) {
    let result = ensemble.analyze(text).await;
    print_result(&result);
}

fn print_result(result: &AggregateResult) {
    println!(
        "{} {} (Confidence: {:.3}) via {}",
        result.label.emoji(),
        result.label,
        result.confidence,
        result.method
    );
}

/// Handle --samples: analyse the built-in texts.
async fn analyze_samples(ensemble: &Ensemble, config: &Config, args: &Args) -> Result<()> {
    let texts: Vec<String> = SAMPLE_TEXTS.iter().map(|s| s.to_string()).collect();

    println!("\n🧪 Analysing {} sample texts...", texts.len());

    let mut progress = BatchProgress::new(texts.len(), 0, false);
    let results =
        batch::analyze_texts(ensemble, &texts, config.general.concurrency, &mut progress).await;
    let duration_seconds = progress.finish();

    for (i, (text, result)) in texts.iter().zip(&results).enumerate() {
        println!("\n{}. {}", i + 1, text);
        print!("   ");
        print_result(result);
    }

    let records: Vec<AnalyzedRecord> = texts
        .into_iter()
        .zip(results)
        .enumerate()
        .map(|(row, (text, result))| AnalyzedRecord { row, text, result })
        .collect();

    let metadata = ReportMetadata {
        input: "samples".to_string(),
        column: "text".to_string(),
        output_column: "-".to_string(),
        analysis_date: Utc::now(),
        classifiers: names(ensemble),
        records_analyzed: records.len(),
        duration_seconds,
    };

    finish(args, config, metadata, &records)
}

/// Handle --input: analyse a CSV file.
async fn analyze_file(ensemble: &Ensemble, config: &Config, args: &Args, input: &Path) -> Result<()> {
    println!("\n📂 Analysing {}...", input.display());

    let options = BatchOptions {
        column: args.column.clone(),
        output_column: args.output_column.clone(),
        output: args.output.clone(),
        overwrite: args.overwrite,
        concurrency: config.general.concurrency,
        progress_interval: config.general.progress_interval,
        show_progress: !args.quiet,
    };

    let outcome = batch::run_batch(ensemble, input, &options).await?;

    let metadata = ReportMetadata {
        input: input.display().to_string(),
        column: outcome.column.clone(),
        output_column: outcome.output_column.clone(),
        analysis_date: Utc::now(),
        classifiers: names(ensemble),
        records_analyzed: outcome.records.len(),
        duration_seconds: outcome.duration_seconds,
    };

    finish(args, config, metadata, &outcome.records)?;
    println!("\n✅ Results saved to: {}", outcome.output.display());

    Ok(())
}

fn names(ensemble: &Ensemble) -> Vec<String> {
    ensemble
        .classifier_names()
        .into_iter()
        .map(String::from)
        .collect()
}

/// Print the distribution summary and write the report if requested.
fn finish(
    args: &Args,
    config: &Config,
    metadata: ReportMetadata,
    records: &[AnalyzedRecord],
) -> Result<()> {
    let summary = BatchSummary::from_results(records.iter().map(|r| &r.result));
    print_summary(&summary, &metadata);

    if let Some(ref path) = args.report {
        let report = Report::new(metadata, records, config.general.attention_limit);
        let output = match args.format {
            OutputFormat::Json => report::generate_json_report(&report)?,
            OutputFormat::Markdown => report::generate_markdown_report(&report),
        };

        std::fs::write(path, &output)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("\n📝 Report saved to: {}", path.display());
    }

    Ok(())
}

fn print_summary(summary: &BatchSummary, metadata: &ReportMetadata) {
    println!("\n📊 Analysis Summary:");
    println!("   Total texts: {}", summary.total);
    for label in models::SentimentLabel::ALL {
        let count = summary.count(label);
        println!(
            "   {} {}: {} ({:.1}%)",
            label.emoji(),
            label,
            count,
            summary.percentage(count)
        );
    }
    println!("   Average confidence: {:.3}", summary.average_confidence);
    println!(
        "   Duration: {:.1}s ({:.1} texts/sec)",
        metadata.duration_seconds,
        metadata.texts_per_second()
    );
}

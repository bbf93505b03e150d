//! CLI entry point for the gradebook rater tool.
//!
//! Provides the analyze subcommand: ingest one or more grade sheets,
//! compute the per-class comparison report, and render the table, chart
//! data, and narrative conclusions.

use anyhow::Result;
use clap::{Parser, Subcommand};
use gradebook_rater::{
    analyzers::analyzer::{AnalysisOutcome, analyze_record_sets},
    error::ParseError,
    ingest::ingest,
    output::{append_report, chart_series, render_narrative, render_table, to_json},
    resolve::AliasConfig,
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::Instrument;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "gradebook_rater")]
#[command(about = "Comparative class performance analysis from grade sheets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze grade sheets and render the comparative report
    Analyze {
        /// Grade sheet files (.csv, .tsv, .txt, .xlsx, .xls)
        #[arg(value_name = "FILES", required = true)]
        files: Vec<String>,

        /// CSV file to append the per-class report to
        #[arg(short, long, default_value = "report.csv")]
        output: String,

        /// Optional: write the chart data series as JSON to this path
        #[arg(long)]
        chart_json: Option<String>,

        /// Print the full analysis outcome as JSON instead of the table
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Maximum number of files parsed concurrently
        #[arg(short, long, default_value_t = 4)]
        concurrency: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/gradebook_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("gradebook_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            files,
            output,
            chart_json,
            json,
            concurrency,
        } => {
            let outcome = analyze_files(&files, concurrency).await?;

            if json {
                println!("{}", to_json(&outcome)?);
            } else {
                println!("{}", render_table(&outcome.reports));
                println!("{}", render_narrative(&outcome.insights));
            }

            if outcome.dropped_rows > 0 {
                warn!(
                    dropped_rows = outcome.dropped_rows,
                    "Some rows had unusable grade values and were excluded"
                );
            }
            for failure in &outcome.parse_failures {
                warn!(file = %failure.filename, reason = %failure.reason, "File was skipped");
            }

            append_report(&output, &outcome.reports)?;
            info!(path = %output, classes = outcome.reports.len(), "Report CSV written");

            if let Some(path) = chart_json {
                let series = chart_series(&outcome.reports);
                std::fs::write(&path, serde_json::to_string_pretty(&series)?)?;
                info!(path = %path, "Chart data written");
            }
        }
    }

    Ok(())
}

/// Reads and parses the given files concurrently, then runs the pipeline.
///
/// Ingestion fans out across tasks bounded by a semaphore; results are
/// collected in argument order, so the merged dataset is deterministic
/// regardless of task scheduling.
#[tracing::instrument(skip(files), fields(file_count = files.len(), concurrency))]
async fn analyze_files(files: &[String], concurrency: usize) -> Result<AnalysisOutcome> {
    let semaphore = std::sync::Arc::new(tokio::sync::Semaphore::new(concurrency.max(1)));

    let mut tasks = vec![];

    for file in files {
        let sem = semaphore.clone();
        let file = file.clone();

        let file_span = tracing::info_span!("ingest_file", file = %file);

        let task = tokio::spawn(
            async move {
                let _permit = sem.acquire().await.unwrap();

                match std::fs::read(&file) {
                    Ok(bytes) => ingest(&file, &bytes),
                    Err(e) => Err(ParseError {
                        filename: file.clone(),
                        reason: e.to_string(),
                    }),
                }
            }
            .instrument(file_span),
        );

        tasks.push(task);
    }

    let mut record_sets = Vec::new();
    let mut parse_failures = Vec::new();

    // Awaiting in spawn order re-imposes file arrival order
    for task in tasks {
        match task.await? {
            Ok(set) => record_sets.push(set),
            Err(e) => {
                error!(file = %e.filename, reason = %e.reason, "File ingest failed");
                parse_failures.push(e);
            }
        }
    }

    let outcome = analyze_record_sets(record_sets, parse_failures, &AliasConfig::default())?;
    Ok(outcome)
}

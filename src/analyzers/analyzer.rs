//! End-to-end analysis pipeline.
//!
//! [`run_analysis`] is a pure function from named file contents to the
//! report and insights, so the whole core is testable without any rendering
//! or filesystem dependency. The binary handles I/O and presentation around
//! it.

use crate::analyzers::aggregate::{ClassReport, aggregate};
use crate::analyzers::insights::{Insights, extract};
use crate::dataset::{RecordSet, merge};
use crate::error::{AnalysisError, ParseError};
use crate::ingest::ingest;
use crate::normalize::normalize_grades;
use crate::resolve::{AliasConfig, resolve};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info};

/// One uploaded file: its name (drives format dispatch) and raw contents.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Everything the presentation layer needs from one analysis run.
#[derive(Debug, Serialize)]
pub struct AnalysisOutcome {
    pub generated_at: DateTime<Utc>,
    pub reports: Vec<ClassReport>,
    pub insights: Insights,
    /// Rows discarded because their grade would not parse.
    pub dropped_rows: usize,
    /// Files that failed to parse; the run continued without them.
    pub parse_failures: Vec<ParseError>,
}

/// Runs the whole pipeline over already-loaded file contents.
///
/// Per-file parse failures are collected and carried in the outcome; every
/// later stage failure aborts the run without producing a report.
pub fn run_analysis(
    sources: &[SourceFile],
    aliases: &AliasConfig,
) -> Result<AnalysisOutcome, AnalysisError> {
    let mut record_sets = Vec::new();
    let mut parse_failures = Vec::new();

    for source in sources {
        match ingest(&source.name, &source.bytes) {
            Ok(set) => record_sets.push(set),
            Err(e) => {
                error!(file = %e.filename, reason = %e.reason, "File ingest failed");
                parse_failures.push(e);
            }
        }
    }

    analyze_record_sets(record_sets, parse_failures, aliases)
}

/// Pipeline tail shared by [`run_analysis`] and the concurrent CLI ingest:
/// merges already-parsed record sets and computes the report.
pub fn analyze_record_sets(
    record_sets: Vec<RecordSet>,
    parse_failures: Vec<ParseError>,
    aliases: &AliasConfig,
) -> Result<AnalysisOutcome, AnalysisError> {
    let mut dataset = merge(record_sets)?;

    let roles = resolve(&dataset, aliases)?;
    debug!(
        class_column = %dataset.columns[roles.class],
        student_column = %dataset.columns[roles.student],
        grade_column = %dataset.columns[roles.grade],
        "Columns resolved"
    );

    let dropped_rows = normalize_grades(&mut dataset, roles.grade);
    let reports = aggregate(&dataset, &roles);
    let insights = extract(&reports)?;

    info!(
        classes = reports.len(),
        rows = dataset.rows.len(),
        dropped_rows,
        "Analysis complete"
    );

    Ok(AnalysisOutcome {
        generated_at: Utc::now(),
        reports,
        insights,
        dropped_rows,
        parse_failures,
    })
}

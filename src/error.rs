//! Error types for the analysis pipeline.
//!
//! Per-file ingest failures are collected and reported without aborting the
//! batch; everything in [`AnalysisError`] halts the run before any report is
//! produced.

use crate::resolve::Role;
use serde::Serialize;
use thiserror::Error;

/// A source file that could not be ingested.
///
/// Non-fatal: the batch continues with the remaining files.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("could not read {filename}: {reason}")]
pub struct ParseError {
    pub filename: String,
    pub reason: String,
}

/// Whole-run failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// No uploaded file survived ingestion.
    #[error("none of the uploaded files could be read")]
    EmptyInput,

    /// The header heuristics could not find every required column.
    #[error("required columns not found: {}", join_roles(.0))]
    UnresolvedColumns(Vec<Role>),

    /// No rows with usable grades remained for aggregation.
    #[error("no analyzable rows remained after filtering")]
    EmptyReport,
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

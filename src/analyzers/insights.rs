//! Comparative conclusions derived from the aggregated report.

use crate::analyzers::aggregate::ClassReport;
use crate::analyzers::utility::mean;
use crate::error::AnalysisError;
use serde::Serialize;

/// School-wide comparative conclusions, recomputed per analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub best_quality_class: String,
    pub worst_quality_class: String,
    pub best_success_class: String,
    pub worst_success_class: String,
    /// Unweighted mean of per-class quality rates.
    pub school_avg_quality: f64,
    /// Unweighted mean of per-class success rates.
    pub school_avg_success: f64,
}

/// Derives best/worst classes and school averages from the report.
///
/// Ties go to the earliest row in the report, so the result is stable for a
/// given report order. The school averages weigh every class equally,
/// regardless of its student count. Fails with
/// [`AnalysisError::EmptyReport`] on an empty report.
pub fn extract(reports: &[ClassReport]) -> Result<Insights, AnalysisError> {
    if reports.is_empty() {
        return Err(AnalysisError::EmptyReport);
    }

    let quality_rates: Vec<f64> = reports.iter().map(|r| r.quality_rate).collect();
    let success_rates: Vec<f64> = reports.iter().map(|r| r.success_rate).collect();

    Ok(Insights {
        best_quality_class: best_by(reports, |r| r.quality_rate).class_name.clone(),
        worst_quality_class: worst_by(reports, |r| r.quality_rate).class_name.clone(),
        best_success_class: best_by(reports, |r| r.success_rate).class_name.clone(),
        worst_success_class: worst_by(reports, |r| r.success_rate).class_name.clone(),
        school_avg_quality: mean(&quality_rates),
        school_avg_success: mean(&success_rates),
    })
}

// Strict comparisons keep the first row on ties.
fn best_by(reports: &[ClassReport], rate: impl Fn(&ClassReport) -> f64) -> &ClassReport {
    let mut best = &reports[0];
    for report in &reports[1..] {
        if rate(report) > rate(best) {
            best = report;
        }
    }
    best
}

fn worst_by(reports: &[ClassReport], rate: impl Fn(&ClassReport) -> f64) -> &ClassReport {
    let mut worst = &reports[0];
    for report in &reports[1..] {
        if rate(report) < rate(worst) {
            worst = report;
        }
    }
    worst
}

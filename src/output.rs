//! Report rendering and persistence.
//!
//! Supports a fixed-width comparison table, narrative text, JSON
//! serialization, chart data extraction, and CSV append.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::analyzers::aggregate::ClassReport;
use crate::analyzers::analyzer::AnalysisOutcome;
use crate::analyzers::insights::Insights;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Two-series view of the report, keyed by class, for a grouped bar chart.
#[derive(Debug, Serialize)]
pub struct ChartSeries {
    pub class_names: Vec<String>,
    pub success_rates: Vec<f64>,
    pub quality_rates: Vec<f64>,
}

/// Reduces the report to the chart view, preserving report order.
pub fn chart_series(reports: &[ClassReport]) -> ChartSeries {
    ChartSeries {
        class_names: reports.iter().map(|r| r.class_name.clone()).collect(),
        success_rates: reports.iter().map(|r| r.success_rate).collect(),
        quality_rates: reports.iter().map(|r| r.quality_rate).collect(),
    }
}

/// Serializes the full outcome as pretty-printed JSON.
pub fn to_json(outcome: &AnalysisOutcome) -> Result<String> {
    Ok(serde_json::to_string_pretty(outcome)?)
}

/// Appends report rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_report(path: &str, reports: &[ClassReport]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending report CSV");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for report in reports {
        writer.serialize(report)?;
    }
    writer.flush()?;

    Ok(())
}

/// Renders the per-class comparison table for terminal display.
pub fn render_table(reports: &[ClassReport]) -> String {
    let mut out = String::from(
        "class            students   passed  quality  avg score  success %  quality %\n",
    );
    for r in reports {
        out.push_str(&format!(
            "{:<16} {:>8} {:>8} {:>8} {:>10.2} {:>10.1} {:>10.1}\n",
            r.class_name,
            r.total_students,
            r.passed_count,
            r.quality_count,
            r.average_score,
            r.success_rate,
            r.quality_rate,
        ));
    }
    out
}

/// Renders the fixed-template narrative: school-wide conclusions, strengths,
/// problem areas, and recommendations.
pub fn render_narrative(insights: &Insights) -> String {
    format!(
        "Overall conclusions:\n\
         - Average quality rate across the school: {:.1}%\n\
         - Average success rate across the school: {:.1}%\n\
         \n\
         Strengths:\n\
         - Best quality of knowledge: class {}\n\
         - Highest success rate: class {}\n\
         \n\
         Problem areas:\n\
         - Lowest quality of knowledge: class {}\n\
         - Lowest success rate: class {}\n\
         \n\
         Recommendations:\n\
         - Review the causes of low quality in class {} individually.\n\
         - Step up work with students carrying grades of 2 and 3.\n\
         - Organize extra sessions on the difficult topics.\n\
         - Hold a methodology meeting to share the successful practices of class {}.\n",
        insights.school_avg_quality,
        insights.school_avg_success,
        insights.best_quality_class,
        insights.best_success_class,
        insights.worst_quality_class,
        insights.worst_success_class,
        insights.worst_quality_class,
        insights.best_quality_class,
    )
}

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use crate::batch::{BatchReport, OutcomeStatus};
use crate::cli::ReportFormat;

/// Save the batch report to a file
pub fn save_report(report: &BatchReport, path: &Path, format: ReportFormat) -> Result<()> {
    let content = match format {
        ReportFormat::Text => format_as_text(report),
        ReportFormat::Json => format_as_json(report)?,
    };

    fs_err::write(path, content).context("Failed to write report")?;
    Ok(())
}

/// Print the end-of-run summary to the console
pub fn print_summary(report: &BatchReport) {
    let planned = report.outcomes.len() - report.succeeded() - report.failed();

    println!();
    if planned > 0 {
        println!("Dry run: {} command(s) planned", planned);
    } else {
        println!(
            "{} succeeded, {} failed",
            style(report.succeeded()).green(),
            style(report.failed()).red()
        );
    }

    for outcome in report.failures() {
        if let OutcomeStatus::Failed { reason } = &outcome.status {
            println!("  • {} ({})", outcome.url, reason);
        }
    }
}

pub fn format_as_text(report: &BatchReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Output root: {}\n", report.output_root.display()));
    out.push_str(&format!(
        "Started: {}\nFinished: {}\n",
        report.started_at.to_rfc3339(),
        report.finished_at.to_rfc3339()
    ));
    out.push_str(&format!(
        "Succeeded: {}  Failed: {}\n\n",
        report.succeeded(),
        report.failed()
    ));

    for outcome in &report.outcomes {
        let status = match &outcome.status {
            OutcomeStatus::Succeeded => "OK".to_string(),
            OutcomeStatus::Planned => "PLANNED".to_string(),
            OutcomeStatus::Failed { reason } => format!("FAILED ({})", reason),
        };
        out.push_str(&format!("[{}] {} - {}", outcome.category, outcome.url, status));
        if let Some(dir) = &outcome.output_dir {
            out.push_str(&format!(" -> {}", dir.display()));
        }
        out.push('\n');
    }

    out
}

pub fn format_as_json(report: &BatchReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report")
}

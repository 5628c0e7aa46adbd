//! Report aggregation and rendering
//!
//! Reduces a batch's outcomes into summary statistics and a plain-text
//! report. Purely computational; the only side effect is the optional file
//! write at the end.

use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::core::types::{ItemOutcome, ReconciliationResult};
use crate::error::Result;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Summary over one batch's outcomes. Derived on demand; regenerate rather
/// than mutate.
#[derive(Debug, Clone)]
pub struct BatchReport<'a> {
    /// Number of items processed
    pub total: usize,
    /// Items where every stage succeeded
    pub succeeded: usize,
    /// Items with at least one failing stage
    pub failed: usize,
    /// Sum of per-item processing durations
    pub total_duration: Duration,
    /// When this summary was generated
    pub generated_at: DateTime<Utc>,
    /// The underlying outcomes, for detail rendering
    pub outcomes: &'a [ItemOutcome],
}

/// Reduce a batch's outcomes into a [`BatchReport`]
pub fn summarize(outcomes: &[ItemOutcome]) -> BatchReport<'_> {
    let succeeded = outcomes.iter().filter(|o| o.success).count();
    BatchReport {
        total: outcomes.len(),
        succeeded,
        failed: outcomes.len() - succeeded,
        total_duration: outcomes.iter().map(|o| o.duration).sum(),
        generated_at: Utc::now(),
        outcomes,
    }
}

/// Render the report as plain text
pub fn render(report: &BatchReport<'_>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "===== Processing Report =====\n");
    let _ = writeln!(
        out,
        "Report generated: {}",
        report.generated_at.format(TIME_FORMAT)
    );
    let _ = writeln!(out, "Total entities processed: {}", report.total);
    let _ = writeln!(out, "Successful: {}", report.succeeded);
    let _ = writeln!(out, "Failed: {}", report.failed);
    let _ = writeln!(
        out,
        "Total processing time: {:.2} seconds\n",
        report.total_duration.as_secs_f64()
    );

    let _ = writeln!(out, "===== Entity Details =====\n");

    for outcome in report.outcomes {
        let _ = writeln!(out, "Entity: {}", outcome.item);
        let _ = writeln!(
            out,
            "  Start time: {}",
            outcome.started_at.format(TIME_FORMAT)
        );
        let _ = writeln!(
            out,
            "  End time: {}",
            outcome.finished_at.format(TIME_FORMAT)
        );
        let _ = writeln!(
            out,
            "  Duration: {:.2} seconds",
            outcome.duration.as_secs_f64()
        );
        let _ = writeln!(out, "  Success: {}", outcome.success);
        let _ = writeln!(
            out,
            "  Source A: {}",
            if outcome.source_a.is_ok() {
                "Success"
            } else {
                "Failed"
            }
        );
        let _ = writeln!(
            out,
            "  Source B: {}",
            if outcome.source_b.is_ok() {
                "Success"
            } else {
                "Failed"
            }
        );
        let reconciliation = match &outcome.reconciliation {
            ReconciliationResult::Success(_) => "Success",
            ReconciliationResult::Failed(_) => "Failed",
            ReconciliationResult::Skipped(_) => "Skipped",
        };
        let _ = writeln!(out, "  Reconciliation: {reconciliation}");

        if !outcome.errors.is_empty() {
            let _ = writeln!(out, "  Errors:");
            for error in &outcome.errors {
                let _ = writeln!(out, "    - {error}");
            }
        }

        let _ = writeln!(out);
    }

    out
}

/// Render the report and write it to `path`
pub async fn write_report(report: &BatchReport<'_>, path: &Path) -> Result<()> {
    tokio::fs::write(path, render(report)).await?;
    info!(
        path = %path.display(),
        succeeded = report.succeeded,
        failed = report.failed,
        "report written"
    );
    Ok(())
}

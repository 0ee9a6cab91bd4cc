//! Console rendering of acquisition results.

use std::fmt::Write;

use slotgrab_core::{AcquisitionReport, RunOutcome};

/// Render the final report: the date, then links grouped by session type.
pub fn render_report(report: &AcquisitionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Date: {}", report.date);
    for session in &report.sessions {
        let _ = writeln!(out, "{}:", session.session_type);
        if session.links.is_empty() {
            let _ = writeln!(out, "  (no bookable time slots)");
        }
        for link in &session.links {
            let _ = writeln!(out, "  {}", link);
        }
    }
    out
}

/// Render a finished run, successful or not.
pub fn render_outcome(outcome: &RunOutcome) -> String {
    match &outcome.result {
        Ok(report) => render_report(report),
        Err(e) => format!(
            "No reservation link obtained after {} attempt(s): {}\n",
            outcome.retry.attempts, e
        ),
    }
}

//! Output module for presenting discovery results
//!
//! This module handles:
//! - JSON rendering of session reports and candidate lists
//! - Plain-text tables for terminal use
//! - Mapping session failures to short user-facing messages

use crate::discovery::{DiscoveryError, DiscoveryOutcome, DiscoveryReport};
use crate::feed::CandidateRecord;
use crate::geo::{distance_km, Coordinate};
use std::fmt::Write;

/// Message shown when a session ends without candidates
pub const NO_RESULTS_MESSAGE: &str = "no results within deadline";

/// Message shown when the scrape job could not be started
pub const DISPATCH_FAILED_MESSAGE: &str = "could not start the search";

/// Message shown when no snapshot of the results feed could be read
pub const FEED_UNAVAILABLE_MESSAGE: &str = "results feed unavailable";

/// Renders a session report as pretty JSON
pub fn render_report_json(report: &DiscoveryReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Renders a candidate list as pretty JSON
pub fn render_candidates_json(candidates: &[CandidateRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(candidates)
}

/// Renders a session report as text
pub fn render_report_text(report: &DiscoveryReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Job: {}", report.job.job_url);
    let _ = writeln!(
        out,
        "Snapshots: {} attempted, {} failed, {} rows skipped, {} ms",
        report.stats.snapshots_attempted,
        report.stats.snapshots_failed,
        report.stats.rows_skipped,
        report.stats.elapsed_ms
    );
    if !report.job.trigger_delivered {
        let _ = writeln!(out, "Note: worker trigger was not acknowledged");
    }
    out.push('\n');

    match &report.outcome {
        DiscoveryOutcome::Matched(candidates) => {
            out.push_str(&render_candidates_text(candidates, report.job.origin));
        }
        DiscoveryOutcome::NoMatchWithinDeadline => {
            let _ = writeln!(out, "{}", NO_RESULTS_MESSAGE);
        }
    }
    out
}

/// Renders candidates as a text table, one line per candidate
pub fn render_candidates_text(candidates: &[CandidateRecord], origin: Coordinate) -> String {
    if candidates.is_empty() {
        return "No candidates found\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:>6}  {:>7}  {}", "score", "km", "title / address");
    for candidate in candidates {
        let _ = writeln!(
            out,
            "{:>6.4}  {:>7.3}  {}{}",
            candidate.score_normalized.unwrap_or(0.0),
            distance_km(origin, candidate.coordinates),
            candidate.title.as_deref().unwrap_or("(untitled)"),
            candidate
                .address
                .as_deref()
                .map(|a| format!(" / {}", a))
                .unwrap_or_default()
        );
    }
    out
}

/// Short, user-facing description of a session failure
pub fn user_message(error: &DiscoveryError) -> &'static str {
    match error {
        DiscoveryError::DispatchFailed(_) => DISPATCH_FAILED_MESSAGE,
        DiscoveryError::SourceUnavailable { .. } => FEED_UNAVAILABLE_MESSAGE,
        DiscoveryError::Cancelled => "search cancelled",
    }
}

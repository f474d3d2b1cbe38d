//! Terminal progress helpers: spinners and status icons.
//!
//! Uses `indicatif` to show an animated spinner while a probe is in flight.
//! Spinners draw to stderr and stay hidden when it is not a terminal.

use crate::probe::NodeStatusReport;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// ── Spinner presets ──────────────────────────────────

/// Braille dots.
const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create an animated spinner with the given message.
///
/// Call one of the helpers (`finish_success`, `finish_error`) when done.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars(TICK_CHARS)
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Spinner shown while the endpoint chain is probed.
pub fn probe_spinner(primary_url: &str, endpoints: usize) -> ProgressBar {
    if endpoints > 1 {
        spinner(&format!(
            "Probing {} (+{} fallback)...",
            primary_url,
            endpoints - 1
        ))
    } else {
        spinner(&format!("Probing {}...", primary_url))
    }
}

// ── Finish helpers ───────────────────────────────────

fn finish_plain(pb: &ProgressBar) {
    if let Ok(style) = ProgressStyle::default_spinner().template("  {msg}") {
        pb.set_style(style);
    }
}

/// Finish a spinner with a green check-mark.
pub fn finish_success(pb: &ProgressBar, msg: &str) {
    finish_plain(pb);
    pb.finish_with_message(format!("✓ {}", msg));
}

/// Finish a spinner with a red cross.
pub fn finish_error(pb: &ProgressBar, msg: &str) {
    finish_plain(pb);
    pb.finish_with_message(format!("✗ {}", msg));
}

// ── Status icons ─────────────────────────────────────

/// Return a status icon for a report.
pub fn status_icon(report: &NodeStatusReport) -> &'static str {
    if !report.connected {
        "❌"
    } else if !report.failures.is_empty() || report.listening == Some(false) {
        "⚠️"
    } else {
        "✅"
    }
}

//! Human-readable rendering of reports, validation issues and watch summaries.

use crate::cli::error::{Severity, ValidationIssue};
use crate::cli::progress::status_icon;
use crate::configuration::Settings;
use crate::probe::{HistorySummary, NodeStatusReport, ProbeError};

const UNAVAILABLE: &str = "unavailable";

fn or_unavailable<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| UNAVAILABLE.to_string())
}

pub fn render_report(report: &NodeStatusReport) -> String {
    let mut lines = Vec::new();

    let timing = report
        .response_time_ms
        .map(|ms| format!(" ({} ms)", ms))
        .unwrap_or_default();
    lines.push(format!("🔍 Node status for {}{}", report.endpoint, timing));

    if !report.connected {
        lines.push("❌ Connection: not connected".to_string());
        return lines.join("\n");
    }

    let listening = match report.listening {
        Some(true) => "connected (listening)",
        Some(false) => "connected (not listening for peers)",
        None => "connected",
    };
    lines.push(format!("{} Connection: {}", status_icon(report), listening));
    lines.push(format!("🌐 Network ID: {}", or_unavailable(report.network_id)));
    lines.push(format!("📦 Current block: {}", or_unavailable(report.current_block)));

    match (report.is_synced(), &report.syncing) {
        (Some(false), Some(sync)) => {
            lines.push(format!(
                "⏳ Sync status: syncing ({:.1}%, {} blocks behind)",
                sync.progress_percent(),
                sync.blocks_remaining()
            ));
            lines.push(format!("   Current block: {}", sync.current_block));
            lines.push(format!("   Highest block: {}", sync.highest_block));
            lines.push(format!("   Known states: {}", sync.known_states));
            lines.push(format!("   Pulled states: {}", sync.pulled_states));
        }
        (Some(_), _) => lines.push("✅ Sync status: synced".to_string()),
        (None, _) => lines.push(format!("❔ Sync status: {}", UNAVAILABLE)),
    }

    lines.push(format!("🔧 Node info: {}", or_unavailable(report.node_info.as_deref())));
    lines.push(format!("👥 Peer count: {}", or_unavailable(report.peer_count)));

    if !report.failures.is_empty() {
        lines.push(format!("⚠️  {} query(ies) failed:", report.failures.len()));
        for failure in &report.failures {
            lines.push(format!("   - {}: {}", failure.query, failure.error));
        }
    }

    lines.join("\n")
}

pub fn render_failure(error: &ProbeError) -> String {
    format!("❌ Probe failed: {}", error)
}

pub fn render_endpoints(settings: &Settings) -> String {
    let mut lines = vec![
        "📡 Available endpoints:".to_string(),
        format!("   HTTP RPC: {}", settings.node.rpc_url),
    ];
    for (i, url) in settings.node.fallback_rpc_urls.iter().enumerate() {
        lines.push(format!("   Fallback {}: {}", i + 1, url));
    }
    if let Some(ws_url) = &settings.node.ws_url {
        lines.push(format!("   WebSocket: {}", ws_url));
    }
    if let Some(gateway_url) = &settings.node.api_gateway_url {
        lines.push(format!("   API Gateway: {}", gateway_url));
    }
    lines.join("\n")
}

pub fn render_issues(issues: &[ValidationIssue]) -> String {
    if issues.is_empty() {
        return "✅ Configuration is valid".to_string();
    }
    issues
        .iter()
        .map(|issue| {
            let icon = match issue.severity {
                Severity::Error => "❌",
                Severity::Warning => "⚠️ ",
                Severity::Info => "ℹ️ ",
            };
            format!("{} {}", icon, issue)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_summary(summary: &HistorySummary) -> String {
    let mut lines = vec![
        "📊 Watch summary:".to_string(),
        format!(
            "   Probes: {} ({} ok, {:.1}% success)",
            summary.total, summary.successes, summary.success_rate
        ),
        format!(
            "   Avg response time: {}",
            summary
                .avg_response_time_ms
                .map(|ms| format!("{} ms", ms))
                .unwrap_or_else(|| UNAVAILABLE.to_string())
        ),
        format!("   Last block: {}", or_unavailable(summary.last_block)),
    ];
    if let Some(endpoint) = &summary.last_endpoint {
        lines.push(format!("   Last endpoint: {}", endpoint));
    }
    lines.join("\n")
}

use super::error::ProbeError;
use super::models::NodeStatusReport;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct ProbeSnapshot {
    pub timestamp: DateTime<Utc>,
    pub endpoint: Option<String>,
    pub success: bool,
    pub response_time_ms: Option<u64>,
    pub block: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub total: usize,
    pub successes: usize,
    pub success_rate: f64,
    pub avg_response_time_ms: Option<u64>,
    pub last_block: Option<u64>,
    pub last_endpoint: Option<String>,
}

/// Rolling window of probe outcomes for watch mode.
pub struct ProbeHistory {
    snapshots: VecDeque<ProbeSnapshot>,
    max_snapshots: usize,
}

impl ProbeHistory {
    pub fn new(max_snapshots: usize) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(max_snapshots),
            max_snapshots: max_snapshots.max(1),
        }
    }

    pub fn record_report(&mut self, report: &NodeStatusReport) {
        self.push(ProbeSnapshot {
            timestamp: report.checked_at,
            endpoint: Some(report.endpoint.clone()),
            success: report.connected,
            response_time_ms: report.response_time_ms,
            block: report.current_block,
        });
    }

    pub fn record_failure(&mut self, error: &ProbeError) {
        tracing::debug!("Recording failed probe: {}", error);
        self.push(ProbeSnapshot {
            timestamp: Utc::now(),
            endpoint: None,
            success: false,
            response_time_ms: None,
            block: None,
        });
    }

    fn push(&mut self, snapshot: ProbeSnapshot) {
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > self.max_snapshots {
            self.snapshots.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn summary(&self) -> HistorySummary {
        let total = self.snapshots.len();
        let successes = self.snapshots.iter().filter(|s| s.success).count();

        let response_times: Vec<u64> = self
            .snapshots
            .iter()
            .filter_map(|s| s.response_time_ms)
            .collect();
        let avg_response_time_ms = if response_times.is_empty() {
            None
        } else {
            Some(response_times.iter().sum::<u64>() / response_times.len() as u64)
        };

        let last_success = self.snapshots.iter().rev().find(|s| s.success);

        HistorySummary {
            total,
            successes,
            success_rate: if total > 0 {
                (successes as f64 / total as f64) * 100.0
            } else {
                0.0
            },
            avg_response_time_ms,
            last_block: self.snapshots.iter().rev().find_map(|s| s.block),
            last_endpoint: last_success.and_then(|s| s.endpoint.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(endpoint: &str, block: u64, elapsed: u64) -> NodeStatusReport {
        let mut report = NodeStatusReport::connected(endpoint);
        report.current_block = Some(block);
        report.response_time_ms = Some(elapsed);
        report
    }

    #[test]
    fn test_summary_mixes_successes_and_failures() {
        let mut history = ProbeHistory::new(10);
        history.record_report(&report("http://a", 100, 20));
        history.record_failure(&ProbeError::AllEndpointsUnreachable {
            attempted: 1,
            last_error: "refused".to_string(),
        });
        history.record_report(&report("http://b", 102, 40));

        let summary = history.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.successes, 2);
        assert!((summary.success_rate - 66.666).abs() < 0.01);
        assert_eq!(summary.avg_response_time_ms, Some(30));
        assert_eq!(summary.last_block, Some(102));
        assert_eq!(summary.last_endpoint.as_deref(), Some("http://b"));
    }

    #[test]
    fn test_window_drops_oldest() {
        let mut history = ProbeHistory::new(2);
        history.record_report(&report("http://a", 1, 10));
        history.record_report(&report("http://a", 2, 10));
        history.record_report(&report("http://a", 3, 10));

        assert_eq!(history.len(), 2);
        assert_eq!(history.summary().last_block, Some(3));
    }

    #[test]
    fn test_empty_summary() {
        let history = ProbeHistory::new(5);
        let summary = history.summary();
        assert!(history.is_empty());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.success_rate, 0.0);
        assert_eq!(summary.avg_response_time_ms, None);
    }
}

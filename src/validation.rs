//! Static checks over [`Settings`] and post-probe checks over a report.
//!
//! Codes are stable so scripts can match on them:
//!
//! | code | severity | meaning |
//! |------|----------|---------|
//! | E001 | error    | URL does not parse |
//! | E002 | error    | RPC URL scheme is not http/https/ws/wss |
//! | E003 | error    | request timeout is zero |
//! | E004 | error    | WebSocket URL scheme is not ws/wss |
//! | E005 | error    | API gateway URL scheme is not http/https |
//! | E010 | error    | node reports a different network id |
//! | W001 | warning  | URL still holds a `YOUR_...` placeholder |
//! | W002 | warning  | endpoint listed twice in the fallback chain |
//! | W003 | warning  | monitoring interval shorter than the timeout |
//! | I001 | info     | no fallback endpoints |

use crate::cli::error::{Severity, ValidationIssue};
use crate::configuration::Settings;
use crate::probe::NodeStatusReport;
use reqwest::Url;
use std::collections::HashSet;

const RPC_SCHEMES: &[&str] = &["http", "https", "ws", "wss"];
const WS_SCHEMES: &[&str] = &["ws", "wss"];
const GATEWAY_SCHEMES: &[&str] = &["http", "https"];

/// Listed endpoints the probe never contacts.
const UNPROBED_FIELDS: &[&str] = &["node.ws_url", "node.api_gateway_url"];
const PLACEHOLDER_MARKER: &str = "YOUR_";

pub fn validate_settings(settings: &Settings) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let mut chain = vec![("node.rpc_url".to_string(), settings.node.rpc_url.as_str())];
    chain.extend(
        settings
            .node
            .fallback_rpc_urls
            .iter()
            .enumerate()
            .map(|(i, url)| (format!("node.fallback_rpc_urls[{}]", i), url.as_str())),
    );

    for (field, url) in &chain {
        check_url(url, field, RPC_SCHEMES, "E002", &mut issues);
    }
    if let Some(ws_url) = &settings.node.ws_url {
        check_url(ws_url, "node.ws_url", WS_SCHEMES, "E004", &mut issues);
    }
    if let Some(gateway_url) = &settings.node.api_gateway_url {
        check_url(
            gateway_url,
            "node.api_gateway_url",
            GATEWAY_SCHEMES,
            "E005",
            &mut issues,
        );
    }

    let mut seen = HashSet::new();
    for (field, url) in &chain {
        let key = url.trim().trim_end_matches('/').to_lowercase();
        if !seen.insert(key) {
            issues.push(
                ValidationIssue::new(
                    Severity::Warning,
                    "W002",
                    format!("{} is already in the endpoint chain", url),
                )
                .with_field(field.as_str()),
            );
        }
    }

    let monitoring = &settings.monitoring;
    if monitoring.timeout_ms == 0 {
        issues.push(
            ValidationIssue::new(
                Severity::Error,
                "E003",
                "request timeout must be greater than 0 ms",
            )
            .with_field("monitoring.timeout_ms"),
        );
    } else if monitoring.block_interval_ms < monitoring.timeout_ms {
        issues.push(
            ValidationIssue::new(
                Severity::Warning,
                "W003",
                format!(
                    "probe interval ({} ms) is shorter than the request timeout ({} ms); \
                     watch runs may overlap a slow node",
                    monitoring.block_interval_ms, monitoring.timeout_ms
                ),
            )
            .with_field("monitoring.block_interval_ms"),
        );
    }

    if settings.node.fallback_rpc_urls.is_empty() {
        issues.push(
            ValidationIssue::new(
                Severity::Info,
                "I001",
                "no fallback endpoints configured; the probe fails as soon as the primary does",
            )
            .with_field("node.fallback_rpc_urls"),
        );
    }

    issues
}

fn check_url(
    url: &str,
    field: &str,
    schemes: &[&str],
    scheme_code: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    match Url::parse(url.trim()) {
        Err(e) => issues.push(
            ValidationIssue::new(
                Severity::Error,
                "E001",
                format!("'{}' is not a valid URL: {}", url, e),
            )
            .with_field(field),
        ),
        Ok(parsed) => {
            if !schemes.contains(&parsed.scheme()) {
                issues.push(
                    ValidationIssue::new(
                        Severity::Error,
                        scheme_code,
                        format!(
                            "unsupported scheme '{}' (expected one of: {})",
                            parsed.scheme(),
                            schemes.join(", ")
                        ),
                    )
                    .with_field(field),
                );
            }
            if url.contains(PLACEHOLDER_MARKER) {
                issues.push(
                    ValidationIssue::new(
                        Severity::Warning,
                        "W001",
                        format!("{} still contains a placeholder credential", url),
                    )
                    .with_field(field),
                );
            }
        }
    }
}

/// Compare the network id a node reported with the configured one.
pub fn check_network(report: &NodeStatusReport, expected: Option<u64>) -> Option<ValidationIssue> {
    let expected = expected?;
    let actual = report.network_id?;
    if !report.connected || actual == expected {
        return None;
    }
    Some(
        ValidationIssue::new(
            Severity::Error,
            "E010",
            format!(
                "{} reports network id {} but {} is configured",
                report.endpoint, actual, expected
            ),
        )
        .with_field("node.network_id"),
    )
}

pub fn has_errors(issues: &[ValidationIssue]) -> bool {
    issues.iter().any(|issue| issue.severity == Severity::Error)
}

/// Errors that make a probe run pointless; problems with listed-only
/// endpoints are left to `validate`.
pub fn blocks_probe(issue: &ValidationIssue) -> bool {
    issue.severity == Severity::Error
        && !issue
            .field
            .as_deref()
            .map_or(false, |field| UNPROBED_FIELDS.contains(&field))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|issue| issue.code.as_str()).collect()
    }

    fn settings_with(primary: &str, fallbacks: &[&str]) -> Settings {
        let mut settings = Settings::default();
        settings.node.rpc_url = primary.to_string();
        settings.node.fallback_rpc_urls = fallbacks.iter().map(|s| s.to_string()).collect();
        settings.monitoring.block_interval_ms = 60_000;
        settings
    }

    #[test]
    fn test_clean_configuration_has_no_issues() {
        let settings = settings_with("http://localhost:8545", &["https://rpc.example.org"]);
        assert!(validate_settings(&settings).is_empty());
    }

    #[test]
    fn test_sample_placeholders_are_flagged() {
        let settings = settings_with(
            "http://localhost:8545",
            &[
                "https://eth-mainnet.g.alchemy.com/v2/YOUR_API_KEY",
                "https://mainnet.infura.io/v3/YOUR_PROJECT_ID",
            ],
        );
        let issues = validate_settings(&settings);
        assert_eq!(codes(&issues), vec!["W001", "W001"]);
        assert_eq!(issues[1].field.as_deref(), Some("node.fallback_rpc_urls[1]"));
        assert!(!has_errors(&issues));
    }

    #[test]
    fn test_bad_urls_and_schemes() {
        let mut settings = settings_with("localhost:8545", &["not a url", "ftp://node"]);
        settings.node.ws_url = Some("http://localhost:8546".to_string());
        let issues = validate_settings(&settings);

        // "localhost:8545" parses with scheme "localhost"
        assert_eq!(codes(&issues), vec!["E002", "E001", "E002", "E004"]);
        assert_eq!(issues.iter().filter(|issue| blocks_probe(issue)).count(), 3);
        assert!(has_errors(&issues));
    }

    #[test]
    fn test_duplicate_endpoints() {
        let settings = settings_with(
            "http://localhost:8545",
            &["http://LOCALHOST:8545/", "https://rpc.example.org"],
        );
        let issues = validate_settings(&settings);
        assert_eq!(codes(&issues), vec!["W002"]);
        assert_eq!(issues[0].field.as_deref(), Some("node.fallback_rpc_urls[0]"));
    }

    #[test]
    fn test_timeout_and_interval() {
        let mut settings = settings_with("http://localhost:8545", &["https://rpc.example.org"]);
        settings.monitoring.timeout_ms = 0;
        assert_eq!(codes(&validate_settings(&settings)), vec!["E003"]);

        settings.monitoring.timeout_ms = 30_000;
        settings.monitoring.block_interval_ms = 1_000;
        assert_eq!(codes(&validate_settings(&settings)), vec!["W003"]);
    }

    #[test]
    fn test_missing_fallbacks_is_informational() {
        let settings = settings_with("http://localhost:8545", &[]);
        let issues = validate_settings(&settings);
        assert_eq!(codes(&issues), vec!["I001"]);
        assert!(!has_errors(&issues));
    }

    #[test]
    fn test_listed_only_endpoints_do_not_block_check() {
        let mut settings = settings_with("http://localhost:8545", &["https://rpc.example.org"]);
        settings.node.ws_url = Some("http://localhost:8546".to_string());
        settings.node.api_gateway_url = Some("ftp://localhost:8080".to_string());

        let issues = validate_settings(&settings);
        assert_eq!(codes(&issues), vec!["E004", "E005"]);
        assert!(has_errors(&issues));
        assert!(!issues.iter().any(blocks_probe));
    }

    #[test]
    fn test_default_settings_warn_on_interval() {
        let issues = validate_settings(&Settings::default());
        assert_eq!(codes(&issues), vec!["W003", "I001"]);
    }

    #[test]
    fn test_check_network() {
        let mut report = NodeStatusReport::connected("http://localhost:8545");
        report.network_id = Some(11155111);

        let issue = check_network(&report, Some(1)).unwrap();
        assert_eq!(issue.code, "E010");
        assert!(issue.message.contains("11155111"));

        assert!(check_network(&report, Some(11155111)).is_none());
        assert!(check_network(&report, None).is_none());

        report.network_id = None;
        assert!(check_network(&report, Some(1)).is_none());
    }
}

use std::time::Duration;

use serde::Serialize;
use tokio::time::MissedTickBehavior;

use crate::cli::error::CliError;
use crate::cli::progress;
use crate::configuration::Settings;
use crate::console::commands::{load_settings, runtime, CallableTrait};
use crate::console::render;
use crate::probe::{EndpointConfig, NodeHealthProbe, NodeStatusReport, ProbeError, ProbeHistory};
use crate::validation::{blocks_probe, check_network, validate_settings};

/// Probe outcomes kept for the watch summary.
const WATCH_HISTORY_SIZE: usize = 1000;

/// `nodeprobe check [--rpc-url URL] [--fallback URL]... [--json] [--watch]`
///
/// Probes the configured endpoint chain and prints the node status.
pub struct CheckCommand {
    pub config: Option<String>,
    pub rpc_url: Option<String>,
    pub fallbacks: Vec<String>,
    pub timeout_ms: Option<u64>,
    pub json: bool,
    pub watch: bool,
    pub count: Option<usize>,
}

/// JSON shape printed by `--json`: the report, plus the error when every
/// endpoint failed.
#[derive(Serialize)]
struct JsonOutcome<'a> {
    #[serde(flatten)]
    report: &'a NodeStatusReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a ProbeError>,
}

impl CheckCommand {
    pub fn new(config: Option<String>, json: bool, watch: bool) -> Self {
        Self {
            config,
            rpc_url: None,
            fallbacks: Vec::new(),
            timeout_ms: None,
            json,
            watch,
            count: None,
        }
    }

    pub fn with_overrides(
        mut self,
        rpc_url: Option<String>,
        fallbacks: Vec<String>,
        timeout_ms: Option<u64>,
    ) -> Self {
        self.rpc_url = rpc_url;
        self.fallbacks = fallbacks;
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_count(mut self, count: Option<usize>) -> Self {
        self.count = count;
        self
    }

    /// Command-line flags win over file and environment.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(url) = &self.rpc_url {
            settings.node.rpc_url = url.clone();
        }
        if !self.fallbacks.is_empty() {
            settings.node.fallback_rpc_urls = self.fallbacks.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            settings.monitoring.timeout_ms = timeout_ms;
        }
    }

    fn print_outcome(
        &self,
        settings: &Settings,
        outcome: &Result<NodeStatusReport, ProbeError>,
    ) -> Result<(), CliError> {
        if self.json {
            let disconnected;
            let json = match outcome {
                Ok(report) => JsonOutcome {
                    report,
                    error: None,
                },
                Err(err) => {
                    disconnected = NodeStatusReport::disconnected(&settings.node.rpc_url);
                    JsonOutcome {
                        report: &disconnected,
                        error: Some(err),
                    }
                }
            };
            let text = if self.watch {
                serde_json::to_string(&json)?
            } else {
                serde_json::to_string_pretty(&json)?
            };
            println!("{}", text);
            return Ok(());
        }

        match outcome {
            Ok(report) => println!("{}", render::render_report(report)),
            Err(err) if self.watch => println!("{}", render::render_failure(err)),
            // Single-shot failures surface once, through the returned error.
            Err(_) => {}
        }
        Ok(())
    }

    async fn check_once(
        &self,
        probe: &NodeHealthProbe,
        settings: &Settings,
        endpoint_config: EndpointConfig,
    ) -> Result<(), CliError> {
        let pb = (!self.json).then(|| {
            progress::probe_spinner(
                endpoint_config.primary_url(),
                endpoint_config.endpoints().count(),
            )
        });

        let outcome = probe.probe(endpoint_config).await;

        if let Some(pb) = &pb {
            match &outcome {
                Ok(report) => {
                    progress::finish_success(pb, &format!("{} answered", report.endpoint))
                }
                Err(_) => progress::finish_error(pb, "No endpoint answered"),
            }
        }

        self.print_outcome(settings, &outcome)?;
        let report = outcome?;

        if !self.json {
            println!();
            println!("{}", render::render_endpoints(settings));
        }

        if let Some(issue) = check_network(&report, settings.node.network_id) {
            eprintln!("{}", render::render_issues(&[issue]));
            return Err(CliError::NetworkMismatch {
                expected: settings.node.network_id.unwrap_or_default(),
                actual: report.network_id.unwrap_or_default(),
            });
        }

        Ok(())
    }

    async fn watch(
        &self,
        probe: &NodeHealthProbe,
        settings: &Settings,
        endpoint_config: EndpointConfig,
    ) -> Result<(), CliError> {
        let mut history = ProbeHistory::new(WATCH_HISTORY_SIZE);
        let mut last_error = None;
        let mut runs = 0usize;

        let period = Duration::from_millis(settings.monitoring.block_interval_ms.max(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                _ = ticker.tick() => {}
            }

            let outcome = tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                outcome = probe.probe(endpoint_config.clone()) => outcome,
            };
            runs += 1;

            match &outcome {
                Ok(report) => {
                    history.record_report(report);
                    if let Some(issue) = check_network(report, settings.node.network_id) {
                        tracing::warn!("{}", issue);
                    }
                }
                Err(err) => {
                    history.record_failure(err);
                    last_error = Some(err.clone());
                }
            }
            self.print_outcome(settings, &outcome)?;

            if self.count.map_or(false, |count| runs >= count) {
                break;
            }
        }

        let summary = history.summary();
        eprintln!("{}", render::render_summary(&summary));

        match last_error {
            Some(err) if summary.successes == 0 => Err(CliError::Probe(err)),
            _ => Ok(()),
        }
    }
}

impl CallableTrait for CheckCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut settings = load_settings(self.config.as_deref())?;
        self.apply_overrides(&mut settings);

        let issues = validate_settings(&settings);
        let blocking: Vec<_> = issues.into_iter().filter(blocks_probe).collect();
        if !blocking.is_empty() {
            eprintln!("{}", render::render_issues(&blocking));
            return Err(Box::new(CliError::ConfigValidation {
                errors: blocking.len(),
            }));
        }

        let endpoint_config = settings.endpoint_config().map_err(CliError::from)?;
        let probe = NodeHealthProbe::new();
        let rt = runtime()?;

        rt.block_on(async {
            if self.watch {
                self.watch(&probe, &settings, endpoint_config).await
            } else {
                self.check_once(&probe, &settings, endpoint_config).await
            }
        })?;

        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

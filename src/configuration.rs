use crate::probe::{EndpointConfig, ProbeError};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "nodeprobe";
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";
pub const DEFAULT_WS_URL: &str = "ws://localhost:8546";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_BLOCK_INTERVAL_MS: u64 = 1_000;

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub node: NodeSettings,
    #[serde(default)]
    pub monitoring: MonitoringSettings,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct NodeSettings {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_ws_url")]
    pub ws_url: Option<String>,
    #[serde(default)]
    pub fallback_rpc_urls: Vec<String>,
    /// Network id the node is expected to report.
    #[serde(default)]
    pub network_id: Option<u64>,
    /// API gateway in front of the node; listed, never probed.
    #[serde(default)]
    pub api_gateway_url: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct MonitoringSettings {
    #[serde(default = "default_block_interval_ms")]
    pub block_interval_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}
fn default_ws_url() -> Option<String> {
    Some(DEFAULT_WS_URL.to_string())
}
fn default_block_interval_ms() -> u64 {
    DEFAULT_BLOCK_INTERVAL_MS
}
fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            ws_url: default_ws_url(),
            fallback_rpc_urls: Vec::new(),
            network_id: None,
            api_gateway_url: None,
        }
    }
}

impl Default for MonitoringSettings {
    fn default() -> Self {
        Self {
            block_interval_ms: DEFAULT_BLOCK_INTERVAL_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Settings {
    /// Apply `ETHEREUM_*` / `MONITOR_*` / `API_GATEWAY_URL` overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("ETHEREUM_RPC_URL") {
            self.node.rpc_url = url.trim().to_string();
        }
        if let Some(url) = lookup("ETHEREUM_WS_URL") {
            let url = url.trim();
            self.node.ws_url = (!url.is_empty()).then(|| url.to_string());
        }
        if let Some(urls) = lookup("ETHEREUM_FALLBACK_RPC_URLS") {
            self.node.fallback_rpc_urls = urls
                .split(',')
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(url) = lookup("API_GATEWAY_URL") {
            let url = url.trim();
            self.node.api_gateway_url = (!url.is_empty()).then(|| url.to_string());
        }
        if let Some(id) = lookup("ETHEREUM_NETWORK_ID") {
            self.node.network_id = Some(parse_number("ETHEREUM_NETWORK_ID", &id)?);
        }
        if let Some(timeout) = lookup("MONITOR_TIMEOUT") {
            self.monitoring.timeout_ms = parse_number("MONITOR_TIMEOUT", &timeout)?;
        }
        if let Some(interval) = lookup("MONITOR_INTERVAL") {
            self.monitoring.block_interval_ms = parse_number("MONITOR_INTERVAL", &interval)?;
        }
        Ok(())
    }

    pub fn endpoint_config(&self) -> Result<EndpointConfig, ProbeError> {
        EndpointConfig::new(
            self.node.rpc_url.clone(),
            self.node.fallback_rpc_urls.clone(),
            self.monitoring.timeout_ms,
        )
    }
}

fn parse_number(var_name: &str, value: &str) -> Result<u64, config::ConfigError> {
    value.trim().parse().map_err(|_| {
        config::ConfigError::Message(format!(
            "{} must be a non-negative integer, got '{}'",
            var_name, value
        ))
    })
}

pub fn get_configuration(path: Option<&Path>) -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // An explicit path must exist; the default `nodeprobe.{yaml,toml,json}` may not
    let source = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let settings = config::Config::builder().add_source(source).build()?;
    let mut config: Settings = settings.try_deserialize()?;

    config.apply_overrides(|key| std::env::var(key).ok())?;

    Ok(config)
}

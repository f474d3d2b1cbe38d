use super::error::ProbeError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Endpoint chain and per-request timeout handed to the probe.
///
/// Immutable once built; `new` is the only way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointConfig {
    primary_url: String,
    fallback_urls: Vec<String>,
    timeout_ms: u64,
}

impl EndpointConfig {
    pub fn new(
        primary_url: impl Into<String>,
        fallback_urls: Vec<String>,
        timeout_ms: u64,
    ) -> Result<Self, ProbeError> {
        let primary_url = primary_url.into().trim().to_string();
        if primary_url.is_empty() {
            return Err(ProbeError::invalid_config("primary URL is empty"));
        }
        if timeout_ms == 0 {
            return Err(ProbeError::invalid_config("timeout must be greater than 0 ms"));
        }

        let fallback_urls = fallback_urls
            .into_iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();

        Ok(Self {
            primary_url,
            fallback_urls,
            timeout_ms,
        })
    }

    pub fn primary_url(&self) -> &str {
        &self.primary_url
    }

    pub fn fallback_urls(&self) -> &[String] {
        &self.fallback_urls
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Primary first, then fallbacks in configured order.
    pub fn endpoints(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary_url.as_str())
            .chain(self.fallback_urls.iter().map(String::as_str))
    }
}

/// Progress of a node that is still catching up with the chain head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncInfo {
    pub starting_block: u64,
    pub current_block: u64,
    pub highest_block: u64,
    pub known_states: u64,
    pub pulled_states: u64,
}

impl SyncInfo {
    pub fn blocks_remaining(&self) -> u64 {
        self.highest_block.saturating_sub(self.current_block)
    }

    /// Percentage of blocks imported between the starting and highest block.
    pub fn progress_percent(&self) -> f64 {
        let total = self.highest_block.saturating_sub(self.starting_block);
        if total == 0 {
            return 100.0;
        }
        let done = self.current_block.saturating_sub(self.starting_block);
        (done as f64 / total as f64 * 100.0).min(100.0)
    }
}

/// The fixed battery of read-only status queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeQuery {
    Listening,
    NetworkId,
    BlockNumber,
    Syncing,
    NodeInfo,
    PeerCount,
}

impl ProbeQuery {
    pub fn method(&self) -> &'static str {
        match self {
            Self::Listening => "net_listening",
            Self::NetworkId => "net_version",
            Self::BlockNumber => "eth_blockNumber",
            Self::Syncing => "eth_syncing",
            Self::NodeInfo => "web3_clientVersion",
            Self::PeerCount => "net_peerCount",
        }
    }
}

impl fmt::Display for ProbeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Listening => "listening status",
            Self::NetworkId => "network id",
            Self::BlockNumber => "block number",
            Self::Syncing => "sync status",
            Self::NodeInfo => "node info",
            Self::PeerCount => "peer count",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryFailure {
    pub query: ProbeQuery,
    pub error: ProbeError,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeStatusReport {
    pub endpoint: String,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listening: Option<bool>,
    pub network_id: Option<u64>,
    pub current_block: Option<u64>,
    pub syncing: Option<SyncInfo>,
    pub peer_count: Option<u64>,
    pub node_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    pub checked_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<QueryFailure>,
}

impl NodeStatusReport {
    /// Empty report for an endpoint that answered the handshake.
    pub fn connected(endpoint: &str) -> Self {
        Self {
            connected: true,
            ..Self::disconnected(endpoint)
        }
    }

    pub fn disconnected(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            connected: false,
            listening: None,
            network_id: None,
            current_block: None,
            syncing: None,
            peer_count: None,
            node_info: None,
            response_time_ms: None,
            checked_at: Utc::now(),
            failures: Vec::new(),
        }
    }

    pub fn failure_for(&self, query: ProbeQuery) -> Option<&ProbeError> {
        self.failures
            .iter()
            .find(|failure| failure.query == query)
            .map(|failure| &failure.error)
    }

    /// `None` when the sync status could not be fetched.
    pub fn is_synced(&self) -> Option<bool> {
        if !self.connected || self.failure_for(ProbeQuery::Syncing).is_some() {
            return None;
        }
        Some(self.syncing.is_none())
    }

    pub fn is_complete(&self) -> bool {
        self.connected && self.failures.is_empty()
    }
}

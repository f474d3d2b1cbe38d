use super::error::ProbeError;
use super::models::{EndpointConfig, NodeStatusReport, ProbeQuery, QueryFailure, SyncInfo};
use crate::rpc::{parse_quantity, Connector, DefaultConnector, RpcTransport};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Runs the status battery against the first reachable endpoint of a chain.
pub struct NodeHealthProbe<C = DefaultConnector> {
    connector: C,
}

impl NodeHealthProbe<DefaultConnector> {
    pub fn new() -> Self {
        Self {
            connector: DefaultConnector,
        }
    }
}

impl Default for NodeHealthProbe<DefaultConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Connector> NodeHealthProbe<C> {
    pub fn with_connector(connector: C) -> Self {
        Self { connector }
    }

    /// Probe the primary endpoint, falling back in order on connection failure.
    #[tracing::instrument(
        name = "Probe node",
        skip(self, config),
        fields(primary = %config.primary_url())
    )]
    pub async fn probe(&self, config: EndpointConfig) -> Result<NodeStatusReport, ProbeError> {
        let mut attempted = 0;
        let mut last_error = None;

        for url in config.endpoints() {
            attempted += 1;
            match self.probe_endpoint(url, config.timeout()).await {
                Ok(report) => {
                    if attempted > 1 {
                        tracing::info!(endpoint = %url, "Fallback endpoint answered");
                    }
                    return Ok(report);
                }
                Err(err) => {
                    tracing::warn!(endpoint = %url, error = %err, "Endpoint unreachable");
                    last_error = Some(err);
                }
            }
        }

        Err(ProbeError::AllEndpointsUnreachable {
            attempted,
            last_error: last_error.map(|e| e.to_string()).unwrap_or_default(),
        })
    }

    /// One endpoint attempt: acquire a client, query, release.
    #[tracing::instrument(name = "Probe endpoint", skip(self, request_timeout))]
    pub async fn probe_endpoint(
        &self,
        url: &str,
        request_timeout: Duration,
    ) -> Result<NodeStatusReport, ProbeError> {
        let start = Instant::now();
        let connect = self.connector.connect(url, request_timeout);
        let client = match timeout(request_timeout, connect).await {
            Ok(connected) => connected?,
            Err(_) => return Err(ProbeError::timeout(url, request_timeout.as_millis() as u64)),
        };

        let outcome = query_node(client.as_ref(), request_timeout).await;
        client.close().await;

        outcome.map(|mut report| {
            report.response_time_ms = Some(start.elapsed().as_millis() as u64);
            report
        })
    }
}

async fn query_node(
    client: &dyn RpcTransport,
    request_timeout: Duration,
) -> Result<NodeStatusReport, ProbeError> {
    let listening = call(client, ProbeQuery::Listening, request_timeout).await;
    if let Err(err) = &listening {
        if err.is_connection_level() {
            return Err(err.clone());
        }
    }

    let (network_id, block_number, syncing, node_info, peer_count) = tokio::join!(
        call(client, ProbeQuery::NetworkId, request_timeout),
        call(client, ProbeQuery::BlockNumber, request_timeout),
        call(client, ProbeQuery::Syncing, request_timeout),
        call(client, ProbeQuery::NodeInfo, request_timeout),
        call(client, ProbeQuery::PeerCount, request_timeout),
    );

    let url = client.url();
    let mut report = NodeStatusReport::connected(url);
    let mut failures = Vec::new();

    report.listening = settle(
        ProbeQuery::Listening,
        listening.and_then(|v| decode(url, ProbeQuery::Listening, &v, Value::as_bool)),
        &mut failures,
    );
    report.network_id = settle(
        ProbeQuery::NetworkId,
        network_id.and_then(|v| decode(url, ProbeQuery::NetworkId, &v, parse_quantity)),
        &mut failures,
    );
    report.current_block = settle(
        ProbeQuery::BlockNumber,
        block_number.and_then(|v| decode(url, ProbeQuery::BlockNumber, &v, parse_quantity)),
        &mut failures,
    );
    report.syncing = settle(
        ProbeQuery::Syncing,
        syncing.and_then(|v| decode(url, ProbeQuery::Syncing, &v, parse_sync_status)),
        &mut failures,
    )
    .flatten();
    report.node_info = settle(
        ProbeQuery::NodeInfo,
        node_info.and_then(|v| {
            decode(url, ProbeQuery::NodeInfo, &v, |v| v.as_str().map(str::to_string))
        }),
        &mut failures,
    );
    report.peer_count = settle(
        ProbeQuery::PeerCount,
        peer_count.and_then(|v| decode(url, ProbeQuery::PeerCount, &v, parse_quantity)),
        &mut failures,
    );

    report.failures = failures;
    Ok(report)
}

async fn call(
    client: &dyn RpcTransport,
    query: ProbeQuery,
    request_timeout: Duration,
) -> Result<Value, ProbeError> {
    match timeout(request_timeout, client.request(query.method(), json!([]))).await {
        Ok(result) => result,
        Err(_) => Err(ProbeError::timeout(
            client.url(),
            request_timeout.as_millis() as u64,
        )),
    }
}

fn decode<T>(
    url: &str,
    query: ProbeQuery,
    value: &Value,
    parse: impl FnOnce(&Value) -> Option<T>,
) -> Result<T, ProbeError> {
    parse(value).ok_or_else(|| {
        ProbeError::invalid_response(
            url,
            format!("unexpected {} result: {}", query.method(), value),
        )
    })
}

fn settle<T>(
    query: ProbeQuery,
    result: Result<T, ProbeError>,
    failures: &mut Vec<QueryFailure>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!(query = %query, error = %error, "Status query failed");
            failures.push(QueryFailure { query, error });
            None
        }
    }
}

/// `eth_syncing` answers `false` once caught up, otherwise a progress object.
fn parse_sync_status(value: &Value) -> Option<Option<SyncInfo>> {
    match value {
        Value::Bool(false) => Some(None),
        Value::Object(fields) => {
            let quantity = |key: &str| fields.get(key).and_then(parse_quantity);
            Some(Some(SyncInfo {
                starting_block: quantity("startingBlock").unwrap_or(0),
                current_block: quantity("currentBlock")?,
                highest_block: quantity("highestBlock")?,
                known_states: quantity("knownStates").unwrap_or(0),
                pulled_states: quantity("pulledStates").unwrap_or(0),
            }))
        }
        _ => None,
    }
}

#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Nothing listens on port 1.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";

pub const CLIENT_VERSION: &str = "Geth/v1.13.5-stable-916d6a44/linux-amd64/go1.21.4";

pub fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": result
    }))
}

pub fn rpc_error(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": {"code": code, "message": message}
    }))
}

/// Answers of a synced mainnet node: network 1, block 100, 5 peers.
pub fn healthy_answers() -> BTreeMap<&'static str, ResponseTemplate> {
    let mut answers = BTreeMap::new();
    answers.insert("net_listening", rpc_result(json!(true)));
    answers.insert("net_version", rpc_result(json!("1")));
    answers.insert("eth_blockNumber", rpc_result(json!("0x64")));
    answers.insert("eth_syncing", rpc_result(json!(false)));
    answers.insert("web3_clientVersion", rpc_result(json!(CLIENT_VERSION)));
    answers.insert("net_peerCount", rpc_result(json!("0x5")));
    answers
}

/// Start a stub node; `overrides` replace the healthy answer per method.
pub async fn spawn_node(overrides: Vec<(&'static str, ResponseTemplate)>) -> MockServer {
    let server = MockServer::start().await;
    let mut answers = healthy_answers();
    answers.extend(overrides);

    for (rpc_method, response) in answers {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": rpc_method })))
            .respond_with(response)
            .mount(&server)
            .await;
    }
    server
}

/// A node that answers every call only after `delay`.
pub async fn spawn_slow_node(delay: Duration) -> MockServer {
    let overrides = healthy_answers()
        .into_iter()
        .map(|(rpc_method, response)| (rpc_method, response.set_delay(delay)))
        .collect();
    spawn_node(overrides).await
}

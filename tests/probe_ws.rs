mod common;

use futures_util::{SinkExt, StreamExt};
use nodeprobe::probe::{EndpointConfig, NodeHealthProbe, ProbeError, ProbeQuery};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

fn answer(method: &str) -> Value {
    match method {
        "net_listening" => json!(true),
        "net_version" => json!("11155111"),
        "eth_blockNumber" => json!("0x4b0"),
        "eth_syncing" => json!({
            "currentBlock": "0x4b0",
            "highestBlock": "0x4c9"
        }),
        "web3_clientVersion" => json!("Nethermind/v1.25.4"),
        "net_peerCount" => json!("0x19"),
        _ => Value::Null,
    }
}

/// How the in-process node behaves on each request.
#[derive(Clone, Copy)]
enum NodeBehaviour {
    /// Pushes a subscription notification before every reply.
    Chatty,
    /// Sends a ping before every reply.
    Pinging,
    /// Answers every request after a delay, requests handled concurrently.
    Slow(Duration),
    /// Sends a close frame instead of answering the handshake.
    ClosesOnHandshake,
    /// Drops the socket instead of answering the handshake.
    DropsOnHandshake,
}

async fn spawn_ws_node(behaviour: NodeBehaviour) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let Ok(ws) = accept_async(stream).await else {
                    return;
                };
                let (mut sink, mut source) = ws.split();

                // Single writer; dropping every sender closes the socket.
                let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
                tokio::spawn(async move {
                    while let Some(msg) = rx.recv().await {
                        if sink.send(msg).await.is_err() {
                            break;
                        }
                    }
                });

                while let Some(Ok(msg)) = source.next().await {
                    let Message::Text(text) = msg else {
                        continue;
                    };
                    let request: Value = serde_json::from_str(&text).unwrap();
                    let method = request["method"].as_str().unwrap_or_default();
                    let reply = Message::Text(
                        json!({
                            "jsonrpc": "2.0",
                            "id": request["id"],
                            "result": answer(method)
                        })
                        .to_string(),
                    );

                    match behaviour {
                        NodeBehaviour::Chatty => {
                            let notification = json!({
                                "jsonrpc": "2.0",
                                "method": "eth_subscription",
                                "params": {"subscription": "0x1", "result": {}}
                            });
                            let _ = tx.send(Message::Text(notification.to_string()));
                            let _ = tx.send(reply);
                        }
                        NodeBehaviour::Pinging => {
                            let _ = tx.send(Message::Ping(vec![1, 2, 3]));
                            let _ = tx.send(reply);
                        }
                        NodeBehaviour::Slow(delay) => {
                            let tx = tx.clone();
                            tokio::spawn(async move {
                                tokio::time::sleep(delay).await;
                                let _ = tx.send(reply);
                            });
                        }
                        NodeBehaviour::ClosesOnHandshake if method == "net_listening" => {
                            let _ = tx.send(Message::Close(None));
                            return;
                        }
                        NodeBehaviour::DropsOnHandshake if method == "net_listening" => return,
                        NodeBehaviour::ClosesOnHandshake | NodeBehaviour::DropsOnHandshake => {
                            let _ = tx.send(reply);
                        }
                    }
                }
            });
        }
    });

    format!("ws://{}", addr)
}

#[tokio::test]
async fn test_ws_probe_reports_fields() {
    let url = spawn_ws_node(NodeBehaviour::Chatty).await;
    let probe = NodeHealthProbe::new();

    let report = probe
        .probe(EndpointConfig::new(url.clone(), vec![], 2_000).unwrap())
        .await
        .expect("ws probe succeeds");

    assert!(report.connected);
    assert_eq!(report.endpoint, url);
    assert_eq!(report.network_id, Some(11_155_111));
    assert_eq!(report.current_block, Some(1200));
    assert_eq!(report.peer_count, Some(25));
    assert_eq!(report.node_info.as_deref(), Some("Nethermind/v1.25.4"));

    let sync = report.syncing.expect("node is syncing");
    assert_eq!(sync.highest_block, 1225);
    assert_eq!(sync.blocks_remaining(), 25);
    assert_eq!(sync.known_states, 0);
    assert!(report.failures.is_empty(), "unexpected failures: {:?}", report.failures);
}

#[tokio::test]
async fn test_ping_frames_are_skipped() {
    let url = spawn_ws_node(NodeBehaviour::Pinging).await;
    let probe = NodeHealthProbe::new();

    let report = probe
        .probe(EndpointConfig::new(url, vec![], 2_000).unwrap())
        .await
        .expect("ws probe succeeds");

    assert!(report.is_complete(), "unexpected failures: {:?}", report.failures);
    assert_eq!(report.current_block, Some(1200));
}

#[tokio::test]
async fn test_slow_ws_node_within_timeout_gives_full_report() {
    // Each reply takes 150 ms; queries share the socket but must not queue
    // behind each other against the 400 ms per-query timeout.
    let url = spawn_ws_node(NodeBehaviour::Slow(Duration::from_millis(150))).await;
    let probe = NodeHealthProbe::new();

    let report = probe
        .probe(EndpointConfig::new(url, vec![], 400).unwrap())
        .await
        .expect("slow node still answers in time");

    assert!(report.failures.is_empty(), "unexpected failures: {:?}", report.failures);
    assert!(report.syncing.is_some());
    assert_eq!(report.node_info.as_deref(), Some("Nethermind/v1.25.4"));
    assert_eq!(report.peer_count, Some(25));
}

#[tokio::test]
async fn test_close_frame_on_handshake_is_connection_refused() {
    let closing = spawn_ws_node(NodeBehaviour::ClosesOnHandshake).await;
    let healthy = spawn_ws_node(NodeBehaviour::Chatty).await;
    let probe = NodeHealthProbe::new();

    let err = probe
        .probe_endpoint(&closing, Duration::from_secs(2))
        .await
        .expect_err("node closed the socket");
    assert!(matches!(err, ProbeError::ConnectionRefused { .. }), "got {err:?}");

    let report = probe
        .probe(EndpointConfig::new(closing, vec![healthy.clone()], 2_000).unwrap())
        .await
        .expect("fallback answers");
    assert_eq!(report.endpoint, healthy);
}

#[tokio::test]
async fn test_dropped_socket_on_handshake_is_connection_refused() {
    let dropping = spawn_ws_node(NodeBehaviour::DropsOnHandshake).await;
    let healthy = spawn_ws_node(NodeBehaviour::Chatty).await;
    let probe = NodeHealthProbe::new();

    let err = probe
        .probe_endpoint(&dropping, Duration::from_secs(2))
        .await
        .expect_err("node dropped the socket");
    assert!(matches!(err, ProbeError::ConnectionRefused { .. }), "got {err:?}");

    let report = probe
        .probe(EndpointConfig::new(dropping, vec![healthy.clone()], 2_000).unwrap())
        .await
        .expect("fallback answers");
    assert_eq!(report.endpoint, healthy);
    assert!(report.failure_for(ProbeQuery::Listening).is_none());
}

#[tokio::test]
async fn test_unreachable_ws_primary_falls_back_to_ws() {
    let url = spawn_ws_node(NodeBehaviour::Chatty).await;
    let probe = NodeHealthProbe::new();

    let report = probe
        .probe(EndpointConfig::new("ws://127.0.0.1:1", vec![url.clone()], 2_000).unwrap())
        .await
        .expect("fallback answers");

    assert_eq!(report.endpoint, url);
}

#[tokio::test]
async fn test_http_primary_falls_back_to_ws() {
    let url = spawn_ws_node(NodeBehaviour::Chatty).await;
    let probe = NodeHealthProbe::new();

    let report = probe
        .probe(EndpointConfig::new(common::UNREACHABLE_URL, vec![url.clone()], 2_000).unwrap())
        .await
        .expect("fallback answers");

    assert_eq!(report.endpoint, url);
    assert_eq!(report.current_block, Some(1200));
}

#[tokio::test]
async fn test_silent_ws_node_times_out() {
    // Accepts the TCP connection but never completes the WebSocket handshake.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let probe = NodeHealthProbe::new();
    let err = probe
        .probe_endpoint(&format!("ws://{}", addr), Duration::from_millis(100))
        .await
        .expect_err("handshake never completes");

    assert!(matches!(err, ProbeError::Timeout { .. }), "got {err:?}");
}

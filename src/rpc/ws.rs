use super::request::{JsonRpcRequest, JsonRpcResponse};
use super::transport::RpcTransport;
use crate::probe::ProbeError;
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Reply = Result<Value, ProbeError>;

/// Requests in flight, keyed by JSON-RPC id.
#[derive(Default)]
struct Pending {
    waiters: HashMap<u64, oneshot::Sender<Reply>>,
    /// Set once the reader stops; later requests fail with it.
    closed: Option<ProbeError>,
}

fn lock(pending: &Mutex<Pending>) -> MutexGuard<'_, Pending> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// JSON-RPC over a single WebSocket connection.
///
/// Requests are multiplexed: writes share the sink, and a reader task hands
/// each reply to the request with the matching id. Notifications and
/// ping/pong frames are skipped.
pub struct WsTransport {
    url: String,
    sink: tokio::sync::Mutex<SplitSink<WsStream, Message>>,
    pending: Arc<Mutex<Pending>>,
    reader: JoinHandle<()>,
    next_id: AtomicU64,
}

impl WsTransport {
    #[tracing::instrument(name = "Open WebSocket", skip(timeout))]
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, ProbeError> {
        let (stream, _response) = tokio::time::timeout(timeout, connect_async(url))
            .await
            .map_err(|_| ProbeError::timeout(url, timeout.as_millis() as u64))?
            .map_err(|e| ProbeError::connection_refused(url, e))?;

        let (sink, source) = stream.split();
        let pending = Arc::new(Mutex::new(Pending::default()));
        let reader = tokio::spawn(read_replies(url.to_string(), source, pending.clone()));

        Ok(Self {
            url: url.to_string(),
            sink: tokio::sync::Mutex::new(sink),
            pending,
            reader,
            next_id: AtomicU64::new(1),
        })
    }
}

async fn read_replies(
    url: String,
    mut source: SplitStream<WsStream>,
    pending: Arc<Mutex<Pending>>,
) {
    let reason = loop {
        match source.next().await {
            Some(Ok(Message::Text(text))) => dispatch(&url, text.as_bytes(), &pending),
            Some(Ok(Message::Binary(bytes))) => dispatch(&url, &bytes, &pending),
            Some(Ok(Message::Close(_))) => break "connection closed by node".to_string(),
            Some(Ok(_)) => {}
            Some(Err(e)) => break e.to_string(),
            None => break "stream ended".to_string(),
        }
    };

    let error = ProbeError::connection_refused(&url, reason);
    let mut pending = lock(&pending);
    for (_, waiter) in pending.waiters.drain() {
        let _ = waiter.send(Err(error.clone()));
    }
    pending.closed = Some(error);
}

fn dispatch(url: &str, payload: &[u8], pending: &Mutex<Pending>) {
    let envelope = match serde_json::from_slice::<JsonRpcResponse>(payload) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!(url = %url, "Skipping undecodable frame: {}", e);
            return;
        }
    };
    let Some(id) = envelope.numeric_id() else {
        tracing::debug!(url = %url, "Skipping notification");
        return;
    };

    let waiter = lock(pending).waiters.remove(&id);
    match waiter {
        Some(waiter) => {
            let _ = waiter.send(envelope.into_result(url));
        }
        None => tracing::debug!(url = %url, id, "Skipping reply for an abandoned request"),
    }
}

#[async_trait]
impl RpcTransport for WsTransport {
    fn url(&self) -> &str {
        &self.url
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, ProbeError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = serde_json::to_string(&JsonRpcRequest::new(id, method, params))
            .map_err(|e| ProbeError::invalid_config(format!("cannot encode {}: {}", method, e)))?;

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = lock(&self.pending);
            if let Some(err) = &pending.closed {
                return Err(err.clone());
            }
            pending.waiters.insert(id, tx);
        }

        let sent = self.sink.lock().await.send(Message::Text(payload)).await;
        if let Err(e) = sent {
            lock(&self.pending).waiters.remove(&id);
            return Err(ProbeError::connection_refused(&self.url, e));
        }

        rx.await
            .unwrap_or_else(|_| Err(ProbeError::connection_refused(&self.url, "reader stopped")))
    }

    async fn close(&self) {
        if let Err(e) = self.sink.lock().await.close().await {
            tracing::debug!(url = %self.url, "WebSocket close failed: {}", e);
        }
        self.reader.abort();
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

use super::request::{JsonRpcRequest, JsonRpcResponse};
use super::transport::RpcTransport;
use crate::probe::ProbeError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// JSON-RPC over HTTP(S) POST.
pub struct HttpTransport {
    url: String,
    http: reqwest::Client,
    timeout_ms: u64,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ProbeError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| ProbeError::invalid_config(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            url: url.to_string(),
            http,
            timeout_ms: timeout.as_millis() as u64,
            next_id: AtomicU64::new(1),
        })
    }

    fn classify(&self, err: reqwest::Error) -> ProbeError {
        if err.is_timeout() {
            ProbeError::timeout(&self.url, self.timeout_ms)
        } else if err.is_decode() || err.is_body() {
            ProbeError::invalid_response(&self.url, err)
        } else {
            ProbeError::connection_refused(&self.url, err)
        }
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    fn url(&self) -> &str {
        &self.url
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, ProbeError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = JsonRpcRequest::new(id, method, params);

        let resp = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            // Some providers pair JSON-RPC errors with a 4xx/5xx status
            if let Ok(envelope) = serde_json::from_str::<JsonRpcResponse>(&text) {
                if envelope.error.is_some() {
                    return envelope.into_result(&self.url);
                }
            }
            return Err(ProbeError::invalid_response(
                &self.url,
                format!("HTTP {} for {}: {}", status, method, text.trim()),
            ));
        }

        let envelope: JsonRpcResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                ProbeError::timeout(&self.url, self.timeout_ms)
            } else {
                ProbeError::invalid_response(&self.url, format!("not a JSON-RPC response: {}", e))
            }
        })?;

        envelope.into_result(&self.url)
    }
}

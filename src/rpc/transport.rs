use super::http::HttpTransport;
use super::ws::WsTransport;
use crate::probe::ProbeError;
use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;

/// An open client handle to one JSON-RPC endpoint.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    fn url(&self) -> &str;

    async fn request(&self, method: &str, params: Value) -> Result<Value, ProbeError>;

    /// Release the handle. Called once at the end of every endpoint attempt.
    async fn close(&self) {}
}

/// Acquires an [`RpcTransport`] for a URL.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<Box<dyn RpcTransport>, ProbeError>;
}

/// Picks HTTP or WebSocket transport from the URL scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConnector;

#[async_trait]
impl Connector for DefaultConnector {
    async fn connect(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<Box<dyn RpcTransport>, ProbeError> {
        let parsed = Url::parse(url).map_err(|e| {
            ProbeError::invalid_config(format!("'{}' is not a valid URL: {}", url, e))
        })?;

        match parsed.scheme() {
            "http" | "https" => Ok(Box::new(HttpTransport::new(url, timeout)?)),
            "ws" | "wss" => Ok(Box::new(WsTransport::connect(url, timeout).await?)),
            other => Err(ProbeError::invalid_config(format!(
                "unsupported scheme '{}' in {}",
                other, url
            ))),
        }
    }
}

use serde::Serialize;
use thiserror::Error;

/// Failure taxonomy for a probe run.
///
/// `ConnectionRefused`, `Timeout` and `InvalidResponse` are connection-level:
/// raised on the handshake they move the probe on to the next fallback
/// endpoint. Raised on an individual query they only degrade the report.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeError {
    #[error("Connection to {url} failed: {reason}")]
    ConnectionRefused { url: String, reason: String },

    #[error("Request to {url} timed out after {timeout_ms} ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("RPC error {code}: {message}")]
    RpcError { code: i64, message: String },

    #[error("Invalid response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    #[error("Invalid endpoint configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("All {attempted} endpoint(s) unreachable, last error: {last_error}")]
    AllEndpointsUnreachable { attempted: usize, last_error: String },
}

impl ProbeError {
    pub fn connection_refused(url: &str, reason: impl ToString) -> Self {
        Self::ConnectionRefused {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn timeout(url: &str, timeout_ms: u64) -> Self {
        Self::Timeout {
            url: url.to_string(),
            timeout_ms,
        }
    }

    pub fn invalid_response(url: &str, reason: impl ToString) -> Self {
        Self::InvalidResponse {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_config(reason: impl ToString) -> Self {
        Self::InvalidConfig {
            reason: reason.to_string(),
        }
    }

    /// True when the endpoint itself could not be talked to.
    pub fn is_connection_level(&self) -> bool {
        matches!(
            self,
            Self::ConnectionRefused { .. } | Self::Timeout { .. } | Self::InvalidResponse { .. }
        )
    }
}

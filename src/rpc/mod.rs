//! JSON-RPC client capability used by the probe.
//!
//! - [`RpcTransport`]: an open client handle to one endpoint
//! - [`Connector`]: acquires a handle for a URL
//! - [`JsonRpcRequest`] / [`JsonRpcResponse`]: wire types

mod http;
mod request;
mod transport;
mod ws;

pub use http::HttpTransport;
pub use request::{parse_quantity, JsonRpcErrorObject, JsonRpcRequest, JsonRpcResponse};
pub use transport::{Connector, DefaultConnector, RpcTransport};
pub use ws::WsTransport;

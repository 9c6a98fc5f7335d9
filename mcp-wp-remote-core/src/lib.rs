//! Core library for the WebSamurai MCP remote relay.
//!
//! Provides the JSON-RPC wire types, the error taxonomy and its JSON-RPC code
//! mapping, the remote endpoint configuration, and the HTTP forwarder used by
//! the `mcp-wp-remote` stdio binary.

pub mod endpoint;
pub mod error;
pub mod jsonrpc;
pub mod transport;

pub use endpoint::RemoteEndpoint;
pub use error::{EndpointError, RelayError};
pub use jsonrpc::{InboundMessage, RelayReply, RequestId};
pub use transport::RemoteClient;

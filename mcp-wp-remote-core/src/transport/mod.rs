//! HTTP transport to the remote WebSamurai MCP endpoint.
//!
//! One [`RemoteClient`] is built at startup and cloned into every forward
//! task; reqwest pools connections internally and is safe for concurrent use.

pub mod remote;

pub use remote::RemoteClient;

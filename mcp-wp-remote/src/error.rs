//! Error types for the stdio relay.
//!
//! `StdioError` covers failures that end the relay: startup configuration,
//! the input stream, and signal registration. Per-request failures never
//! appear here; they are [`RelayError`](mcp_wp_remote_core::RelayError)s
//! written back to the caller as JSON-RPC error replies.

use mcp_wp_remote_core::EndpointError;

/// Errors that stop the relay.
#[derive(Debug, thiserror::Error)]
pub enum StdioError {
    /// Invalid endpoint configuration detected at startup.
    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    /// Reading from the input stream failed.
    #[error("failed to read input: {0}")]
    Read(#[source] std::io::Error),

    /// Writing a line to one of the output streams failed.
    #[error("failed to write to {stream}: {source}")]
    Write {
        /// `"stdout"` or `"stderr"`.
        stream: &'static str,
        source: std::io::Error,
    },

    /// A reply or notification could not be serialized.
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    /// A termination signal handler could not be installed.
    #[error("failed to install {signal} handler: {source}")]
    Signal {
        signal: &'static str,
        source: std::io::Error,
    },
}

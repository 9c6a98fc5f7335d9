//! Error taxonomy for the relay.
//!
//! [`RelayError`] covers per-request failures. Every variant is recovered
//! locally and surfaced to the caller as a JSON-RPC error object; none of them
//! stop the relay loop.
//!
//! [`EndpointError`] covers startup configuration failures, which are fatal
//! and reported as plain text before any protocol traffic.

use crate::jsonrpc::JsonRpcErrorObject;

/// Code used for transport-level failures (DNS, refused connection, TLS).
pub const NETWORK_ERROR_CODE: i64 = -32000;

/// JSON-RPC 2.0 "Invalid Request".
pub const INVALID_REQUEST_CODE: i64 = -32600;

/// JSON-RPC 2.0 "Parse error".
pub const PARSE_ERROR_CODE: i64 = -32700;

/// Per-request failure, mapped 1:1 to a JSON-RPC error reply.
///
/// The `Display` output is the `error.message` written on the wire, so the
/// format strings here are part of the external interface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    /// The HTTP request never produced a response.
    #[error("Network error: {cause}")]
    Network {
        /// Description of the transport failure, including its source chain.
        cause: String,
    },

    /// The remote answered, but not with a JSON-RPC success object.
    ///
    /// Raised both for non-2xx statuses and for 2xx bodies lacking `jsonrpc`
    /// or `result`; the remote's protocol shape decides success, not the
    /// HTTP status alone.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code, reused as the JSON-RPC error code.
        status: u16,
        /// Raw response body text.
        body: String,
    },

    /// The decoded input cannot be forwarded (not an object, no method, ...).
    #[error("Invalid Request: {reason}")]
    InvalidRequest { reason: String },

    /// Buffered input grew past the configured limit without becoming valid
    /// JSON and was discarded.
    #[error("Parse error: buffered input exceeds {max_bytes} bytes")]
    BufferOverflow { max_bytes: usize },
}

impl RelayError {
    /// The JSON-RPC `error.code` for this failure.
    pub fn code(&self) -> i64 {
        match self {
            RelayError::Network { .. } => NETWORK_ERROR_CODE,
            RelayError::Http { status, .. } => i64::from(*status),
            RelayError::InvalidRequest { .. } => INVALID_REQUEST_CODE,
            RelayError::BufferOverflow { .. } => PARSE_ERROR_CODE,
        }
    }

    /// Short machine-readable label, used as a structured log field.
    pub fn error_type(&self) -> &'static str {
        match self {
            RelayError::Network { .. } => "network",
            RelayError::Http { .. } => "http",
            RelayError::InvalidRequest { .. } => "invalid_request",
            RelayError::BufferOverflow { .. } => "buffer_overflow",
        }
    }

    pub fn to_error_object(&self) -> JsonRpcErrorObject {
        JsonRpcErrorObject {
            code: self.code(),
            message: self.to_string(),
        }
    }

    /// Build a [`RelayError::Network`] from any error, flattening its source
    /// chain into the message.
    ///
    /// `reqwest` errors keep the interesting part ("Connection refused",
    /// "dns error") in nested sources, so the top-level `Display` alone is
    /// rarely useful to a caller.
    pub fn network(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut cause = err.to_string();
        let mut source = err.source();
        while let Some(inner) = source {
            let text = inner.to_string();
            if !cause.contains(&text) {
                cause.push_str(": ");
                cause.push_str(&text);
            }
            source = inner.source();
        }
        RelayError::Network { cause }
    }
}

/// Fatal startup configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    /// The normalized endpoint URL does not parse.
    #[error("Invalid URL provided: {url}")]
    InvalidUrl {
        /// The normalized URL that failed to parse.
        url: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The HTTP client could not be constructed (e.g., TLS backend failure).
    #[error("Failed to build HTTP client: {reason}")]
    ClientBuild { reason: String },
}

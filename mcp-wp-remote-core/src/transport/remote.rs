//! Remote MCP client.
//!
//! Performs exactly one authenticated `POST` per decoded message and maps
//! every outcome to either the remote `result` value or a [`RelayError`].
//!
//! # Outcome Classification
//!
//! In priority order:
//! 1. No response (DNS, refused connection, TLS, body read failure)
//!    → [`RelayError::Network`] (-32000)
//! 2. Non-2xx status → [`RelayError::Http`] carrying status and body text
//! 3. 2xx status, but the body is not a JSON object with both `jsonrpc` and
//!    `result` keys → [`RelayError::Http`], same as (2)
//! 4. Otherwise → the remote `result` value
//!
//! # Non-goals
//!
//! - No retries: a forward may have side effects on the remote site.
//! - No request timeout beyond reqwest's defaults; callers needing bounded
//!   latency wrap the relay themselves.

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, warn};

use crate::endpoint::RemoteEndpoint;
use crate::error::{EndpointError, RelayError};
use crate::jsonrpc::{InboundMessage, RelayReply};

/// Client bound to a single [`RemoteEndpoint`].
///
/// `Clone` is cheap: the underlying reqwest client is reference-counted.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    client: Client,
    endpoint: RemoteEndpoint,
}

impl RemoteClient {
    /// Build a client with a fresh reqwest connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::ClientBuild`] if the TLS backend cannot be
    /// initialised.
    pub fn new(endpoint: RemoteEndpoint) -> Result<Self, EndpointError> {
        let client = Client::builder()
            .user_agent(concat!("mcp-wp-remote/", env!("CARGO_PKG_VERSION")))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| EndpointError::ClientBuild {
                reason: e.to_string(),
            })?;
        Ok(Self::with_client(client, endpoint))
    }

    /// Use a caller-supplied reqwest client.
    pub fn with_client(client: Client, endpoint: RemoteEndpoint) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &RemoteEndpoint {
        &self.endpoint
    }

    /// Forward `message` and build the reply to write back.
    ///
    /// The reply always carries `message.id`, never anything the remote
    /// echoed, since the forwarded envelope has no id.
    pub async fn relay(&self, message: InboundMessage) -> RelayReply {
        match self.forward(&message).await {
            Ok(result) => RelayReply::success(message.id, result),
            Err(e) => {
                warn!(
                    method = %message.method,
                    error_type = e.error_type(),
                    code = e.code(),
                    "forward failed"
                );
                RelayReply::failure(message.id, &e)
            }
        }
    }

    /// Forward a single message to the remote endpoint (single attempt).
    ///
    /// # Errors
    ///
    /// - [`RelayError::Network`] if no response was received or its body
    ///   could not be read
    /// - [`RelayError::Http`] for a non-2xx status or a malformed body
    #[tracing::instrument(skip(self, message), fields(method = %message.method))]
    pub async fn forward(&self, message: &InboundMessage) -> Result<Value, RelayError> {
        debug!(url = %self.endpoint.url(), "forwarding request to remote");

        let response = self
            .client
            .post(self.endpoint.url().clone())
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(self.endpoint.api_key())
            .json(&message.envelope())
            .send()
            .await
            .map_err(|e| RelayError::network(&e))?;

        let status = response.status();

        // Read the body as text up front: it is needed verbatim for error
        // messages, and success is decided by its shape, not only the status.
        let body = response.text().await.map_err(|e| RelayError::network(&e))?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "remote returned error status");
            return Err(RelayError::Http {
                status: status.as_u16(),
                body,
            });
        }

        match extract_result(&body) {
            Some(result) => {
                debug!(status = status.as_u16(), "received remote result");
                Ok(result)
            }
            None => {
                debug!(
                    status = status.as_u16(),
                    body_len = body.len(),
                    "remote body is not a JSON-RPC success object"
                );
                Err(RelayError::Http {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

/// Pull `result` out of a JSON-RPC success object.
///
/// Returns `None` unless `body` is a JSON object holding both a `jsonrpc` key
/// and a `result` key. Presence is checked, not truthiness: a `result` of
/// `null`, `0`, `false` or `""` is still a success.
fn extract_result(body: &str) -> Option<Value> {
    let mut value: Value = serde_json::from_str(body).ok()?;
    let obj = value.as_object_mut()?;
    if !obj.contains_key("jsonrpc") {
        return None;
    }
    obj.remove("result")
}

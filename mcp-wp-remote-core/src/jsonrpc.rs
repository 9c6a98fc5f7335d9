//! JSON-RPC 2.0 wire types for the relay.
//!
//! Inbound messages arrive as already-parsed `serde_json::Value`s from the
//! line accumulator. This module decodes them into [`InboundMessage`], builds
//! the [`ForwardEnvelope`] posted to the remote endpoint, and shapes every
//! outcome into a [`RelayReply`] that is written back as one NDJSON line.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value, json};

use crate::error::RelayError;

/// Protocol version stamped on every envelope and reply.
pub const JSONRPC_VERSION: &str = "2.0";

/// Text of the informational banner written once at startup.
pub const WELCOME_MESSAGE: &str = "Welcome to the WebSamurai MCP Remote Client!";

// ─────────────────────────────────────────────────────────────────────────────
// Request ID
// ─────────────────────────────────────────────────────────────────────────────

/// JSON-RPC request identifier.
///
/// Preserves the JSON type of the caller's id so the reply echoes it back
/// unchanged: `"id": 1` stays a number, `"id": "1"` stays a string. Any JSON
/// scalar is accepted, including booleans. Numbers
/// keep their `serde_json::Number` representation, so floats and values
/// outside `i64` round-trip as well.
///
/// A missing `id` is modelled as `Option::None` at the use site, which is
/// distinct from [`RequestId::Null`] (an explicit `"id": null`).
#[derive(Debug, Clone, PartialEq)]
pub enum RequestId {
    /// Numeric ID (e.g., `"id": 1`)
    Number(Number),
    /// String ID (e.g., `"id": "abc-123"`)
    String(String),
    /// Boolean ID (`"id": true`)
    Bool(bool),
    /// Explicit null ID (`"id": null`)
    Null,
}

impl RequestId {
    /// Convert a JSON value into a request id.
    ///
    /// Returns `None` for arrays and objects; every scalar is accepted.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(RequestId::Number(n.clone())),
            Value::String(s) => Some(RequestId::String(s.clone())),
            Value::Bool(b) => Some(RequestId::Bool(*b)),
            Value::Null => Some(RequestId::Null),
            _ => None,
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n.into())
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{n}"),
            RequestId::String(s) => write!(f, "{s}"),
            RequestId::Bool(b) => write!(f, "{b}"),
            RequestId::Null => f.write_str("null"),
        }
    }
}

impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RequestId::Number(n) => n.serialize(serializer),
            RequestId::String(s) => serializer.serialize_str(s),
            RequestId::Bool(b) => serializer.serialize_bool(*b),
            RequestId::Null => serializer.serialize_unit(),
        }
    }
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        RequestId::from_value(&value).ok_or_else(|| {
            serde::de::Error::custom("JSON-RPC ID must be a scalar or null")
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inbound Messages
// ─────────────────────────────────────────────────────────────────────────────

/// A decoded message read from the local input stream.
///
/// Both requests and notifications decode to this type; a notification simply
/// has `id: None` and its reply is written without an `id` field.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// The JSON-RPC method to invoke remotely.
    pub method: String,
    /// Call parameters. Absent or `null` params decode to an empty object.
    pub params: Value,
    /// Caller's id, echoed back verbatim on the reply.
    pub id: Option<RequestId>,
}

/// A parsed value that cannot be forwarded.
///
/// Carries whatever id could be recovered so the caller can still correlate
/// the error reply.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedMessage {
    /// The id recovered from the message, if any.
    pub id: Option<RequestId>,
    /// Why the message was rejected.
    pub error: RelayError,
}

impl RejectedMessage {
    fn new(id: Option<RequestId>, reason: &str) -> Self {
        Self {
            id,
            error: RelayError::InvalidRequest {
                reason: reason.to_string(),
            },
        }
    }

    /// Build the error reply for this rejection.
    pub fn into_reply(self) -> RelayReply {
        RelayReply::failure(self.id, &self.error)
    }
}

impl InboundMessage {
    /// Decode a parsed JSON value into a forwardable message.
    ///
    /// The `jsonrpc` field is not checked: callers are trusted to speak
    /// JSON-RPC, and the outgoing envelope always carries `"2.0"`.
    ///
    /// # Errors
    ///
    /// Returns [`RejectedMessage`] when:
    /// - the value is an array (batches are not supported),
    /// - the value is not an object,
    /// - `id` is present but is an array or object,
    /// - `method` is missing or not a string.
    pub fn from_value(value: Value) -> Result<Self, RejectedMessage> {
        let mut obj = match value {
            Value::Object(obj) => obj,
            Value::Array(_) => {
                return Err(RejectedMessage::new(
                    None,
                    "batch requests are not supported",
                ));
            }
            _ => {
                return Err(RejectedMessage::new(None, "expected a JSON object"));
            }
        };

        let id = match obj.get("id") {
            None => None,
            Some(raw) => match RequestId::from_value(raw) {
                Some(id) => Some(id),
                None => return Err(RejectedMessage::new(None, "invalid id field")),
            },
        };

        let method = match obj.get("method").and_then(Value::as_str) {
            Some(method) => method.to_string(),
            None => return Err(RejectedMessage::new(id, "missing method")),
        };

        // Remove rather than clone: params may be large.
        let params = match obj.remove("params") {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(params) => params,
        };

        Ok(Self { method, params, id })
    }

    /// The body posted to the remote endpoint.
    ///
    /// The caller's `id` is deliberately not included; it is restored from
    /// this message when the reply is built.
    pub fn envelope(&self) -> ForwardEnvelope<'_> {
        ForwardEnvelope {
            jsonrpc: JSONRPC_VERSION,
            method: &self.method,
            params: &self.params,
        }
    }
}

/// Outgoing JSON-RPC body: `{jsonrpc, method, params}`.
#[derive(Debug, Serialize)]
pub struct ForwardEnvelope<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: &'a Value,
}

// ─────────────────────────────────────────────────────────────────────────────
// Replies
// ─────────────────────────────────────────────────────────────────────────────

/// JSON-RPC 2.0 error object: `{code, message}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    /// Error code (JSON-RPC reserved code or an HTTP status)
    pub code: i64,
    /// Human-readable error message
    pub message: String,
}

/// Success or failure payload of a [`RelayReply`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyOutcome {
    Result(Value),
    Error(JsonRpcErrorObject),
}

/// A record written to the local output streams.
///
/// Serializes as `{"jsonrpc":"2.0","result":...,"id":...}` or
/// `{"jsonrpc":"2.0","error":{"code":...,"message":...},"id":...}`. The `id`
/// key is omitted entirely when the inbound message had none.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelayReply {
    pub jsonrpc: &'static str,
    #[serde(flatten)]
    pub outcome: ReplyOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
}

impl RelayReply {
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            outcome: ReplyOutcome::Result(result),
            id,
        }
    }

    pub fn failure(id: Option<RequestId>, error: &RelayError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            outcome: ReplyOutcome::Error(error.to_error_object()),
            id,
        }
    }

    /// Failure replies go to the error stream, successes to the output stream.
    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ReplyOutcome::Error(_))
    }
}

/// The `notifications/message` banner announced on startup.
///
/// Carries no `id`; callers must not treat it as a response.
pub fn welcome_notification() -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "method": "notifications/message",
        "params": {
            "level": "info",
            "logger": "stdio",
            "data": {
                "message": WELCOME_MESSAGE,
            }
        }
    })
}

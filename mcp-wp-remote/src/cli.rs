//! CLI argument types for `mcp-wp-remote`.
//!
//! These types are defined separately from `main.rs` so that integration tests
//! can parse them directly.

use std::num::NonZeroUsize;

use clap::Parser;

use crate::stdio::relay::RelayOptions;

/// Usage line printed when required arguments are missing.
pub const USAGE: &str = "Usage: mcp-wp-remote <url> <api-key> [tunnel-api-key]";

// ─────────────────────────────────────────────────────────────────────────────
// Relay Args
// ─────────────────────────────────────────────────────────────────────────────

/// Relay line-delimited JSON-RPC on stdin/stdout to a WebSamurai MCP endpoint.
///
/// Every JSON document read from stdin is posted to
/// `<url>/wp-json/websamurai/v1/mcp` with `Authorization: Bearer <api-key>`.
/// Results are written to stdout, errors to stderr, one JSON object per line.
#[derive(Parser, Debug)]
#[command(name = "mcp-wp-remote", version)]
pub struct RelayArgs {
    /// WordPress site URL (the MCP endpoint path is appended if missing).
    pub url: String,

    /// API key sent as a bearer token. May start with `-`.
    #[arg(allow_hyphen_values = true)]
    pub api_key: String,

    /// Tunnel API key. Accepted for compatibility; currently unused.
    #[arg(allow_hyphen_values = true)]
    pub tunnel_api_key: Option<String>,

    /// Further positional arguments are accepted and ignored.
    #[arg(hide = true, num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
    pub extra_args: Vec<String>,

    /// Maximum number of concurrent forward calls (default: unbounded).
    ///
    /// When the limit is reached, input is not read until a call completes.
    #[arg(long)]
    pub max_in_flight: Option<NonZeroUsize>,

    /// Discard buffered input that grows past this many bytes without
    /// parsing, and report a parse error (default: unbounded).
    #[arg(long)]
    pub max_buffer_bytes: Option<NonZeroUsize>,

    /// Enable debug logging on stderr.
    #[arg(long)]
    pub verbose: bool,
}

impl RelayArgs {
    /// Relay loop tuning derived from the flags.
    pub fn relay_options(&self) -> RelayOptions {
        RelayOptions {
            max_in_flight: self.max_in_flight,
            max_buffer_bytes: self.max_buffer_bytes,
        }
    }
}

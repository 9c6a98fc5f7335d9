//! WebSamurai MCP remote relay.
//!
//! Bridges a local stdio JSON-RPC transport to a remote WordPress MCP endpoint
//! over authenticated HTTP.

pub mod cli;
pub mod error;
pub mod stdio;

//! The relay loop: read lines, frame documents, dispatch forward calls.
//!
//! Each completed document is decoded and handed to its own Tokio task, which
//! performs the HTTP call and writes the reply. The loop never waits for a
//! forward to finish before reading the next line, so replies can be written
//! in a different order than the requests arrived.
//!
//! # Shared State
//!
//! The [`LineAccumulator`] is owned by the loop and only touched between
//! reads. Its buffer is cleared before a forward task is spawned, so a slow
//! forward never holds up framing of later input.
//!
//! # Concurrency Bound
//!
//! By default any number of forwards may be in flight. With
//! [`RelayOptions::max_in_flight`] set, each dispatch first acquires a
//! semaphore permit, and the loop stops reading until one is free.

use std::num::NonZeroUsize;
use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, BufReader};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use mcp_wp_remote_core::jsonrpc::welcome_notification;
use mcp_wp_remote_core::{InboundMessage, RelayError, RelayReply, RemoteClient, RemoteEndpoint};

use crate::cli::RelayArgs;
use crate::error::StdioError;

use super::accumulator::{Framed, LineAccumulator};
use super::lifecycle::shutdown_signal;
use super::output::ReplyWriter;

/// Tuning for the relay loop. The defaults match unbounded behaviour.
#[derive(Debug, Clone, Default)]
pub struct RelayOptions {
    /// Upper bound on concurrent forward calls.
    pub max_in_flight: Option<NonZeroUsize>,
    /// Upper bound on the pending input buffer.
    pub max_buffer_bytes: Option<NonZeroUsize>,
}

/// Stdio ↔ HTTP relay over arbitrary async streams.
pub struct Relay<O, E> {
    client: RemoteClient,
    output: ReplyWriter<O, E>,
    accumulator: LineAccumulator,
    limiter: Option<Arc<Semaphore>>,
    in_flight: JoinSet<()>,
}

impl<O, E> Relay<O, E>
where
    O: AsyncWrite + Unpin + Send + 'static,
    E: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(client: RemoteClient, output: ReplyWriter<O, E>, options: RelayOptions) -> Self {
        let accumulator = match options.max_buffer_bytes {
            Some(max) => LineAccumulator::with_max_bytes(max),
            None => LineAccumulator::new(),
        };
        let limiter = options
            .max_in_flight
            .map(|n| Arc::new(Semaphore::new(n.get())));

        Self {
            client,
            output,
            accumulator,
            limiter,
            in_flight: JoinSet::new(),
        }
    }

    /// Write the startup banner notification to stdout.
    pub async fn announce(&self) -> Result<(), StdioError> {
        self.output.write_notification(&welcome_notification()).await
    }

    /// Number of forward tasks spawned and not yet reaped.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Relay until `input` reaches EOF.
    ///
    /// On EOF any partial document is discarded, then every dispatched forward
    /// is awaited so its reply is written before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`StdioError::Read`] if reading `input` fails. Per-request
    /// failures are written as error replies and never end the loop.
    pub async fn run<R>(&mut self, mut input: R) -> Result<(), StdioError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut raw = Vec::new();

        loop {
            raw.clear();
            let n = input
                .read_until(b'\n', &mut raw)
                .await
                .map_err(StdioError::Read)?;
            if n == 0 {
                break;
            }

            self.reap_finished();

            // Validate UTF-8 strictly: lossy conversion would silently replace
            // bytes inside string values.
            let Ok(line) = std::str::from_utf8(trim_line_ending(&raw)) else {
                tracing::warn!(len = raw.len(), "input line is not valid UTF-8, skipping");
                continue;
            };

            match self.accumulator.push_line(line) {
                Framed::Incomplete => {
                    tracing::trace!(
                        pending = self.accumulator.pending_len(),
                        "buffered partial input"
                    );
                }
                Framed::Complete(value) => self.dispatch(value).await,
                Framed::Overflow {
                    max_bytes,
                    discarded,
                } => {
                    tracing::warn!(max_bytes, discarded, "discarding oversized partial input");
                    let reply = RelayReply::failure(None, &RelayError::BufferOverflow { max_bytes });
                    self.write_local_reply(&reply).await;
                }
            }
        }

        if !self.accumulator.is_empty() {
            let discarded = self.accumulator.discard();
            tracing::debug!(discarded, "input closed with partial document, discarding");
        }

        self.drain().await;
        Ok(())
    }

    /// Decode a completed document and spawn its forward call.
    async fn dispatch(&mut self, value: Value) {
        let message = match InboundMessage::from_value(value) {
            Ok(message) => message,
            Err(rejected) => {
                tracing::warn!(error = %rejected.error, "rejecting input message");
                self.write_local_reply(&rejected.into_reply()).await;
                return;
            }
        };

        // The semaphore is never closed, so acquisition only fails if that
        // changes; in that case forward without a permit.
        let permit = match &self.limiter {
            Some(limiter) => Arc::clone(limiter).acquire_owned().await.ok(),
            None => None,
        };

        tracing::debug!(
            method = %message.method,
            id = ?message.id,
            "dispatching forward"
        );

        let client = self.client.clone();
        let output = self.output.clone();
        self.in_flight.spawn(async move {
            let _permit = permit;
            let reply = client.relay(message).await;
            if let Err(e) = output.write_reply(&reply).await {
                tracing::warn!(error = %e, "failed to write reply");
            }
        });
    }

    /// Write a reply produced without a forward call (rejections, overflow).
    async fn write_local_reply(&self, reply: &RelayReply) {
        if let Err(e) = self.output.write_reply(reply).await {
            tracing::warn!(error = %e, "failed to write reply");
        }
    }

    /// Collect finished forward tasks without waiting.
    fn reap_finished(&mut self) {
        while let Some(result) = self.in_flight.try_join_next() {
            log_join_result(result);
        }
    }

    /// Wait for every in-flight forward to finish.
    async fn drain(&mut self) {
        if !self.in_flight.is_empty() {
            tracing::debug!(count = self.in_flight.len(), "waiting for in-flight forwards");
        }
        while let Some(result) = self.in_flight.join_next().await {
            log_join_result(result);
        }
    }
}

fn log_join_result(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        tracing::error!(error = %e, "forward task panicked");
    }
}

/// Strip a trailing `\n` or `\r\n`.
fn trim_line_ending(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    raw.strip_suffix(b"\r").unwrap_or(raw)
}

// ─────────────────────────────────────────────────────────────────────────────
// run_relay — Process Entry
// ─────────────────────────────────────────────────────────────────────────────

/// Run the relay on the process's stdin/stdout/stderr.
///
/// 1. Validate and normalize the endpoint URL
/// 2. Build the HTTP client
/// 3. Write the startup banner
/// 4. Relay until stdin closes or SIGINT/SIGTERM arrives
///
/// Returns `Ok(())` on both stdin EOF and signal; the process exits 0 either
/// way. Forwards still in flight when a signal arrives are abandoned.
///
/// # Errors
///
/// Returns [`StdioError`] on invalid configuration or a failed banner write,
/// before any input is read, or if reading stdin fails.
pub async fn run_relay(args: RelayArgs) -> Result<(), StdioError> {
    let endpoint = RemoteEndpoint::new(&args.url, args.api_key.as_str())?;
    if args.tunnel_api_key.is_some() {
        tracing::debug!("tunnel API key supplied; it is not used");
    }
    if !args.extra_args.is_empty() {
        tracing::debug!(count = args.extra_args.len(), "ignoring extra positional arguments");
    }
    let client = RemoteClient::new(endpoint)?;
    tracing::info!(url = %client.endpoint().url(), "relay starting");

    let output = ReplyWriter::new(tokio::io::stdout(), tokio::io::stderr());
    let mut relay = Relay::new(client, output, args.relay_options());
    relay.announce().await?;

    let stdin = BufReader::new(tokio::io::stdin());

    tokio::select! {
        result = relay.run(stdin) => {
            result?;
            tracing::info!("stdin closed, exiting");
        }
        signal = shutdown_signal() => {
            let signal = signal?;
            tracing::info!(signal, "received signal, exiting");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_line_ending() {
        assert_eq!(trim_line_ending(b"abc\n"), b"abc");
        assert_eq!(trim_line_ending(b"abc\r\n"), b"abc");
        assert_eq!(trim_line_ending(b"abc"), b"abc");
        assert_eq!(trim_line_ending(b"\n"), b"");
        // Only one line ending is removed.
        assert_eq!(trim_line_ending(b"abc\n\n"), b"abc\n");
    }

    #[test]
    fn test_default_options_are_unbounded() {
        let options = RelayOptions::default();
        assert!(options.max_in_flight.is_none());
        assert!(options.max_buffer_bytes.is_none());
    }
}

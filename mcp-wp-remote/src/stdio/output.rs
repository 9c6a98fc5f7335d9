//! Shared NDJSON writer for the relay's output streams.
//!
//! Forward tasks finish in any order and write concurrently. Each stream sits
//! behind its own `Mutex` and every record is written and flushed as a single
//! line while the lock is held, so lines are never interleaved.

use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use mcp_wp_remote_core::RelayReply;

use crate::error::StdioError;

/// Routes replies to stdout (results) or stderr (errors).
pub struct ReplyWriter<O, E> {
    stdout: Arc<Mutex<O>>,
    stderr: Arc<Mutex<E>>,
}

// Manual impl: cloning only bumps the Arcs, so `O`/`E` need not be `Clone`.
impl<O, E> Clone for ReplyWriter<O, E> {
    fn clone(&self) -> Self {
        Self {
            stdout: Arc::clone(&self.stdout),
            stderr: Arc::clone(&self.stderr),
        }
    }
}

impl<O, E> ReplyWriter<O, E>
where
    O: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    pub fn new(stdout: O, stderr: E) -> Self {
        Self::from_shared(Arc::new(Mutex::new(stdout)), Arc::new(Mutex::new(stderr)))
    }

    /// Build a writer over handles the caller keeps a reference to.
    pub fn from_shared(stdout: Arc<Mutex<O>>, stderr: Arc<Mutex<E>>) -> Self {
        Self { stdout, stderr }
    }

    /// Write a reply to the stream matching its outcome.
    pub async fn write_reply(&self, reply: &RelayReply) -> Result<(), StdioError> {
        if reply.is_error() {
            write_line(&self.stderr, "stderr", reply).await
        } else {
            write_line(&self.stdout, "stdout", reply).await
        }
    }

    /// Write a notification (e.g. the startup banner) to stdout.
    pub async fn write_notification<T: Serialize>(&self, message: &T) -> Result<(), StdioError> {
        write_line(&self.stdout, "stdout", message).await
    }
}

/// Serialize `message` and write it followed by `\n`, then flush.
async fn write_line<W, T>(
    stream: &Mutex<W>,
    name: &'static str,
    message: &T,
) -> Result<(), StdioError>
where
    W: AsyncWrite + Unpin,
    T: Serialize + ?Sized,
{
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');

    let mut guard = stream.lock().await;
    guard
        .write_all(&line)
        .await
        .map_err(|source| StdioError::Write {
            stream: name,
            source,
        })?;
    guard.flush().await.map_err(|source| StdioError::Write {
        stream: name,
        source,
    })
}

#[cfg(test)]
mod tests {
    use mcp_wp_remote_core::{RelayError, RequestId};
    use serde_json::json;

    use super::*;

    fn shared() -> Arc<Mutex<Vec<u8>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[tokio::test]
    async fn test_success_goes_to_stdout() {
        let (out, err) = (shared(), shared());
        let writer = ReplyWriter::from_shared(out.clone(), err.clone());

        let reply = RelayReply::success(Some(RequestId::from(1)), json!({"ok": true}));
        writer.write_reply(&reply).await.unwrap();

        assert_eq!(
            String::from_utf8(out.lock().await.clone()).unwrap(),
            "{\"jsonrpc\":\"2.0\",\"result\":{\"ok\":true},\"id\":1}\n"
        );
        assert!(err.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_error_goes_to_stderr() {
        let (out, err) = (shared(), shared());
        let writer = ReplyWriter::from_shared(out.clone(), err.clone());

        let error = RelayError::Network {
            cause: "refused".to_string(),
        };
        writer
            .write_reply(&RelayReply::failure(None, &error))
            .await
            .unwrap();

        assert!(out.lock().await.is_empty());
        assert_eq!(
            String::from_utf8(err.lock().await.clone()).unwrap(),
            "{\"jsonrpc\":\"2.0\",\"error\":{\"code\":-32000,\"message\":\"Network error: refused\"}}\n"
        );
    }

    #[tokio::test]
    async fn test_concurrent_writes_do_not_interleave() {
        let (out, err) = (shared(), shared());
        let writer = ReplyWriter::from_shared(out.clone(), err);

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..32 {
            let writer = writer.clone();
            tasks.spawn(async move {
                let reply = RelayReply::success(Some(RequestId::from(i)), json!("x".repeat(256)));
                writer.write_reply(&reply).await.unwrap();
            });
        }
        while tasks.join_next().await.is_some() {}

        let text = String::from_utf8(out.lock().await.clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 32);
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["jsonrpc"], "2.0");
        }
    }
}

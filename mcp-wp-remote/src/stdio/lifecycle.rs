//! Process lifecycle: termination signals.
//!
//! The relay owns no resources that outlive a single forward call, so a signal
//! needs no cleanup; the caller simply stops and exits with code 0.

use crate::error::StdioError;

/// Wait for SIGINT (Ctrl+C) or, on Unix, SIGTERM.
///
/// Returns the name of the signal received.
///
/// # Errors
///
/// Returns [`StdioError::Signal`] if a handler cannot be installed.
pub async fn shutdown_signal() -> Result<&'static str, StdioError> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate()).map_err(|source| {
            StdioError::Signal {
                signal: "SIGTERM",
                source,
            }
        })?;

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.map_err(|source| StdioError::Signal { signal: "SIGINT", source })?;
                Ok("SIGINT")
            }
            _ = sigterm.recv() => Ok("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .map_err(|source| StdioError::Signal {
                signal: "Ctrl+C",
                source,
            })?;
        Ok("Ctrl+C")
    }
}

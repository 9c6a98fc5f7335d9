//! Line accumulation and JSON framing for the input stream.
//!
//! Input lines are fragments of JSON documents. Each line is appended to a
//! single pending buffer, and after every append the whole buffer is parsed as
//! one JSON value. The first successful parse completes a document and clears
//! the buffer; until then nothing is emitted and nothing is reported.
//!
//! Lines are concatenated without a separator. This reconstructs multi-line
//! documents correctly because line breaks in JSON text only ever fall between
//! tokens, where whitespace is insignificant.
//!
//! This module is pure: no async I/O. The relay loop feeds it one line at a
//! time and owns the only instance, so no synchronization is needed.

use std::num::NonZeroUsize;

use serde_json::Value;

/// Result of feeding one line to a [`LineAccumulator`].
#[derive(Debug, Clone, PartialEq)]
pub enum Framed {
    /// The buffer does not parse yet; keep reading.
    Incomplete,
    /// The buffer parsed; it has been cleared.
    Complete(Value),
    /// The buffer grew past the configured limit without parsing and was
    /// discarded.
    Overflow {
        /// The configured limit.
        max_bytes: usize,
        /// How many bytes were thrown away.
        discarded: usize,
    },
}

/// Owner of the pending input buffer.
///
/// Without a limit the buffer grows without bound on input that never becomes
/// valid JSON (e.g. a stray `}`), and such input is never reported.
#[derive(Debug, Default)]
pub struct LineAccumulator {
    pending: String,
    max_bytes: Option<NonZeroUsize>,
}

impl LineAccumulator {
    /// An accumulator with no size limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// An accumulator that discards its buffer once it exceeds `max_bytes`
    /// without parsing.
    pub fn with_max_bytes(max_bytes: NonZeroUsize) -> Self {
        Self {
            pending: String::new(),
            max_bytes: Some(max_bytes),
        }
    }

    /// Append `line` (without its trailing newline) and try to complete a
    /// document.
    ///
    /// The buffer is cleared *before* the decoded value is returned, so the
    /// caller can dispatch it without holding any borrow on the accumulator.
    pub fn push_line(&mut self, line: &str) -> Framed {
        self.pending.push_str(line);

        if let Ok(value) = serde_json::from_str::<Value>(&self.pending) {
            self.pending.clear();
            return Framed::Complete(value);
        }

        match self.max_bytes {
            Some(max) if self.pending.len() > max.get() => {
                let discarded = std::mem::take(&mut self.pending).len();
                Framed::Overflow {
                    max_bytes: max.get(),
                    discarded,
                }
            }
            _ => Framed::Incomplete,
        }
    }

    /// Number of buffered bytes not yet parsed.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no partial input is buffered.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop any buffered partial input, returning how many bytes were lost.
    pub fn discard(&mut self) -> usize {
        std::mem::take(&mut self.pending).len()
    }
}

//! Stdio side of the relay.
//!
//! Line framing ([`accumulator`]), the shared output writer ([`output`]),
//! signal handling ([`lifecycle`]) and the read/dispatch loop ([`relay`]).

pub mod accumulator;
pub mod lifecycle;
pub mod output;
pub mod relay;

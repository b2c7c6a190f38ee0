//! Error types for the protocol engine.

use std::io;

use crate::message::Ticket;

/// Errors raised by the frame codec.
///
/// Every variant except [`FrameError::Closed`] means the stream can no
/// longer be trusted; no reframing is attempted after a bad header.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// End of stream at a frame boundary (clean shutdown).
    #[error("stream closed")]
    Closed,

    /// The length header is not `0x` + hex digits + newline.
    #[error("malformed frame header: {0:?}")]
    MalformedHeader(String),

    /// End of stream before the declared payload length was satisfied.
    #[error("frame truncated: expected {expected} payload bytes")]
    Truncated { expected: usize },

    /// The payload is not well-formed JSON.
    #[error("frame payload is not valid JSON: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    /// The payload parsed but is not an invocation or a reply.
    #[error("unexpected message shape: {0}")]
    Shape(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors surfaced by the session dispatcher.
///
/// `Frame` and `UnknownTicket` are fatal: correlation state can no
/// longer be trusted and the session must end. `Remote` is the terminal
/// outcome of one call and leaves the session usable; it is never
/// conflated with the fatal kinds, and nothing in this engine retries.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The peer echoed a ticket this side never issued.
    #[error("reply for unknown ticket {0}")]
    UnknownTicket(Ticket),

    /// The peer reported failure for one of our invocations.
    #[error("remote operation failed: {0}")]
    Remote(String),
}

//! Minimal Lower Layer Protocol (MLLP) transport for HL7 messages.
//!
//! A frame is `0x0B` + message bytes + `0x1C 0x0D`. [`MllpCodec`] implements that framing
//! for `tokio_util::codec::Framed`, and [`MllpClient`] uses it to deliver one message per
//! connection and return the receiver's acknowledgment.
//!
//! This layer never retries and applies no timeout of its own; callers that need bounded
//! latency wrap [`MllpClient::send`] in `tokio::time::timeout` or similar.

mod client;
mod codec;

pub use client::{send, MllpClient};
pub use codec::{MllpCodec, CARRIAGE_RETURN, DEFAULT_MAX_FRAME_LENGTH, END_BLOCK, START_BLOCK};

/// Errors returned by the MLLP transport.
#[derive(Debug, thiserror::Error)]
pub enum MllpError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("MLLP framing error: {0}")]
    Framing(String),

    #[error("connection closed before an acknowledgment was received")]
    ConnectionClosed,

    #[error("acknowledgment is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Type alias for Results that can fail with an [`MllpError`].
pub type MllpResult<T> = Result<T, MllpError>;

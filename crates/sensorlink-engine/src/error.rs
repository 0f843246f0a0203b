//! Error types for the protocol engine.

use sensorlink_protocol::ProtocolError;
use thiserror::Error;

/// Errors surfaced by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The transport is closed; nothing was sent and no state changed.
    #[error("transport is not open")]
    TransportNotOpen,

    /// The transport accepted only part of a command frame.
    #[error("short write: {written} of {expected} bytes")]
    ShortWrite {
        /// Bytes the transport accepted.
        written: usize,
        /// Size of the encoded frame.
        expected: usize,
    },

    /// Transport I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The command could not be encoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

//! Error types for the runner.

use sensorlink_engine::EngineError;
use sensorlink_protocol::{DecodeError, ProtocolError};
use thiserror::Error;

/// Errors that can occur while running a CLI command.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// I/O error reading a capture, the config file, or the socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// Output could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Frame text is not valid hex.
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Engine operation failed.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// Frame could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Command could not be encoded.
    #[error("encode error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;

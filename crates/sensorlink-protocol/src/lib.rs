//! Sensor Link Serial Protocol
//!
//! This crate provides types and utilities for talking to the sensor board
//! over its serial link: the CRC-8 checksum, the framed wire format, the
//! command and response kinds, the payload records, and the growable FIFO used
//! to reassemble frames from fragmented reads.
//!
//! # Protocol Overview
//!
//! Every message, in both directions, is a single frame:
//!
//! ```text
//! [0xAA][kind][len][payload: len bytes][crc8]
//! ```
//!
//! - **Commands** (host → device): `GetData`, `Stop`, `ReconfigureUart`
//! - **Responses** (device → host): `Accepted`, `Rejected`, `ChecksumFailed`, `Malformed`
//!
//! # Example
//!
//! ```rust
//! use sensorlink_protocol::{Command, FrameCodec, PayloadKind, ResponseKind};
//!
//! // Build a command
//! let frame = Command::stop().encode()?;
//! assert_eq!(&frame[..], &[0xAA, 0x02, 0x00, 0xE5]);
//!
//! // Classify a response
//! let response = FrameCodec::decode(&[0xAA, 0x01, 0x00, 0x00], PayloadKind::Empty)?;
//! assert_eq!(response.kind, ResponseKind::ChecksumFailed);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod buffer;
mod checksum;
mod commands;
mod constants;
mod error;
mod frame;
mod payload;
mod responses;
mod types;

pub use buffer::*;
pub use checksum::*;
pub use commands::*;
pub use constants::*;
pub use error::*;
pub use frame::*;
pub use payload::*;
pub use responses::*;
pub use types::*;

//! Protocol engine for the sensor board link.
//!
//! [`ProtocolEngine`] reassembles frames from whatever chunks the transport
//! delivers, resynchronizes on garbage, and hands each frame to a single
//! registered handler. [`SensorFeed`] is the downstream pass that checks
//! checksums and decodes sensor readings.
//!
//! # Example
//!
//! ```rust
//! use sensorlink_engine::{MemoryTransport, ProtocolEngine, SensorFeed};
//! use std::sync::mpsc;
//!
//! let (tx, rx) = mpsc::channel();
//! let mut engine = ProtocolEngine::new(MemoryTransport::new());
//! engine.start_reading(move |frame| tx.send(frame.to_vec()).unwrap()).unwrap();
//!
//! // Two garbage bytes, then a frame split across deliveries.
//! engine.on_bytes_received(&[0xFF, 0xFF, 0xAA]);
//! engine.on_bytes_received(&[0x02, 0x00, 0xE5]);
//!
//! let frame = rx.try_recv().unwrap();
//! assert_eq!(frame, vec![0xAA, 0x02, 0x00, 0xE5]);
//!
//! let mut feed = SensorFeed::new();
//! assert_eq!(feed.classify(&frame).as_str(), "rejected");
//! ```

mod config;
mod engine;
mod error;
mod feed;
mod rate;
mod transport;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use feed::*;
pub use rate::*;
pub use transport::*;

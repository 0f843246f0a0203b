//! Host-side tooling for the sensor link.
//!
//! The `sensorlink` binary is a thin shell over these modules: one-shot frame
//! encoding and decoding, capture replay, and live sessions over a TCP serial
//! bridge.

pub mod cli;
pub mod config;
pub mod error;
pub mod oneshot;
pub mod replay;
pub mod tcp;

pub use config::RunnerConfig;
pub use error::{Result, RunnerError};

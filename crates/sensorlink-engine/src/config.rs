//! Engine configuration.

use std::time::Duration;

use sensorlink_protocol::MAX_FRAME_SIZE;
use serde::{Deserialize, Serialize};

/// Default interval between frame-rate snapshots.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;

/// Configuration for a [`ProtocolEngine`](crate::ProtocolEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Initial stream buffer capacity in bytes.
    pub initial_buffer_capacity: usize,
    /// Upper bound on buffered bytes. Large deliveries are ingested in
    /// slices so the buffer never holds more than this; values below
    /// [`MAX_FRAME_SIZE`] are raised to it. `None` lets the buffer grow with
    /// the largest delivery.
    pub max_buffered_bytes: Option<usize>,
    /// Frame-rate snapshot interval used by `maybe_tick`.
    pub tick_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            initial_buffer_capacity: sensorlink_protocol::DEFAULT_BUFFER_CAPACITY,
            max_buffered_bytes: None,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl EngineConfig {
    /// Tick interval as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// The effective buffer bound, never smaller than one maximum-size frame.
    pub fn buffer_limit(&self) -> Option<usize> {
        self.max_buffered_bytes.map(|limit| limit.max(MAX_FRAME_SIZE))
    }
}

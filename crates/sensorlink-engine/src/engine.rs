//! The protocol engine.
//!
//! Turns an arbitrarily fragmented byte stream into whole frames and sends
//! commands in the same wire format. The extraction loop only looks at the
//! marker and length byte of each header; checksums are validated later by
//! whoever decodes the frame (see [`SensorFeed`](crate::SensorFeed)).

use std::time::Instant;

use bytes::Bytes;
use crossbeam_channel::Sender;
use sensorlink_metrics::{metric_defs, MetricLabels};
use sensorlink_protocol::{
    Command, FrameCodec, StreamBuffer, UartSettings, FRAME_MARKER, HEADER_SIZE, MAX_FRAME_SIZE,
};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::rate::FrameRate;
use crate::transport::Transport;

// ============================================================================
// Handler
// ============================================================================

/// Receives raw frame bytes (marker through checksum) in arrival order.
pub type FrameHandler = Box<dyn FnMut(&[u8])>;

/// Forward every frame into a channel, for hosts that consume frames on
/// another thread. Frames are dropped once the receiver is gone.
pub fn channel_handler(sender: Sender<Bytes>) -> FrameHandler {
    Box::new(move |frame: &[u8]| {
        if sender.send(Bytes::copy_from_slice(frame)).is_err() {
            trace!("frame receiver dropped, discarding {} bytes", frame.len());
        }
    })
}

// ============================================================================
// State
// ============================================================================

/// Dispatch state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// No handler has been registered since the link was opened. Incoming
    /// bytes are dropped without being buffered.
    Idle,
    /// A handler receives every extracted frame.
    Streaming,
    /// Reading was interrupted. Frames still in flight are extracted and
    /// counted but not dispatched.
    Stopped,
}

/// Running counters kept by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    /// Frames handed to the handler.
    pub frames_dispatched: u64,
    /// Frames extracted while stopped.
    pub frames_absorbed: u64,
    /// Bytes dropped while hunting for a frame marker.
    pub resync_bytes_dropped: u64,
    /// Bytes received while idle.
    pub idle_bytes_dropped: u64,
    /// Commands fully written to the transport.
    pub commands_sent: u64,
}

// ============================================================================
// Engine
// ============================================================================

/// Frame extraction and command dispatch over one transport.
pub struct ProtocolEngine<T: Transport> {
    transport: T,
    config: EngineConfig,
    buffer: StreamBuffer,
    handler: Option<FrameHandler>,
    state: EngineState,

    // Frame rate
    frames_since_tick: u32,
    last_tick: Instant,
    rate: FrameRate,

    // Statistics
    stats: EngineStats,
    labels: MetricLabels,
    metric_labels: Vec<(&'static str, String)>,
}

impl<T: Transport> ProtocolEngine<T> {
    /// Create an engine with default configuration.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, EngineConfig::default())
    }

    /// Create an engine with the given configuration.
    ///
    /// A `max_buffered_bytes` below [`MAX_FRAME_SIZE`] is raised to it, since
    /// a smaller buffer could never hold the largest frame.
    pub fn with_config(transport: T, mut config: EngineConfig) -> Self {
        if let Some(limit) = config.max_buffered_bytes {
            if limit < MAX_FRAME_SIZE {
                warn!(
                    "max_buffered_bytes {} is below the largest frame, using {}",
                    limit, MAX_FRAME_SIZE
                );
            }
        }
        config.max_buffered_bytes = config.buffer_limit();

        let labels = MetricLabels::default();
        ProtocolEngine {
            transport,
            buffer: StreamBuffer::with_capacity(config.initial_buffer_capacity),
            config,
            handler: None,
            state: EngineState::Idle,
            frames_since_tick: 0,
            last_tick: Instant::now(),
            rate: FrameRate::new(),
            stats: EngineStats::default(),
            metric_labels: labels.to_labels(),
            labels,
        }
    }

    /// Set the labels attached to every metric this engine records.
    pub fn with_labels(mut self, labels: MetricLabels) -> Self {
        self.metric_labels = labels.to_labels();
        self.labels = labels;
        self
    }

    /// Register `handler` and ask the device to start streaming.
    ///
    /// Any previously registered handler is replaced.
    pub fn start_reading(&mut self, handler: impl FnMut(&[u8]) + 'static) -> EngineResult<()> {
        self.ensure_open()?;
        self.handler = Some(Box::new(handler));
        self.state = EngineState::Streaming;
        self.send(&Command::get_data())?;
        Ok(())
    }

    /// Stop dispatching and ask the device to stop streaming.
    ///
    /// Frames already dispatched stay dispatched. Bytes still in flight are
    /// absorbed until a new handler is registered.
    pub fn interrupt(&mut self) -> EngineResult<()> {
        self.ensure_open()?;
        self.stop_dispatch();
        self.send(&Command::stop())?;
        Ok(())
    }

    /// Stop dispatching and ask the device to switch UART settings.
    ///
    /// The host must reopen the transport with the new parameters and then
    /// call [`on_transport_reopened`](Self::on_transport_reopened).
    pub fn reconfigure(&mut self, settings: &UartSettings) -> EngineResult<()> {
        self.ensure_open()?;
        let command = Command::reconfigure_uart(settings)?;
        self.stop_dispatch();
        self.send(&command)?;
        Ok(())
    }

    /// Encode and write one command. Returns the number of bytes written.
    pub fn send(&mut self, command: &Command) -> EngineResult<usize> {
        self.ensure_open()?;
        let frame = command.encode()?;
        debug!("{} command data: {}", command.kind(), hex::encode_upper(&frame));

        let command_labels = self
            .labels
            .with(&[("command", command.kind().as_str().to_string())]);
        let written = self.transport.write(&frame)?;
        if written < frame.len() {
            warn!(
                "failed to send full {} command: {} of {} bytes",
                command.kind(),
                written,
                frame.len()
            );
            metrics::counter!(metric_defs::SHORT_WRITES.name, &command_labels).increment(1);
            return Err(EngineError::ShortWrite {
                written,
                expected: frame.len(),
            });
        }

        self.stats.commands_sent += 1;
        metrics::counter!(metric_defs::COMMANDS_SENT.name, &command_labels).increment(1);
        Ok(written)
    }

    /// Feed bytes delivered by the transport. Returns the number of frames
    /// extracted.
    pub fn on_bytes_received(&mut self, bytes: &[u8]) -> usize {
        if self.state == EngineState::Idle {
            if !bytes.is_empty() {
                trace!("idle, dropping {} bytes", bytes.len());
                self.stats.idle_bytes_dropped += bytes.len() as u64;
                metrics::counter!(metric_defs::IDLE_BYTES_DROPPED.name, &self.metric_labels)
                    .increment(bytes.len() as u64);
            }
            return 0;
        }

        let extracted = match self.config.max_buffered_bytes {
            Some(limit) => self.ingest_bounded(bytes, limit),
            None => {
                self.buffer.append(bytes);
                self.extract_frames()
            }
        };

        metrics::gauge!(metric_defs::BUFFERED_BYTES.name, &self.metric_labels)
            .set(self.buffer.len() as f64);
        extracted
    }

    /// Snapshot the frame counter into the frame rate and reset it.
    pub fn tick(&mut self) -> u32 {
        let frames = std::mem::take(&mut self.frames_since_tick);
        self.rate.set(frames);
        metrics::gauge!(metric_defs::FRAME_RATE.name, &self.metric_labels).set(f64::from(frames));
        frames
    }

    /// Call [`tick`](Self::tick) if the configured interval has elapsed.
    pub fn maybe_tick(&mut self, now: Instant) -> Option<u32> {
        if now.saturating_duration_since(self.last_tick) < self.config.tick_interval() {
            return None;
        }
        self.last_tick = now;
        Some(self.tick())
    }

    /// The host reopened the transport (e.g. after a reconfiguration).
    ///
    /// Buffered bytes belong to the old link and are discarded.
    pub fn on_transport_reopened(&mut self) {
        debug!("transport reopened, discarding {} buffered bytes", self.buffer.len());
        self.handler = None;
        self.state = EngineState::Idle;
        self.buffer.clear();
        self.frames_since_tick = 0;
    }

    /// Cloneable handle over the frames-per-tick value.
    pub fn frame_rate(&self) -> FrameRate {
        self.rate.clone()
    }

    /// Running counters.
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Current dispatch state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Bytes waiting for a complete frame.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// The configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The transport, mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn ensure_open(&self) -> EngineResult<()> {
        if self.transport.is_open() {
            Ok(())
        } else {
            warn!("serial port is not open");
            Err(EngineError::TransportNotOpen)
        }
    }

    fn stop_dispatch(&mut self) {
        self.handler = None;
        self.state = EngineState::Stopped;
    }

    /// Append `bytes` in slices that keep the buffer within `limit`,
    /// extracting after each slice.
    fn ingest_bounded(&mut self, mut bytes: &[u8], limit: usize) -> usize {
        let mut extracted = 0;
        while !bytes.is_empty() {
            // Extraction leaves less than one frame behind and limit is at
            // least one frame, so there is always room.
            let room = limit.saturating_sub(self.buffer.len()).max(1);
            let (head, rest) = bytes.split_at(room.min(bytes.len()));
            self.buffer.append(head);
            extracted += self.extract_frames();
            bytes = rest;
        }
        extracted
    }

    fn extract_frames(&mut self) -> usize {
        let mut extracted = 0;
        let mut resync_dropped = 0usize;

        while self.buffer.len() >= HEADER_SIZE {
            if self.buffer.get(0) != Some(FRAME_MARKER) {
                self.buffer.discard(1);
                resync_dropped += 1;
                continue;
            }

            let (Some(kind), Some(declared_len)) = (self.buffer.get(1), self.buffer.get(2)) else {
                break;
            };
            let total = FrameCodec::frame_size(declared_len);
            if self.buffer.len() < total {
                break;
            }

            let Ok(frame) = self.buffer.consume(total) else {
                break;
            };
            extracted += 1;
            self.frames_since_tick = self.frames_since_tick.saturating_add(1);
            metrics::histogram!(metric_defs::FRAME_SIZE.name, &self.metric_labels)
                .record(total as f64);

            match self.handler.as_mut() {
                Some(handler) => {
                    trace!("dispatching frame kind 0x{:02X}, {} bytes", kind, total);
                    handler(&frame);
                    self.stats.frames_dispatched += 1;
                    metrics::counter!(metric_defs::FRAMES_DISPATCHED.name, &self.metric_labels)
                        .increment(1);
                }
                None => {
                    trace!("absorbing frame kind 0x{:02X}, {} bytes", kind, total);
                    self.stats.frames_absorbed += 1;
                    metrics::counter!(metric_defs::FRAMES_ABSORBED.name, &self.metric_labels)
                        .increment(1);
                }
            }
        }

        if resync_dropped > 0 {
            trace!("resync dropped {} bytes", resync_dropped);
            self.stats.resync_bytes_dropped += resync_dropped as u64;
            metrics::counter!(metric_defs::RESYNC_BYTES_DROPPED.name, &self.metric_labels)
                .increment(resync_dropped as u64);
        }

        extracted
    }
}

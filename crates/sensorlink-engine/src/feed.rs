//! Classification of dispatched frames into readings.
//!
//! This is the second validation pass: the engine hands over raw frames,
//! the feed checks them with [`FrameCodec::decode`] and keeps what a display
//! needs.

use chrono::{DateTime, Utc};
use sensorlink_metrics::{metric_defs, MetricLabels};
use sensorlink_protocol::{Body, FrameCodec, PayloadKind, ResponseKind, SensorData};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// A sensor record stamped with its receive time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampedSensorData {
    /// When the frame was classified.
    pub timestamp: DateTime<Utc>,
    /// The decoded record.
    #[serde(flatten)]
    pub data: SensorData,
}

/// Outcome of classifying one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FeedEvent {
    /// The device accepted the request and sent a reading.
    Reading(TimestampedSensorData),
    /// The device rejected the request.
    Rejected {
        /// Payload length of the rejection frame.
        payload_len: usize,
    },
    /// The frame failed its checksum, locally or on the device side.
    ChecksumFailed {
        /// What went wrong.
        error: String,
    },
    /// The frame could not be interpreted.
    Malformed {
        /// Kind byte as received.
        raw_kind: u8,
        /// What went wrong.
        error: String,
    },
}

impl FeedEvent {
    /// Short lowercase name, used for logs and metric labels.
    pub const fn as_str(&self) -> &'static str {
        match self {
            FeedEvent::Reading(_) => "reading",
            FeedEvent::Rejected { .. } => "rejected",
            FeedEvent::ChecksumFailed { .. } => "checksum_failed",
            FeedEvent::Malformed { .. } => "malformed",
        }
    }

    /// The reading, if this event carries one.
    pub fn reading(&self) -> Option<&TimestampedSensorData> {
        match self {
            FeedEvent::Reading(reading) => Some(reading),
            _ => None,
        }
    }
}

/// Per-outcome counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeedStats {
    /// Accepted frames decoded into sensor readings.
    pub readings: u64,
    /// Frames the device marked as rejected.
    pub rejected: u64,
    /// Frames whose checksum did not match.
    pub checksum_failed: u64,
    /// Frames with an unknown kind or undecodable payload.
    pub malformed: u64,
}

/// Decodes dispatched frames as sensor responses.
#[derive(Debug, Default)]
pub struct SensorFeed {
    labels: MetricLabels,
    stats: FeedStats,
}

impl SensorFeed {
    /// Create a feed with empty labels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the labels attached to the outcome metric.
    pub fn with_labels(mut self, labels: MetricLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Classify a frame, stamping readings with the current time.
    pub fn classify(&mut self, frame: &[u8]) -> FeedEvent {
        self.classify_at(frame, Utc::now())
    }

    /// Classify a frame, stamping readings with `timestamp`.
    pub fn classify_at(&mut self, frame: &[u8], timestamp: DateTime<Utc>) -> FeedEvent {
        let event = match FrameCodec::decode(frame, PayloadKind::Sensor) {
            Ok(response) => match (response.kind, response.body) {
                (ResponseKind::Accepted, Some(Body::Sensor(data))) => {
                    trace!("accepted, send counter {}", data.send_counter);
                    FeedEvent::Reading(TimestampedSensorData { timestamp, data })
                }
                (ResponseKind::Rejected, _) => {
                    debug!("rejected");
                    FeedEvent::Rejected {
                        payload_len: response.payload.len(),
                    }
                }
                (ResponseKind::ChecksumFailed, _) => {
                    let error = response.error.unwrap_or_default();
                    warn!("CRC failed: {}", error);
                    FeedEvent::ChecksumFailed { error }
                }
                (_, _) => {
                    let error = response
                        .error
                        .unwrap_or_else(|| "unexpected response body".to_string());
                    warn!("bad response: {}", error);
                    FeedEvent::Malformed {
                        raw_kind: response.raw_kind,
                        error,
                    }
                }
            },
            Err(err) => {
                warn!("bad response: {}", err);
                FeedEvent::Malformed {
                    raw_kind: frame.get(1).copied().unwrap_or_default(),
                    error: err.to_string(),
                }
            }
        };

        self.record(&event);
        event
    }

    /// Per-outcome counters.
    pub fn stats(&self) -> FeedStats {
        self.stats
    }

    fn record(&mut self, event: &FeedEvent) {
        match event {
            FeedEvent::Reading(_) => self.stats.readings += 1,
            FeedEvent::Rejected { .. } => self.stats.rejected += 1,
            FeedEvent::ChecksumFailed { .. } => self.stats.checksum_failed += 1,
            FeedEvent::Malformed { .. } => self.stats.malformed += 1,
        }
        let labels = self.labels.with(&[("outcome", event.as_str().to_string())]);
        metrics::counter!(metric_defs::FEED_RESPONSES.name, &labels).increment(1);
    }
}

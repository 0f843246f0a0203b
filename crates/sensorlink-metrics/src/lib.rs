//! Metrics infrastructure for the sensor link.
//!
//! This crate describes every metric the protocol engine records. It
//! re-exports the `metrics` crate for convenience and defines all metrics as
//! structured [`Metric`] constants to avoid typos and carry their metadata.
//!
//! # Example
//!
//! ```rust,ignore
//! use sensorlink_metrics::{MetricLabels, metric_defs, describe_metrics};
//!
//! // Initialize metric descriptions at startup
//! describe_metrics();
//!
//! // Create labels for a device link
//! let labels = MetricLabels::new("/dev/ttyUSB0").with_link("bench");
//!
//! // Use labels with metrics
//! metrics::counter!(metric_defs::FRAMES_DISPATCHED.name, &labels.to_labels()).increment(1);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

/// The kind of metric (counter, gauge, or histogram).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,
    /// A gauge that can go up and down.
    Gauge,
    /// A histogram for recording distributions.
    Histogram,
}

/// A metric declaration with its metadata.
///
/// Use the const constructors to declare metrics at compile time.
///
/// # Example
///
/// ```rust
/// use sensorlink_metrics::{Metric, MetricKind};
/// use sensorlink_metrics::metrics::Unit;
///
/// const FRAMES: Metric = Metric::counter("sensorlink.engine.frames")
///     .with_description("Frames extracted")
///     .with_unit(Unit::Count)
///     .with_labels(&["device"]);
///
/// assert_eq!(FRAMES.name, "sensorlink.engine.frames");
/// assert_eq!(FRAMES.kind, MetricKind::Counter);
/// ```
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric name (e.g., "sensorlink.engine.frames_dispatched").
    pub name: &'static str,
    /// The kind of metric (counter, gauge, histogram).
    pub kind: MetricKind,
    /// Human-readable description of the metric.
    pub description: &'static str,
    /// The unit of measurement (optional).
    pub unit: Option<Unit>,
    /// Expected label keys for this metric.
    pub labels: &'static [&'static str],
}

impl Metric {
    /// Creates a new counter metric with the given name.
    pub const fn counter(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Counter,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Creates a new gauge metric with the given name.
    pub const fn gauge(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Gauge,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Creates a new histogram metric with the given name.
    pub const fn histogram(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Histogram,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Sets the description for the metric.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the unit for the metric.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Sets the expected label keys for the metric.
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Registers this metric's description with the metrics recorder.
    ///
    /// This should be called once at startup for each metric.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => {
                describe_counter!(self.name, unit, self.description);
            }
            (MetricKind::Counter, None) => {
                describe_counter!(self.name, self.description);
            }
            (MetricKind::Gauge, Some(unit)) => {
                describe_gauge!(self.name, unit, self.description);
            }
            (MetricKind::Gauge, None) => {
                describe_gauge!(self.name, self.description);
            }
            (MetricKind::Histogram, Some(unit)) => {
                describe_histogram!(self.name, unit, self.description);
            }
            (MetricKind::Histogram, None) => {
                describe_histogram!(self.name, self.description);
            }
        }
    }
}

/// All metric definitions for the sensor link.
pub mod metric_defs {
    use super::{Metric, Unit};

    // ========================================================================
    // Standard Label Keys
    // ========================================================================

    /// Standard labels present on all link-scoped metrics.
    pub const STANDARD_LABELS: &[&str] = &["device", "link"];

    // ========================================================================
    // Ingest
    // ========================================================================

    /// Frames handed to the registered handler.
    pub const FRAMES_DISPATCHED: Metric = Metric::counter("sensorlink.engine.frames_dispatched")
        .with_description("Frames handed to the registered handler")
        .with_unit(Unit::Count)
        .with_labels(STANDARD_LABELS);

    /// Frames extracted while no handler was active.
    pub const FRAMES_ABSORBED: Metric = Metric::counter("sensorlink.engine.frames_absorbed")
        .with_description("Frames extracted after interrupt and not dispatched")
        .with_unit(Unit::Count)
        .with_labels(STANDARD_LABELS);

    /// Extracted frame size.
    pub const FRAME_SIZE: Metric = Metric::histogram("sensorlink.engine.frame_size_bytes")
        .with_description("Size of extracted frames in bytes")
        .with_unit(Unit::Bytes)
        .with_labels(STANDARD_LABELS);

    /// Bytes dropped one at a time while hunting for a frame marker.
    pub const RESYNC_BYTES_DROPPED: Metric = Metric::counter("sensorlink.engine.resync_bytes_dropped")
        .with_description("Bytes dropped during header resynchronization")
        .with_unit(Unit::Bytes)
        .with_labels(STANDARD_LABELS);

    /// Bytes received before any handler was ever registered.
    pub const IDLE_BYTES_DROPPED: Metric = Metric::counter("sensorlink.engine.idle_bytes_dropped")
        .with_description("Bytes received while idle and discarded")
        .with_unit(Unit::Bytes)
        .with_labels(STANDARD_LABELS);

    /// Bytes waiting in the stream buffer after each ingest.
    pub const BUFFERED_BYTES: Metric = Metric::gauge("sensorlink.engine.buffered_bytes")
        .with_description("Bytes buffered awaiting a complete frame")
        .with_unit(Unit::Bytes)
        .with_labels(STANDARD_LABELS);

    /// Frames per second over the last tick.
    pub const FRAME_RATE: Metric = Metric::gauge("sensorlink.engine.frame_rate")
        .with_description("Frames extracted during the last tick interval")
        .with_unit(Unit::CountPerSecond)
        .with_labels(STANDARD_LABELS);

    // ========================================================================
    // Commands
    // ========================================================================

    /// Commands written to the transport.
    ///
    /// Labels: device, link, command
    pub const COMMANDS_SENT: Metric = Metric::counter("sensorlink.engine.commands_sent")
        .with_description("Commands written to the transport")
        .with_unit(Unit::Count)
        .with_labels(&["device", "link", "command"]);

    /// Writes that did not accept the whole frame.
    pub const SHORT_WRITES: Metric = Metric::counter("sensorlink.engine.short_writes")
        .with_description("Command writes shorter than the encoded frame")
        .with_unit(Unit::Count)
        .with_labels(&["device", "link", "command"]);

    // ========================================================================
    // Feed
    // ========================================================================

    /// Classified responses.
    ///
    /// Labels: device, link, outcome
    pub const FEED_RESPONSES: Metric = Metric::counter("sensorlink.feed.responses")
        .with_description("Decoded frames by outcome")
        .with_unit(Unit::Count)
        .with_labels(&["device", "link", "outcome"]);

    /// All metric definitions.
    pub const ALL: &[&Metric] = &[
        // Ingest
        &FRAMES_DISPATCHED,
        &FRAMES_ABSORBED,
        &FRAME_SIZE,
        &RESYNC_BYTES_DROPPED,
        &IDLE_BYTES_DROPPED,
        &BUFFERED_BYTES,
        &FRAME_RATE,
        // Commands
        &COMMANDS_SENT,
        &SHORT_WRITES,
        // Feed
        &FEED_RESPONSES,
    ];
}

/// Labels identifying one device link.
#[derive(Debug, Clone, Default)]
pub struct MetricLabels {
    /// Device or port name.
    pub device: String,
    /// Free-form link name (e.g. bench, field); empty when unset.
    pub link: String,
}

impl MetricLabels {
    /// Create labels for a device.
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            link: String::new(),
        }
    }

    /// Set the link name.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    /// Convert to a label list for the `metrics` macros.
    pub fn to_labels(&self) -> Vec<(&'static str, String)> {
        vec![("device", self.device.clone()), ("link", self.link.clone())]
    }

    /// Standard labels plus extras.
    pub fn with(&self, extra: &[(&'static str, String)]) -> Vec<(&'static str, String)> {
        let mut labels = self.to_labels();
        labels.extend_from_slice(extra);
        labels
    }
}

/// Register descriptions for all metrics.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_labels_new() {
        let labels = MetricLabels::new("/dev/ttyUSB0");
        assert_eq!(labels.device, "/dev/ttyUSB0");
        assert!(labels.link.is_empty());
    }

    #[test]
    fn test_to_labels() {
        let labels = MetricLabels::new("COM3").with_link("bench");
        let label_vec = labels.to_labels();
        assert_eq!(label_vec.len(), 2);
        assert!(label_vec.contains(&("device", "COM3".to_string())));
        assert!(label_vec.contains(&("link", "bench".to_string())));
    }

    #[test]
    fn test_with_extra_labels() {
        let labels = MetricLabels::new("COM3");
        let extended = labels.with(&[("command", "stop".to_string())]);
        assert_eq!(extended.len(), 3);
        assert!(extended.contains(&("command", "stop".to_string())));
    }

    #[test]
    fn test_metric_definitions() {
        assert_eq!(
            metric_defs::FRAMES_DISPATCHED.name,
            "sensorlink.engine.frames_dispatched"
        );
        assert_eq!(metric_defs::FRAMES_DISPATCHED.kind, MetricKind::Counter);
        assert_eq!(metric_defs::FRAME_RATE.kind, MetricKind::Gauge);
        assert_eq!(metric_defs::FRAME_RATE.unit, Some(Unit::CountPerSecond));
        assert_eq!(metric_defs::FRAME_SIZE.kind, MetricKind::Histogram);
        assert_eq!(metric_defs::FRAME_SIZE.unit, Some(Unit::Bytes));
        assert_eq!(
            metric_defs::COMMANDS_SENT.labels,
            &["device", "link", "command"]
        );
    }

    #[test]
    fn test_all_metrics_count() {
        assert_eq!(metric_defs::ALL.len(), 10);
    }

    #[test]
    fn test_metric_names_unique() {
        let mut names: Vec<&str> = metric_defs::ALL.iter().map(|m| m.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), metric_defs::ALL.len());
    }

    #[test]
    fn test_describe_without_recorder() {
        // No recorder installed: describing is a no-op and must not panic.
        describe_metrics();
    }
}

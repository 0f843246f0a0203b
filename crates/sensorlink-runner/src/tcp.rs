//! Live session over a TCP serial bridge.
//!
//! Many USB-serial adapters and simulators expose the device UART as a raw
//! TCP socket. Bytes read from the socket go to the engine; commands go back
//! with a non-blocking write so the engine stays synchronous.

use std::io::{self, Write};
use std::time::Duration;

use sensorlink_engine::{channel_handler, ProtocolEngine, SensorFeed, Transport};
use sensorlink_metrics::MetricLabels;
use serde_json::json;
use tokio::io::AsyncReadExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::time::{interval_at, Instant};
use tracing::{info, warn};

use crate::config::RunnerConfig;
use crate::error::Result;
use crate::replay::{emit_events, SessionSummary};

/// Write half of a TCP bridge connection.
pub struct TcpTransport {
    writer: OwnedWriteHalf,
    open: bool,
}

impl TcpTransport {
    /// Wrap the write half of a connected stream.
    pub fn new(writer: OwnedWriteHalf) -> Self {
        TcpTransport { writer, open: true }
    }

    /// Mark the link closed after the peer hung up.
    pub fn close(&mut self) {
        self.open = false;
    }
}

impl Transport for TcpTransport {
    fn is_open(&self) -> bool {
        self.open
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.writer.try_write(bytes)
    }
}

/// Stream from `addr` until the peer disconnects, Ctrl-C, or `seconds`
/// elapse. Feed events and one rate line per tick go to `out` as JSON.
pub async fn run_session(
    addr: &str,
    config: &RunnerConfig,
    seconds: Option<u64>,
    out: &mut impl Write,
) -> Result<SessionSummary> {
    let stream = TcpStream::connect(addr).await?;
    info!("connected to {}", addr);
    let (mut reader, writer) = stream.into_split();

    let labels = MetricLabels::new(addr);
    let mut engine = ProtocolEngine::with_config(TcpTransport::new(writer), config.engine.clone())
        .with_labels(labels.clone());
    let (tx, rx) = crossbeam_channel::unbounded();
    // Wait until the socket accepts writes before sending GetData.
    engine.transport().writer.writable().await?;
    engine.start_reading(channel_handler(tx))?;
    let mut feed = SensorFeed::new().with_labels(labels);

    let period = config.engine.tick_interval().max(Duration::from_millis(1));
    let mut ticker = interval_at(Instant::now() + period, period);
    let deadline = seconds.map(|s| Instant::now() + Duration::from_secs(s));

    let mut read_buf = [0u8; 1024];
    let mut bytes = 0u64;

    loop {
        tokio::select! {
            result = reader.read(&mut read_buf) => {
                match result {
                    Ok(0) => {
                        info!("bridge closed the connection");
                        engine.transport_mut().close();
                        break;
                    }
                    Ok(n) => {
                        bytes += n as u64;
                        engine.on_bytes_received(&read_buf[..n]);
                        emit_events(&rx, &mut feed, out)?;
                    }
                    Err(e) => {
                        return Err(e.into());
                    }
                }
            }

            _ = ticker.tick() => {
                let frames = engine.tick();
                serde_json::to_writer(&mut *out, &json!({ "event": "rate", "frames_per_second": frames }))?;
                writeln!(out)?;
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    info!("session time elapsed");
                    break;
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }

    if engine.transport().is_open() {
        if let Err(e) = engine.interrupt() {
            warn!("failed to send stop: {}", e);
        }
    }

    Ok(SessionSummary {
        bytes,
        engine: engine.stats(),
        feed: feed.stats(),
    })
}

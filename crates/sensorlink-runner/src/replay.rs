//! Replay a binary capture through the engine.

use std::io::{Read, Write};

use bytes::Bytes;
use crossbeam_channel::Receiver;
use sensorlink_engine::{
    channel_handler, EngineConfig, EngineStats, FeedStats, MemoryTransport, ProtocolEngine,
    SensorFeed,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;

/// Totals printed after a replay or a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Bytes fed to the engine.
    pub bytes: u64,
    /// Engine counters at the end of the session.
    pub engine: EngineStats,
    /// Feed counters at the end of the session.
    pub feed: FeedStats,
}

/// Classify every queued frame and write one JSON line per event.
pub(crate) fn emit_events(
    frames: &Receiver<Bytes>,
    feed: &mut SensorFeed,
    out: &mut impl Write,
) -> Result<usize> {
    let mut emitted = 0;
    for frame in frames.try_iter() {
        let event = feed.classify(&frame);
        serde_json::to_writer(&mut *out, &event)?;
        writeln!(out)?;
        emitted += 1;
    }
    Ok(emitted)
}

/// Feed `input` to a fresh engine `chunk_size` bytes at a time.
///
/// Each classified frame is written to `out` as a JSON line. The capture is
/// assumed to start mid-stream, so the engine is put in streaming state
/// before the first byte.
pub fn replay(
    mut input: impl Read,
    chunk_size: usize,
    config: &EngineConfig,
    out: &mut impl Write,
) -> Result<SessionSummary> {
    let chunk_size = chunk_size.max(1);
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut engine = ProtocolEngine::with_config(MemoryTransport::new(), config.clone());
    engine.start_reading(channel_handler(tx))?;
    let mut feed = SensorFeed::new();

    let mut chunk = vec![0u8; chunk_size];
    let mut bytes = 0u64;
    loop {
        let n = input.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        bytes += n as u64;
        let frames = engine.on_bytes_received(&chunk[..n]);
        if frames > 0 {
            debug!("chunk of {} bytes produced {} frames", n, frames);
        }
        emit_events(&rx, &mut feed, out)?;
    }

    if engine.buffered_len() > 0 {
        info!("{} trailing bytes did not form a frame", engine.buffered_len());
    }

    Ok(SessionSummary {
        bytes,
        engine: engine.stats(),
        feed: feed.stats(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorlink_protocol::{FrameCodec, Payload, ResponseKind, SensorData};

    fn capture() -> Vec<u8> {
        let reading = SensorData {
            send_counter: 4,
            ..SensorData::default()
        };
        let mut data = vec![0x01, 0x02];
        data.extend_from_slice(
            &FrameCodec::encode_response(ResponseKind::Accepted, &reading.to_bytes().unwrap())
                .unwrap(),
        );
        data.extend_from_slice(&FrameCodec::encode_response(ResponseKind::Rejected, &[]).unwrap());
        data
    }

    #[test]
    fn test_replay_emits_json_lines() {
        let mut out = Vec::new();
        let summary = replay(&capture()[..], 5, &EngineConfig::default(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "reading");
        assert_eq!(lines[0]["send_counter"], 4);
        assert_eq!(lines[1]["event"], "rejected");

        assert_eq!(summary.bytes, capture().len() as u64);
        assert_eq!(summary.engine.frames_dispatched, 2);
        assert_eq!(summary.engine.resync_bytes_dropped, 2);
        assert_eq!(summary.feed.readings, 1);
        assert_eq!(summary.feed.rejected, 1);
    }

    #[test]
    fn test_zero_chunk_size_is_clamped() {
        let mut out = Vec::new();
        let summary = replay(&capture()[..], 0, &EngineConfig::default(), &mut out).unwrap();
        assert_eq!(summary.engine.frames_dispatched, 2);
    }
}

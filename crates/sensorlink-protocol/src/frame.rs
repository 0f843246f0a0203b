//! Frame encoding/decoding.
//!
//! Every frame on the link, in either direction, has the same layout:
//!
//! ```text
//! +--------+------+-----+-------------------+-------+
//! | marker | kind | len | payload[0..len]   | crc8  |
//! | 0xAA   | u8   | u8  | len bytes         | u8    |
//! +--------+------+-----+-------------------+-------+
//! ```
//!
//! The CRC covers everything before it. Finding frame boundaries in a byte
//! stream only needs the marker and the length byte; that is the engine's
//! job. This module does the second pass: checksum and payload validation.

use bytes::{BufMut, Bytes, BytesMut};

use crate::checksum::{crc8, Crc8};
use crate::commands::CommandKind;
use crate::constants::*;
use crate::error::{DecodeError, ProtocolError};
use crate::payload::{Body, PayloadKind};
use crate::responses::{Response, ResponseKind};

/// Stateless encoder/decoder for single frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCodec;

impl FrameCodec {
    /// Total size of a frame whose length byte is `declared_len`.
    pub const fn frame_size(declared_len: u8) -> usize {
        HEADER_SIZE + declared_len as usize + CHECKSUM_SIZE
    }

    /// Encode a command frame.
    pub fn encode(kind: CommandKind, payload: &[u8]) -> Result<Bytes, ProtocolError> {
        Self::encode_frame(kind.into(), payload)
    }

    /// Encode a response frame, as the device would send it.
    pub fn encode_response(kind: ResponseKind, payload: &[u8]) -> Result<Bytes, ProtocolError> {
        Self::encode_frame(kind.into(), payload)
    }

    /// Encode a frame with an arbitrary kind byte.
    pub fn encode_frame(kind: u8, payload: &[u8]) -> Result<Bytes, ProtocolError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let mut buf = BytesMut::with_capacity(MIN_FRAME_SIZE + payload.len());
        buf.put_u8(FRAME_MARKER);
        buf.put_u8(kind);
        buf.put_u8(payload.len() as u8);
        buf.put_slice(payload);
        let crc = crc8(&buf);
        buf.put_u8(crc);
        Ok(buf.freeze())
    }

    /// Decode and classify one frame.
    ///
    /// `expected` names the body to deserialize when the device accepted the
    /// command. Bytes after the end of the frame are ignored.
    ///
    /// A checksum mismatch is not an `Err`: it yields a
    /// [`ResponseKind::ChecksumFailed`] response with `error` set.
    pub fn decode(frame: &[u8], expected: PayloadKind) -> Result<Response, DecodeError> {
        if frame.len() < MIN_FRAME_SIZE {
            return Err(DecodeError::Truncated {
                expected: MIN_FRAME_SIZE,
                actual: frame.len(),
            });
        }

        let marker = frame[0];
        if marker != FRAME_MARKER {
            return Err(DecodeError::BadMarker(marker));
        }

        let raw_kind = frame[1];
        let declared_len = frame[2];
        let total = Self::frame_size(declared_len);
        if frame.len() < total {
            return Err(DecodeError::Truncated {
                expected: total,
                actual: frame.len(),
            });
        }

        let body_end = HEADER_SIZE + declared_len as usize;
        let payload = Bytes::copy_from_slice(&frame[HEADER_SIZE..body_end]);
        let received_crc = frame[body_end];

        let mut digest = Crc8::new();
        digest.update(&frame[..body_end]);
        let computed_crc = digest.finalize();

        if received_crc != computed_crc {
            log::debug!(
                "CRC mismatch on kind 0x{:02X}: computed 0x{:02X}, received 0x{:02X}",
                raw_kind,
                computed_crc,
                received_crc
            );
            return Ok(Response {
                kind: ResponseKind::ChecksumFailed,
                raw_kind,
                payload,
                body: None,
                error: Some(format!(
                    "CRC check failed: computed 0x{:02X}, received 0x{:02X}",
                    computed_crc, received_crc
                )),
            });
        }

        let kind = match ResponseKind::try_from(raw_kind) {
            Ok(kind) => kind,
            Err(code) => {
                return Ok(Response {
                    kind: ResponseKind::Malformed,
                    raw_kind,
                    payload,
                    body: None,
                    error: Some(format!("unknown response kind 0x{:02X}", code)),
                });
            }
        };

        let (body, error) = match kind {
            ResponseKind::Accepted => (Some(Body::decode(expected, &payload)?), None),
            ResponseKind::Rejected => (None, None),
            ResponseKind::ChecksumFailed => {
                (None, Some("device reported a checksum failure".to_string()))
            }
            ResponseKind::Malformed => (None, Some("device reported a malformed frame".to_string())),
        };

        Ok(Response {
            kind,
            raw_kind,
            payload,
            body,
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Payload;
    use crate::types::{Axes, Environment, SensorData, UartSettings};

    fn sample_sensor() -> SensorData {
        SensorData {
            environment: Environment {
                temperature: -4.75,
                humidity: 88.0,
                pressure: 998.5,
            },
            gyroscope: Axes::new(10, 20, 30),
            accelerometer: Axes::new(-1, -2, -3),
            magnetometer: Axes::new(400, -500, 600),
            send_counter: 17,
        }
    }

    #[test]
    fn test_encode_stop() {
        let frame = FrameCodec::encode(CommandKind::Stop, &[]).unwrap();
        assert_eq!(&frame[..], &[0xAA, 0x02, 0x00, 0xE5]);
    }

    #[test]
    fn test_encode_payload_too_large() {
        let payload = [0u8; MAX_PAYLOAD_SIZE + 1];
        assert_eq!(
            FrameCodec::encode(CommandKind::GetData, &payload),
            Err(ProtocolError::PayloadTooLarge { len: 256, max: 255 })
        );

        let frame = FrameCodec::encode(CommandKind::GetData, &[0u8; MAX_PAYLOAD_SIZE]).unwrap();
        assert_eq!(frame.len(), MAX_FRAME_SIZE);
        assert_eq!(frame[2], 0xFF);
    }

    #[test]
    fn test_decode_sensor_roundtrip() {
        let sensor = sample_sensor();
        let frame =
            FrameCodec::encode_response(ResponseKind::Accepted, &sensor.to_bytes().unwrap()).unwrap();

        let response = FrameCodec::decode(&frame, PayloadKind::Sensor).unwrap();
        assert_eq!(response.kind, ResponseKind::Accepted);
        assert!(response.error.is_none());
        assert_eq!(response.sensor(), Some(&sensor));
        assert_eq!(response.payload.len(), SENSOR_PAYLOAD_SIZE);
    }

    #[test]
    fn test_decode_uart_settings_roundtrip() {
        let settings = UartSettings::default();
        let frame = FrameCodec::encode_response(ResponseKind::Accepted, &settings.to_bytes().unwrap())
            .unwrap();
        let response = FrameCodec::decode(&frame, PayloadKind::UartSettings).unwrap();
        assert_eq!(response.body, Some(Body::UartSettings(settings)));
    }

    #[test]
    fn test_decode_wrong_crc() {
        for wrong in [0x00u8, 0x01, 0xFF] {
            let response =
                FrameCodec::decode(&[0xAA, 0x01, 0x00, wrong], PayloadKind::Empty).unwrap();
            assert_eq!(response.kind, ResponseKind::ChecksumFailed);
            assert!(response.error.as_deref().is_some_and(|e| !e.is_empty()));
            assert_eq!(response.raw_kind, 0x01);
        }
    }

    #[test]
    fn test_decode_bad_marker() {
        assert_eq!(
            FrameCodec::decode(&[0x55, 0x01, 0x00, 0xDA], PayloadKind::Empty),
            Err(DecodeError::BadMarker(0x55))
        );
    }

    #[test]
    fn test_decode_truncated() {
        assert_eq!(
            FrameCodec::decode(&[0xAA, 0x01, 0x00], PayloadKind::Empty),
            Err(DecodeError::Truncated {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(
            FrameCodec::decode(&[0xAA, 0x01, 0x02, 0x00], PayloadKind::Empty),
            Err(DecodeError::Truncated {
                expected: 6,
                actual: 4
            })
        );
    }

    #[test]
    fn test_decode_short_sensor_payload() {
        let frame = FrameCodec::encode_response(ResponseKind::Accepted, &[1, 2, 3]).unwrap();
        assert_eq!(
            FrameCodec::decode(&frame, PayloadKind::Sensor),
            Err(DecodeError::Payload(ProtocolError::PayloadTooShort {
                expected: 31,
                actual: 3
            }))
        );
    }

    #[test]
    fn test_decode_rejected_skips_body() {
        let frame = FrameCodec::encode_response(ResponseKind::Rejected, &[]).unwrap();
        let response = FrameCodec::decode(&frame, PayloadKind::Sensor).unwrap();
        assert_eq!(response.kind, ResponseKind::Rejected);
        assert!(response.body.is_none());
        assert!(response.error.is_none());
    }

    #[test]
    fn test_decode_device_reported_errors() {
        let frame = FrameCodec::encode_response(ResponseKind::Malformed, &[]).unwrap();
        let response = FrameCodec::decode(&frame, PayloadKind::Sensor).unwrap();
        assert_eq!(response.kind, ResponseKind::Malformed);
        assert!(response.is_error());

        let frame = FrameCodec::encode_response(ResponseKind::ChecksumFailed, &[]).unwrap();
        let response = FrameCodec::decode(&frame, PayloadKind::Sensor).unwrap();
        assert_eq!(response.kind, ResponseKind::ChecksumFailed);
        assert!(response.is_error());
    }

    #[test]
    fn test_decode_unknown_kind() {
        let frame = FrameCodec::encode_frame(0x42, &[]).unwrap();
        let response = FrameCodec::decode(&frame, PayloadKind::Empty).unwrap();
        assert_eq!(response.kind, ResponseKind::Malformed);
        assert_eq!(response.raw_kind, 0x42);
        assert!(response.error.unwrap().contains("0x42"));
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut data = FrameCodec::encode_response(ResponseKind::Accepted, &[]).unwrap().to_vec();
        data.extend_from_slice(&[0xAA, 0xAA]);
        let response = FrameCodec::decode(&data, PayloadKind::Empty).unwrap();
        assert_eq!(response.kind, ResponseKind::Accepted);
        assert_eq!(response.body, Some(Body::Empty));
    }

    #[test]
    fn test_single_bit_flip_fails_checksum() {
        let sensor = sample_sensor();
        let frame =
            FrameCodec::encode_response(ResponseKind::Accepted, &sensor.to_bytes().unwrap()).unwrap();
        let crc_index = frame.len() - 1;

        // Kind and payload bytes; marker and length flips change the framing instead.
        for index in (1..crc_index).filter(|&i| i != 2) {
            for bit in 0..8 {
                let mut corrupted = frame.to_vec();
                corrupted[index] ^= 1 << bit;
                let response = FrameCodec::decode(&corrupted, PayloadKind::Sensor).unwrap();
                assert_eq!(
                    response.kind,
                    ResponseKind::ChecksumFailed,
                    "byte {} bit {}",
                    index,
                    bit
                );
            }
        }
    }

    #[test]
    fn test_frame_size() {
        assert_eq!(FrameCodec::frame_size(0), 4);
        assert_eq!(FrameCodec::frame_size(31), 35);
        assert_eq!(FrameCodec::frame_size(255), MAX_FRAME_SIZE);
    }
}

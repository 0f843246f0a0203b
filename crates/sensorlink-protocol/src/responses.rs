//! Responses received from the sensor device.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::payload::Body;
use crate::types::SensorData;

/// Classification of an inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// Command accepted; payload carries data.
    Accepted,
    /// Command rejected by the device.
    Rejected,
    /// Checksum did not match (reported by the device or detected locally).
    ChecksumFailed,
    /// Frame could not be interpreted.
    Malformed,
}

impl ResponseKind {
    /// Short lowercase name, used for logs and metric labels.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Accepted => "accepted",
            ResponseKind::Rejected => "rejected",
            ResponseKind::ChecksumFailed => "checksum_failed",
            ResponseKind::Malformed => "malformed",
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ResponseKind> for u8 {
    fn from(kind: ResponseKind) -> Self {
        match kind {
            ResponseKind::Accepted => RESP_ACCEPTED,
            ResponseKind::Rejected => RESP_REJECTED,
            ResponseKind::ChecksumFailed => RESP_CHECKSUM_FAILED,
            ResponseKind::Malformed => RESP_MALFORMED,
        }
    }
}

impl TryFrom<u8> for ResponseKind {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            RESP_ACCEPTED => Ok(ResponseKind::Accepted),
            RESP_REJECTED => Ok(ResponseKind::Rejected),
            RESP_CHECKSUM_FAILED => Ok(ResponseKind::ChecksumFailed),
            RESP_MALFORMED => Ok(ResponseKind::Malformed),
            other => Err(other),
        }
    }
}

/// A classified inbound frame.
///
/// A checksum failure still produces a `Response`: the frame was consumed
/// from the stream and the caller decides whether it matters.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Classification.
    pub kind: ResponseKind,
    /// The kind byte exactly as received.
    pub raw_kind: u8,
    /// Raw payload bytes.
    pub payload: Bytes,
    /// Deserialized body, present for accepted frames.
    pub body: Option<Body>,
    /// Why the frame is not usable, if it is not.
    pub error: Option<String>,
}

impl Response {
    /// Whether the device accepted the command and the frame is intact.
    pub fn is_ok(&self) -> bool {
        self.kind == ResponseKind::Accepted && self.error.is_none()
    }

    /// Whether the frame carries an error.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The sensor record, if the body is one.
    pub fn sensor(&self) -> Option<&SensorData> {
        self.body.as_ref().and_then(Body::as_sensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_codes() {
        for kind in [
            ResponseKind::Accepted,
            ResponseKind::Rejected,
            ResponseKind::ChecksumFailed,
            ResponseKind::Malformed,
        ] {
            assert_eq!(ResponseKind::try_from(u8::from(kind)), Ok(kind));
        }
        assert_eq!(u8::from(ResponseKind::Malformed), 0x04);
        assert_eq!(ResponseKind::try_from(0x00), Err(0x00));
    }

    #[test]
    fn test_response_predicates() {
        let response = Response {
            kind: ResponseKind::Accepted,
            raw_kind: RESP_ACCEPTED,
            payload: Bytes::new(),
            body: Some(Body::Sensor(SensorData::default())),
            error: None,
        };
        assert!(response.is_ok());
        assert!(!response.is_error());
        assert!(response.sensor().is_some());

        let failed = Response {
            kind: ResponseKind::ChecksumFailed,
            error: Some("CRC check failed".to_string()),
            body: None,
            ..response
        };
        assert!(!failed.is_ok());
        assert!(failed.is_error());
        assert!(failed.sensor().is_none());
    }
}

//! The payload capability shared by every message body.
//!
//! Commands take any [`Payload`] as a trait object when encoding. On the
//! receive side the caller names the body it expects with a [`PayloadKind`],
//! and [`Body`] dispatches to the matching `from_bytes`.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::types::{SensorData, UartSettings};

/// A message body with a fixed binary layout.
pub trait Payload {
    /// Serialize into wire bytes.
    fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError>;

    /// Deserialize from wire bytes.
    fn from_bytes(data: &[u8]) -> Result<Self, ProtocolError>
    where
        Self: Sized;
}

/// Body of a `GetData` or `Stop` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyPayload;

impl Payload for EmptyPayload {
    fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(Vec::new())
    }

    fn from_bytes(_data: &[u8]) -> Result<Self, ProtocolError> {
        Ok(EmptyPayload)
    }
}

/// Which body a decoder should expect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    /// No body; any payload bytes are ignored.
    #[default]
    Empty,
    /// A [`SensorData`] record.
    Sensor,
    /// A [`UartSettings`] record.
    UartSettings,
}

/// A decoded message body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Body {
    /// No body.
    Empty,
    /// A sensor measurement.
    Sensor(SensorData),
    /// UART settings.
    UartSettings(UartSettings),
}

impl Body {
    /// Deserialize `data` as the body named by `kind`.
    pub fn decode(kind: PayloadKind, data: &[u8]) -> Result<Self, ProtocolError> {
        match kind {
            PayloadKind::Empty => EmptyPayload::from_bytes(data).map(|_| Body::Empty),
            PayloadKind::Sensor => SensorData::from_bytes(data).map(Body::Sensor),
            PayloadKind::UartSettings => UartSettings::from_bytes(data).map(Body::UartSettings),
        }
    }

    /// The kind of this body.
    pub fn kind(&self) -> PayloadKind {
        match self {
            Body::Empty => PayloadKind::Empty,
            Body::Sensor(_) => PayloadKind::Sensor,
            Body::UartSettings(_) => PayloadKind::UartSettings,
        }
    }

    /// The sensor record, if this is one.
    pub fn as_sensor(&self) -> Option<&SensorData> {
        match self {
            Body::Sensor(data) => Some(data),
            _ => None,
        }
    }

    /// The UART settings, if this is one.
    pub fn as_uart_settings(&self) -> Option<&UartSettings> {
        match self {
            Body::UartSettings(settings) => Some(settings),
            _ => None,
        }
    }
}

impl Payload for Body {
    fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        match self {
            Body::Empty => EmptyPayload.to_bytes(),
            Body::Sensor(data) => data.to_bytes(),
            Body::UartSettings(settings) => settings.to_bytes(),
        }
    }

    /// Without a [`PayloadKind`] the only safe interpretation is by size.
    fn from_bytes(data: &[u8]) -> Result<Self, ProtocolError> {
        match data.len() {
            0 => Ok(Body::Empty),
            crate::constants::UART_SETTINGS_PAYLOAD_SIZE => {
                Body::decode(PayloadKind::UartSettings, data)
            }
            _ => Body::decode(PayloadKind::Sensor, data),
        }
    }
}

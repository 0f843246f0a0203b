//! Commands that can be sent to the sensor device.

use std::fmt;

use bytes::Bytes;

use crate::constants::*;
use crate::error::ProtocolError;
use crate::frame::FrameCodec;
use crate::payload::Payload;
use crate::types::UartSettings;

/// Command codes understood by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Start streaming sensor frames.
    GetData,
    /// Stop streaming.
    Stop,
    /// Switch the device UART to new settings.
    ReconfigureUart,
}

impl CommandKind {
    /// Short lowercase name, used for logs and metric labels.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CommandKind::GetData => "get_data",
            CommandKind::Stop => "stop",
            CommandKind::ReconfigureUart => "reconfigure_uart",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CommandKind> for u8 {
    fn from(kind: CommandKind) -> Self {
        match kind {
            CommandKind::GetData => CMD_GET_DATA,
            CommandKind::Stop => CMD_STOP,
            CommandKind::ReconfigureUart => CMD_RECONFIGURE_UART,
        }
    }
}

impl TryFrom<u8> for CommandKind {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            CMD_GET_DATA => Ok(CommandKind::GetData),
            CMD_STOP => Ok(CommandKind::Stop),
            CMD_RECONFIGURE_UART => Ok(CommandKind::ReconfigureUart),
            other => Err(other),
        }
    }
}

/// An outbound command: a kind plus its serialized body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    kind: CommandKind,
    payload: Bytes,
}

impl Command {
    /// A command with no body.
    pub fn new(kind: CommandKind) -> Self {
        Command {
            kind,
            payload: Bytes::new(),
        }
    }

    /// A command carrying any payload.
    ///
    /// Fails if the payload cannot be serialized or does not fit in a frame.
    pub fn with_body(kind: CommandKind, body: &dyn Payload) -> Result<Self, ProtocolError> {
        let payload = body.to_bytes()?;
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }
        Ok(Command {
            kind,
            payload: Bytes::from(payload),
        })
    }

    /// Start streaming.
    pub fn get_data() -> Self {
        Command::new(CommandKind::GetData)
    }

    /// Stop streaming.
    pub fn stop() -> Self {
        Command::new(CommandKind::Stop)
    }

    /// Reconfigure the device UART.
    pub fn reconfigure_uart(settings: &UartSettings) -> Result<Self, ProtocolError> {
        Command::with_body(CommandKind::ReconfigureUart, settings)
    }

    /// The command kind.
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    /// The serialized body.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Encode into a complete wire frame.
    pub fn encode(&self) -> Result<Bytes, ProtocolError> {
        FrameCodec::encode(self.kind, &self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Parity;

    #[test]
    fn test_command_codes() {
        assert_eq!(u8::from(CommandKind::GetData), 1);
        assert_eq!(u8::from(CommandKind::Stop), 2);
        assert_eq!(u8::from(CommandKind::ReconfigureUart), 3);
        assert_eq!(CommandKind::try_from(2), Ok(CommandKind::Stop));
        assert_eq!(CommandKind::try_from(7), Err(7));
    }

    #[test]
    fn test_stop_encoding() {
        let frame = Command::stop().encode().unwrap();
        assert_eq!(&frame[..], &[0xAA, 0x02, 0x00, 0xE5]);
    }

    #[test]
    fn test_get_data_encoding() {
        let frame = Command::get_data().encode().unwrap();
        assert_eq!(&frame[..], &[0xAA, 0x01, 0x00, 0xDA]);
    }

    #[test]
    fn test_reconfigure_encoding() {
        let command = Command::reconfigure_uart(&UartSettings::default()).unwrap();
        assert_eq!(command.kind(), CommandKind::ReconfigureUart);
        assert_eq!(command.payload(), &[5, 2, 1, 1, 1]);

        let frame = command.encode().unwrap();
        assert_eq!(&frame[..], &[0xAA, 0x03, 0x05, 5, 2, 1, 1, 1, 0x3C]);
    }

    #[test]
    fn test_reconfigure_unmapped() {
        let settings = UartSettings {
            parity: Parity::Space,
            ..UartSettings::default()
        };
        assert!(matches!(
            Command::reconfigure_uart(&settings),
            Err(ProtocolError::UnmappedSetting { setting: "parity", .. })
        ));
    }

    struct Oversized;

    impl Payload for Oversized {
        fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
            Ok(vec![0; 256])
        }

        fn from_bytes(_data: &[u8]) -> Result<Self, ProtocolError> {
            Ok(Oversized)
        }
    }

    #[test]
    fn test_oversized_body() {
        assert_eq!(
            Command::with_body(CommandKind::GetData, &Oversized),
            Err(ProtocolError::PayloadTooLarge { len: 256, max: 255 })
        );
    }
}

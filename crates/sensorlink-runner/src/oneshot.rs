//! One-shot `encode` and `decode` commands.

use sensorlink_protocol::{Body, Command, FrameCodec, PayloadKind, ResponseKind, UartSettings};
use serde::Serialize;

use crate::cli::CommandArg;
use crate::error::Result;

/// Encode a command frame and render it as uppercase hex.
pub fn encode_command(command: CommandArg, settings: &UartSettings) -> Result<String> {
    let command = match command {
        CommandArg::GetData => Command::get_data(),
        CommandArg::Stop => Command::stop(),
        CommandArg::Reconfigure => Command::reconfigure_uart(settings)?,
    };
    Ok(hex::encode_upper(command.encode()?))
}

/// JSON view of a decoded frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedFrame {
    /// Classified response kind.
    pub kind: ResponseKind,
    /// Kind byte as received.
    pub raw_kind: u8,
    /// Payload bytes as hex.
    pub payload: String,
    /// Decoded payload, when it parsed.
    pub body: Option<Body>,
    /// Checksum or payload error, if any.
    pub error: Option<String>,
}

/// Decode one hex frame. Whitespace between bytes is ignored.
pub fn decode_frame(text: &str, expected: PayloadKind) -> Result<DecodedFrame> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = hex::decode(compact)?;
    let response = FrameCodec::decode(&bytes, expected)?;
    Ok(DecodedFrame {
        kind: response.kind,
        raw_kind: response.raw_kind,
        payload: hex::encode_upper(&response.payload),
        body: response.body,
        error: response.error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RunnerError;

    #[test]
    fn test_encode_commands() {
        let settings = UartSettings::default();
        assert_eq!(encode_command(CommandArg::Stop, &settings).unwrap(), "AA0200E5");
        assert_eq!(encode_command(CommandArg::GetData, &settings).unwrap(), "AA0100DA");
        assert_eq!(
            encode_command(CommandArg::Reconfigure, &settings).unwrap(),
            "AA030505020101013C"
        );
    }

    #[test]
    fn test_encode_unmapped_baud() {
        let settings = UartSettings {
            baud_rate: 250_000,
            ..UartSettings::default()
        };
        assert!(matches!(
            encode_command(CommandArg::Reconfigure, &settings),
            Err(RunnerError::Protocol(_))
        ));
    }

    #[test]
    fn test_decode_checksum_failed() {
        let decoded = decode_frame("AA 01 00 00", PayloadKind::Empty).unwrap();
        assert_eq!(decoded.kind, ResponseKind::ChecksumFailed);
        assert!(decoded.error.is_some());
        assert!(decoded.body.is_none());
    }

    #[test]
    fn test_decode_uart_settings() {
        let frame = FrameCodec::encode_response(ResponseKind::Accepted, &[5, 2, 1, 1, 1]).unwrap();
        let decoded = decode_frame(&hex::encode(frame), PayloadKind::UartSettings).unwrap();
        assert_eq!(decoded.body, Some(Body::UartSettings(UartSettings::default())));
        assert_eq!(decoded.payload, "0502010101");
    }

    #[test]
    fn test_decode_bad_input() {
        assert!(matches!(
            decode_frame("AAZZ", PayloadKind::Empty),
            Err(RunnerError::Hex(_))
        ));
        assert!(matches!(
            decode_frame("AA01", PayloadKind::Empty),
            Err(RunnerError::Decode(_))
        ));
    }
}

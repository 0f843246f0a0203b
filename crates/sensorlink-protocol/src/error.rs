//! Protocol error types.

use thiserror::Error;

/// Errors raised while building or reading protocol values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Payload does not fit in the single-byte length field.
    #[error("payload too large: maximum {max} bytes, got {len}")]
    PayloadTooLarge {
        /// Actual payload length.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// A UART setting has no wire code.
    #[error("unmapped {setting} value: {value}")]
    UnmappedSetting {
        /// Which setting (baud rate, parity, ...).
        setting: &'static str,
        /// The offending value, rendered for display.
        value: String,
    },

    /// A received UART setting code is not in the table.
    #[error("unknown {setting} code: {code}")]
    UnknownSettingCode {
        /// Which setting.
        setting: &'static str,
        /// The offending code.
        code: u8,
    },

    /// More bytes were requested from a stream buffer than it holds.
    #[error("insufficient data: requested {requested} bytes, {available} available")]
    InsufficientData {
        /// Bytes requested.
        requested: usize,
        /// Bytes buffered.
        available: usize,
    },

    /// Payload is shorter than the record it should contain.
    #[error("payload too short: expected at least {expected} bytes, got {actual}")]
    PayloadTooShort {
        /// Minimum length of the record.
        expected: usize,
        /// Actual payload length.
        actual: usize,
    },
}

impl ProtocolError {
    /// Create an unmapped-setting error.
    pub fn unmapped(setting: &'static str, value: impl ToString) -> Self {
        ProtocolError::UnmappedSetting {
            setting,
            value: value.to_string(),
        }
    }
}

/// Errors that prevent a frame from being classified at all.
///
/// A checksum mismatch is not one of these: it is reported as a
/// [`ResponseKind::ChecksumFailed`](crate::ResponseKind::ChecksumFailed) response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// First byte is not the frame marker.
    #[error("bad frame marker: 0x{0:02X}")]
    BadMarker(u8),

    /// Fewer bytes than the header promises.
    #[error("truncated frame: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes the frame needs.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },

    /// Frame is intact but its payload could not be deserialized.
    #[error("invalid payload: {0}")]
    Payload(#[from] ProtocolError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::unmapped("baud rate", 4800);
        assert_eq!(err.to_string(), "unmapped baud rate value: 4800");

        let err = DecodeError::BadMarker(0x55);
        assert!(err.to_string().contains("0x55"));

        let err = DecodeError::from(ProtocolError::PayloadTooShort {
            expected: 31,
            actual: 4,
        });
        assert!(err.to_string().contains("expected at least 31"));
    }
}

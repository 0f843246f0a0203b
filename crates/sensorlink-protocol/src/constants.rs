//! Protocol constants
//!
//! These constants define the frame layout, command codes, response codes and
//! payload codes used on the sensor serial link.

// ============================================================================
// Frame Layout
// ============================================================================

/// Start-of-frame marker. Every frame in both directions begins with it.
pub const FRAME_MARKER: u8 = 0xAA;
/// Header size: marker, kind, length.
pub const HEADER_SIZE: usize = 3;
/// Trailing checksum size.
pub const CHECKSUM_SIZE: usize = 1;
/// Smallest possible frame (empty payload).
pub const MIN_FRAME_SIZE: usize = HEADER_SIZE + CHECKSUM_SIZE;
/// Largest payload the single-byte length field can describe.
pub const MAX_PAYLOAD_SIZE: usize = u8::MAX as usize;
/// Largest possible frame.
pub const MAX_FRAME_SIZE: usize = HEADER_SIZE + MAX_PAYLOAD_SIZE + CHECKSUM_SIZE;

/// CRC-8 generator polynomial (x^8 + x^2 + x + 1).
pub const CRC8_POLYNOMIAL: u8 = 0x07;
/// CRC-8 initial value.
pub const CRC8_INIT: u8 = 0x00;

// ============================================================================
// Command Codes (host → device)
// ============================================================================

/// Start streaming sensor frames.
pub const CMD_GET_DATA: u8 = 1;
/// Stop streaming.
pub const CMD_STOP: u8 = 2;
/// Switch the device UART to new line settings.
pub const CMD_RECONFIGURE_UART: u8 = 3;

// ============================================================================
// Response Codes (device → host)
// ============================================================================

/// Command accepted; payload carries data.
pub const RESP_ACCEPTED: u8 = 0x01;
/// Command rejected by the device.
pub const RESP_REJECTED: u8 = 0x02;
/// Device reported a checksum failure (also used locally when ours fails).
pub const RESP_CHECKSUM_FAILED: u8 = 0x03;
/// Malformed frame.
pub const RESP_MALFORMED: u8 = 0x04;

// ============================================================================
// Payload Sizes
// ============================================================================

/// Size of the sensor measurement record.
pub const SENSOR_PAYLOAD_SIZE: usize = 3 * 4 + 3 * 2 + 3 * 2 + 3 * 2 + 1;
/// Size of the UART reconfiguration record.
pub const UART_SETTINGS_PAYLOAD_SIZE: usize = 5;

// ============================================================================
// UART Setting Codes
// ============================================================================

/// Baud rates the device understands, with their wire codes.
pub const BAUD_RATE_CODES: &[(u32, u8)] = &[
    (9_600, 1),
    (19_200, 2),
    (38_400, 3),
    (57_600, 4),
    (115_200, 5),
];

/// Data bit widths the device understands, with their wire codes.
pub const DATA_BITS_CODES: &[(u8, u8)] = &[(7, 1), (8, 2)];

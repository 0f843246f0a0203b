//! Payload records carried inside frames.

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ProtocolError;
use crate::payload::Payload;

// ============================================================================
// Sensor Measurements
// ============================================================================

/// Environmental readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Temperature.
    pub temperature: f32,
    /// Relative humidity.
    pub humidity: f32,
    /// Barometric pressure.
    pub pressure: f32,
}

/// A raw three-axis reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Axes {
    /// X axis.
    pub x: i16,
    /// Y axis.
    pub y: i16,
    /// Z axis.
    pub z: i16,
}

impl Axes {
    /// Create a reading from its components.
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Axes { x, y, z }
    }

    fn read(buf: &mut &[u8]) -> Self {
        Axes {
            x: buf.get_i16_le(),
            y: buf.get_i16_le(),
            z: buf.get_i16_le(),
        }
    }

    fn write(&self, buf: &mut Vec<u8>) {
        buf.put_i16_le(self.x);
        buf.put_i16_le(self.y);
        buf.put_i16_le(self.z);
    }
}

/// One sensor measurement record as streamed by the device.
///
/// Wire layout (31 bytes, little-endian):
///
/// ```text
/// +-------------+-------------+-------------+-------------+---------+
/// | env 3×f32   | gyro 3×i16  | accel 3×i16 | mag 3×i16   | counter |
/// | 12          | 6           | 6           | 6           | 1       |
/// +-------------+-------------+-------------+-------------+---------+
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorData {
    /// Temperature, humidity and pressure.
    pub environment: Environment,
    /// Gyroscope.
    pub gyroscope: Axes,
    /// Accelerometer.
    pub accelerometer: Axes,
    /// Magnetometer.
    pub magnetometer: Axes,
    /// Device-side send counter (wraps at 255).
    pub send_counter: u8,
}

impl Payload for SensorData {
    fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        let mut buf = Vec::with_capacity(SENSOR_PAYLOAD_SIZE);
        buf.put_f32_le(self.environment.temperature);
        buf.put_f32_le(self.environment.humidity);
        buf.put_f32_le(self.environment.pressure);
        self.gyroscope.write(&mut buf);
        self.accelerometer.write(&mut buf);
        self.magnetometer.write(&mut buf);
        buf.put_u8(self.send_counter);
        Ok(buf)
    }

    fn from_bytes(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < SENSOR_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooShort {
                expected: SENSOR_PAYLOAD_SIZE,
                actual: data.len(),
            });
        }

        let mut buf = data;
        let environment = Environment {
            temperature: buf.get_f32_le(),
            humidity: buf.get_f32_le(),
            pressure: buf.get_f32_le(),
        };
        let gyroscope = Axes::read(&mut buf);
        let accelerometer = Axes::read(&mut buf);
        let magnetometer = Axes::read(&mut buf);
        let send_counter = buf.get_u8();

        Ok(SensorData {
            environment,
            gyroscope,
            accelerometer,
            magnetometer,
            send_counter,
        })
    }
}

// ============================================================================
// UART Settings
// ============================================================================

/// Stop bit configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopBits {
    /// One stop bit.
    One,
    /// One and a half stop bits.
    OneAndHalf,
    /// Two stop bits.
    Two,
}

impl StopBits {
    fn code(self) -> u8 {
        match self {
            StopBits::One => 1,
            StopBits::OneAndHalf => 2,
            StopBits::Two => 3,
        }
    }

    fn from_code(code: u8) -> Result<Self, ProtocolError> {
        match code {
            1 => Ok(StopBits::One),
            2 => Ok(StopBits::OneAndHalf),
            3 => Ok(StopBits::Two),
            _ => Err(ProtocolError::UnknownSettingCode {
                setting: "stop bits",
                code,
            }),
        }
    }
}

/// Parity configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    /// No parity bit.
    None,
    /// Even parity.
    Even,
    /// Odd parity.
    Odd,
    /// Mark parity. Not supported by the device.
    Mark,
    /// Space parity. Not supported by the device.
    Space,
}

impl Parity {
    fn code(self) -> Result<u8, ProtocolError> {
        match self {
            Parity::None => Ok(1),
            Parity::Even => Ok(2),
            Parity::Odd => Ok(3),
            other => Err(ProtocolError::unmapped("parity", format!("{:?}", other))),
        }
    }

    fn from_code(code: u8) -> Result<Self, ProtocolError> {
        match code {
            1 => Ok(Parity::None),
            2 => Ok(Parity::Even),
            3 => Ok(Parity::Odd),
            _ => Err(ProtocolError::UnknownSettingCode {
                setting: "parity",
                code,
            }),
        }
    }
}

/// Flow control configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowControl {
    /// No flow control.
    None,
    /// RTS/CTS.
    Hardware,
    /// XON/XOFF. Not supported by the device.
    Software,
}

impl FlowControl {
    fn code(self) -> Result<u8, ProtocolError> {
        match self {
            FlowControl::None => Ok(1),
            FlowControl::Hardware => Ok(2),
            FlowControl::Software => Err(ProtocolError::unmapped("flow control", "Software")),
        }
    }

    fn from_code(code: u8) -> Result<Self, ProtocolError> {
        match code {
            1 => Ok(FlowControl::None),
            2 => Ok(FlowControl::Hardware),
            _ => Err(ProtocolError::UnknownSettingCode {
                setting: "flow control",
                code,
            }),
        }
    }
}

/// UART line settings sent with a reconfiguration command.
///
/// Each field is mapped to a small wire code; values the device does not
/// know are rejected at encode time rather than silently defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct UartSettings {
    /// Baud rate in bits per second.
    pub baud_rate: u32,
    /// Data bits per character.
    pub data_bits: u8,
    /// Stop bits.
    pub stop_bits: StopBits,
    /// Parity.
    pub parity: Parity,
    /// Flow control.
    pub flow_control: FlowControl,
}

impl Default for UartSettings {
    fn default() -> Self {
        UartSettings {
            baud_rate: 115_200,
            data_bits: 8,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::None,
        }
    }
}

impl UartSettings {
    /// Wire code for the baud rate.
    pub fn baud_rate_code(&self) -> Result<u8, ProtocolError> {
        lookup_code(BAUD_RATE_CODES, self.baud_rate, "baud rate")
    }

    /// Wire code for the data bits.
    pub fn data_bits_code(&self) -> Result<u8, ProtocolError> {
        lookup_code(DATA_BITS_CODES, self.data_bits, "data bits")
    }
}

fn lookup_code<T: Copy + PartialEq + ToString>(
    table: &[(T, u8)],
    value: T,
    setting: &'static str,
) -> Result<u8, ProtocolError> {
    table
        .iter()
        .find(|(v, _)| *v == value)
        .map(|(_, code)| *code)
        .ok_or_else(|| ProtocolError::unmapped(setting, value))
}

fn lookup_value<T: Copy>(
    table: &[(T, u8)],
    code: u8,
    setting: &'static str,
) -> Result<T, ProtocolError> {
    table
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(value, _)| *value)
        .ok_or(ProtocolError::UnknownSettingCode { setting, code })
}

impl Payload for UartSettings {
    fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(vec![
            self.baud_rate_code()?,
            self.data_bits_code()?,
            self.stop_bits.code(),
            self.parity.code()?,
            self.flow_control.code()?,
        ])
    }

    fn from_bytes(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < UART_SETTINGS_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooShort {
                expected: UART_SETTINGS_PAYLOAD_SIZE,
                actual: data.len(),
            });
        }

        Ok(UartSettings {
            baud_rate: lookup_value(BAUD_RATE_CODES, data[0], "baud rate")?,
            data_bits: lookup_value(DATA_BITS_CODES, data[1], "data bits")?,
            stop_bits: StopBits::from_code(data[2])?,
            parity: Parity::from_code(data[3])?,
            flow_control: FlowControl::from_code(data[4])?,
        })
    }
}

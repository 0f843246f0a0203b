//! CRC-8 checksum.
//!
//! Polynomial `0x07`, initial value `0x00`, no input or output reflection
//! (the CRC-8/SMBUS parameter set). Computed over every frame byte except the
//! trailing checksum itself.

use crate::constants::{CRC8_INIT, CRC8_POLYNOMIAL};

/// Incremental CRC-8 digest.
///
/// Lets the codec checksum a header and a payload that live in different
/// buffers without concatenating them first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc8 {
    value: u8,
}

impl Default for Crc8 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc8 {
    /// Start a new digest.
    pub const fn new() -> Self {
        Crc8 { value: CRC8_INIT }
    }

    /// Feed bytes into the digest.
    pub fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.value ^= byte;
            for _ in 0..8 {
                if self.value & 0x80 != 0 {
                    self.value = (self.value << 1) ^ CRC8_POLYNOMIAL;
                } else {
                    self.value <<= 1;
                }
            }
        }
    }

    /// Current checksum value.
    pub const fn finalize(&self) -> u8 {
        self.value
    }
}

/// Compute the CRC-8 of a byte slice.
pub fn crc8(bytes: &[u8]) -> u8 {
    let mut digest = Crc8::new();
    digest.update(bytes);
    digest.finalize()
}

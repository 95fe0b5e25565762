// SPDX-FileCopyrightText: 2024 Gabriel Marcano
//
// SPDX-License-Identifier: BSD-3-Clause

//! Checks applied to operator input before any serial port is touched.

use std::fmt::Write;
use std::num::ParseIntError;

use thiserror::Error;

/// The largest number of bytes the firmware will dump in one READ command.
pub const MAX_READ_LENGTH: u16 = 4096;

/// Malformed operator input. Each variant carries the message shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a port name")]
    MissingPort,
    #[error("Address must start with 0x (e.g., 0x20000000)")]
    AddressPrefix,
    #[error("Invalid hex address. Use format like 0x20000000")]
    AddressHex,
    #[error("Length must be a number between 1 and 4096")]
    Length,
    #[error("Please enter a search pattern")]
    EmptyPattern,
    #[error("Hex pattern must have even number of characters (e.g., DEADBEEF)")]
    OddHexPattern,
    #[error("Invalid hex pattern. Use only 0-9 and A-F (e.g., DEADBEEF)")]
    HexPattern,
    #[error("Invalid integer: {0}")]
    Integer(String),
}

/// Rejects an empty port identifier.
pub fn require_port(port: &str) -> Result<&str, ValidationError> {
    let port = port.trim();
    if port.is_empty() {
        return Err(ValidationError::MissingPort);
    }
    Ok(port)
}

/// Parses a `0x` prefixed 32-bit hexadecimal address.
///
/// Surrounding whitespace is ignored, but the prefix is mandatory: `20000000` is rejected even
/// though it is valid hex.
pub fn parse_address(address: &str) -> Result<u32, ValidationError> {
    let address = address.trim();
    let digits = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or(ValidationError::AddressPrefix)?;

    // from_str_radix tolerates a leading '+', the firmware does not
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ValidationError::AddressHex);
    }
    u32::from_str_radix(digits, 16).map_err(|_| ValidationError::AddressHex)
}

/// Parses a decimal read length in `1..=4096`.
pub fn parse_length(length: &str) -> Result<u16, ValidationError> {
    let length: u32 = length.parse().map_err(|_| ValidationError::Length)?;
    match u16::try_from(length) {
        Ok(length) if (1..=MAX_READ_LENGTH).contains(&length) => Ok(length),
        _ => Err(ValidationError::Length),
    }
}

/// How a search pattern typed by the operator should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PatternKind {
    /// Hex digits, e.g. `DEADBEEF` or `de ad be ef`.
    #[default]
    Hex,
    /// A literal string, searched for byte by byte.
    Ascii,
    /// A signed decimal integer, searched for as four little-endian bytes.
    Int32,
}

impl PatternKind {
    /// Converts `pattern` into the upper-case hex form sent after `SEARCH:`.
    pub fn to_hex(self, pattern: &str) -> Result<String, ValidationError> {
        if pattern.is_empty() {
            return Err(ValidationError::EmptyPattern);
        }

        match self {
            Self::Hex => {
                let hex = pattern.replace(' ', "").to_ascii_uppercase();
                if hex.is_empty() {
                    return Err(ValidationError::EmptyPattern);
                }
                if hex.len() % 2 != 0 {
                    return Err(ValidationError::OddHexPattern);
                }
                if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(ValidationError::HexPattern);
                }
                Ok(hex)
            }
            Self::Ascii => Ok(bytes_to_hex(pattern.as_bytes())),
            Self::Int32 => {
                let value: i32 = pattern
                    .parse()
                    .map_err(|err: ParseIntError| ValidationError::Integer(err.to_string()))?;
                Ok(bytes_to_hex(&value.to_le_bytes()))
            }
        }
    }
}

fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // Writing into a String cannot fail
        let _ = write!(hex, "{byte:02X}");
    }
    hex
}

// SPDX-FileCopyrightText: 2024 Gabriel Marcano
//
// SPDX-License-Identifier: BSD-3-Clause

//! Re-rendering of hex dumps produced by the READ command.
//!
//! The firmware answers a READ with a transcript shaped like this:
//!
//! ```text
//! === HEX DUMP ===
//! Address: 0x20000000, Length: 32 bytes
//!
//! Address:  00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F  ASCII
//! --------  -----------------------------------------------  ----------------
//! 20000000: 2a 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00  *...............
//! 20000010: 00 00 80 3f 01 02 03 04 05 06 07 08 09 0a 0b 0c  ...?............
//!
//! ===END===
//! ```
//!
//! [parse_hex_dump] recovers the bytes and the base address from such a transcript, and
//! [format_memory_dump] renders them as little-endian 16-bit words, 32-bit words, or IEEE-754
//! single precision floats. Every rendered view ends with the same `===END===` terminator the
//! firmware uses.

use std::fmt;
use std::fmt::Write;
use std::str::FromStr;

use byteorder::{ByteOrder, LittleEndian};

/// Terminator line closing every rendered view.
const END_MARKER: &str = "===END===";

/// Label of the dump's header lines, the one carrying the base address included.
const ADDRESS_LABEL: &str = "Address";

/// Bytes and base address recovered from a textual hex dump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HexDump {
    /// The dumped bytes, in transcript order.
    pub bytes: Vec<u8>,
    /// Address of the first byte, or 0 if the transcript did not say.
    pub base_address: u32,
}

/// The ways a memory dump can be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DisplayMode {
    /// The firmware's own hex dump, untouched.
    #[default]
    #[value(name = "bytes")]
    Bytes,
    /// Little-endian 16-bit words.
    #[value(name = "words16")]
    Words16,
    /// Little-endian 32-bit words.
    #[value(name = "words32")]
    Words32,
    /// Little-endian 32-bit floats.
    #[value(name = "float")]
    Float,
}

impl DisplayMode {
    /// All modes, in the order they are offered to the operator.
    pub const ALL: [Self; 4] = [Self::Bytes, Self::Words16, Self::Words32, Self::Float];

    /// Human readable label of the mode.
    pub fn label(self) -> &'static str {
        match self {
            Self::Bytes => "Bytes (Hex)",
            Self::Words16 => "16-bit Words",
            Self::Words32 => "32-bit Words",
            Self::Float => "Float (32-bit)",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a string names no known [DisplayMode].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown display mode: {0}")]
pub struct UnknownDisplayMode(String);

impl FromStr for DisplayMode {
    type Err = UnknownDisplayMode;

    /// Accepts either the label (`"32-bit Words"`) or the short name (`"words32"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| {
                s == mode.label()
                    || <Self as clap::ValueEnum>::to_possible_value(mode)
                        .is_some_and(|value| value.matches(s, true))
            })
            .ok_or_else(|| UnknownDisplayMode(s.to_string()))
    }
}

/// Splits a line at its first colon, returning the label before it and the text after it.
fn split_label(line: &str) -> Option<(&str, &str)> {
    line.split_once(':').map(|(label, rest)| (label.trim(), rest))
}

/// Extracts the dumped bytes and base address from a hex dump transcript.
///
/// Only lines with a colon are considered. Of those, the text after the first colon is cut at the
/// first double space (where the ASCII rendering starts), and every whitespace separated token
/// that is exactly two hex digits becomes a byte. Anything else is skipped, so a few garbled
/// tokens do not spoil the rest of the dump. Lines labelled `Address:` are header lines and only
/// contribute the base address; the label of a data row is its hex address, whatever its ASCII
/// column happens to say.
pub fn parse_hex_dump(text: &str) -> HexDump {
    let mut bytes = Vec::new();

    for line in text.lines() {
        let Some((label, rest)) = split_label(line) else {
            continue;
        };
        if label == ADDRESS_LABEL {
            continue;
        }
        let hex = rest.split_once("  ").map_or(rest, |(hex, _)| hex);

        bytes.extend(
            hex.split_whitespace()
                .filter(|token| token.len() == 2)
                .filter(|token| token.bytes().all(|b| b.is_ascii_hexdigit()))
                .filter_map(|token| u8::from_str_radix(token, 16).ok()),
        );
    }

    HexDump {
        bytes,
        base_address: extract_base_address(text),
    }
}

/// Finds the first `Address: 0x...` header in the transcript; defaults to 0.
///
/// Header lines whose first token is not a `0x` address, like the column header
/// `Address:  00 01 02 ...`, are passed over.
fn extract_base_address(text: &str) -> u32 {
    text.lines()
        .filter_map(split_label)
        .filter(|(label, _)| *label == ADDRESS_LABEL)
        .filter_map(|(_, rest)| rest.split_whitespace().next())
        .find_map(|value| {
            let value = value.strip_suffix(',').unwrap_or(value);
            let digits = value
                .strip_prefix("0x")
                .or_else(|| value.strip_prefix("0X"))?;
            u32::from_str_radix(digits, 16).ok()
        })
        .unwrap_or(0)
}

/// Renders a READ transcript in the requested mode.
///
/// [DisplayMode::Bytes] returns `raw` as is. For the other modes, a transcript with no parseable
/// bytes is also returned as is rather than rendered as an empty table.
pub fn format_memory_dump(raw: &str, mode: DisplayMode) -> String {
    if mode == DisplayMode::Bytes {
        return raw.to_string();
    }

    let dump = parse_hex_dump(raw);
    if dump.bytes.is_empty() {
        log::debug!("no bytes found in transcript, leaving it as is");
        return raw.to_string();
    }

    match mode {
        DisplayMode::Bytes => raw.to_string(),
        DisplayMode::Words16 => format_words16(&dump.bytes, dump.base_address),
        DisplayMode::Words32 => format_words32(&dump.bytes, dump.base_address),
        DisplayMode::Float => format_floats(&dump.bytes, dump.base_address),
    }
}

fn offset_address(base: u32, offset: usize) -> u32 {
    // Addresses wrap like the device's 32-bit bus does
    base.wrapping_add(offset as u32)
}

/// Renders `bytes` as little-endian 16-bit words, with signed decimal values.
///
/// A trailing odd byte is shown on its own row, marked `(partial)`, as a signed 8-bit value.
pub fn format_words16(bytes: &[u8], base: u32) -> String {
    let mut out = String::new();
    out.push_str("=== 16-bit Word View (Little-Endian) ===\n\n");
    out.push_str("Address:  Hex Bytes  Value      Decimal\n");
    out.push_str("--------  ---------  ------     --------\n");

    let words = bytes.chunks_exact(2);
    let remainder = words.remainder();
    for (index, word) in words.enumerate() {
        let value = LittleEndian::read_u16(word);
        let _ = writeln!(
            out,
            "{:08x}: {:02x} {:02x}     0x{:04x}     {}",
            offset_address(base, index * 2),
            word[0],
            word[1],
            value,
            value as i16
        );
    }

    if let [byte] = remainder {
        let _ = writeln!(
            out,
            "{:08x}: {:02x}        0x{:02x}       {} (partial)",
            offset_address(base, bytes.len() - 1),
            byte,
            byte,
            *byte as i8
        );
    }

    out.push('\n');
    out.push_str(END_MARKER);
    out.push('\n');
    out
}

/// Renders `bytes` as little-endian 32-bit words, with signed and unsigned decimal values.
///
/// One to three trailing bytes are shown on their own row, marked `(partial word)`.
pub fn format_words32(bytes: &[u8], base: u32) -> String {
    let mut out = String::new();
    out.push_str("=== 32-bit Word View (Little-Endian) ===\n\n");
    out.push_str(
        "Address:  Hex Bytes        Value       Decimal (signed)  Decimal (unsigned)\n",
    );
    out.push_str(
        "--------  ---------------  ----------  ----------------  ------------------\n",
    );

    let words = bytes.chunks_exact(4);
    let remainder = words.remainder();
    for (index, word) in words.enumerate() {
        let value = LittleEndian::read_u32(word);
        let _ = writeln!(
            out,
            "{:08x}: {:02x} {:02x} {:02x} {:02x}  0x{:08x}  {:<16}  {}",
            offset_address(base, index * 4),
            word[0],
            word[1],
            word[2],
            word[3],
            value,
            value as i32,
            value
        );
    }
    write_partial_row(&mut out, bytes, base, remainder, "(partial word)");

    out.push('\n');
    out.push_str(END_MARKER);
    out.push('\n');
    out
}

/// Renders `bytes` as little-endian IEEE-754 single precision floats.
///
/// The four bytes are reinterpreted bit for bit, never converted numerically. One to three
/// trailing bytes are shown on their own row, marked `(partial float)`.
pub fn format_floats(bytes: &[u8], base: u32) -> String {
    let mut out = String::new();
    out.push_str("=== Float View (32-bit, Little-Endian) ===\n\n");
    out.push_str("Address:  Hex Bytes        Float Value\n");
    out.push_str("--------  ---------------  -----------\n");

    let words = bytes.chunks_exact(4);
    let remainder = words.remainder();
    for (index, word) in words.enumerate() {
        let value = f32::from_bits(LittleEndian::read_u32(word));
        let _ = writeln!(
            out,
            "{:08x}: {:02x} {:02x} {:02x} {:02x}  {:.6}",
            offset_address(base, index * 4),
            word[0],
            word[1],
            word[2],
            word[3],
            value
        );
    }
    write_partial_row(&mut out, bytes, base, remainder, "(partial float)");

    out.push('\n');
    out.push_str(END_MARKER);
    out.push('\n');
    out
}

fn write_partial_row(out: &mut String, bytes: &[u8], base: u32, remainder: &[u8], marker: &str) {
    if remainder.is_empty() {
        return;
    }
    let _ = write!(
        out,
        "{:08x}: ",
        offset_address(base, bytes.len() - remainder.len())
    );
    for byte in remainder {
        let _ = write!(out, "{byte:02x} ");
    }
    out.push_str(marker);
    out.push('\n');
}

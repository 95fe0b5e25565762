// SPDX-FileCopyrightText: 2024 Gabriel Marcano
//
// SPDX-License-Identifier: BSD-3-Clause

//! Board models and their memory maps.

use crate::validate::{self, ValidationError};

/// The supported boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Model {
    /// Raspberry Pi Pico, RP2040.
    #[value(name = "pico1")]
    Pico1,
    /// Raspberry Pi Pico 2, RP2350.
    #[default]
    #[value(name = "pico2")]
    Pico2,
}

/// Sizes of the searchable regions of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegions {
    pub sram_size: &'static str,
    pub flash_size: &'static str,
    pub sram_bytes: u32,
    pub flash_bytes: u32,
}

impl Model {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pico1 => "Pico 1 (RP2040)",
            Self::Pico2 => "Pico 2 (RP2350)",
        }
    }

    pub fn regions(self) -> MemoryRegions {
        match self {
            Self::Pico1 => MemoryRegions {
                sram_size: "264KB",
                flash_size: "2MB",
                sram_bytes: 0x42000,
                flash_bytes: 0x20_0000,
            },
            Self::Pico2 => MemoryRegions {
                sram_size: "520KB",
                flash_size: "4MB",
                sram_bytes: 0x82000,
                flash_bytes: 0x40_0000,
            },
        }
    }
}

/// The region a search runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Region {
    /// Runtime data.
    #[default]
    Sram,
    /// Code and string literals.
    Flash,
}

impl Region {
    pub fn label(self) -> &'static str {
        match self {
            Self::Sram => "SRAM",
            Self::Flash => "Flash",
        }
    }

    /// Human readable size of the region on `model`.
    pub fn size(self, model: Model) -> &'static str {
        let regions = model.regions();
        match self {
            Self::Sram => regions.sram_size,
            Self::Flash => regions.flash_size,
        }
    }
}

/// Well known start addresses, usable in place of a hex address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAccess {
    Rom,
    Flash,
    Sram,
    Gpio,
}

impl QuickAccess {
    pub const ALL: [Self; 4] = [Self::Rom, Self::Flash, Self::Sram, Self::Gpio];

    pub fn name(self) -> &'static str {
        match self {
            Self::Rom => "rom",
            Self::Flash => "flash",
            Self::Sram => "sram",
            Self::Gpio => "gpio",
        }
    }

    pub fn address(self) -> u32 {
        match self {
            Self::Rom => 0x0000_0000,
            Self::Flash => 0x1000_0000,
            Self::Sram => 0x2000_0000,
            Self::Gpio => 0x4002_8000,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|quick| quick.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Resolves a quick access name or a `0x` prefixed hex address.
pub fn resolve_address(text: &str) -> Result<u32, ValidationError> {
    match QuickAccess::from_name(text) {
        Some(quick) => Ok(quick.address()),
        None => validate::parse_address(text),
    }
}

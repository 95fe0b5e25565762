// SPDX-FileCopyrightText: 2024 Gabriel Marcano
//
// SPDX-License-Identifier: BSD-3-Clause

//! This crate contains routines for inspecting the memory of a Raspberry Pi Pico running the
//! memory explorer firmware. The firmware speaks a line oriented text protocol over the USB serial
//! console: it reports a few landmark addresses, dumps address ranges as hex, and searches SRAM or
//! flash for a byte pattern.
//!
//! The [session] module performs one framed request/response exchange per call, the [format]
//! module re-renders hex dumps as 16-bit words, 32-bit words or floats, and [worker] runs
//! exchanges in the background and delivers their results over a channel.
//!
//! A binary companion crate is provided that exposes all of this on the command line.

pub mod config;
pub mod format;
pub mod session;
pub mod validate;
pub mod worker;

pub use session::*;

// SPDX-FileCopyrightText: 2024 Gabriel Marcano
//
// SPDX-License-Identifier: BSD-3-Clause

//! # pico-peek
//!
//! This CLI inspects the memory of a Raspberry Pi Pico running the memory explorer firmware over
//! its USB serial console.
//!
//! Commands supported: landmarks, read, search, reformat, regions

use pico_peek::config::{self, Model, QuickAccess, Region};
use pico_peek::format::{self, DisplayMode};
use pico_peek::validate::{self, PatternKind};
use pico_peek::worker::{Dispatcher, Job, Update};

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::result;
use std::time::Duration;

type Result<T> = result::Result<T, Box<dyn Error>>;

/// Number of worker updates buffered before further ones are dropped.
const UPDATE_CAPACITY: usize = 10;

#[derive(Subcommand)]
enum Commands {
    /// Ask the firmware for the addresses of its landmark symbols.
    Landmarks,
    /// Dump a range of memory.
    Read {
        /// The starting address, 0x prefixed hex or one of rom, flash, sram, gpio.
        address: String,
        /// The number of bytes to read, between 1 and 4096.
        #[arg(default_value = "256")]
        length: String,
        #[arg(short, long, value_enum, default_value_t)]
        /// How to present the dump.
        display: DisplayMode,
    },
    /// Search SRAM or flash for a pattern.
    Search {
        /// The pattern to look for.
        pattern: String,
        #[arg(short, long, value_enum, default_value_t)]
        /// How to interpret the pattern.
        kind: PatternKind,
        #[arg(short, long, value_enum, default_value_t)]
        /// The region to search.
        region: Region,
    },
    /// Re-render a saved read transcript.
    Reformat {
        /// File holding the transcript of a read.
        file: PathBuf,
        #[arg(short, long, value_enum)]
        /// How to present the dump.
        display: DisplayMode,
    },
    /// Show the memory map of the selected board.
    Regions,
}

#[derive(Parser)]
#[command(author, version, about, long_about=None)]
#[command(propagate_version = true)]
struct Cli {
    #[arg(short, long, env = "PICOPEEK_PORT", global = true)]
    /// Path to the serial device of the Pico.
    port: Option<String>,
    #[arg(short, long, value_enum, default_value_t, global = true)]
    /// The board running the firmware.
    model: Model,
    #[command(subcommand)]
    /// The task to perform.
    command: Commands,
    #[command(flatten)]
    /// The level of output verbosity.
    verbose: clap_verbosity_flag::Verbosity,
}

/// Runs `job` in the background, showing a spinner until its result arrives.
fn dispatch(port: &str, model: Model, job: Job) -> ExitCode {
    let (dispatcher, updates) = Dispatcher::new(UPDATE_CAPACITY, model);
    let worker = dispatcher.submit(port, job);
    // Once the worker is done the channel closes and the loop below ends
    drop(dispatcher);

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut status = ExitCode::SUCCESS;
    for update in updates {
        match update {
            Update::Progress(text) => spinner.set_message(text),
            Update::Finished(text) => {
                spinner.finish_and_clear();
                println!("{text}");
            }
            Update::Failed(text) => {
                spinner.finish_and_clear();
                eprintln!("{text}");
                status = ExitCode::FAILURE;
            }
        }
    }

    if worker.join().is_err() {
        error!("Worker thread panicked");
        status = ExitCode::FAILURE;
    }
    status
}

fn print_regions(model: Model) {
    let regions = model.regions();
    println!("{}", model.label());
    println!("SRAM:  {} ({:#x} bytes)", regions.sram_size, regions.sram_bytes);
    println!("Flash: {} ({:#x} bytes)", regions.flash_size, regions.flash_bytes);
    println!();
    println!("Quick access:");
    for quick in QuickAccess::ALL {
        println!("  {:<6} {:#010x}", quick.name(), quick.address());
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let port = || validate::require_port(cli.port.as_deref().unwrap_or_default());

    match &cli.command {
        Commands::Landmarks => Ok(dispatch(port()?, cli.model, Job::Landmarks)),
        Commands::Read {
            address,
            length,
            display,
        } => {
            let address = config::resolve_address(address)?;
            let length = validate::parse_length(length)?;
            Ok(dispatch(
                port()?,
                cli.model,
                Job::Read {
                    address,
                    length,
                    mode: *display,
                },
            ))
        }
        Commands::Search {
            pattern,
            kind,
            region,
        } => {
            let pattern = kind.to_hex(pattern)?;
            info!("Searching {} for {pattern}", region.label());
            Ok(dispatch(
                port()?,
                cli.model,
                Job::Search {
                    region: *region,
                    pattern,
                },
            ))
        }
        Commands::Reformat { file, display } => {
            let raw = fs::read_to_string(file)?;
            print!("{}", format::format_memory_dump(&raw, *display));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Regions => {
            print_regions(cli.model);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    info!(
        "pico-peek version: {}.{}",
        env!("CARGO_PKG_VERSION_MAJOR"),
        env!("CARGO_PKG_VERSION_MINOR")
    );

    match run(cli) {
        Ok(status) => status,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

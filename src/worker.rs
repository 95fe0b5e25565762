// SPDX-FileCopyrightText: 2024 Gabriel Marcano
//
// SPDX-License-Identifier: BSD-3-Clause

//! Runs exchanges on background threads and reports their results over a channel.
//!
//! Every job gets its own thread, so a two minute flash search does not hold up anything else.
//! Jobs for the same port are run one at a time, since the firmware handles one command at a time
//! and interleaved responses are unusable. Results are sent with `try_send`: a worker never blocks
//! on a receiver that is slow or gone, it drops the update instead.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use log::{debug, info};

use crate::config::{Model, Region};
use crate::format::{self, DisplayMode};
use crate::session;

/// Work a [Dispatcher] can run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    Landmarks,
    /// Reads memory and renders the dump in `mode`.
    Read {
        address: u32,
        length: u16,
        mode: DisplayMode,
    },
    /// Searches `region` for the bytes spelled out by the hex digits of `pattern`.
    Search { region: Region, pattern: String },
}

impl Job {
    fn progress(&self, model: Model) -> String {
        match self {
            Self::Landmarks => "Fetching landmarks...".to_string(),
            Self::Read { .. } => "Reading memory...".to_string(),
            Self::Search {
                region: Region::Sram,
                ..
            } => format!(
                "Searching SRAM ({}, this may take 5-10 seconds)...",
                Region::Sram.size(model)
            ),
            Self::Search {
                region: Region::Flash,
                ..
            } => format!(
                "Searching Flash ({}, this may take 30-60 seconds)...",
                Region::Flash.size(model)
            ),
        }
    }
}

/// A message from a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// The job started; more is coming.
    Progress(String),
    /// The job's result.
    Finished(String),
    /// Why the job failed.
    Failed(String),
}

impl Update {
    pub fn text(&self) -> &str {
        match self {
            Self::Progress(text) | Self::Finished(text) | Self::Failed(text) => text,
        }
    }
}

type Runner = dyn Fn(&str, &Job) -> session::Result<String> + Send + Sync;
type PortLocks = Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>;

/// Spawns workers and hands out the receiving end of their update channel.
pub struct Dispatcher {
    updates: SyncSender<Update>,
    ports: PortLocks,
    runner: Arc<Runner>,
    model: Model,
}

impl Dispatcher {
    /// Creates a dispatcher whose jobs talk to real serial ports.
    ///
    /// At most `capacity` updates are buffered; further ones are dropped until the receiver
    /// catches up.
    pub fn new(capacity: usize, model: Model) -> (Self, Receiver<Update>) {
        Self::with_runner(capacity, model, run_job)
    }

    /// Creates a dispatcher that executes jobs with `runner`.
    pub fn with_runner<F>(capacity: usize, model: Model, runner: F) -> (Self, Receiver<Update>)
    where
        F: Fn(&str, &Job) -> session::Result<String> + Send + Sync + 'static,
    {
        let (updates, receiver) = mpsc::sync_channel(capacity);
        let dispatcher = Self {
            updates,
            ports: Arc::default(),
            runner: Arc::new(runner),
            model,
        };
        (dispatcher, receiver)
    }

    fn port_lock(&self, port: &str) -> Arc<Mutex<()>> {
        let mut ports = self.ports.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(ports.entry(port.to_string()).or_default())
    }

    /// Runs `job` against `port` on a new thread.
    ///
    /// The worker first waits for any earlier job on the same port to finish, then sends an
    /// [Update::Progress] followed by either [Update::Finished] or [Update::Failed].
    pub fn submit(&self, port: &str, job: Job) -> JoinHandle<()> {
        let port = port.to_string();
        let lock = self.port_lock(&port);
        let updates = self.updates.clone();
        let runner = Arc::clone(&self.runner);
        let ports = Arc::clone(&self.ports);
        let progress = job.progress(self.model);

        thread::spawn(move || {
            {
                let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
                info!("Running {job:?} on {port}");
                deliver(&updates, Update::Progress(progress));
                let update = match runner(&port, &job) {
                    Ok(text) => Update::Finished(text),
                    Err(err) => Update::Failed(format!("Error: {err}")),
                };
                deliver(&updates, update);
            }
            release_port_lock(&ports, &port, lock);
        })
    }
}

/// Forgets the lock of `port` once no queued or running job holds it any more.
fn release_port_lock(ports: &PortLocks, port: &str, lock: Arc<Mutex<()>>) {
    let mut ports = ports.lock().unwrap_or_else(PoisonError::into_inner);
    // Clones are only taken and dropped under the map lock, so the count is exact here
    drop(lock);
    if ports.get(port).is_some_and(|held| Arc::strong_count(held) == 1) {
        debug!("No more jobs for {port}, dropping its lock");
        ports.remove(port);
    }
}

fn deliver(updates: &SyncSender<Update>, update: Update) {
    match updates.try_send(update) {
        Ok(()) => {}
        Err(TrySendError::Full(update)) => {
            debug!("Update channel full, dropping {:?}", update.text());
        }
        Err(TrySendError::Disconnected(_)) => debug!("Nobody is listening for updates"),
    }
}

fn with_completeness(text: String, complete: bool) -> String {
    if complete {
        text
    } else {
        format!("{text}\n(incomplete response: end marker never received)")
    }
}

/// Executes `job` against the serial port `port`.
pub fn run_job(port: &str, job: &Job) -> session::Result<String> {
    match job {
        Job::Landmarks => Ok(format!("Landmarks: {}", session::fetch_landmarks(port)?)),
        Job::Read {
            address,
            length,
            mode,
        } => {
            let transcript = session::read_memory(port, *address, *length)?;
            let text = format::format_memory_dump(&transcript.text, *mode);
            Ok(with_completeness(text, transcript.complete))
        }
        Job::Search { region, pattern } => {
            let transcript = match region {
                Region::Sram => session::search_memory(port, pattern)?,
                Region::Flash => session::search_flash(port, pattern)?,
            };
            Ok(with_completeness(transcript.text, transcript.complete))
        }
    }
}

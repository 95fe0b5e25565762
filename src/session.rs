// SPDX-FileCopyrightText: 2024 Gabriel Marcano
//
// SPDX-License-Identifier: BSD-3-Clause

//! Memory explorer protocol access routines.

use std::fmt;
use std::io;
use std::io::{Read, Write};
use std::result;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use thiserror::Error;

use crate::validate::{self, PatternKind, ValidationError, MAX_READ_LENGTH};

/// Baud rate of the firmware's serial console.
pub const BAUD_RATE: u32 = 115_200;

/// Terminator of a LANDMARKS response.
pub const LANDMARKS_END: &str = "END_LANDMARKS";

/// Terminator of READ, SEARCH and SEARCHFLASH responses.
pub const TRANSCRIPT_END: &str = "===END===";

/// Marker introducing the landmark list in a LANDMARKS response.
const LANDMARKS_MARKER: &str = "LANDMARKS:";

const DRAIN_BUFFER_SIZE: usize = 4096;
const RECEIVE_BUFFER_SIZE: usize = 1024;

/// Timeout of every individual read in the receive loop.
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

pub type Result<T> = result::Result<T, Error>;

/// Errors that can be emitted while talking to the memory explorer firmware.
#[derive(Debug, Error)]
pub enum Error {
    /// The port is missing, busy, or otherwise could not be opened.
    #[error("failed to open port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },
    /// The command line could not be written after the port was opened.
    #[error("failed to send command: {0}")]
    Write(#[source] io::Error),
    /// Not a single byte arrived before the deadline.
    #[error("timeout: no response from device after {0:?}")]
    Timeout(Duration),
    /// The request was rejected before any port was opened.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Requests understood by the memory explorer firmware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Requests the addresses of a few well known symbols.
    ///
    /// The firmware answers with a `LANDMARKS:` line, one `name=0xADDRESS` line per symbol, and
    /// `END_LANDMARKS`.
    Landmarks,
    /// Requests a hex dump of `length` bytes starting at `address`.
    ///
    /// The firmware answers with a `=== HEX DUMP ===` header, the dump itself, and `===END===`.
    Read { address: u32, length: u16 },
    /// Requests a search of SRAM for the bytes given as upper-case hex digits.
    SearchRam { pattern: String },
    /// Requests a search of flash for the bytes given as upper-case hex digits. Flash is much
    /// larger than SRAM, so this takes far longer.
    SearchFlash { pattern: String },
}

impl Command {
    /// The newline terminated command line sent to the firmware.
    pub fn line(&self) -> String {
        match self {
            Self::Landmarks => "LANDMARKS\n".to_string(),
            Self::Read { address, length } => format!("READ:{address:#010x}:{length}\n"),
            Self::SearchRam { pattern } => format!("SEARCH:{pattern}\n"),
            Self::SearchFlash { pattern } => format!("SEARCHFLASH:{pattern}\n"),
        }
    }

    /// The token whose arrival completes the response.
    pub fn terminator(&self) -> &'static str {
        match self {
            Self::Landmarks => LANDMARKS_END,
            _ => TRANSCRIPT_END,
        }
    }

    /// The timing the firmware needs for this command.
    pub fn timing(&self) -> Timing {
        match self {
            Self::Landmarks => Timing {
                settle: Duration::from_millis(200),
                drain_timeout: Duration::from_millis(100),
                poll_timeout: POLL_TIMEOUT,
                deadline: Duration::from_secs(2),
            },
            Self::Read { .. } => Timing::with_deadline(Duration::from_secs(5)),
            Self::SearchRam { .. } => Timing::with_deadline(Duration::from_secs(30)),
            Self::SearchFlash { .. } => Timing::with_deadline(Duration::from_secs(120)),
        }
    }
}

/// Delays and timeouts of one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Pause before draining, giving stale bytes time to arrive.
    pub settle: Duration,
    /// Read timeout of the single draining read.
    pub drain_timeout: Duration,
    /// Read timeout of each read in the receive loop.
    pub poll_timeout: Duration,
    /// Overall time allowed for the response, measured from the end of the send stage.
    pub deadline: Duration,
}

impl Timing {
    fn with_deadline(deadline: Duration) -> Self {
        Self {
            settle: Duration::from_millis(100),
            drain_timeout: Duration::from_millis(50),
            poll_timeout: POLL_TIMEOUT,
            deadline,
        }
    }
}

/// Text received during one exchange.
///
/// If the deadline passes after some bytes arrived but before the terminator did, the exchange
/// still succeeds and the transcript is marked incomplete. Its contents may be cut short anywhere,
/// so consumers must check [Transcript::complete] before trusting it to be whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// Everything received after the command was sent, including the terminator.
    pub text: String,
    /// Whether the terminator was seen.
    pub complete: bool,
}

/// A byte stream with an adjustable read timeout.
///
/// A read that times out must fail with [io::ErrorKind::TimedOut] (or
/// [io::ErrorKind::WouldBlock]); the exchange treats that as "nothing yet".
pub trait Link: Read + Write {
    /// Sets the timeout of subsequent reads.
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()>;
}

impl Link for Box<dyn SerialPort> {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        (**self).set_timeout(timeout).map_err(io::Error::from)
    }
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// A trait for running one request/response exchange with the memory explorer firmware.
///
/// The protocol has no framing of its own: commands are single lines of ASCII, and responses are
/// free form text closed by a terminator token. An exchange therefore goes through three stages:
///  - drain: wait a little, then read and discard whatever the device already sent (boot banners,
///    the tail of an earlier response)
///  - send: write the command line
///  - receive: poll with short read timeouts, accumulating bytes until the terminator shows up or
///    the overall deadline passes
pub trait Session: Link {
    /// Discards stale input.
    fn drain(&mut self, timing: &Timing) {
        thread::sleep(timing.settle);
        if let Err(err) = self.set_read_timeout(timing.drain_timeout) {
            warn!("Unable to set drain timeout: {err}");
        }

        let mut stale = [0u8; DRAIN_BUFFER_SIZE];
        match self.read(&mut stale) {
            Ok(count) => debug!("Discarded {count} stale bytes"),
            Err(err) if is_timeout(&err) => debug!("Nothing to drain"),
            Err(err) => warn!("Error while draining: {err}"),
        }
    }

    /// Writes the command line.
    ///
    /// # Errors
    ///
    /// [Error::Write] if the line could not be written.
    fn send_command(&mut self, command: &Command) -> Result<()> {
        let line = command.line();
        debug!("Sending {:?}", line.trim_end());
        self.write_all(line.as_bytes()).map_err(Error::Write)?;
        self.flush().map_err(Error::Write)?;
        Ok(())
    }

    /// Accumulates the response until its terminator arrives or `timing.deadline` passes.
    ///
    /// # Errors
    ///
    /// [Error::Timeout] if nothing at all arrived before the deadline.
    fn receive(&mut self, command: &Command, timing: &Timing) -> Result<Transcript> {
        let terminator = command.terminator().as_bytes();
        let mut received = Vec::new();
        let mut chunk = [0u8; RECEIVE_BUFFER_SIZE];

        let start = Instant::now();
        while start.elapsed() < timing.deadline {
            if let Err(err) = self.set_read_timeout(timing.poll_timeout) {
                warn!("Unable to set read timeout: {err}");
            }

            let count = match self.read(&mut chunk) {
                Ok(count) => count,
                Err(err) if is_timeout(&err) => 0,
                Err(err) => {
                    // Keep polling, the device may still come through before the deadline
                    warn!("Ignoring read error: {err}");
                    thread::sleep(timing.poll_timeout);
                    0
                }
            };
            if count == 0 {
                continue;
            }

            // The terminator may straddle two reads
            let search_from = received.len().saturating_sub(terminator.len() - 1);
            received.extend_from_slice(&chunk[..count]);
            debug!("Received {count} bytes, {} total", received.len());

            if contains(&received[search_from..], terminator) {
                return Ok(Transcript {
                    text: String::from_utf8_lossy(&received).into_owned(),
                    complete: true,
                });
            }
        }

        if received.is_empty() {
            return Err(Error::Timeout(timing.deadline));
        }

        warn!(
            "{} never arrived, returning {} bytes as a partial response",
            command.terminator(),
            received.len()
        );
        Ok(Transcript {
            text: String::from_utf8_lossy(&received).into_owned(),
            complete: false,
        })
    }

    /// Runs a complete exchange: drain, send, receive.
    fn exchange_with(&mut self, command: &Command, timing: &Timing) -> Result<Transcript> {
        self.drain(timing);
        self.send_command(command)?;
        self.receive(command, timing)
    }
}

impl<T: Link + ?Sized> Session for T {}

/// Opens `port` at [BAUD_RATE], 8N1, without flow control.
///
/// # Errors
///
/// [Error::Validation] if `port` is blank, [Error::Open] if the port cannot be opened.
pub fn open(port: &str) -> Result<Box<dyn SerialPort>> {
    let port = validate::require_port(port)?;
    let serial = serialport::new(port, BAUD_RATE)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(POLL_TIMEOUT)
        .open()
        .map_err(|source| Error::Open {
            port: port.to_string(),
            source,
        })?;
    info!("Opened {port} at {BAUD_RATE} baud");
    Ok(serial)
}

/// Runs one exchange over `link` and closes it, whatever the outcome.
pub fn exchange_on<L: Link>(mut link: L, command: &Command, timing: &Timing) -> Result<Transcript> {
    let result = link.exchange_with(command, timing);
    drop(link);
    debug!("Closed link");
    result
}

/// Opens `port`, runs one exchange for `command`, and closes the port again.
pub fn run(port: &str, command: &Command) -> Result<Transcript> {
    let serial = open(port)?;
    info!("Sending {} command", command.line().trim_end());
    let transcript = exchange_on(serial, command, &command.timing())?;
    info!(
        "Received {} bytes{}",
        transcript.text.len(),
        if transcript.complete { "" } else { " (incomplete)" }
    );
    Ok(transcript)
}

/// Asks the firmware for its landmark addresses.
pub fn fetch_landmarks(port: &str) -> Result<Landmarks> {
    let transcript = run(port, &Command::Landmarks)?;
    Ok(parse_landmarks(&transcript.text))
}

/// Reads `length` bytes of memory starting at `address`, returning the firmware's hex dump.
///
/// # Errors
///
/// [Error::Validation] if `length` is not in `1..=4096`. Otherwise see [run].
pub fn read_memory(port: &str, address: u32, length: u16) -> Result<Transcript> {
    if !(1..=MAX_READ_LENGTH).contains(&length) {
        return Err(ValidationError::Length.into());
    }
    run(port, &Command::Read { address, length })
}

/// Searches SRAM for the bytes spelled out by `pattern_hex`.
pub fn search_memory(port: &str, pattern_hex: &str) -> Result<Transcript> {
    let pattern = PatternKind::Hex.to_hex(pattern_hex)?;
    run(port, &Command::SearchRam { pattern })
}

/// Searches flash for the bytes spelled out by `pattern_hex`.
pub fn search_flash(port: &str, pattern_hex: &str) -> Result<Transcript> {
    let pattern = PatternKind::Hex.to_hex(pattern_hex)?;
    run(port, &Command::SearchFlash { pattern })
}

/// A named address reported by the firmware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Landmark {
    pub name: String,
    /// The address exactly as the firmware printed it, `0x` prefix included.
    pub value: String,
}

/// Landmarks extracted from a LANDMARKS transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Landmarks {
    /// The transcript has no `LANDMARKS:` marker.
    Missing,
    /// The marker is there, but no `name=0xADDRESS` token is.
    Unparseable,
    /// Landmarks in order of appearance.
    Found(Vec<Landmark>),
}

impl fmt::Display for Landmarks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("No landmarks found in response"),
            Self::Unparseable => f.write_str("Found LANDMARKS but couldn't parse"),
            Self::Found(landmarks) => {
                for (index, landmark) in landmarks.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{} @ {}", landmark.name, landmark.value)?;
                }
                Ok(())
            }
        }
    }
}

fn is_word(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Extracts every `name=0xHEX` token from a LANDMARKS transcript.
///
/// `name` is the longest run of ASCII word characters before the `=`, and the value is `0x`
/// followed by as many hex digits as there are. Tokens never overlap.
pub fn parse_landmarks(text: &str) -> Landmarks {
    if !text.contains(LANDMARKS_MARKER) {
        return Landmarks::Missing;
    }

    let bytes = text.as_bytes();
    let mut landmarks = Vec::new();
    // End of the previous token; the next one cannot start before it
    let mut floor = 0;

    for (equals, _) in text.match_indices('=') {
        if equals < floor {
            continue;
        }
        let name_start = bytes[floor..equals]
            .iter()
            .rposition(|&byte| !is_word(byte))
            .map_or(floor, |position| floor + position + 1);
        if name_start == equals {
            continue;
        }

        let value = &bytes[equals + 1..];
        if !value.starts_with(b"0x") {
            continue;
        }
        let digits = value[2..]
            .iter()
            .take_while(|byte| byte.is_ascii_hexdigit())
            .count();
        if digits == 0 {
            continue;
        }

        let end = equals + 3 + digits;
        landmarks.push(Landmark {
            name: text[name_start..equals].to_string(),
            value: text[equals + 1..end].to_string(),
        });
        floor = end;
    }

    if landmarks.is_empty() {
        Landmarks::Unparseable
    } else {
        Landmarks::Found(landmarks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// What a [ScriptedLink] saw, kept alive after the link itself is dropped.
    #[derive(Default)]
    struct Record {
        written: Vec<u8>,
        timeouts: Vec<Duration>,
        closed: bool,
    }

    /// A device that has `stale` bytes pending before the command, and answers the command with
    /// one chunk per read from `replies`. Empty chunks and an empty queue behave like a read that
    /// times out.
    struct ScriptedLink {
        stale: Vec<u8>,
        replies: VecDeque<io::Result<Vec<u8>>>,
        timeout: Duration,
        fail_writes: bool,
        record: Rc<RefCell<Record>>,
    }

    impl ScriptedLink {
        fn new(stale: &[u8], replies: &[&[u8]]) -> (Self, Rc<RefCell<Record>>) {
            let record = Rc::new(RefCell::new(Record::default()));
            let link = Self {
                stale: stale.to_vec(),
                replies: replies.iter().map(|reply| Ok(reply.to_vec())).collect(),
                timeout: Duration::ZERO,
                fail_writes: false,
                record: Rc::clone(&record),
            };
            (link, record)
        }

        fn timed_out(&self) -> io::Error {
            thread::sleep(self.timeout);
            io::Error::new(io::ErrorKind::TimedOut, "timed out")
        }
    }

    impl Read for ScriptedLink {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let chunk = if self.record.borrow().written.is_empty() {
                std::mem::take(&mut self.stale)
            } else {
                match self.replies.pop_front() {
                    Some(reply) => reply?,
                    None => Vec::new(),
                }
            };
            if chunk.is_empty() {
                return Err(self.timed_out());
            }
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }
    }

    impl Write for ScriptedLink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail_writes {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"));
            }
            self.record.borrow_mut().written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Link for ScriptedLink {
        fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
            self.timeout = timeout;
            self.record.borrow_mut().timeouts.push(timeout);
            Ok(())
        }
    }

    impl Drop for ScriptedLink {
        fn drop(&mut self) {
            self.record.borrow_mut().closed = true;
        }
    }

    fn quick() -> Timing {
        Timing {
            settle: Duration::ZERO,
            drain_timeout: Duration::from_millis(1),
            poll_timeout: Duration::from_millis(2),
            deadline: Duration::from_millis(60),
        }
    }

    #[test]
    fn command_lines() {
        assert_eq!(Command::Landmarks.line(), "LANDMARKS\n");
        assert_eq!(
            Command::Read {
                address: 0x2000_0000,
                length: 256
            }
            .line(),
            "READ:0x20000000:256\n"
        );
        assert_eq!(
            Command::Read {
                address: 0x10,
                length: 1
            }
            .line(),
            "READ:0x00000010:1\n"
        );
        let pattern = "DEADBEEF".to_string();
        assert_eq!(
            Command::SearchRam {
                pattern: pattern.clone()
            }
            .line(),
            "SEARCH:DEADBEEF\n"
        );
        assert_eq!(
            Command::SearchFlash { pattern }.line(),
            "SEARCHFLASH:DEADBEEF\n"
        );
    }

    #[test]
    fn terminators_and_deadlines() {
        let read = Command::Read {
            address: 0,
            length: 4,
        };
        let ram = Command::SearchRam {
            pattern: "00".to_string(),
        };
        let flash = Command::SearchFlash {
            pattern: "00".to_string(),
        };
        assert_eq!(Command::Landmarks.terminator(), "END_LANDMARKS");
        assert_eq!(read.terminator(), "===END===");
        assert_eq!(Command::Landmarks.timing().deadline, Duration::from_secs(2));
        assert_eq!(Command::Landmarks.timing().settle, Duration::from_millis(200));
        assert_eq!(read.timing().deadline, Duration::from_secs(5));
        assert_eq!(read.timing().drain_timeout, Duration::from_millis(50));
        assert_eq!(ram.timing().deadline, Duration::from_secs(30));
        assert_eq!(flash.timing().deadline, Duration::from_secs(120));
    }

    #[test]
    fn exchange_drains_sends_and_stops_at_terminator() {
        let (link, record) = ScriptedLink::new(
            b"boot banner FOO=0xdead\n",
            &[
                b"LAND",
                b"",
                b"MARKS:\nFOO=0x1000 BAR=0x2000\nEND_LAND",
                b"MARKS\n",
                b"never read",
            ],
        );

        let transcript = exchange_on(link, &Command::Landmarks, &quick()).unwrap();
        assert!(transcript.complete);
        assert_eq!(
            transcript.text,
            "LANDMARKS:\nFOO=0x1000 BAR=0x2000\nEND_LANDMARKS\n"
        );
        assert_eq!(
            parse_landmarks(&transcript.text).to_string(),
            "FOO @ 0x1000 | BAR @ 0x2000"
        );

        let record = record.borrow();
        assert_eq!(record.written, b"LANDMARKS\n");
        assert_eq!(record.timeouts[0], quick().drain_timeout);
        assert!(record.timeouts[1..].iter().all(|t| *t == quick().poll_timeout));
        assert!(record.closed);
    }

    #[test]
    fn silence_is_a_timeout() {
        let (link, record) = ScriptedLink::new(b"", &[]);
        let result = exchange_on(link, &Command::Landmarks, &quick());
        assert!(matches!(result, Err(Error::Timeout(deadline)) if deadline == quick().deadline));
        assert!(record.borrow().closed);
    }

    #[test]
    fn missing_terminator_returns_partial_transcript() {
        let (link, record) = ScriptedLink::new(b"", &[b"=== HEX DUMP ===\n", b"20000000: 01"]);
        let command = Command::Read {
            address: 0x2000_0000,
            length: 16,
        };
        let transcript = exchange_on(link, &command, &quick()).unwrap();
        assert!(!transcript.complete);
        assert_eq!(transcript.text, "=== HEX DUMP ===\n20000000: 01");
        assert!(record.borrow().closed);
    }

    #[test]
    fn write_failure_closes_link() {
        let (mut link, record) = ScriptedLink::new(b"", &[b"===END===\n"]);
        link.fail_writes = true;
        let result = exchange_on(link, &Command::Landmarks, &quick());
        assert!(matches!(result, Err(Error::Write(_))));
        assert!(result.unwrap_err().to_string().starts_with("failed to send command"));
        assert!(record.borrow().closed);
    }

    #[test]
    fn read_errors_are_ignored_until_deadline() {
        let (mut link, _record) = ScriptedLink::new(b"", &[]);
        link.replies = VecDeque::from([
            Err(io::Error::new(io::ErrorKind::Other, "glitch")),
            Ok(b"===END===\n".to_vec()),
        ]);
        let command = Command::SearchRam {
            pattern: "2A000000".to_string(),
        };
        let transcript = exchange_on(link, &command, &quick()).unwrap();
        assert!(transcript.complete);
    }

    #[test]
    fn multibyte_text_split_across_reads() {
        let (link, _record) = ScriptedLink::new(b"", &[b"caf\xc3", b"\xa9\n===END===\n"]);
        let command = Command::SearchFlash {
            pattern: "636166".to_string(),
        };
        let transcript = exchange_on(link, &command, &quick()).unwrap();
        assert_eq!(transcript.text, "caf\u{e9}\n===END===\n");
    }

    #[test]
    fn validation_happens_before_open() {
        assert!(matches!(
            read_memory("", 0x2000_0000, 16),
            Err(Error::Validation(ValidationError::MissingPort))
        ));
        assert!(matches!(
            read_memory("/dev/does-not-exist", 0x2000_0000, 0),
            Err(Error::Validation(ValidationError::Length))
        ));
        assert!(matches!(
            search_memory("/dev/does-not-exist", "XYZ"),
            Err(Error::Validation(ValidationError::OddHexPattern))
        ));
        assert!(matches!(
            search_flash("/dev/does-not-exist", "ZZ"),
            Err(Error::Validation(ValidationError::HexPattern))
        ));
    }

    #[test]
    fn open_failure_names_the_port() {
        let err = fetch_landmarks("/dev/does-not-exist").unwrap_err();
        assert!(matches!(err, Error::Open { .. }));
        assert!(err.to_string().contains("/dev/does-not-exist"));
    }

    #[test]
    fn landmarks_missing_marker() {
        assert_eq!(parse_landmarks("FOO=0x1000\n"), Landmarks::Missing);
        assert_eq!(
            Landmarks::Missing.to_string(),
            "No landmarks found in response"
        );
    }

    #[test]
    fn landmarks_marker_without_tokens() {
        let landmarks = parse_landmarks("LANDMARKS:\nnothing here\nEND_LANDMARKS\n");
        assert_eq!(landmarks, Landmarks::Unparseable);
        assert_eq!(landmarks.to_string(), "Found LANDMARKS but couldn't parse");
    }

    #[test]
    fn landmarks_from_firmware() {
        let text = "LANDMARKS:\nglobal_var=0x20000abc\nglobal_uninitialized=0x20000f00\n\
                    main=0x100002e5\nEND_LANDMARKS\n\n";
        let Landmarks::Found(found) = parse_landmarks(text) else {
            panic!("no landmarks found");
        };
        let names: Vec<_> = found.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["global_var", "global_uninitialized", "main"]);
        assert_eq!(found[2].value, "0x100002e5");
    }

    #[test]
    fn landmark_tokens_do_not_overlap() {
        let text = "LANDMARKS:\na=b=0x10 c=0x2=0x3 d=0X4 é_x=0xF \n";
        assert_eq!(
            parse_landmarks(text).to_string(),
            "b @ 0x10 | c @ 0x2 | _x @ 0xF"
        );
    }
}

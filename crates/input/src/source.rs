//! Direction sources.
//!
//! A [`DirectionSource`] is an optional input capability that produces
//! transcribed text while listening. The game loop polls it each tick and
//! decides what the text means; the source only guarantees that one utterance
//! yields at most one accepted result.
//!
//! Backends:
//! - [`TranscriptSource`]: text events from a channel, usually fed by a reader
//!   thread over a FIFO written by an external speech recognizer
//! - [`SilentSource`]: placeholder when no recognizer is configured
//!
//! Transcript line format (one event per line):
//!
//! | Line               | Event                  |
//! |--------------------|------------------------|
//! | `partial: <text>`  | unstable partial result |
//! | `final: <text>`    | final result           |
//! | `<text>`           | final result           |

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use crate::voice::UtteranceGate;

/// Environment variable naming the transcript FIFO
pub const VOICE_FIFO_ENV: &str = "TUI_2048_VOICE_FIFO";

/// Optional text input capability polled by the game loop.
pub trait DirectionSource: Send {
    fn name(&self) -> &'static str;

    fn start(&mut self);

    fn stop(&mut self);

    fn is_listening(&self) -> bool;

    /// Drain pending results, offering each to `on_text` (which returns true
    /// if it used the text). Returns how many results were accepted.
    fn poll(&mut self, on_text: &mut dyn FnMut(&str) -> bool) -> usize;
}

/// One recognizer result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEvent {
    pub text: String,
    pub is_final: bool,
}

impl TranscriptEvent {
    pub fn partial(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn final_result(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }

    /// Parse one transcript line. Blank lines carry no event.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if let Some(rest) = line.strip_prefix("partial:") {
            return Some(Self::partial(rest.trim()));
        }
        if let Some(rest) = line.strip_prefix("final:") {
            return Some(Self::final_result(rest.trim()));
        }
        Some(Self::final_result(line))
    }
}

/// Transcript events from a channel
pub struct TranscriptSource {
    rx: Receiver<TranscriptEvent>,
    gate: UtteranceGate,
    listening: bool,
    disconnected: bool,
}

impl TranscriptSource {
    pub fn new(rx: Receiver<TranscriptEvent>) -> Self {
        Self {
            rx,
            gate: UtteranceGate::new(),
            listening: false,
            disconnected: false,
        }
    }

    /// Source plus the sender that feeds it
    pub fn channel() -> (Sender<TranscriptEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self::new(rx))
    }

    /// Spawn a reader thread over `path`.
    ///
    /// A FIFO is reopened after each writer disconnects; a regular file is read
    /// once.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (tx, source) = Self::channel();
        let spawned = thread::Builder::new()
            .name("voice-transcript".to_string())
            .spawn(move || read_transcripts(&path, &tx));
        if let Err(e) = spawned {
            log::warn!("could not start transcript reader: {e}");
        }
        source
    }

    /// Whether the feeding side has gone away
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

impl DirectionSource for TranscriptSource {
    fn name(&self) -> &'static str {
        "transcript"
    }

    fn start(&mut self) {
        self.listening = true;
        self.gate.reset();
    }

    fn stop(&mut self) {
        self.listening = false;
    }

    fn is_listening(&self) -> bool {
        self.listening
    }

    fn poll(&mut self, on_text: &mut dyn FnMut(&str) -> bool) -> usize {
        let mut accepted = 0;
        loop {
            let event = match self.rx.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.disconnected {
                        log::info!("transcript source disconnected");
                        self.disconnected = true;
                    }
                    break;
                }
            };
            // Results that arrive while stopped are dropped.
            if !self.listening {
                continue;
            }
            if self.gate.offer(&event.text, event.is_final, on_text) {
                accepted += 1;
            }
        }
        accepted
    }
}

/// Source that never hears anything
#[derive(Debug, Default)]
pub struct SilentSource {
    listening: bool,
}

impl SilentSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DirectionSource for SilentSource {
    fn name(&self) -> &'static str {
        "silent"
    }

    fn start(&mut self) {
        self.listening = true;
    }

    fn stop(&mut self) {
        self.listening = false;
    }

    fn is_listening(&self) -> bool {
        self.listening
    }

    fn poll(&mut self, _on_text: &mut dyn FnMut(&str) -> bool) -> usize {
        0
    }
}

/// Which direction source to use
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceBackend {
    Transcript(PathBuf),
    Silent,
}

impl VoiceBackend {
    /// Pick a backend from `TUI_2048_VOICE_FIFO`.
    pub fn detect() -> Self {
        match std::env::var(VOICE_FIFO_ENV) {
            Ok(path) if !path.trim().is_empty() => VoiceBackend::Transcript(PathBuf::from(path)),
            _ => VoiceBackend::Silent,
        }
    }
}

pub fn open_direction_source(backend: &VoiceBackend) -> Box<dyn DirectionSource> {
    match backend {
        VoiceBackend::Transcript(path) => {
            log::info!("voice transcripts from {}", path.display());
            Box::new(TranscriptSource::from_path(path.clone()))
        }
        VoiceBackend::Silent => Box::new(SilentSource::new()),
    }
}

fn read_transcripts(path: &Path, tx: &Sender<TranscriptEvent>) {
    let reopen = is_fifo(path);
    loop {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                log::warn!("could not open transcript {}: {e}", path.display());
                return;
            }
        };
        for line in BufReader::new(file).lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::warn!("transcript read failed: {e}");
                    return;
                }
            };
            if let Some(event) = TranscriptEvent::parse_line(&line) {
                if tx.send(event).is_err() {
                    return;
                }
            }
        }
        if !reopen {
            return;
        }
    }
}

#[cfg(unix)]
fn is_fifo(path: &Path) -> bool {
    use std::os::unix::fs::FileTypeExt;
    std::fs::metadata(path)
        .map(|m| m.file_type().is_fifo())
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_fifo(_path: &Path) -> bool {
    false
}

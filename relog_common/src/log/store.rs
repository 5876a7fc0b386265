//! Persistence boundary: append-only sequences of per-cycle snapshots.
//!
//! A capture session appends one [`CycleSnapshot`] per control cycle
//! through a [`LogSink`]; a replay session reads the same sequence back
//! through a [`ReplaySource`]. Two implementations are provided: an
//! in-process [`MemoryLog`] (tests, tooling) and a JSON Lines file pair
//! ([`JsonlSink`] / [`JsonlSource`]) writing one serde_json object per
//! line, preserving key, type, and array-length fidelity.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use super::logger::LogError;
use super::table::LogTable;

// ─── CycleSnapshot ──────────────────────────────────────────────────

/// All input tables recorded for one control cycle, keyed by adapter
/// log name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleSnapshot {
    /// Monotonic cycle sequence number within the session.
    pub cycle: u64,
    /// Per-adapter tables, keyed by registered log name.
    pub tables: BTreeMap<String, LogTable>,
}

impl CycleSnapshot {
    /// Create an empty snapshot for the given cycle number.
    pub fn new(cycle: u64) -> Self {
        Self {
            cycle,
            tables: BTreeMap::new(),
        }
    }

    /// Table recorded under `name`, if any.
    pub fn table(&self, name: &str) -> Option<&LogTable> {
        self.tables.get(name)
    }
}

// ─── Sink / Source traits ───────────────────────────────────────────

/// Capture-side half of the persistence boundary.
pub trait LogSink: Send {
    /// Append one cycle snapshot to the sequence.
    fn append(&mut self, snapshot: &CycleSnapshot) -> Result<(), LogError>;

    /// Flush any buffered snapshots to durable storage.
    fn flush(&mut self) -> Result<(), LogError> {
        Ok(())
    }
}

/// Replay-side half of the persistence boundary.
pub trait ReplaySource: Send {
    /// Next snapshot in sequence, or `None` when the log is exhausted.
    fn next_cycle(&mut self) -> Result<Option<CycleSnapshot>, LogError>;
}

// ─── In-memory implementation ───────────────────────────────────────

/// In-process snapshot store. Cloning yields another handle to the same
/// underlying sequence, so a test can hand one handle to an
/// [`InputLogger`](super::logger::InputLogger) as its sink and keep
/// another to inspect or replay what was captured.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    cycles: Arc<Mutex<Vec<CycleSnapshot>>>,
}

impl MemoryLog {
    /// Create an empty in-memory log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log pre-populated with the given snapshots.
    pub fn from_cycles(cycles: Vec<CycleSnapshot>) -> Self {
        Self {
            cycles: Arc::new(Mutex::new(cycles)),
        }
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.cycles.lock().expect("memory log lock poisoned").len()
    }

    /// True if no snapshots are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the stored sequence.
    pub fn cycles(&self) -> Vec<CycleSnapshot> {
        self.cycles
            .lock()
            .expect("memory log lock poisoned")
            .clone()
    }

    /// Replay source over a copy of the current sequence.
    pub fn to_source(&self) -> MemoryReplay {
        MemoryReplay {
            cycles: self.cycles().into_iter(),
        }
    }
}

impl LogSink for MemoryLog {
    fn append(&mut self, snapshot: &CycleSnapshot) -> Result<(), LogError> {
        self.cycles
            .lock()
            .expect("memory log lock poisoned")
            .push(snapshot.clone());
        Ok(())
    }
}

/// Replay source over an in-memory snapshot sequence.
#[derive(Debug)]
pub struct MemoryReplay {
    cycles: std::vec::IntoIter<CycleSnapshot>,
}

impl ReplaySource for MemoryReplay {
    fn next_cycle(&mut self) -> Result<Option<CycleSnapshot>, LogError> {
        Ok(self.cycles.next())
    }
}

// ─── JSON Lines implementation ──────────────────────────────────────

/// File-backed sink writing one JSON object per cycle, appended in order.
pub struct JsonlSink {
    writer: BufWriter<File>,
}

impl JsonlSink {
    /// Create (truncating) a log file at `path`.
    pub fn create(path: &Path) -> Result<Self, LogError> {
        let file = File::create(path).map_err(|e| LogError::Io(e.to_string()))?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl LogSink for JsonlSink {
    fn append(&mut self, snapshot: &CycleSnapshot) -> Result<(), LogError> {
        serde_json::to_writer(&mut self.writer, snapshot)
            .map_err(|e| LogError::Encode(e.to_string()))?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| LogError::Io(e.to_string()))
    }

    fn flush(&mut self) -> Result<(), LogError> {
        self.writer.flush().map_err(|e| LogError::Io(e.to_string()))
    }
}

impl Drop for JsonlSink {
    fn drop(&mut self) {
        // Best effort; explicit flush() reports errors.
        let _ = self.writer.flush();
    }
}

/// File-backed replay source reading snapshots sequentially.
#[derive(Debug)]
pub struct JsonlSource {
    lines: Lines<BufReader<File>>,
}

impl JsonlSource {
    /// Open an existing log file at `path`.
    pub fn open(path: &Path) -> Result<Self, LogError> {
        let file = File::open(path).map_err(|e| LogError::Io(e.to_string()))?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
        })
    }
}

impl ReplaySource for JsonlSource {
    fn next_cycle(&mut self) -> Result<Option<CycleSnapshot>, LogError> {
        for line in self.lines.by_ref() {
            let line = line.map_err(|e| LogError::Io(e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            let snapshot =
                serde_json::from_str(&line).map_err(|e| LogError::Decode(e.to_string()))?;
            return Ok(Some(snapshot));
        }
        Ok(None)
    }
}

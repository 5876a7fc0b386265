//! Input logger: per-cycle orchestration of capture and replay.
//!
//! One [`InputLogger`] exists per logging session. Adapters register their
//! log name once at setup (duplicates are a fatal configuration error) and
//! then call [`InputLogger::process_inputs`] exactly once per control
//! cycle. Depending on the injected [`RunMode`] the call either serializes
//! the adapter's inputs into the current snapshot or repopulates them from
//! a previously persisted one.

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{debug, trace};

use super::inputs::LoggableInputs;
use super::mode::RunMode;
use super::store::{CycleSnapshot, LogSink, ReplaySource};
use super::table::LogTable;

// ─── Error Types ────────────────────────────────────────────────────

/// Errors from logging setup, cycle orchestration, and persistence.
///
/// Schema drift inside a table (missing or retyped keys) is deliberately
/// *not* represented here: it degrades to default substitution in
/// [`LogTable`] and never aborts a cycle. Only configuration mistakes and
/// broken persisted sequences surface as errors.
#[derive(Debug, Clone, Error)]
pub enum LogError {
    /// Two adapters registered the same log name.
    #[error("Log name '{name}' is already registered")]
    DuplicateName {
        /// The colliding log name.
        name: String,
    },

    /// `process_inputs` was called with a name never registered.
    #[error("Log name '{name}' was not registered at setup")]
    UnregisteredName {
        /// The unknown log name.
        name: String,
    },

    /// `process_inputs` was called twice for one name within one cycle.
    #[error("Log name '{name}' was already processed this cycle")]
    AlreadyProcessed {
        /// The repeated log name.
        name: String,
    },

    /// `begin_cycle` was called while a cycle was still open.
    #[error("Previous cycle was not closed with end_cycle")]
    CycleInProgress,

    /// A cycle operation was attempted outside begin/end.
    #[error("No cycle is active; call begin_cycle first")]
    NoActiveCycle,

    /// Underlying storage I/O failed.
    #[error("Log I/O error: {0}")]
    Io(String),

    /// A snapshot could not be encoded for persistence.
    #[error("Snapshot encode error: {0}")]
    Encode(String),

    /// A persisted snapshot could not be decoded.
    #[error("Snapshot decode error: {0}")]
    Decode(String),
}

// ─── InputLogger ────────────────────────────────────────────────────

/// Where cycle snapshots go to or come from; fixed by the run mode.
enum Backend {
    Capture(Box<dyn LogSink>),
    Replay(Box<dyn ReplaySource>),
}

/// Mode-aware registry and orchestrator for all loggable input sources.
///
/// The run mode is injected once at construction and never changes; every
/// producer queries it through [`InputLogger::is_replay`] instead of an
/// ambient global.
pub struct InputLogger {
    backend: Backend,
    names: BTreeSet<String>,
    processed: BTreeSet<String>,
    current: Option<CycleSnapshot>,
    cycles_completed: u64,
}

impl InputLogger {
    /// Create a capture-mode logger appending snapshots to `sink`.
    pub fn capture(sink: Box<dyn LogSink>) -> Self {
        Self {
            backend: Backend::Capture(sink),
            names: BTreeSet::new(),
            processed: BTreeSet::new(),
            current: None,
            cycles_completed: 0,
        }
    }

    /// Create a replay-mode logger reading snapshots from `source`.
    pub fn replay(source: Box<dyn ReplaySource>) -> Self {
        Self {
            backend: Backend::Replay(source),
            names: BTreeSet::new(),
            processed: BTreeSet::new(),
            current: None,
            cycles_completed: 0,
        }
    }

    /// The injected run mode.
    pub fn mode(&self) -> RunMode {
        match self.backend {
            Backend::Capture(_) => RunMode::Capture,
            Backend::Replay(_) => RunMode::Replay,
        }
    }

    /// True when inputs come from a persisted log instead of hardware.
    pub fn is_replay(&self) -> bool {
        self.mode().is_replay()
    }

    /// Number of cycles completed so far in this session.
    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    /// Register an adapter's log name at setup.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::DuplicateName`] if the name is already taken.
    /// Namespace collisions are a configuration error and must stop
    /// initialization; they are never silently merged.
    pub fn register(&mut self, name: &str) -> Result<(), LogError> {
        if !self.names.insert(name.to_string()) {
            return Err(LogError::DuplicateName {
                name: name.to_string(),
            });
        }
        debug!("Registered log name '{name}'");
        Ok(())
    }

    /// Start a new control cycle.
    ///
    /// In capture mode a fresh snapshot is created and `Ok(true)` is
    /// returned. In replay mode the next persisted snapshot is loaded;
    /// `Ok(false)` signals that the log is exhausted and the session is
    /// over.
    pub fn begin_cycle(&mut self) -> Result<bool, LogError> {
        if self.current.is_some() {
            return Err(LogError::CycleInProgress);
        }
        self.processed.clear();

        match &mut self.backend {
            Backend::Capture(_) => {
                self.current = Some(CycleSnapshot::new(self.cycles_completed));
                Ok(true)
            }
            Backend::Replay(source) => {
                match source.next_cycle()? {
                    Some(snapshot) => {
                        trace!("Loaded replay snapshot for cycle {}", snapshot.cycle);
                        self.current = Some(snapshot);
                        Ok(true)
                    }
                    None => {
                        debug!(
                            "Replay log exhausted after {} cycles",
                            self.cycles_completed
                        );
                        Ok(false)
                    }
                }
            }
        }
    }

    /// Process one adapter's inputs for the current cycle.
    ///
    /// Capture: serializes `inputs` into the snapshot under `name`.
    /// Replay: deserializes the stored table back into `inputs`, mutating
    /// it in place; a snapshot with no table under `name` (an older log)
    /// leaves `inputs` untouched.
    pub fn process_inputs(
        &mut self,
        name: &str,
        inputs: &mut dyn LoggableInputs,
    ) -> Result<(), LogError> {
        if !self.names.contains(name) {
            return Err(LogError::UnregisteredName {
                name: name.to_string(),
            });
        }
        let mode = self.mode();
        let snapshot = self.current.as_mut().ok_or(LogError::NoActiveCycle)?;
        if !self.processed.insert(name.to_string()) {
            return Err(LogError::AlreadyProcessed {
                name: name.to_string(),
            });
        }

        match mode {
            RunMode::Capture => {
                let mut table = LogTable::new();
                inputs.to_log(&mut table);
                snapshot.tables.insert(name.to_string(), table);
            }
            RunMode::Replay => match snapshot.tables.get(name) {
                Some(table) => inputs.from_log(table),
                // Older log without this adapter: keep previous values.
                None => trace!("No replay table for '{name}' this cycle"),
            },
        }
        Ok(())
    }

    /// Close the current cycle. In capture mode the snapshot is appended
    /// to the sink.
    pub fn end_cycle(&mut self) -> Result<(), LogError> {
        let snapshot = self.current.take().ok_or(LogError::NoActiveCycle)?;
        if let Backend::Capture(sink) = &mut self.backend {
            sink.append(&snapshot)?;
        }
        self.cycles_completed += 1;
        Ok(())
    }

    /// Flush buffered snapshots to durable storage (capture mode).
    pub fn flush(&mut self) -> Result<(), LogError> {
        match &mut self.backend {
            Backend::Capture(sink) => sink.flush(),
            Backend::Replay(_) => Ok(()),
        }
    }

    /// Table recorded under `name` in the currently open cycle, if any.
    /// Inspection hook for tests and tooling.
    pub fn current_table(&self, name: &str) -> Option<&LogTable> {
        self.current.as_ref().and_then(|s| s.table(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::store::MemoryLog;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct TestInputs {
        enabled: bool,
        position: f64,
    }

    impl LoggableInputs for TestInputs {
        fn to_log(&self, table: &mut LogTable) {
            table.put_bool("Enabled", self.enabled);
            table.put_float("Position", self.position);
        }

        fn from_log(&mut self, table: &LogTable) {
            self.enabled = table.get_bool("Enabled", self.enabled);
            self.position = table.get_float("Position", self.position);
        }
    }

    fn capture_session(cycles: &[TestInputs]) -> MemoryLog {
        let log = MemoryLog::new();
        let mut logger = InputLogger::capture(Box::new(log.clone()));
        logger.register("Axis").unwrap();
        for inputs in cycles {
            assert!(logger.begin_cycle().unwrap());
            let mut current = inputs.clone();
            logger.process_inputs("Axis", &mut current).unwrap();
            logger.end_cycle().unwrap();
        }
        log
    }

    #[test]
    fn duplicate_registration_is_fatal() {
        let mut logger = InputLogger::capture(Box::new(MemoryLog::new()));
        logger.register("Axis").unwrap();
        let err = logger.register("Axis").unwrap_err();
        assert!(matches!(err, LogError::DuplicateName { name } if name == "Axis"));
    }

    #[test]
    fn unregistered_name_is_rejected() {
        let mut logger = InputLogger::capture(Box::new(MemoryLog::new()));
        logger.begin_cycle().unwrap();
        let mut inputs = TestInputs::default();
        let err = logger.process_inputs("Ghost", &mut inputs).unwrap_err();
        assert!(matches!(err, LogError::UnregisteredName { .. }));
    }

    #[test]
    fn double_process_in_one_cycle_is_rejected() {
        let mut logger = InputLogger::capture(Box::new(MemoryLog::new()));
        logger.register("Axis").unwrap();
        logger.begin_cycle().unwrap();
        let mut inputs = TestInputs::default();
        logger.process_inputs("Axis", &mut inputs).unwrap();
        let err = logger.process_inputs("Axis", &mut inputs).unwrap_err();
        assert!(matches!(err, LogError::AlreadyProcessed { .. }));
    }

    #[test]
    fn process_outside_cycle_is_rejected() {
        let mut logger = InputLogger::capture(Box::new(MemoryLog::new()));
        logger.register("Axis").unwrap();
        let mut inputs = TestInputs::default();
        let err = logger.process_inputs("Axis", &mut inputs).unwrap_err();
        assert!(matches!(err, LogError::NoActiveCycle));
    }

    #[test]
    fn begin_without_end_is_rejected() {
        let mut logger = InputLogger::capture(Box::new(MemoryLog::new()));
        logger.begin_cycle().unwrap();
        let err = logger.begin_cycle().unwrap_err();
        assert!(matches!(err, LogError::CycleInProgress));
    }

    #[test]
    fn capture_appends_one_snapshot_per_cycle() {
        let log = capture_session(&[
            TestInputs {
                enabled: true,
                position: 1.0,
            },
            TestInputs {
                enabled: false,
                position: 2.0,
            },
        ]);

        let cycles = log.cycles();
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0].cycle, 0);
        assert_eq!(cycles[1].cycle, 1);
        assert!(cycles[0].table("Axis").unwrap().get_bool("Enabled", false));
        assert_eq!(
            cycles[1].table("Axis").unwrap().get_float("Position", 0.0),
            2.0
        );
    }

    #[test]
    fn replay_repopulates_inputs_in_place() {
        let log = capture_session(&[TestInputs {
            enabled: true,
            position: 42.5,
        }]);

        let mut logger = InputLogger::replay(Box::new(log.to_source()));
        logger.register("Axis").unwrap();
        assert!(logger.is_replay());

        let mut inputs = TestInputs::default();
        assert!(logger.begin_cycle().unwrap());
        logger.process_inputs("Axis", &mut inputs).unwrap();
        logger.end_cycle().unwrap();

        assert_eq!(
            inputs,
            TestInputs {
                enabled: true,
                position: 42.5,
            }
        );

        // Log exhausted: begin_cycle signals end of session.
        assert!(!logger.begin_cycle().unwrap());
    }

    #[test]
    fn replay_missing_namespace_keeps_previous_values() {
        // Captured log only knows "Axis"; a newer build also has "Gripper".
        let log = capture_session(&[TestInputs {
            enabled: true,
            position: 1.0,
        }]);

        let mut logger = InputLogger::replay(Box::new(log.to_source()));
        logger.register("Axis").unwrap();
        logger.register("Gripper").unwrap();

        let mut gripper = TestInputs {
            enabled: true,
            position: 9.0,
        };
        logger.begin_cycle().unwrap();
        logger.process_inputs("Gripper", &mut gripper).unwrap();
        logger.end_cycle().unwrap();

        assert_eq!(gripper.position, 9.0);
        assert!(gripper.enabled);
    }

    #[test]
    fn replay_twice_is_deterministic() {
        let log = capture_session(&[
            TestInputs {
                enabled: true,
                position: 0.25,
            },
            TestInputs {
                enabled: false,
                position: -3.5,
            },
        ]);

        let run = |log: &MemoryLog| -> Vec<TestInputs> {
            let mut logger = InputLogger::replay(Box::new(log.to_source()));
            logger.register("Axis").unwrap();
            let mut inputs = TestInputs::default();
            let mut decoded = Vec::new();
            while logger.begin_cycle().unwrap() {
                logger.process_inputs("Axis", &mut inputs).unwrap();
                logger.end_cycle().unwrap();
                decoded.push(inputs.clone());
            }
            decoded
        };

        let first = run(&log);
        let second = run(&log);
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn current_table_exposes_capture_in_progress() {
        let mut logger = InputLogger::capture(Box::new(MemoryLog::new()));
        logger.register("Axis").unwrap();
        logger.begin_cycle().unwrap();
        assert!(logger.current_table("Axis").is_none());

        let mut inputs = TestInputs {
            enabled: true,
            position: 5.0,
        };
        logger.process_inputs("Axis", &mut inputs).unwrap();
        let table = logger.current_table("Axis").unwrap();
        assert_eq!(table.get_float("Position", 0.0), 5.0);
    }
}

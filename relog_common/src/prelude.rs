//! Prelude module for common re-exports.
//!
//! Consumers can do `use relog_common::prelude::*;` and get the most
//! important types without listing individual paths.

// ─── Logging core ───────────────────────────────────────────────────
pub use crate::log::inputs::LoggableInputs;
pub use crate::log::logger::{InputLogger, LogError};
pub use crate::log::mode::RunMode;
pub use crate::log::store::{
    CycleSnapshot, JsonlSink, JsonlSource, LogSink, MemoryLog, MemoryReplay, ReplaySource,
};
pub use crate::log::table::LogTable;
pub use crate::log::value::LogValue;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{CYCLE_TIME, CYCLE_TIME_US, FAULT_GROUP_LEN, SOLENOID_CHANNELS};

//! System-wide constants for the relog workspace.
//!
//! Single source of truth for all numeric limits and default paths.
//! Imported by all crates — no duplication permitted.

use std::time::Duration;

/// Number of solenoid channels on a pneumatics control module.
pub const SOLENOID_CHANNELS: u8 = 8;

/// Number of fault bits packed into one logged fault group.
///
/// Array index order is the de-facto schema for fault groups and must
/// never be reordered without a log version bump.
pub const FAULT_GROUP_LEN: usize = 4;

/// Default control cycle time in microseconds (50 Hz = 20 000 µs).
pub const CYCLE_TIME_US: u64 = 20_000;

/// Default control cycle time as Duration.
pub const CYCLE_TIME: Duration = Duration::from_micros(CYCLE_TIME_US);

/// Default capture log file name.
pub const DEFAULT_LOG_PATH: &str = "relog.jsonl";

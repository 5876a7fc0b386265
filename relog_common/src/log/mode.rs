//! Capture/replay mode selection.
//!
//! The mode is chosen once, at [`InputLogger`](super::logger::InputLogger)
//! construction, and injected into the logger rather than looked up through
//! ambient global state. There is no setter: components that cache the mode
//! at startup are safe by construction because no mid-run transition exists.

use serde::{Deserialize, Serialize};

/// Process-wide operating mode for one logging session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Live operation: inputs come from hardware and are written to the log.
    #[default]
    Capture,
    /// Offline operation: inputs come from a previously written log.
    Replay,
}

impl RunMode {
    /// True when inputs are sourced from a persisted log.
    pub fn is_replay(self) -> bool {
        self == RunMode::Replay
    }

    /// True when inputs are sourced from hardware.
    pub fn is_capture(self) -> bool {
        self == RunMode::Capture
    }
}

//! Pneumatics driver trait and error types.
//!
//! This module defines:
//! - `PneumaticsDriver` trait - Interface for pluggable PCM drivers
//! - `DriverError` enum - Error types for driver operations
//! - `DriverFactory` type alias - Factory function type
//! - `PcmFaults` bitflags - Hardware fault word with log-group packing

use relog_common::consts::{FAULT_GROUP_LEN, SOLENOID_CHANNELS};
use static_assertions::const_assert;
use thiserror::Error;

/// Error types for driver operations.
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    /// Module is not reachable on the bus.
    #[error("Module {module} is not responding on the bus")]
    Offline {
        /// CAN id of the unreachable module.
        module: u8,
    },

    /// Solenoid channel outside the valid range.
    #[error("Solenoid channel {channel} out of range (0..{max})")]
    InvalidChannel {
        /// Requested channel.
        channel: u8,
        /// Exclusive upper bound.
        max: u8,
    },

    /// Hardware communication error.
    #[error("Hardware communication error: {0}")]
    Communication(String),
}

/// Factory function type for creating driver instances for a module id.
pub type DriverFactory = fn(u8) -> Box<dyn PneumaticsDriver>;

bitflags::bitflags! {
    /// Pneumatics control module fault word.
    ///
    /// The bit order doubles as the index order of the 4-element fault
    /// group written to the log; it must never be reordered without a log
    /// version bump.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PcmFaults: u8 {
        /// Compressor current above the hardware limit.
        const COMPRESSOR_CURRENT_TOO_HIGH = 1 << 0;
        /// Compressor output shorted.
        const COMPRESSOR_SHORTED = 1 << 1;
        /// Compressor not connected.
        const COMPRESSOR_NOT_CONNECTED = 1 << 2;
        /// Solenoid supply voltage fault.
        const SOLENOID_VOLTAGE = 1 << 3;
    }
}

// The log fault group must cover exactly the defined flag bits.
const_assert!(PcmFaults::all().bits().count_ones() as usize == FAULT_GROUP_LEN);
// Solenoid states must fit a u8 bitmask.
const_assert!(SOLENOID_CHANNELS as u32 <= u8::BITS);

impl PcmFaults {
    /// Pack the fault word into the fixed-order log group.
    ///
    /// Index mapping: 0 = current too high, 1 = shorted,
    /// 2 = not connected, 3 = solenoid voltage.
    pub fn to_group(self) -> [bool; FAULT_GROUP_LEN] {
        [
            self.contains(PcmFaults::COMPRESSOR_CURRENT_TOO_HIGH),
            self.contains(PcmFaults::COMPRESSOR_SHORTED),
            self.contains(PcmFaults::COMPRESSOR_NOT_CONNECTED),
            self.contains(PcmFaults::SOLENOID_VOLTAGE),
        ]
    }

    /// Rebuild the fault word from a log group, inverse of
    /// [`PcmFaults::to_group`].
    pub fn from_group(group: [bool; FAULT_GROUP_LEN]) -> Self {
        let mut faults = PcmFaults::empty();
        faults.set(PcmFaults::COMPRESSOR_CURRENT_TOO_HIGH, group[0]);
        faults.set(PcmFaults::COMPRESSOR_SHORTED, group[1]);
        faults.set(PcmFaults::COMPRESSOR_NOT_CONNECTED, group[2]);
        faults.set(PcmFaults::SOLENOID_VOLTAGE, group[3]);
        faults
    }
}

/// Trait defining the interface for pneumatics control module drivers.
///
/// The adapter calls the query methods only while in capture mode; during
/// replay the persisted log stands in for the hardware and no query method
/// is ever invoked. Command methods are forwarded in every mode — actuation
/// is not replayable, only sensed inputs are.
///
/// Every method may fail independently. The adapter treats a failed query
/// as a field-level miss and keeps the previous cycle's value, so a flaky
/// bus degrades one field at a time instead of aborting the cycle.
pub trait PneumaticsDriver: Send {
    /// CAN id of the module this driver is bound to.
    fn module_id(&self) -> u8;

    // ─── Queries (capture mode only) ────────────────────────────────

    /// Commanded state of every solenoid channel.
    fn solenoid_states(&self) -> Result<[bool; SOLENOID_CHANNELS as usize], DriverError>;

    /// True if the compressor output is energized.
    fn compressor_on(&self) -> Result<bool, DriverError>;

    /// True if the pressure switch is closed (system below pressure).
    fn pressure_switch(&self) -> Result<bool, DriverError>;

    /// Compressor current draw in amperes.
    fn compressor_current(&self) -> Result<f64, DriverError>;

    /// True if the compressor runs in closed-loop control.
    fn closed_loop_control(&self) -> Result<bool, DriverError>;

    /// State of the pressure switch valve channel.
    fn pressure_switch_valve(&self) -> Result<bool, DriverError>;

    /// Instantaneous fault word.
    fn faults(&self) -> Result<PcmFaults, DriverError>;

    /// Sticky fault word: bits stay set until explicitly cleared.
    fn sticky_faults(&self) -> Result<PcmFaults, DriverError>;

    // ─── Commands (forwarded in every mode) ─────────────────────────

    /// Energize or release one solenoid channel.
    fn set_solenoid(&mut self, channel: u8, on: bool) -> Result<(), DriverError>;

    /// Enable or disable compressor closed-loop control.
    fn set_closed_loop_control(&mut self, enabled: bool) -> Result<(), DriverError>;

    /// Clear all sticky fault bits.
    fn clear_sticky_faults(&mut self) -> Result<(), DriverError>;
}

//! # relog HAL Library
//!
//! Device adapters and pluggable pneumatics drivers riding on the
//! capture/replay core in `relog_common`.
//!
//! Drivers implement the [`driver::PneumaticsDriver`] trait; the
//! [`pneumatics::PneumaticsModule`] adapter owns one driver plus one
//! [`pneumatics::PneumaticsInputs`] struct per physical module and is the
//! single source of truth for all client-facing accessor calls. In capture
//! mode the adapter pulls fresh values from the driver each cycle; in
//! replay mode the same values come back out of the persisted log, so
//! downstream behavior is identical either way.
//!
//! # Module Structure
//!
//! - [`driver`] - `PneumaticsDriver` trait, fault flags, driver errors
//! - [`device_registry`] - Module-id keyed adapter registry
//! - [`pneumatics`] - Loggable inputs struct and device adapter
//! - [`drivers`] - Driver implementations (simulation)

#![deny(missing_docs)]

pub mod device_registry;
pub mod driver;
pub mod drivers;
pub mod pneumatics;

// Re-export key types for convenience
pub use crate::device_registry::DeviceRegistry;
pub use crate::driver::{DriverError, DriverFactory, PcmFaults, PneumaticsDriver};
pub use crate::pneumatics::{PneumaticsInputs, PneumaticsModule};

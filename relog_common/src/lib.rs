//! relog Common Library
//!
//! Shared core for the relog workspace: the typed per-cycle log table and
//! the capture/replay input logger that device adapters build on.
//!
//! # Module Structure
//!
//! - [`log`] - Log table, loggable-inputs contract, run mode, input logger
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - System-wide constants
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use relog_common::prelude::*;
//!
//! let mut logger = InputLogger::capture(Box::new(MemoryLog::new()));
//! logger.register("Imu").unwrap();
//! ```

pub mod config;
pub mod consts;
pub mod log;
pub mod prelude;

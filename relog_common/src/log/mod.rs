//! Capture/replay logging core.
//!
//! One [`CycleSnapshot`](store::CycleSnapshot) is produced per control
//! cycle: a map from adapter log name to a typed [`LogTable`](table::LogTable).
//! In capture mode adapters serialize fresh hardware readings into the
//! snapshot; in replay mode the same snapshot is read back and the adapter
//! structs are repopulated in place, bit-for-bit, without touching hardware.

pub mod inputs;
pub mod logger;
pub mod mode;
pub mod store;
pub mod table;
pub mod value;

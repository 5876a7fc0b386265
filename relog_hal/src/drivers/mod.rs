//! Driver implementations for the pneumatics driver trait.
//!
//! Hardware-backed drivers (CAN bus) plug in behind the same trait; only
//! the simulation driver ships with the workspace.

pub mod simulation;

pub use simulation::SimulatedPcm;

//! Simulated pneumatics control module.
//!
//! Software emulation of a PCM for development and testing without
//! physical hardware: a small tank-pressure model drives the pressure
//! switch and compressor, solenoid commands are latched, and faults can be
//! injected. State lives behind a shared handle so a test or demo binary
//! can steer the simulation while the device adapter owns a driver box.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use relog_common::consts::SOLENOID_CHANNELS;
use tracing::{debug, trace};

use crate::driver::{DriverError, PcmFaults, PneumaticsDriver};

/// Tank pressure at which the pressure switch opens (system full), in psi.
const CUTOFF_PSI: f64 = 120.0;

/// Tank pressure gained per second while the compressor runs, in psi.
const FILL_RATE_PSI: f64 = 8.0;

/// Tank pressure lost per second per energized solenoid, in psi.
const BLEED_RATE_PSI: f64 = 2.5;

/// Compressor current draw while running, in amperes.
const RUN_CURRENT_A: f64 = 14.0;

#[derive(Debug)]
struct PcmState {
    solenoids: [bool; SOLENOID_CHANNELS as usize],
    closed_loop: bool,
    pressure_psi: f64,
    pressure_switch_override: Option<bool>,
    compressor_current_override: Option<f64>,
    faults: PcmFaults,
    sticky_faults: PcmFaults,
    offline: bool,
}

impl Default for PcmState {
    fn default() -> Self {
        Self {
            solenoids: [false; SOLENOID_CHANNELS as usize],
            closed_loop: true,
            pressure_psi: 0.0,
            pressure_switch_override: None,
            compressor_current_override: None,
            faults: PcmFaults::empty(),
            sticky_faults: PcmFaults::empty(),
            offline: false,
        }
    }
}

impl PcmState {
    /// Pressure switch closes while the tank is below cutoff.
    fn pressure_switch(&self) -> bool {
        self.pressure_switch_override
            .unwrap_or(self.pressure_psi < CUTOFF_PSI)
    }

    /// Compressor runs when closed-loop control is on and the switch is
    /// closed.
    fn compressor_on(&self) -> bool {
        self.closed_loop && self.pressure_switch()
    }
}

/// Simulated PCM driver. Cloning yields another handle to the same module
/// state.
#[derive(Debug, Clone)]
pub struct SimulatedPcm {
    module_id: u8,
    state: Arc<Mutex<PcmState>>,
}

impl SimulatedPcm {
    /// Create a simulated module with an empty tank.
    pub fn new(module_id: u8) -> Self {
        debug!("Creating simulated PCM for module {module_id}");
        Self {
            module_id,
            state: Arc::new(Mutex::new(PcmState::default())),
        }
    }

    /// Factory suitable for
    /// [`DeviceRegistry::new`](crate::device_registry::DeviceRegistry::new).
    pub fn factory(module_id: u8) -> Box<dyn PneumaticsDriver> {
        Box::new(Self::new(module_id))
    }

    fn state(&self) -> std::sync::MutexGuard<'_, PcmState> {
        self.state.lock().expect("simulated PCM state poisoned")
    }

    /// Advance the pressure model by `dt`.
    pub fn tick(&self, dt: Duration) {
        let mut state = self.state();
        let dt_s = dt.as_secs_f64();
        if state.compressor_on() {
            state.pressure_psi += FILL_RATE_PSI * dt_s;
        }
        let open_valves = state.solenoids.iter().filter(|&&on| on).count() as f64;
        state.pressure_psi = (state.pressure_psi - BLEED_RATE_PSI * open_valves * dt_s).max(0.0);
        trace!(
            "sim PCM {}: pressure {:.2} psi, compressor {}",
            self.module_id,
            state.pressure_psi,
            state.compressor_on()
        );
    }

    /// Current simulated tank pressure in psi.
    pub fn pressure_psi(&self) -> f64 {
        self.state().pressure_psi
    }

    /// Force the pressure switch reading, overriding the tank model.
    pub fn set_pressure_switch(&self, closed: bool) {
        self.state().pressure_switch_override = Some(closed);
    }

    /// Force the compressor current reading, overriding the model.
    pub fn set_compressor_current(&self, amperes: f64) {
        self.state().compressor_current_override = Some(amperes);
    }

    /// Raise fault bits. Faults are mirrored into the sticky word, where
    /// they stay until cleared.
    pub fn inject_fault(&self, faults: PcmFaults) {
        let mut state = self.state();
        state.faults |= faults;
        state.sticky_faults |= faults;
    }

    /// Lower instantaneous fault bits; sticky bits remain set.
    pub fn clear_fault(&self, faults: PcmFaults) {
        self.state().faults &= !faults;
    }

    /// Take the module on or off the bus. While offline every driver call
    /// fails with [`DriverError::Offline`].
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    fn check_online(&self) -> Result<(), DriverError> {
        if self.state().offline {
            Err(DriverError::Offline {
                module: self.module_id,
            })
        } else {
            Ok(())
        }
    }
}

impl PneumaticsDriver for SimulatedPcm {
    fn module_id(&self) -> u8 {
        self.module_id
    }

    fn solenoid_states(&self) -> Result<[bool; SOLENOID_CHANNELS as usize], DriverError> {
        self.check_online()?;
        Ok(self.state().solenoids)
    }

    fn compressor_on(&self) -> Result<bool, DriverError> {
        self.check_online()?;
        Ok(self.state().compressor_on())
    }

    fn pressure_switch(&self) -> Result<bool, DriverError> {
        self.check_online()?;
        Ok(self.state().pressure_switch())
    }

    fn compressor_current(&self) -> Result<f64, DriverError> {
        self.check_online()?;
        let state = self.state();
        if let Some(amperes) = state.compressor_current_override {
            return Ok(amperes);
        }
        Ok(if state.compressor_on() {
            RUN_CURRENT_A
        } else {
            0.0
        })
    }

    fn closed_loop_control(&self) -> Result<bool, DriverError> {
        self.check_online()?;
        Ok(self.state().closed_loop)
    }

    fn pressure_switch_valve(&self) -> Result<bool, DriverError> {
        self.check_online()?;
        Ok(self.state().pressure_switch())
    }

    fn faults(&self) -> Result<PcmFaults, DriverError> {
        self.check_online()?;
        Ok(self.state().faults)
    }

    fn sticky_faults(&self) -> Result<PcmFaults, DriverError> {
        self.check_online()?;
        Ok(self.state().sticky_faults)
    }

    fn set_solenoid(&mut self, channel: u8, on: bool) -> Result<(), DriverError> {
        self.check_online()?;
        if channel >= SOLENOID_CHANNELS {
            return Err(DriverError::InvalidChannel {
                channel,
                max: SOLENOID_CHANNELS,
            });
        }
        self.state().solenoids[channel as usize] = on;
        Ok(())
    }

    fn set_closed_loop_control(&mut self, enabled: bool) -> Result<(), DriverError> {
        self.check_online()?;
        self.state().closed_loop = enabled;
        Ok(())
    }

    fn clear_sticky_faults(&mut self) -> Result<(), DriverError> {
        self.check_online()?;
        self.state().sticky_faults = PcmFaults::empty();
        Ok(())
    }
}

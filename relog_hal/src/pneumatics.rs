//! Pneumatics control module adapter.
//!
//! One [`PneumaticsModule`] exists per physical module id. It owns the
//! module's [`PneumaticsInputs`] struct exclusively: `periodic()` is the
//! only mutator and must run exactly once per control cycle, before any
//! getter is trusted for that cycle. Getters read only the struct, never
//! the driver, so behavior is identical whether the process is live or
//! replaying a log.

use relog_common::consts::SOLENOID_CHANNELS;
use relog_common::log::inputs::LoggableInputs;
use relog_common::log::logger::{InputLogger, LogError};
use relog_common::log::table::LogTable;
use tracing::trace;

use crate::driver::{DriverError, PcmFaults, PneumaticsDriver};

/// Number of solenoid channels as a usize, for array sizing.
const CHANNELS: usize = SOLENOID_CHANNELS as usize;

// ─── PneumaticsInputs ───────────────────────────────────────────────

/// Observable surface of one pneumatics control module.
///
/// A plain data record: no hidden state, mutated only by the owning
/// adapter's capture step and by `from_log` during replay.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PneumaticsInputs {
    /// Compressor output energized.
    pub compressor: bool,
    /// Pressure switch closed (system below pressure).
    pub pressure_switch: bool,
    /// Commanded state of each solenoid channel.
    pub solenoid_states: [bool; CHANNELS],
    /// Module CAN id echoed back by the hardware.
    pub module_id: u8,
    /// Compressor current draw in amperes.
    pub compressor_current: f64,
    /// Compressor closed-loop control enabled.
    pub closed_loop_control: bool,
    /// Pressure switch valve channel state.
    pub pressure_switch_valve: bool,
    /// Instantaneous fault word.
    pub faults: PcmFaults,
    /// Sticky fault word (set until explicitly cleared).
    pub sticky_faults: PcmFaults,
}

impl LoggableInputs for PneumaticsInputs {
    fn to_log(&self, table: &mut LogTable) {
        table.put_bool("Compressor", self.compressor);
        table.put_bool("Pressure Switch", self.pressure_switch);
        table.put_bool_array("Solenoid States", &self.solenoid_states);
        table.put_int("Module ID", i64::from(self.module_id));
        table.put_float("Compressor Current", self.compressor_current);
        table.put_bool("Closed Loop Control", self.closed_loop_control);
        table.put_bool("Pressure Switch Valve", self.pressure_switch_valve);
        table.put_bool_array("Faults", &self.faults.to_group());
        table.put_bool_array("Sticky Faults", &self.sticky_faults.to_group());
    }

    fn from_log(&mut self, table: &LogTable) {
        self.compressor = table.get_bool("Compressor", self.compressor);
        self.pressure_switch = table.get_bool("Pressure Switch", self.pressure_switch);
        self.solenoid_states = table.get_bool_array("Solenoid States", self.solenoid_states);
        self.module_id = u8::try_from(table.get_int("Module ID", i64::from(self.module_id)))
            .unwrap_or(self.module_id);
        self.compressor_current =
            table.get_float("Compressor Current", self.compressor_current);
        self.closed_loop_control =
            table.get_bool("Closed Loop Control", self.closed_loop_control);
        self.pressure_switch_valve =
            table.get_bool("Pressure Switch Valve", self.pressure_switch_valve);
        self.faults =
            PcmFaults::from_group(table.get_bool_array("Faults", self.faults.to_group()));
        self.sticky_faults = PcmFaults::from_group(
            table.get_bool_array("Sticky Faults", self.sticky_faults.to_group()),
        );
    }
}

// ─── PneumaticsModule ───────────────────────────────────────────────

/// Device adapter for one pneumatics control module.
pub struct PneumaticsModule {
    log_name: String,
    driver: Box<dyn PneumaticsDriver>,
    inputs: PneumaticsInputs,
}

impl std::fmt::Debug for PneumaticsModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PneumaticsModule")
            .field("log_name", &self.log_name)
            .field("inputs", &self.inputs)
            .finish_non_exhaustive()
    }
}

impl PneumaticsModule {
    /// Create an adapter for `module_id`, registering its log name with
    /// `logger`.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::DuplicateName`] if another adapter already
    /// claimed this module's log name, a fatal configuration error.
    pub fn new(
        module_id: u8,
        driver: Box<dyn PneumaticsDriver>,
        logger: &mut InputLogger,
    ) -> Result<Self, LogError> {
        let log_name = Self::log_name_for(module_id);
        logger.register(&log_name)?;
        let inputs = PneumaticsInputs {
            module_id,
            ..PneumaticsInputs::default()
        };
        Ok(Self {
            log_name,
            driver,
            inputs,
        })
    }

    /// Log name used for a given module id. Module 0 keeps the bare
    /// hardware name; other ids are suffixed to stay unique per adapter.
    pub fn log_name_for(module_id: u8) -> String {
        if module_id == 0 {
            "CTREPCM".to_string()
        } else {
            format!("CTREPCM-{module_id}")
        }
    }

    /// This adapter's registered log name.
    pub fn log_name(&self) -> &str {
        &self.log_name
    }

    /// True if `channel` is a valid solenoid channel number.
    pub fn check_solenoid_channel(channel: u8) -> bool {
        channel < SOLENOID_CHANNELS
    }

    /// Per-cycle hook. Must be invoked exactly once per control cycle by
    /// the scheduler, inside an open logger cycle.
    ///
    /// In capture mode this pulls fresh values from the driver into the
    /// input struct; in every mode it then hands the struct to the logger,
    /// which either records it or repopulates it from the log.
    pub fn periodic(&mut self, logger: &mut InputLogger) -> Result<(), LogError> {
        if !logger.is_replay() {
            self.capture();
        }
        logger.process_inputs(&self.log_name, &mut self.inputs)
    }

    /// Pull fresh values from the driver, field by field.
    ///
    /// A failed query keeps the previous cycle's value for that field,
    /// the same keep-previous policy as a replay-missing key.
    fn capture(&mut self) {
        let inputs = &mut self.inputs;
        let driver = &*self.driver;
        inputs.module_id = driver.module_id();

        match driver.solenoid_states() {
            Ok(v) => inputs.solenoid_states = v,
            Err(e) => trace!("solenoid_states unavailable: {e}"),
        }
        match driver.compressor_on() {
            Ok(v) => inputs.compressor = v,
            Err(e) => trace!("compressor_on unavailable: {e}"),
        }
        match driver.pressure_switch() {
            Ok(v) => inputs.pressure_switch = v,
            Err(e) => trace!("pressure_switch unavailable: {e}"),
        }
        match driver.compressor_current() {
            Ok(v) => inputs.compressor_current = v,
            Err(e) => trace!("compressor_current unavailable: {e}"),
        }
        match driver.closed_loop_control() {
            Ok(v) => inputs.closed_loop_control = v,
            Err(e) => trace!("closed_loop_control unavailable: {e}"),
        }
        match driver.pressure_switch_valve() {
            Ok(v) => inputs.pressure_switch_valve = v,
            Err(e) => trace!("pressure_switch_valve unavailable: {e}"),
        }
        match driver.faults() {
            Ok(v) => inputs.faults = v,
            Err(e) => trace!("faults unavailable: {e}"),
        }
        match driver.sticky_faults() {
            Ok(v) => inputs.sticky_faults = v,
            Err(e) => trace!("sticky_faults unavailable: {e}"),
        }
    }

    // ─── Getters (pure reads of captured state) ─────────────────────

    /// Full input struct for this module.
    pub fn inputs(&self) -> &PneumaticsInputs {
        &self.inputs
    }

    /// Current compressor state.
    pub fn compressor(&self) -> bool {
        self.inputs.compressor
    }

    /// Current pressure switch state.
    pub fn pressure_switch(&self) -> bool {
        self.inputs.pressure_switch
    }

    /// State of one solenoid channel.
    ///
    /// The caller is responsible for pre-checking the channel with
    /// [`PneumaticsModule::check_solenoid_channel`]; use
    /// [`PneumaticsModule::try_solenoid`] for a bounds-checked variant.
    pub fn solenoid(&self, channel: u8) -> bool {
        debug_assert!(Self::check_solenoid_channel(channel));
        self.inputs.solenoid_states[channel as usize]
    }

    /// Bounds-checked state of one solenoid channel.
    pub fn try_solenoid(&self, channel: u8) -> Option<bool> {
        self.inputs
            .solenoid_states
            .get(channel as usize)
            .copied()
    }

    /// All solenoid channels as a bitmask, channel N in bit N.
    pub fn all_solenoids(&self) -> u8 {
        self.inputs
            .solenoid_states
            .iter()
            .enumerate()
            .fold(0u8, |mask, (i, &on)| if on { mask | 1 << i } else { mask })
    }

    /// Module CAN id.
    pub fn module_id(&self) -> u8 {
        self.inputs.module_id
    }

    /// Compressor current in amperes.
    pub fn compressor_current(&self) -> f64 {
        self.inputs.compressor_current
    }

    /// Compressor closed-loop control state.
    pub fn closed_loop_control(&self) -> bool {
        self.inputs.closed_loop_control
    }

    /// Pressure switch valve state.
    pub fn pressure_switch_valve(&self) -> bool {
        self.inputs.pressure_switch_valve
    }

    /// Instantaneous fault word.
    pub fn faults(&self) -> PcmFaults {
        self.inputs.faults
    }

    /// Sticky fault word.
    pub fn sticky_faults(&self) -> PcmFaults {
        self.inputs.sticky_faults
    }

    // ─── Setters (forwarded to the driver in every mode) ────────────

    /// Command one solenoid channel.
    ///
    /// Setters have no replay branch: actuation commands are not
    /// replayable, only sensed inputs are.
    pub fn set_solenoid(&mut self, channel: u8, on: bool) -> Result<(), DriverError> {
        if !Self::check_solenoid_channel(channel) {
            return Err(DriverError::InvalidChannel {
                channel,
                max: SOLENOID_CHANNELS,
            });
        }
        self.driver.set_solenoid(channel, on)
    }

    /// Command all solenoid channels from a bitmask, channel N in bit N.
    pub fn set_all_solenoids(&mut self, mask: u8) -> Result<(), DriverError> {
        for channel in 0..SOLENOID_CHANNELS {
            self.driver.set_solenoid(channel, mask & (1 << channel) != 0)?;
        }
        Ok(())
    }

    /// Enable or disable compressor closed-loop control.
    pub fn set_closed_loop_control(&mut self, enabled: bool) -> Result<(), DriverError> {
        self.driver.set_closed_loop_control(enabled)
    }

    /// Clear all sticky fault bits on the hardware.
    pub fn clear_sticky_faults(&mut self) -> Result<(), DriverError> {
        self.driver.clear_sticky_faults()
    }
}

//! Capture/replay integration tests for the pneumatics adapter.
//!
//! Exercises the full path: simulated driver → input struct → logger →
//! snapshot store → replayed input struct, including mode isolation and
//! old-log tolerance.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use relog_common::consts::SOLENOID_CHANNELS;
use relog_common::log::logger::InputLogger;
use relog_common::log::store::{JsonlSink, JsonlSource, MemoryLog};
use tempfile::TempDir;
use relog_hal::driver::{DriverError, PcmFaults, PneumaticsDriver};
use relog_hal::drivers::simulation::SimulatedPcm;
use relog_hal::pneumatics::{PneumaticsInputs, PneumaticsModule};

/// Stub driver counting every query and command, for mode-isolation
/// checks.
#[derive(Clone, Default)]
struct CountingDriver {
    queries: Arc<AtomicU32>,
    commands: Arc<AtomicU32>,
}

impl CountingDriver {
    fn query_count(&self) -> u32 {
        self.queries.load(Ordering::SeqCst)
    }

    fn command_count(&self) -> u32 {
        self.commands.load(Ordering::SeqCst)
    }

    fn count_query(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }
}

impl PneumaticsDriver for CountingDriver {
    fn module_id(&self) -> u8 {
        0
    }

    fn solenoid_states(&self) -> Result<[bool; SOLENOID_CHANNELS as usize], DriverError> {
        self.count_query();
        Ok([false; SOLENOID_CHANNELS as usize])
    }

    fn compressor_on(&self) -> Result<bool, DriverError> {
        self.count_query();
        Ok(false)
    }

    fn pressure_switch(&self) -> Result<bool, DriverError> {
        self.count_query();
        Ok(false)
    }

    fn compressor_current(&self) -> Result<f64, DriverError> {
        self.count_query();
        Ok(0.0)
    }

    fn closed_loop_control(&self) -> Result<bool, DriverError> {
        self.count_query();
        Ok(false)
    }

    fn pressure_switch_valve(&self) -> Result<bool, DriverError> {
        self.count_query();
        Ok(false)
    }

    fn faults(&self) -> Result<PcmFaults, DriverError> {
        self.count_query();
        Ok(PcmFaults::empty())
    }

    fn sticky_faults(&self) -> Result<PcmFaults, DriverError> {
        self.count_query();
        Ok(PcmFaults::empty())
    }

    fn set_solenoid(&mut self, _channel: u8, _on: bool) -> Result<(), DriverError> {
        self.commands.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn set_closed_loop_control(&mut self, _enabled: bool) -> Result<(), DriverError> {
        self.commands.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear_sticky_faults(&mut self) -> Result<(), DriverError> {
        self.commands.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Capture one cycle from a simulated PCM prepared by `setup`, returning
/// the in-memory log.
fn capture_one_cycle(setup: impl Fn(&SimulatedPcm)) -> MemoryLog {
    let log = MemoryLog::new();
    let sim = SimulatedPcm::new(0);
    setup(&sim);

    let mut logger = InputLogger::capture(Box::new(log.clone()));
    let mut module = PneumaticsModule::new(0, Box::new(sim), &mut logger).unwrap();

    logger.begin_cycle().unwrap();
    module.periodic(&mut logger).unwrap();
    logger.end_cycle().unwrap();
    log
}

#[test]
fn captured_pcm_cycle_replays_bit_for_bit() {
    // Capture: compressor running at 3.2 A, no faults.
    let log = capture_one_cycle(|sim| {
        sim.set_compressor_current(3.2);
    });

    let snapshot = &log.cycles()[0];
    let table = snapshot.table("CTREPCM").expect("CTREPCM table recorded");
    assert!(table.get_bool("Compressor", false));
    assert_eq!(table.get_float("Compressor Current", 0.0), 3.2);
    assert_eq!(table.get_bool_array("Faults", [true; 4]), [false; 4]);

    // Replay against a dead driver must reproduce the captured values.
    let offline = SimulatedPcm::new(0);
    offline.set_offline(true);

    let mut logger = InputLogger::replay(Box::new(log.to_source()));
    let mut module = PneumaticsModule::new(0, Box::new(offline), &mut logger).unwrap();

    assert!(logger.begin_cycle().unwrap());
    module.periodic(&mut logger).unwrap();
    logger.end_cycle().unwrap();

    assert!(module.compressor());
    assert_eq!(module.compressor_current(), 3.2);
    assert_eq!(module.faults(), PcmFaults::empty());
    assert_eq!(module.sticky_faults(), PcmFaults::empty());
    assert!(!logger.begin_cycle().unwrap());
}

#[test]
fn replay_of_old_log_keeps_missing_field() {
    // Cycle 0 carries the full schema with the valve reading true.
    let log = capture_one_cycle(|sim| {
        sim.set_pressure_switch(true);
    });

    // Cycle 1 simulates an older log: same data, but recorded before the
    // "Pressure Switch Valve" field existed.
    let mut cycles = log.cycles();
    let mut old = cycles[0].clone();
    old.cycle = 1;
    old.tables
        .get_mut("CTREPCM")
        .unwrap()
        .remove("Pressure Switch Valve")
        .expect("field present in new schema");
    cycles.push(old);
    let log = MemoryLog::from_cycles(cycles);

    let offline = SimulatedPcm::new(0);
    offline.set_offline(true);
    let mut logger = InputLogger::replay(Box::new(log.to_source()));
    let mut module = PneumaticsModule::new(0, Box::new(offline), &mut logger).unwrap();

    logger.begin_cycle().unwrap();
    module.periodic(&mut logger).unwrap();
    logger.end_cycle().unwrap();
    assert!(module.pressure_switch_valve());

    // The missing key must keep the previous cycle's value, not reset to
    // false.
    logger.begin_cycle().unwrap();
    module.periodic(&mut logger).unwrap();
    logger.end_cycle().unwrap();
    assert!(module.pressure_switch_valve());
}

#[test]
fn replay_never_queries_the_driver() {
    let log = capture_one_cycle(|_| {});

    let driver = CountingDriver::default();
    let handle = driver.clone();
    let mut logger = InputLogger::replay(Box::new(log.to_source()));
    let mut module = PneumaticsModule::new(0, Box::new(driver), &mut logger).unwrap();

    logger.begin_cycle().unwrap();
    module.periodic(&mut logger).unwrap();
    logger.end_cycle().unwrap();

    // Mode isolation: processing inputs in replay mode touched no driver
    // query and issued no command.
    assert_eq!(handle.query_count(), 0);
    assert_eq!(handle.command_count(), 0);

    // Explicit setter calls still forward; setters have no replay branch.
    module.set_solenoid(2, true).unwrap();
    module.clear_sticky_faults().unwrap();
    assert_eq!(handle.command_count(), 2);
    assert_eq!(handle.query_count(), 0);
}

#[test]
fn capture_queries_the_driver_each_cycle() {
    let driver = CountingDriver::default();
    let handle = driver.clone();
    let mut logger = InputLogger::capture(Box::new(MemoryLog::new()));
    let mut module = PneumaticsModule::new(0, Box::new(driver), &mut logger).unwrap();

    logger.begin_cycle().unwrap();
    module.periodic(&mut logger).unwrap();
    logger.end_cycle().unwrap();

    // All eight observable queries ran exactly once.
    assert_eq!(handle.query_count(), 8);
}

#[test]
fn replaying_a_session_twice_is_identical() {
    // A short session with evolving state.
    let log = MemoryLog::new();
    let sim = SimulatedPcm::new(0);
    let mut logger = InputLogger::capture(Box::new(log.clone()));
    let mut module = PneumaticsModule::new(0, Box::new(sim.clone()), &mut logger).unwrap();

    for cycle in 0..5u8 {
        logger.begin_cycle().unwrap();
        module.set_solenoid(cycle % 4, true).unwrap();
        if cycle == 3 {
            sim.inject_fault(PcmFaults::SOLENOID_VOLTAGE);
        }
        sim.tick(std::time::Duration::from_millis(20));
        module.periodic(&mut logger).unwrap();
        logger.end_cycle().unwrap();
    }

    let run = |log: &MemoryLog| -> Vec<PneumaticsInputs> {
        let offline = SimulatedPcm::new(0);
        offline.set_offline(true);
        let mut logger = InputLogger::replay(Box::new(log.to_source()));
        let mut module = PneumaticsModule::new(0, Box::new(offline), &mut logger).unwrap();
        let mut decoded = Vec::new();
        while logger.begin_cycle().unwrap() {
            module.periodic(&mut logger).unwrap();
            logger.end_cycle().unwrap();
            decoded.push(module.inputs().clone());
        }
        decoded
    };

    let first = run(&log);
    let second = run(&log);
    assert_eq!(first.len(), 5);
    assert_eq!(first, second);

    // The injected fault shows up sticky from cycle 3 on.
    assert!(!first[2].sticky_faults.contains(PcmFaults::SOLENOID_VOLTAGE));
    assert!(first[3].sticky_faults.contains(PcmFaults::SOLENOID_VOLTAGE));
    assert!(first[4].sticky_faults.contains(PcmFaults::SOLENOID_VOLTAGE));
}

#[test]
fn file_backed_session_replays_through_the_adapter() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pcm.jsonl");

    // Capture three cycles to disk, energizing one more solenoid each
    // cycle, and keep the adapter's view of every cycle for comparison.
    let mut captured = Vec::new();
    {
        let sim = SimulatedPcm::new(0);
        let mut logger = InputLogger::capture(Box::new(JsonlSink::create(&path).unwrap()));
        let mut module = PneumaticsModule::new(0, Box::new(sim.clone()), &mut logger).unwrap();

        for cycle in 0..3u8 {
            logger.begin_cycle().unwrap();
            module.set_solenoid(cycle, true).unwrap();
            sim.tick(Duration::from_millis(20));
            module.periodic(&mut logger).unwrap();
            logger.end_cycle().unwrap();
            captured.push(module.inputs().clone());
        }
        logger.flush().unwrap();
    }

    // Replay the file against a dead driver: the adapter must walk
    // through the identical sequence of input states.
    let offline = SimulatedPcm::new(0);
    offline.set_offline(true);
    let mut logger = InputLogger::replay(Box::new(JsonlSource::open(&path).unwrap()));
    let mut module = PneumaticsModule::new(0, Box::new(offline), &mut logger).unwrap();

    let mut replayed = Vec::new();
    while logger.begin_cycle().unwrap() {
        module.periodic(&mut logger).unwrap();
        logger.end_cycle().unwrap();
        replayed.push(module.inputs().clone());
    }

    assert_eq!(replayed, captured);
    assert!(replayed[2].solenoid_states[..3].iter().all(|&on| on));
    assert!(!replayed[0].solenoid_states[1]);
}

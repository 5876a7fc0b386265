//! # relog HAL demo binary
//!
//! Runs the pneumatics adapter against the simulated PCM in capture mode,
//! writing a JSON Lines input log, or replays a previously captured log
//! offline without touching any driver.
//!
//! # Usage
//!
//! ```bash
//! # Capture 250 cycles from the simulated PCM
//! relog_hal --log session.jsonl --cycles 250
//!
//! # Replay the captured session offline
//! relog_hal --replay session.jsonl
//!
//! # With a config file and verbose logging
//! relog_hal --config relog.toml -v
//! ```

use clap::Parser;
use relog_common::config::{ConfigLoader, LogLevel, SharedConfig};
use relog_common::consts::{CYCLE_TIME_US, DEFAULT_LOG_PATH};
use relog_common::log::logger::InputLogger;
use relog_common::log::store::{JsonlSink, JsonlSource};
use relog_hal::drivers::simulation::SimulatedPcm;
use relog_hal::pneumatics::PneumaticsModule;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// relog HAL demo - capture/replay of pneumatics inputs
#[derive(Parser, Debug)]
#[command(name = "relog_hal")]
#[command(version)]
#[command(about = "Pneumatics input capture/replay demo")]
#[command(long_about = None)]
struct Args {
    /// Path to TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Capture log output path.
    #[arg(short, long, default_value = DEFAULT_LOG_PATH)]
    log: PathBuf,

    /// Replay the given log instead of capturing.
    #[arg(short, long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Number of cycles to capture.
    #[arg(short = 'n', long, default_value_t = 250)]
    cycles: u64,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

/// Demo application configuration.
#[derive(Debug, Deserialize)]
struct DemoConfig {
    /// Shared base configuration.
    shared: SharedConfig,
    /// Pneumatics section.
    #[serde(default)]
    pneumatics: PneumaticsSection,
}

/// Pneumatics-specific configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct PneumaticsSection {
    /// Module CAN id to capture from.
    module_id: u8,
    /// Control cycle time in microseconds.
    cycle_time_us: u64,
}

impl Default for PneumaticsSection {
    fn default() -> Self {
        Self {
            module_id: 0,
            cycle_time_us: CYCLE_TIME_US,
        }
    }
}

fn main() {
    if let Err(e) = run() {
        // Config loading can fail before the tracing subscriber exists,
        // so the terminal error goes straight to stderr.
        eprintln!("relog_hal failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let (level, section) = match &args.config {
        Some(path) => {
            let config = DemoConfig::load(path)?;
            config.shared.validate()?;
            (config.shared.log_level, config.pneumatics)
        }
        None => (LogLevel::default(), PneumaticsSection::default()),
    };

    setup_tracing(&args, level);

    info!("relog HAL demo v{} starting...", env!("CARGO_PKG_VERSION"));

    match &args.replay {
        Some(path) => run_replay(path, section.module_id),
        None => run_capture(&args, &section),
    }
}

/// Capture session: live simulated hardware, inputs logged per cycle.
fn run_capture(args: &Args, section: &PneumaticsSection) -> Result<(), Box<dyn std::error::Error>> {
    let cycle_time = Duration::from_micros(section.cycle_time_us);
    info!(
        "Capturing {} cycles from module {} to {}",
        args.cycles,
        section.module_id,
        args.log.display()
    );

    let sim = SimulatedPcm::new(section.module_id);
    let mut logger = InputLogger::capture(Box::new(JsonlSink::create(&args.log)?));
    let mut module = PneumaticsModule::new(section.module_id, Box::new(sim.clone()), &mut logger)?;

    for cycle in 0..args.cycles {
        logger.begin_cycle()?;

        // Exercise the actuation path: cycle a solenoid every 25 cycles.
        if cycle % 25 == 0 {
            module.set_solenoid(0, (cycle / 25) % 2 == 0)?;
        }

        sim.tick(cycle_time);
        module.periodic(&mut logger)?;
        logger.end_cycle()?;

        debug!(
            "cycle {cycle}: compressor={} current={:.1}A pressure={:.1}psi",
            module.compressor(),
            module.compressor_current(),
            sim.pressure_psi()
        );
    }
    logger.flush()?;

    info!(
        "Capture complete: {} cycles, final compressor current {:.1} A",
        logger.cycles_completed(),
        module.compressor_current()
    );
    Ok(())
}

/// Replay session: inputs come from the log; no driver query runs.
fn run_replay(path: &Path, module_id: u8) -> Result<(), Box<dyn std::error::Error>> {
    info!("Replaying {}", path.display());

    // The driver is never queried during replay; an offline simulated
    // module stands in for the missing hardware.
    let sim = SimulatedPcm::new(module_id);
    sim.set_offline(true);

    let mut logger = InputLogger::replay(Box::new(JsonlSource::open(path)?));
    let mut module = PneumaticsModule::new(module_id, Box::new(sim), &mut logger)?;

    let mut compressor_cycles = 0u64;
    while logger.begin_cycle()? {
        module.periodic(&mut logger)?;
        logger.end_cycle()?;

        if module.compressor() {
            compressor_cycles += 1;
        }
        debug!(
            "replayed cycle {}: compressor={} current={:.1}A solenoids={:#04x}",
            logger.cycles_completed(),
            module.compressor(),
            module.compressor_current(),
            module.all_solenoids()
        );
    }

    info!(
        "Replay complete: {} cycles, compressor on for {}",
        logger.cycles_completed(),
        compressor_cycles
    );
    Ok(())
}

fn setup_tracing(args: &Args, level: LogLevel) {
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()))
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if args.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

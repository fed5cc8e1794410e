//! Engine binary for the epidermis simulation.
//!
//! This is the main entry point that wires together configuration, the
//! agent factory, the reference substrate, and the step loop. It seeds a
//! sheet of stem cells, runs the configured number of steps, and logs the
//! final lineage census.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (path from the first argument, `EPIDERMIS_CONFIG`,
//!    or `epidermis-config.yaml`; defaults if none exists)
//! 2. Initialize structured logging (tracing), `RUST_LOG` over `logging.level`
//! 3. Log the random seed
//! 4. Seed stem cells and build the substrate from one seeded RNG
//! 5. Run the simulation loop
//! 6. Log the census and the per-step history

mod census_callback;
mod error;
mod seeding;

use std::path::{Path, PathBuf};

use epidermis_core::config::{LoggingConfig, SimulationConfig};
use epidermis_core::runner::{self, SimulationResult, TickCallback};
use epidermis_core::tick::{SimulationState, Substrate};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::census_callback::CensusCallback;
use crate::error::EngineError;

/// Environment variable naming the config file.
const CONFIG_ENV_VAR: &str = "EPIDERMIS_CONFIG";

/// Config file looked up in the working directory when no path is given.
const DEFAULT_CONFIG_FILE: &str = "epidermis-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, seeding, or the simulation fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = resolve_config_path(std::env::args_os().nth(1).map(PathBuf::from));
    let config = load_config(config_path.as_deref())?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);

    info!("epidermis-engine starting");
    info!(
        world_name = %config.world.name,
        config_path = ?config_path,
        initial_agents = config.population.initial_agents,
        steps = config.simulation.steps,
        bound_space = config.world.bound_space,
        "Configuration loaded"
    );

    // 3. Log the seed.
    info!(seed = config.world.seed, "Random seed");

    // 4-5. Seed, build, run.
    let mut callback = CensusCallback::new();
    let result = simulate(&config, &mut callback)?;

    // 6. Log results.
    runner::log_simulation_end(&result);
    let history = callback.to_json().map_err(EngineError::from)?;
    debug!(steps_recorded = callback.history().len(), %history, "Census history");

    info!(
        total_steps = result.total_steps,
        population = result.census.total,
        "Simulation completed"
    );

    Ok(())
}

/// Seed the population, build the substrate, and run the configured steps.
///
/// Seeding and division draw from one `StdRng` seeded with `world.seed`,
/// so a config fully determines the run.
fn simulate(
    config: &SimulationConfig,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, EngineError> {
    let mut rng = StdRng::seed_from_u64(config.world.seed);
    let population = seeding::seed_stem_cells(config, &mut rng)?;
    let substrate = Substrate::from_config(config, rng)?;
    let mut state = SimulationState::new(population, substrate);

    let result = runner::run_simulation(&mut state, config.simulation.steps, callback)?;
    Ok(result)
}

/// Pick the config file: explicit argument, then `EPIDERMIS_CONFIG`, then
/// `epidermis-config.yaml` if it exists in the working directory.
fn resolve_config_path(arg: Option<PathBuf>) -> Option<PathBuf> {
    arg.or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
        .or_else(|| {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            fallback.exists().then(|| fallback.to_path_buf())
        })
}

/// Load the simulation configuration, falling back to defaults when no
/// file is given.
fn load_config(path: Option<&Path>) -> Result<SimulationConfig, EngineError> {
    let config = match path {
        Some(path) => SimulationConfig::from_file(path)?,
        None => {
            let mut config = SimulationConfig::default();
            config.apply_env_overrides()?;
            config
        }
    };
    Ok(config)
}

/// Install the global tracing subscriber.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

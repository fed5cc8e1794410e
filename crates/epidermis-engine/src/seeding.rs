//! Initial population seeding.
//!
//! At simulation start the engine places `population.initial_agents` stem
//! cells of diameter `population.initial_diameter` at uniformly random
//! positions on the `z = 0` plane of the configured world bound. The cells
//! are committed as one batch.

use epidermis_core::config::SimulationConfig;
use epidermis_world::{Population, create_agents, stem_cell_builder};
use rand::Rng;
use tracing::info;

use crate::error::EngineError;

/// Seed the initial stem cell population described by `config`.
///
/// Positions are drawn from `rng`, so a seeded generator reproduces the
/// same layout.
///
/// # Errors
///
/// Returns [`EngineError::World`] if the bound or the agent count is
/// invalid.
pub fn seed_stem_cells<R: Rng + ?Sized>(
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<Population, EngineError> {
    let mut population = Population::new();
    let created = create_agents(
        &mut population,
        rng,
        config.world.min_bound,
        config.world.max_bound,
        config.population.initial_agents,
        stem_cell_builder(config.population.initial_diameter),
    )?;

    info!(
        agents_spawned = created,
        diameter = config.population.initial_diameter,
        "Seed stem cells placed"
    );
    Ok(population)
}

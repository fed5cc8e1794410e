//! Agent factory for seeding the simulation with initial agents.
//!
//! At simulation start the factory creates N agents at uniformly random
//! `(x, y)` positions inside a square bound, all on the plane `z = 0`. Cells
//! start confined to that plane and migrate along the z axis later under
//! forces owned by the substrate.
//!
//! The batch is built locally and committed in one append, so no agent of
//! a batch is visible before all of them have been built. Agents already
//! staged in the population are not touched.

use epidermis_types::{Cell, LineageType, Position};
use rand::Rng;
use rand::distr::{Distribution, Uniform};
use tracing::info;

use crate::error::WorldError;
use crate::population::Population;

/// Diameter given to seeded stem cells.
pub const DEFAULT_INITIAL_DIAMETER: f64 = 2.0;

/// Validate a seeding bound and build the sampler for it.
///
/// # Errors
///
/// Returns [`WorldError::InvalidRange`] unless both bounds are finite,
/// `min < max`, and the interval width is representable.
pub fn seeding_range(min: f64, max: f64) -> Result<Uniform<f64>, WorldError> {
    if !(min.is_finite() && max.is_finite() && min < max) {
        return Err(WorldError::InvalidRange { min, max });
    }
    Uniform::new(min, max).map_err(|_range_err| WorldError::InvalidRange { min, max })
}

/// Create `count` agents at random positions on the `z = 0` plane and
/// commit them to `population` as one batch.
///
/// `x` and `y` are drawn independently from `[min, max)`, `x` first, and
/// `builder` turns each position into an agent. Returns `count`: agents
/// staged in `population` by someone else stay staged and are not counted.
///
/// # Errors
///
/// Returns [`WorldError::InvalidRange`] for a malformed bound and
/// [`WorldError::InvalidCount`] for a negative count. Both are checked
/// before the population is touched.
pub fn create_agents<T, R, F>(
    population: &mut Population<T>,
    rng: &mut R,
    min: f64,
    max: f64,
    count: i64,
    mut builder: F,
) -> Result<usize, WorldError>
where
    R: Rng + ?Sized,
    F: FnMut(Position) -> T,
{
    let range = seeding_range(min, max)?;
    let count_usize =
        usize::try_from(count).map_err(|_conversion_err| WorldError::InvalidCount(count))?;

    population.reserve(count_usize);

    let mut batch = Vec::with_capacity(count_usize);
    for _ in 0..count_usize {
        let x = range.sample(rng);
        let y = range.sample(rng);
        batch.push(builder(Position::new(x, y, 0.0)));
    }

    let committed = population.commit_batch(batch);
    info!(count = committed, min, max, population = population.len(), "Agents created");
    Ok(committed)
}

/// Builder for seeded stem cells: stem lineage, stem rule attached,
/// proliferating, with the given diameter.
pub fn stem_cell_builder(diameter: f64) -> impl Fn(Position) -> Cell {
    move |position| Cell::new(position, diameter, LineageType::Stem)
}

//! Step cycle: the four-phase loop that drives the epidermis simulation.
//!
//! Each step runs through these phases:
//!
//! 1. **Clock** -- advance the step counter.
//!
//! 2. **Substrate** -- grow every committed cell and, when the space is
//!    bounded, clamp it back into the bound.
//!
//! 3. **Rules** -- snapshot the committed ids and run each cell's attached
//!    lineage rule exactly once. Daughters produced by divisions are staged,
//!    not committed, so no cell born this step is visited this step.
//!
//! 4. **Commit** -- make every staged daughter visible in one batch.
//!
//! The cycle is deterministic given the same initial population and the
//! same seeded substrate.

use core::fmt;

use epidermis_agents::{AgentError, RuleOutcome, run_rule};
use epidermis_types::{AgentId, PopulationCensus};
use epidermis_world::{
    DivisionPrimitive, GrowthModel, LinearGrowth, Population, SpaceBounds, VolumeSplitDivision,
    WorldError,
};
use rand::Rng;
use tracing::{debug, info};

use crate::clock::{ClockError, StepClock};
use crate::config::SimulationConfig;

/// Errors that can occur during step execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A lineage rule failed for one cell.
    ///
    /// Cells visited earlier in the same step keep their new state, so a
    /// mother that already divided has lost half her volume while her
    /// daughter was discarded. A state that returned this error is
    /// inconsistent and must not be stepped again.
    #[error("rule error for {agent_id}: {source}")]
    Agent {
        /// The cell whose rule failed.
        agent_id: AgentId,
        /// The underlying rule error.
        source: AgentError,
    },

    /// A population operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

/// Summary of a single step's execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSummary {
    /// The step number that was executed.
    pub step: u64,
    /// Cells that divided this step.
    pub divisions: u64,
    /// Cells whose division flag was cleared this step.
    pub retirements: u64,
    /// Differentiated cells that re-affirmed their lineage.
    pub relabels: u64,
    /// Already-retired cells whose rule was skipped.
    pub inactive: u64,
    /// Daughters committed at the end of the step, by lineage.
    pub offspring: PopulationCensus,
    /// The whole population after the commit.
    pub census: PopulationCensus,
}

impl StepSummary {
    /// Number of committed cells after the step.
    pub const fn population(&self) -> u64 {
        self.census.total
    }
}

/// Per-outcome counters gathered during the rule phase.
#[derive(Debug, Default)]
struct RuleTally {
    divisions: u64,
    retirements: u64,
    relabels: u64,
    inactive: u64,
    offspring: PopulationCensus,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// The spatial substrate the rule engine runs on.
pub struct Substrate {
    /// Per-step diameter growth.
    pub growth: Box<dyn GrowthModel>,
    /// Cell division primitive.
    pub division: Box<dyn DivisionPrimitive>,
    /// Clamp applied after growth and to every daughter, if the space is
    /// bounded.
    pub bounds: Option<SpaceBounds>,
}

impl Substrate {
    /// Assemble a substrate from its parts.
    pub const fn new(
        growth: Box<dyn GrowthModel>,
        division: Box<dyn DivisionPrimitive>,
        bounds: Option<SpaceBounds>,
    ) -> Self {
        Self {
            growth,
            division,
            bounds,
        }
    }

    /// Build the reference substrate described by `config`: linear growth,
    /// volume-splitting division drawing from `rng`, and bounded space when
    /// `world.bound_space` is set.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError`] if a growth, jitter or bound parameter is out
    /// of range.
    pub fn from_config<R: Rng + 'static>(
        config: &SimulationConfig,
        rng: R,
    ) -> Result<Self, WorldError> {
        let growth = LinearGrowth::new(config.growth.rate)?;
        let division = VolumeSplitDivision::new(rng, config.growth.division_jitter)?;
        let bounds = if config.world.bound_space {
            Some(SpaceBounds::new(
                config.world.min_bound,
                config.world.max_bound,
            )?)
        } else {
            None
        };
        debug!(
            rate = growth.rate(),
            jitter = config.growth.division_jitter,
            min_bound = bounds.as_ref().map(SpaceBounds::min),
            max_bound = bounds.as_ref().map(SpaceBounds::max),
            "Substrate built"
        );
        Ok(Self::new(Box::new(growth), Box::new(division), bounds))
    }
}

impl fmt::Debug for Substrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Substrate")
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

/// The mutable simulation state passed through the step cycle.
#[derive(Debug)]
pub struct SimulationState {
    /// The step clock.
    pub clock: StepClock,
    /// All committed cells, plus daughters staged during a step.
    pub population: Population,
    /// Growth, division and bounds.
    pub substrate: Substrate,
}

impl SimulationState {
    /// Create a state at step 0.
    pub const fn new(population: Population, substrate: Substrate) -> Self {
        Self {
            clock: StepClock::new(),
            population,
            substrate,
        }
    }
}

// ---------------------------------------------------------------------------
// Step cycle
// ---------------------------------------------------------------------------

/// Execute one complete step of the simulation.
///
/// On error the step is abandoned: daughters staged so far are discarded,
/// while changes already applied to existing cells are kept. The state is
/// not rolled back and must not be passed to `run_step` again.
///
/// # Errors
///
/// Returns [`TickError`] if the clock overflows or a division fails.
pub fn run_step(state: &mut SimulationState) -> Result<StepSummary, TickError> {
    // --- Phase 1: Clock ---
    let step = state.clock.advance()?;
    debug!(step, population = state.population.len(), "Step started");

    // --- Phase 2: Substrate ---
    phase_substrate(state);

    // --- Phase 3: Rules ---
    let tally = match phase_rules(state, step) {
        Ok(tally) => tally,
        Err(err) => {
            let dropped = state.population.discard_staged();
            debug!(step, dropped, "Discarded staged daughters after rule failure");
            return Err(err);
        }
    };

    // --- Phase 4: Commit ---
    let born = state.population.commit();
    let census = state.population.census();

    info!(
        step,
        divisions = tally.divisions,
        born,
        retirements = tally.retirements,
        population = census.total,
        stem = census.stem,
        transit_amplifying = census.transit_amplifying,
        differentiated = census.differentiated,
        "Step completed"
    );

    Ok(StepSummary {
        step,
        divisions: tally.divisions,
        retirements: tally.retirements,
        relabels: tally.relabels,
        inactive: tally.inactive,
        offspring: tally.offspring,
        census,
    })
}

/// Phase 2: grow every committed cell and clamp it into the bound.
fn phase_substrate(state: &mut SimulationState) {
    let substrate = &mut state.substrate;
    for (_, cell) in state.population.iter_mut() {
        substrate.growth.grow(cell);
        if let Some(bounds) = &substrate.bounds {
            bounds.apply(cell);
        }
    }
}

/// Phase 3: run every committed cell's rule once, staging daughters.
fn phase_rules(state: &mut SimulationState, step: u64) -> Result<RuleTally, TickError> {
    let mut tally = RuleTally::default();

    for agent_id in state.population.ids() {
        let cell = state.population.require_mut(agent_id)?;
        let outcome = run_rule(cell, state.substrate.division.as_mut())
            .map_err(|source| TickError::Agent { agent_id, source })?;

        match outcome {
            RuleOutcome::Divided(mut daughter) => {
                if let Some(bounds) = &state.substrate.bounds {
                    bounds.apply(&mut daughter);
                }
                debug!(
                    step,
                    %agent_id,
                    daughter = %daughter.lineage(),
                    diameter = daughter.diameter,
                    "Cell divided"
                );
                tally.divisions = tally.divisions.saturating_add(1);
                tally.offspring.record(&daughter);
                state.population.stage(daughter);
            }
            RuleOutcome::Retired => {
                debug!(step, %agent_id, "Cell retired");
                tally.retirements = tally.retirements.saturating_add(1);
            }
            RuleOutcome::Relabelled => {
                tally.relabels = tally.relabels.saturating_add(1);
            }
            RuleOutcome::Inactive => {
                tally.inactive = tally.inactive.saturating_add(1);
            }
            RuleOutcome::Unchanged => {}
        }
    }

    Ok(tally)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use epidermis_types::{Cell, LineageType, Position};
    use epidermis_world::DivisionError;

    use super::*;

    /// Growth model that does nothing.
    struct NoGrowth;

    impl GrowthModel for NoGrowth {
        fn grow(&mut self, _cell: &mut Cell) {}
    }

    /// Division primitive that duplicates the mother in place.
    struct Duplicate;

    impl DivisionPrimitive for Duplicate {
        fn divide(&mut self, mother: &mut Cell) -> Result<Cell, DivisionError> {
            Ok(mother.clone())
        }
    }

    /// Division primitive that always fails.
    struct Refuse;

    impl DivisionPrimitive for Refuse {
        fn divide(&mut self, _mother: &mut Cell) -> Result<Cell, DivisionError> {
            Err(DivisionError::RetiredMother)
        }
    }

    /// Division primitive that halves the first mother and refuses the rest.
    #[derive(Default)]
    struct HalveOnce {
        divided: bool,
    }

    impl DivisionPrimitive for HalveOnce {
        fn divide(&mut self, mother: &mut Cell) -> Result<Cell, DivisionError> {
            if self.divided {
                return Err(DivisionError::RetiredMother);
            }
            self.divided = true;
            mother.diameter /= 2.0;
            Ok(mother.clone())
        }
    }

    fn state_with(cells: Vec<Cell>, division: Box<dyn DivisionPrimitive>) -> SimulationState {
        let mut population = Population::new();
        for cell in cells {
            population.stage(cell);
        }
        population.commit();
        SimulationState::new(population, Substrate::new(Box::new(NoGrowth), division, None))
    }

    fn cell(lineage: LineageType, diameter: f64) -> Cell {
        Cell::new(Position::new(5.0, 5.0, 0.0), diameter, lineage)
    }

    #[test]
    fn step_advances_clock() {
        let mut state = state_with(Vec::new(), Box::new(Duplicate));
        let summary = run_step(&mut state).unwrap();
        assert_eq!(summary.step, 1);
        assert_eq!(state.clock.step(), 1);
        assert_eq!(summary.population(), 0);
    }

    #[test]
    fn daughters_are_committed_after_the_rule_phase() {
        let mut state = state_with(vec![cell(LineageType::Stem, 2.0)], Box::new(Duplicate));
        let summary = run_step(&mut state).unwrap();

        assert_eq!(summary.divisions, 1);
        assert_eq!(summary.offspring.stem, 1);
        assert_eq!(state.population.len(), 2);
        assert_eq!(state.population.staged_len(), 0);
    }

    #[test]
    fn daughters_are_not_visited_in_their_birth_step() {
        // With in-place duplication every visited cell divides; if daughters
        // were visited the count would cascade.
        let cells = vec![cell(LineageType::Stem, 2.0); 3];
        let mut state = state_with(cells, Box::new(Duplicate));
        let summary = run_step(&mut state).unwrap();
        assert_eq!(summary.divisions, 3);
        assert_eq!(summary.population(), 6);
    }

    #[test]
    fn summary_counts_each_outcome() {
        let mut retired = cell(LineageType::Stem, 2.0);
        retired.set_can_divide(false);
        let cells = vec![
            cell(LineageType::Stem, 6.0),
            cell(LineageType::Stem, 9.0),
            cell(LineageType::Differentiated, 11.0),
            retired,
        ];
        let mut state = state_with(cells, Box::new(Duplicate));
        let summary = run_step(&mut state).unwrap();

        assert_eq!(summary.divisions, 1);
        assert_eq!(summary.offspring.transit_amplifying, 1);
        assert_eq!(summary.retirements, 1);
        assert_eq!(summary.relabels, 1);
        assert_eq!(summary.inactive, 1);
        assert_eq!(summary.census.total, 5);
        assert_eq!(summary.census.retired, 2);
    }

    #[test]
    fn division_failure_aborts_step_and_discards_daughters() {
        let mut state = state_with(vec![cell(LineageType::Stem, 2.0)], Box::new(Refuse));
        let err = run_step(&mut state).unwrap_err();
        assert!(matches!(err, TickError::Agent { .. }));
        assert_eq!(state.population.len(), 1);
        assert_eq!(state.population.staged_len(), 0);
    }

    #[test]
    fn failed_step_keeps_split_mothers_and_drops_their_daughters() {
        let cells = vec![cell(LineageType::Stem, 2.0); 2];
        let mut state = state_with(cells, Box::new(HalveOnce::default()));
        let err = run_step(&mut state).unwrap_err();

        assert!(matches!(err, TickError::Agent { agent_id, .. } if agent_id == AgentId::new(1)));
        assert_eq!(state.population.len(), 2);
        assert_eq!(state.population.staged_len(), 0);
        let first = state.population.get(AgentId::new(0)).unwrap();
        let second = state.population.get(AgentId::new(1)).unwrap();
        assert!((first.diameter - 1.0).abs() < f64::EPSILON);
        assert!((second.diameter - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_diameter_stem_divides_with_reference_division() {
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        let division = VolumeSplitDivision::new(StdRng::seed_from_u64(2), 0.5).unwrap();
        let mut state = state_with(vec![cell(LineageType::Stem, 0.0)], Box::new(division));
        let summary = run_step(&mut state).unwrap();

        assert_eq!(summary.divisions, 1);
        assert_eq!(summary.offspring.stem, 1);
        assert_eq!(state.population.len(), 2);
    }

    #[test]
    fn bounds_clamp_grown_cells_and_daughters() {
        let mut population = Population::new();
        population.stage(Cell::new(Position::new(-5.0, 300.0, 0.0), 2.0, LineageType::Stem));
        population.commit();
        let substrate = Substrate::new(
            Box::new(NoGrowth),
            Box::new(Duplicate),
            Some(SpaceBounds::new(0.0, 250.0).unwrap()),
        );
        let mut state = SimulationState::new(population, substrate);
        run_step(&mut state).unwrap();

        for (_, cell) in state.population.iter() {
            assert_eq!(cell.position.to_array(), [0.0, 250.0, 0.0]);
        }
    }

    #[test]
    fn substrate_from_default_config_is_bounded() {
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        let substrate =
            Substrate::from_config(&SimulationConfig::default(), StdRng::seed_from_u64(1))
                .unwrap();
        let bounds = substrate.bounds.unwrap();
        assert!(bounds.min().abs() < f64::EPSILON);
        assert!((bounds.max() - 250.0).abs() < f64::EPSILON);
    }
}

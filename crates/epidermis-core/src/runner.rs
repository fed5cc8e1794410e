//! Bounded simulation loop.
//!
//! [`run_simulation`] drives [`run_step`] a fixed number of times, invokes a
//! [`TickCallback`] after every completed step, and returns a
//! [`SimulationResult`] with the final census and wall-clock timings. Any
//! step error aborts the run.
//!
//! [`run_step`]: crate::tick::run_step

use chrono::{DateTime, Utc};
use epidermis_types::PopulationCensus;
use tracing::{info, warn};

use crate::tick::{self, SimulationState, StepSummary, TickError};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A step execution failed.
    #[error("step error: {source}")]
    Tick {
        /// The underlying step error.
        #[from]
        source: TickError,
    },
}

/// Result of the simulation run.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Total number of steps executed.
    pub total_steps: u64,
    /// The last step summary, if any step ran.
    pub final_summary: Option<StepSummary>,
    /// Population census at the end of the run.
    pub census: PopulationCensus,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

impl SimulationResult {
    /// Wall-clock duration of the run in milliseconds.
    pub fn elapsed_ms(&self) -> i64 {
        self.finished_at
            .signed_duration_since(self.started_at)
            .num_milliseconds()
    }
}

/// Callback invoked after each step completes.
///
/// The callback receives the step summary and the current simulation state.
pub trait TickCallback: Send {
    /// Called after a step completes successfully.
    fn on_tick(&mut self, summary: &StepSummary, state: &SimulationState);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &StepSummary, _state: &SimulationState) {}
}

/// Run `steps` steps of the simulation.
///
/// # Errors
///
/// Returns [`RunnerError`] if a step fails. Steps completed before the
/// failure keep their effects on `state`.
pub fn run_simulation(
    state: &mut SimulationState,
    steps: u64,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let started_at = Utc::now();
    let mut final_summary: Option<StepSummary> = None;
    let mut total_steps: u64 = 0;

    info!(
        steps,
        start_step = state.clock.step(),
        population = state.population.len(),
        "Simulation starting"
    );

    while total_steps < steps {
        let summary = tick::run_step(state)?;
        total_steps = total_steps.saturating_add(1);
        callback.on_tick(&summary, state);
        final_summary = Some(summary);
    }

    Ok(SimulationResult {
        total_steps,
        final_summary,
        census: state.population.census(),
        started_at,
        finished_at: Utc::now(),
    })
}

/// Log the outcome of a run.
pub fn log_simulation_end(result: &SimulationResult) {
    let census = &result.census;
    info!(
        total_steps = result.total_steps,
        elapsed_ms = result.elapsed_ms(),
        population = census.total,
        stem = census.stem,
        transit_amplifying = census.transit_amplifying,
        differentiated = census.differentiated,
        active = census.active,
        retired = census.retired,
        "Simulation ended"
    );

    if result.final_summary.is_none() {
        warn!("Simulation ended with no steps executed");
    }
}

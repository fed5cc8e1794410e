//! Tick callback that records the population census after every step.
//!
//! The engine serializes the recorded history to JSON at the end of a run
//! for downstream analysis.

use epidermis_core::runner::TickCallback;
use epidermis_core::tick::{SimulationState, StepSummary};
use epidermis_types::PopulationCensus;
use serde::Serialize;
use tracing::debug;

/// One step's worth of census data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    /// Step number.
    pub step: u64,
    /// Cells that divided during the step.
    pub divisions: u64,
    /// Cells retired during the step.
    pub retirements: u64,
    /// Population after the step.
    pub census: PopulationCensus,
}

impl From<&StepSummary> for StepRecord {
    fn from(summary: &StepSummary) -> Self {
        Self {
            step: summary.step,
            divisions: summary.divisions,
            retirements: summary.retirements,
            census: summary.census,
        }
    }
}

/// Callback that accumulates a [`StepRecord`] per completed step.
#[derive(Debug, Default)]
pub struct CensusCallback {
    history: Vec<StepRecord>,
}

impl CensusCallback {
    /// Create a callback with an empty history.
    pub const fn new() -> Self {
        Self {
            history: Vec::new(),
        }
    }

    /// Records gathered so far, in step order.
    pub fn history(&self) -> &[StepRecord] {
        &self.history
    }

    /// Serialize the history as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if encoding fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.history)
    }
}

impl TickCallback for CensusCallback {
    fn on_tick(&mut self, summary: &StepSummary, state: &SimulationState) {
        debug!(
            step = summary.step,
            staged = state.population.staged_len(),
            population = summary.census.total,
            "Census recorded"
        );
        self.history.push(StepRecord::from(summary));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn summary(step: u64, total: u64) -> StepSummary {
        StepSummary {
            step,
            divisions: 1,
            retirements: 0,
            relabels: 0,
            inactive: 0,
            offspring: PopulationCensus::default(),
            census: PopulationCensus {
                total,
                stem: total,
                active: total,
                ..PopulationCensus::default()
            },
        }
    }

    #[test]
    fn record_copies_summary_fields() {
        let record = StepRecord::from(&summary(3, 8));
        assert_eq!(record.step, 3);
        assert_eq!(record.divisions, 1);
        assert_eq!(record.census.stem, 8);
    }

    #[test]
    fn history_serializes_as_json_array() {
        let mut callback = CensusCallback::new();
        callback.history.push(StepRecord::from(&summary(1, 2)));
        callback.history.push(StepRecord::from(&summary(2, 4)));

        let value: serde_json::Value = serde_json::from_str(&callback.to_json().unwrap()).unwrap();
        let steps = value.as_array().unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps.get(1).unwrap()["census"]["total"], 4);
    }
}

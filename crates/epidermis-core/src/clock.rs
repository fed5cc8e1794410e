//! Step clock for the epidermis simulation.
//!
//! The clock is the single source of truth for simulation time. It counts
//! completed steps and advances with checked arithmetic, once at the start
//! of every step.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Step counter would overflow.
    #[error("step counter overflow: cannot advance beyond u64::MAX")]
    StepOverflow,
}

/// Counter of simulation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepClock {
    /// Current step number (0 before the first step, incremented at the
    /// start of each step).
    step: u64,
}

impl StepClock {
    /// Create a clock at step 0.
    pub const fn new() -> Self {
        Self { step: 0 }
    }

    /// Create a clock at an arbitrary step (useful for testing and state
    /// restoration).
    pub const fn at(step: u64) -> Self {
        Self { step }
    }

    /// Advance the clock by one step. Returns the new step number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::StepOverflow`] if the counter would exceed
    /// `u64::MAX`. The clock is unchanged in that case.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.step = self.step.checked_add(1).ok_or(ClockError::StepOverflow)?;
        Ok(self.step)
    }

    /// Return the current step number.
    pub const fn step(&self) -> u64 {
        self.step
    }
}

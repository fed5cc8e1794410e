//! Error types for the `epidermis-world` crate.
//!
//! Factory and substrate construction return [`WorldError`]; division
//! primitives return [`DivisionError`](crate::substrate::DivisionError).

use epidermis_types::AgentId;

/// Errors that can occur during population and substrate operations.
///
/// Every variant is detected before any mutation takes place, so a failed
/// call leaves the population untouched.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The spatial bound is malformed: not finite, not strictly increasing,
    /// or too wide to sample from.
    #[error("invalid range: min bound {min} must be finite and strictly below max bound {max}")]
    InvalidRange {
        /// Lower bound supplied by the caller.
        min: f64,
        /// Upper bound supplied by the caller.
        max: f64,
    },

    /// A negative number of agents was requested.
    #[error("invalid agent count: {0} (must be non-negative)")]
    InvalidCount(i64),

    /// An agent was not found in the population.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// A growth rate was negative or not finite.
    #[error("invalid growth rate: {0} (must be finite and non-negative)")]
    InvalidGrowthRate(f64),

    /// A division jitter fraction was negative or not finite.
    #[error("invalid division jitter: {0} (must be finite and non-negative)")]
    InvalidJitter(f64),
}

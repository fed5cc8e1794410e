//! Error types for the epidermis-agents crate.
//!
//! Rule selection itself cannot fail; the only fallible step is the call
//! into the substrate's division primitive, which is wrapped here with the
//! rule that requested it.

use epidermis_types::LineageRule;
use epidermis_world::DivisionError;

/// Errors that can occur while running a lineage rule.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The division primitive refused to divide the cell.
    #[error("division requested by {rule} failed: {source}")]
    Division {
        /// The rule that asked for the division.
        rule: LineageRule,
        /// The substrate failure.
        source: DivisionError,
    },
}

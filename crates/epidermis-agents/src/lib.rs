//! Lineage rules for the epidermis simulation.
//!
//! This crate decides, per cell and per step, whether a cell divides,
//! retires, or re-affirms its lineage. It holds no state of its own and
//! touches cells only through the accessors in `epidermis-types`, calling
//! into the substrate (`epidermis-world`) only to divide.
//!
//! # Modules
//!
//! - [`differentiation`] -- Threshold ladders, branch selection ([`decide`]), and rule application ([`run_rule`])
//! - [`error`] -- Error types for rule execution ([`AgentError`])

pub mod differentiation;
pub mod error;

// Re-export primary types at crate root for convenience.
pub use differentiation::{
    DIFFERENTIATED_RELABEL_ABOVE, Decision, DivisionLadder, RuleOutcome, STEM_LADDER,
    TRANSIT_AMPLIFYING_LADDER, decide, ladder, run_rule, select_branch,
};
pub use error::AgentError;

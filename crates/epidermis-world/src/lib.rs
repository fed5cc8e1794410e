//! Population storage, agent factory, and spatial substrate for the
//! epidermis simulation.
//!
//! This crate owns everything the lineage rules treat as external: where
//! agents are stored, how the initial population is seeded, and how cells
//! grow and divide in space.
//!
//! # Modules
//!
//! - [`error`] -- Error types for factory and substrate operations.
//! - [`factory`] -- Bulk creation of agents at random positions on the
//!   `z = 0` plane, committed as a single batch.
//! - [`population`] -- [`Population`], the owning arena with staged inserts
//!   and bulk commit.
//! - [`substrate`] -- Growth and division interfaces plus the reference
//!   implementations and bounded-space clamping.

pub mod error;
pub mod factory;
pub mod population;
pub mod substrate;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use factory::{DEFAULT_INITIAL_DIAMETER, create_agents, stem_cell_builder};
pub use population::Population;
pub use substrate::{
    DivisionError, DivisionPrimitive, GrowthModel, LinearGrowth, SpaceBounds, VolumeSplitDivision,
};

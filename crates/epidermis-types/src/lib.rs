//! Shared type definitions for the epidermis lineage simulation.
//!
//! This crate is the single source of truth for the data that flows between
//! the world (population storage and substrate), the rule engine and the
//! simulation driver.
//!
//! # Modules
//!
//! - [`ids`] -- Arena-slot identifier for agents
//! - [`enums`] -- Lineage stages and the behaviour rules bound to them
//! - [`structs`] -- The [`Cell`] agent, [`Position`], and population census

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{LineageRule, LineageType};
pub use ids::AgentId;
pub use structs::{Cell, PopulationCensus, Position};

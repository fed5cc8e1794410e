//! Type-safe identifier for agents in the population arena.
//!
//! Agents are stored in an owning arena (see `epidermis-world`); an
//! [`AgentId`] is the slot index assigned when an agent is committed. Slots
//! are never reused because the rule engine never removes agents, so an id
//! stays valid for the lifetime of the population that issued it.

use serde::{Deserialize, Serialize};

/// Unique identifier for an agent in the simulation.
///
/// Identifiers are issued by the population at commit time, in commit
/// order. They carry no meaning beyond identity and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(usize);

impl AgentId {
    /// Create an identifier from a raw arena slot index.
    pub const fn new(slot: usize) -> Self {
        Self(slot)
    }

    /// Return the arena slot index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl core::fmt::Display for AgentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

impl From<usize> for AgentId {
    fn from(slot: usize) -> Self {
        Self(slot)
    }
}

impl From<AgentId> for usize {
    fn from(id: AgentId) -> Self {
        id.0
    }
}

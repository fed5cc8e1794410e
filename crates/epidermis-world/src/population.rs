//! Owning arena for simulation agents with staged, bulk-committed inserts.
//!
//! New agents are first *staged*: they exist, but no reader of the
//! population can see them. [`Population::commit`] moves every staged agent
//! into the visible arena in one operation and assigns each one an
//! [`AgentId`] equal to its slot index. Slots are never freed, so ids stay
//! stable for the lifetime of the population.
//!
//! The factory builds its batch locally and hands it to
//! [`Population::commit_batch`], which leaves the staging buffer alone. The
//! step scheduler stages offspring during the rule phase and commits them
//! after every existing agent has run, which keeps newborns out of the step
//! that created them.

use epidermis_types::{AgentId, Cell, PopulationCensus};

use crate::error::WorldError;

/// Arena of committed agents plus a staging buffer of pending inserts.
///
/// Generic over the stored agent type so the factory can populate any
/// agent representation; the simulation itself uses [`Cell`].
#[derive(Debug, Clone)]
pub struct Population<T = Cell> {
    /// Visible agents, indexed by [`AgentId::index`].
    committed: Vec<T>,
    /// Agents awaiting the next commit. Invisible to every accessor except
    /// [`Population::staged_len`].
    staged: Vec<T>,
}

impl<T> Population<T> {
    /// Create an empty population.
    pub const fn new() -> Self {
        Self {
            committed: Vec::new(),
            staged: Vec::new(),
        }
    }

    /// Reserve room for `additional` more committed agents.
    ///
    /// Capacity is a hint; inserting beyond it is always allowed.
    pub fn reserve(&mut self, additional: usize) {
        self.committed.reserve(additional);
    }

    /// Stage an agent for the next commit.
    pub fn stage(&mut self, agent: T) {
        self.staged.push(agent);
    }

    /// Make every staged agent visible at once.
    ///
    /// Returns the number of agents committed. Committed agents receive
    /// consecutive ids in staging order.
    pub fn commit(&mut self) -> usize {
        let committed = self.staged.len();
        self.committed.append(&mut self.staged);
        committed
    }

    /// Commit a caller-built batch directly, bypassing the staging buffer.
    ///
    /// Agents already staged stay staged. Returns the size of `batch`.
    pub fn commit_batch(&mut self, mut batch: Vec<T>) -> usize {
        let committed = batch.len();
        self.committed.append(&mut batch);
        committed
    }

    /// Drop every staged agent without committing it.
    pub fn discard_staged(&mut self) -> usize {
        let dropped = self.staged.len();
        self.staged.clear();
        dropped
    }

    /// Number of committed agents.
    pub fn len(&self) -> usize {
        self.committed.len()
    }

    /// Whether no agent has been committed.
    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }

    /// Number of agents waiting for the next commit.
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    /// Look up a committed agent.
    pub fn get(&self, id: AgentId) -> Option<&T> {
        self.committed.get(id.index())
    }

    /// Look up a committed agent, failing with [`WorldError::AgentNotFound`].
    pub fn require_mut(&mut self, id: AgentId) -> Result<&mut T, WorldError> {
        self.committed
            .get_mut(id.index())
            .ok_or(WorldError::AgentNotFound(id))
    }

    /// Ids of all committed agents, in slot order.
    ///
    /// The returned list is a snapshot: agents committed afterwards are not
    /// in it.
    pub fn ids(&self) -> Vec<AgentId> {
        (0..self.committed.len()).map(AgentId::new).collect()
    }

    /// Iterate over committed agents with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &T)> {
        self.committed
            .iter()
            .enumerate()
            .map(|(slot, agent)| (AgentId::new(slot), agent))
    }

    /// Iterate mutably over committed agents with their ids.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (AgentId, &mut T)> {
        self.committed
            .iter_mut()
            .enumerate()
            .map(|(slot, agent)| (AgentId::new(slot), agent))
    }

    /// Committed agents as a slice, in slot order.
    pub fn as_slice(&self) -> &[T] {
        &self.committed
    }
}

impl Population<Cell> {
    /// Count committed cells by lineage and division eligibility.
    pub fn census(&self) -> PopulationCensus {
        self.committed.iter().collect()
    }
}

impl<T> Default for Population<T> {
    fn default() -> Self {
        Self::new()
    }
}

//! Enumeration types for the epidermis simulation.
//!
//! Two closed sets live here: the lineage stage a cell has reached, and the
//! behaviour rule attached to it. The rule is what runs each step; the
//! lineage is what the cell records about itself. [`LineageRule::for_lineage`]
//! maps one to the other.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Lineage stages
// ---------------------------------------------------------------------------

/// The differentiation stage of a cell.
///
/// Stages progress `Stem` -> `TransitAmplifying` -> `Differentiated` through
/// division; a cell never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LineageType {
    /// Self-renewing stem cell (basal layer).
    Stem,
    /// Transit-amplifying cell, a committed but still proliferating progenitor.
    TransitAmplifying,
    /// Terminally differentiated cell; never divides.
    Differentiated,
}

impl LineageType {
    /// Every lineage stage, in progression order.
    pub const ALL: [Self; 3] = [Self::Stem, Self::TransitAmplifying, Self::Differentiated];

    /// Short label used in logs and reports.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stem => "stem",
            Self::TransitAmplifying => "transit_amplifying",
            Self::Differentiated => "differentiated",
        }
    }
}

impl core::fmt::Display for LineageType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Behaviour rules
// ---------------------------------------------------------------------------

/// Identity of the behaviour rule attached to a cell.
///
/// The rule carries no state of its own; the decision logic lives in
/// `epidermis-agents`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LineageRule {
    /// Stem rule: self-renew below 5, emit transit-amplifying progeny below 8.
    Stem,
    /// Transit-amplifying rule: self-renew below 8, emit differentiated progeny below 10.
    TransitAmplifying,
    /// Differentiated rule: no division.
    Differentiated,
}

impl LineageRule {
    /// The rule that must be attached to a cell of the given lineage.
    pub const fn for_lineage(lineage: LineageType) -> Self {
        match lineage {
            LineageType::Stem => Self::Stem,
            LineageType::TransitAmplifying => Self::TransitAmplifying,
            LineageType::Differentiated => Self::Differentiated,
        }
    }

    /// The lineage this rule governs.
    pub const fn lineage(self) -> LineageType {
        match self {
            Self::Stem => LineageType::Stem,
            Self::TransitAmplifying => LineageType::TransitAmplifying,
            Self::Differentiated => LineageType::Differentiated,
        }
    }
}

impl core::fmt::Display for LineageRule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}_rule", self.lineage().label())
    }
}

//! Core entity structs for the epidermis simulation.
//!
//! [`Cell`] is the single agent type. Its lineage and attached rule are kept
//! private so the only way to change one is [`Cell::set_lineage`], which
//! rebinds the other in the same call.

use serde::{Deserialize, Serialize};

use crate::enums::{LineageRule, LineageType};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A point in the three-dimensional simulation space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate (the migration axis; seeded cells start at 0).
    pub z: f64,
}

impl Position {
    /// The origin.
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a position from its three coordinates.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Return the coordinates as an `[x, y, z]` array.
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Translate by the given displacement.
    pub fn offset(self, dx: f64, dy: f64, dz: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Clamp every coordinate into `[min, max]`.
    pub fn clamp(self, min: f64, max: f64) -> Self {
        Self::new(
            self.x.max(min).min(max),
            self.y.max(min).min(max),
            self.z.max(min).min(max),
        )
    }

    /// Euclidean distance to another position.
    pub fn distance(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dz.mul_add(dz, dx.mul_add(dx, dy * dy)).sqrt()
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// A simulated epidermal cell.
///
/// `position` and `diameter` belong to the spatial substrate; the lineage,
/// the attached rule and the division flag belong to the rule engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    /// Centre of the cell.
    pub position: Position,
    /// Cell diameter (non-negative).
    pub diameter: f64,
    /// Recorded differentiation stage.
    lineage: LineageType,
    /// Behaviour rule run for this cell each step. Always matches `lineage`.
    rule: LineageRule,
    /// Whether the cell may still divide. Once cleared it is never set again
    /// by the rule engine.
    can_divide: bool,
}

impl Cell {
    /// Create a proliferating cell of the given lineage with its matching
    /// rule attached.
    pub const fn new(position: Position, diameter: f64, lineage: LineageType) -> Self {
        Self {
            position,
            diameter,
            lineage,
            rule: LineageRule::for_lineage(lineage),
            can_divide: true,
        }
    }

    /// Recorded differentiation stage.
    pub const fn lineage(&self) -> LineageType {
        self.lineage
    }

    /// Rule currently attached to the cell.
    pub const fn rule(&self) -> LineageRule {
        self.rule
    }

    /// Whether the cell may still divide.
    pub const fn can_divide(&self) -> bool {
        self.can_divide
    }

    /// Set the lineage and attach the matching rule.
    pub const fn set_lineage(&mut self, lineage: LineageType) {
        self.lineage = lineage;
        self.rule = LineageRule::for_lineage(lineage);
    }

    /// Set the division flag.
    pub const fn set_can_divide(&mut self, can_divide: bool) {
        self.can_divide = can_divide;
    }

    /// Cell radius.
    pub fn radius(&self) -> f64 {
        self.diameter / 2.0
    }

    /// Cell volume, treating the cell as a sphere.
    pub fn volume(&self) -> f64 {
        core::f64::consts::FRAC_PI_6 * self.diameter.powi(3)
    }
}

// ---------------------------------------------------------------------------
// Population census
// ---------------------------------------------------------------------------

/// Head counts of a population, by lineage and by division eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PopulationCensus {
    /// All cells counted.
    pub total: u64,
    /// Stem cells.
    pub stem: u64,
    /// Transit-amplifying cells.
    pub transit_amplifying: u64,
    /// Differentiated cells.
    pub differentiated: u64,
    /// Cells that may still divide.
    pub active: u64,
    /// Cells whose division flag has been cleared.
    pub retired: u64,
}

impl PopulationCensus {
    /// Count one cell.
    pub const fn record(&mut self, cell: &Cell) {
        self.total = self.total.saturating_add(1);
        match cell.lineage() {
            LineageType::Stem => self.stem = self.stem.saturating_add(1),
            LineageType::TransitAmplifying => {
                self.transit_amplifying = self.transit_amplifying.saturating_add(1);
            }
            LineageType::Differentiated => {
                self.differentiated = self.differentiated.saturating_add(1);
            }
        }
        if cell.can_divide() {
            self.active = self.active.saturating_add(1);
        } else {
            self.retired = self.retired.saturating_add(1);
        }
    }

    /// Number of counted cells of the given lineage.
    pub const fn count(&self, lineage: LineageType) -> u64 {
        match lineage {
            LineageType::Stem => self.stem,
            LineageType::TransitAmplifying => self.transit_amplifying,
            LineageType::Differentiated => self.differentiated,
        }
    }
}

impl<'a> FromIterator<&'a Cell> for PopulationCensus {
    fn from_iter<I: IntoIterator<Item = &'a Cell>>(cells: I) -> Self {
        let mut census = Self::default();
        for cell in cells {
            census.record(cell);
        }
        census
    }
}

//! Reference spatial substrate: diameter growth, cell division, bounded space.
//!
//! The rule engine consumes two narrow interfaces from the substrate:
//! [`GrowthModel`], which advances every cell's diameter once per step before
//! rules run, and [`DivisionPrimitive`], which splits one cell into two when
//! a rule asks for it. The reference implementations:
//!
//! - [`LinearGrowth`] adds a fixed amount to the diameter each step.
//! - [`VolumeSplitDivision`] halves the mother's volume between mother and
//!   daughter and places the daughter one daughter-radius (plus jitter) away
//!   along a random direction. Randomness comes from an owned, seedable RNG
//!   so runs are reproducible.
//! - [`SpaceBounds`] clamps positions into the simulation cube.

use epidermis_types::Cell;
use rand::Rng;
use tracing::trace;

use crate::error::WorldError;

/// Errors raised by a division primitive.
///
/// A division failure is a substrate fault; callers treat it as fatal for the
/// current step.
#[derive(Debug, thiserror::Error)]
pub enum DivisionError {
    /// The mother has been retired and must not divide.
    #[error("cannot divide a retired cell")]
    RetiredMother,

    /// The mother's diameter is negative or not finite.
    #[error("cannot divide a cell with diameter {diameter}")]
    InvalidMother {
        /// The offending diameter.
        diameter: f64,
    },
}

// ---------------------------------------------------------------------------
// Interfaces
// ---------------------------------------------------------------------------

/// Advances a cell's diameter (and, for richer models, its position) by one
/// step.
pub trait GrowthModel {
    /// Grow one cell by one step.
    fn grow(&mut self, cell: &mut Cell);
}

/// Splits a mother cell into mother plus a new daughter.
pub trait DivisionPrimitive {
    /// Divide `mother`, returning the not-yet-registered daughter.
    ///
    /// The daughter is a fresh value with storage independent of the mother,
    /// positioned near her, and inherits her lineage and division flag. The
    /// caller is responsible for relabelling the daughter and for inserting
    /// it into the population.
    ///
    /// # Errors
    ///
    /// Returns [`DivisionError`] if the mother cannot be divided.
    fn divide(&mut self, mother: &mut Cell) -> Result<Cell, DivisionError>;
}

// ---------------------------------------------------------------------------
// Growth
// ---------------------------------------------------------------------------

/// Constant-rate diameter growth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearGrowth {
    /// Diameter added per step.
    rate: f64,
}

impl LinearGrowth {
    /// Create a growth model adding `rate` to the diameter every step.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidGrowthRate`] if `rate` is negative or not
    /// finite.
    pub fn new(rate: f64) -> Result<Self, WorldError> {
        if !(rate.is_finite() && rate >= 0.0) {
            return Err(WorldError::InvalidGrowthRate(rate));
        }
        Ok(Self { rate })
    }

    /// Diameter added per step.
    pub const fn rate(&self) -> f64 {
        self.rate
    }
}

impl GrowthModel for LinearGrowth {
    fn grow(&mut self, cell: &mut Cell) {
        cell.diameter += self.rate;
    }
}

// ---------------------------------------------------------------------------
// Division
// ---------------------------------------------------------------------------

/// Volume-conserving division along a random axis.
#[derive(Debug, Clone)]
pub struct VolumeSplitDivision<R> {
    /// Source of division axes and jitter.
    rng: R,
    /// Extra displacement as a fraction of the daughter radius, drawn
    /// uniformly from `[0, jitter)`.
    jitter: f64,
}

impl<R: Rng> VolumeSplitDivision<R> {
    /// Create a division primitive drawing randomness from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidJitter`] if `jitter` is negative or not
    /// finite.
    pub fn new(rng: R, jitter: f64) -> Result<Self, WorldError> {
        if !(jitter.is_finite() && jitter >= 0.0) {
            return Err(WorldError::InvalidJitter(jitter));
        }
        Ok(Self { rng, jitter })
    }

    /// Draw a uniformly distributed unit vector.
    fn random_direction(&mut self) -> (f64, f64, f64) {
        let azimuth = self.rng.random_range(0.0..core::f64::consts::TAU);
        let cos_polar: f64 = self.rng.random_range(-1.0..=1.0);
        let sin_polar = cos_polar.mul_add(-cos_polar, 1.0).max(0.0).sqrt();
        (sin_polar * azimuth.cos(), sin_polar * azimuth.sin(), cos_polar)
    }
}

impl<R: Rng> DivisionPrimitive for VolumeSplitDivision<R> {
    fn divide(&mut self, mother: &mut Cell) -> Result<Cell, DivisionError> {
        if !mother.can_divide() {
            return Err(DivisionError::RetiredMother);
        }
        let diameter = mother.diameter;
        if !(diameter.is_finite() && diameter >= 0.0) {
            return Err(DivisionError::InvalidMother { diameter });
        }

        // Half the volume each: d' = d / cbrt(2).
        let split_diameter = diameter / 2.0_f64.cbrt();
        let jitter = if self.jitter > 0.0 {
            self.rng.random_range(0.0..self.jitter)
        } else {
            0.0
        };
        let distance = split_diameter / 2.0 * (1.0 + jitter);
        let (dx, dy, dz) = self.random_direction();

        mother.diameter = split_diameter;

        let mut daughter = Cell::new(
            mother.position.offset(dx * distance, dy * distance, dz * distance),
            split_diameter,
            mother.lineage(),
        );
        daughter.set_can_divide(mother.can_divide());

        trace!(
            diameter,
            split_diameter,
            distance,
            lineage = %mother.lineage(),
            "Cell divided"
        );
        Ok(daughter)
    }
}

// ---------------------------------------------------------------------------
// Bounded space
// ---------------------------------------------------------------------------

/// Axis-aligned cube `[min, max]^3` that positions are clamped into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpaceBounds {
    /// Lower bound on every axis.
    min: f64,
    /// Upper bound on every axis.
    max: f64,
}

impl SpaceBounds {
    /// Create bounds covering `[min, max]` on every axis.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidRange`] unless both bounds are finite
    /// and `min < max`.
    pub fn new(min: f64, max: f64) -> Result<Self, WorldError> {
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(WorldError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Lower bound.
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound.
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Clamp the cell's position into the bounds.
    pub fn apply(&self, cell: &mut Cell) {
        cell.position = cell.position.clamp(self.min, self.max);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use epidermis_types::{LineageType, Position};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn divider(seed: u64) -> VolumeSplitDivision<StdRng> {
        VolumeSplitDivision::new(StdRng::seed_from_u64(seed), 0.5).unwrap()
    }

    #[test]
    fn linear_growth_adds_rate() {
        let mut growth = LinearGrowth::new(2.5).unwrap();
        let mut cell = Cell::new(Position::ORIGIN, 2.0, LineageType::Stem);
        growth.grow(&mut cell);
        growth.grow(&mut cell);
        assert!((cell.diameter - 7.0).abs() < 1e-12);
    }

    #[test]
    fn negative_growth_rate_rejected() {
        assert!(matches!(
            LinearGrowth::new(-1.0),
            Err(WorldError::InvalidGrowthRate(_))
        ));
        assert!(LinearGrowth::new(f64::NAN).is_err());
    }

    #[test]
    fn division_conserves_volume() {
        let mut mother = Cell::new(Position::new(10.0, 10.0, 0.0), 6.0, LineageType::Stem);
        let before = mother.volume();
        let daughter = divider(1).divide(&mut mother).unwrap();
        let after = mother.volume() + daughter.volume();
        assert!((before - after).abs() < 1e-9);
        assert!((mother.diameter - daughter.diameter).abs() < 1e-12);
    }

    #[test]
    fn daughter_inherits_lineage_and_flag_and_sits_nearby() {
        let origin = Position::new(50.0, 50.0, 0.0);
        let mut mother = Cell::new(origin, 6.0, LineageType::TransitAmplifying);
        let daughter = divider(2).divide(&mut mother).unwrap();

        assert_eq!(daughter.lineage(), LineageType::TransitAmplifying);
        assert_eq!(daughter.rule(), mother.rule());
        assert!(daughter.can_divide());

        let gap = daughter.position.distance(mother.position);
        let radius = daughter.radius();
        assert!(gap >= radius - 1e-9);
        assert!(gap <= radius * 1.5 + 1e-9);
    }

    #[test]
    fn retired_mother_is_refused() {
        let mut mother = Cell::new(Position::ORIGIN, 4.0, LineageType::Stem);
        mother.set_can_divide(false);
        let err = divider(3).divide(&mut mother).unwrap_err();
        assert!(matches!(err, DivisionError::RetiredMother));
        assert!((mother.diameter - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn degenerate_mother_is_refused() {
        for diameter in [-1.0, f64::NAN, f64::INFINITY] {
            let mut mother = Cell::new(Position::ORIGIN, diameter, LineageType::Stem);
            let err = divider(4).divide(&mut mother).unwrap_err();
            assert!(matches!(err, DivisionError::InvalidMother { .. }));
        }
    }

    #[test]
    fn zero_diameter_mother_divides_into_two_points() {
        let position = Position::new(3.0, 4.0, 0.0);
        let mut mother = Cell::new(position, 0.0, LineageType::Stem);
        let daughter = divider(5).divide(&mut mother).unwrap();

        assert!(mother.diameter.abs() < f64::EPSILON);
        assert!(daughter.diameter.abs() < f64::EPSILON);
        assert!(daughter.position.distance(position) < 1e-12);
        assert_eq!(daughter.lineage(), LineageType::Stem);
    }

    #[test]
    fn same_seed_same_daughter() {
        let mut a = Cell::new(Position::ORIGIN, 5.0, LineageType::Stem);
        let mut b = a.clone();
        let da = divider(9).divide(&mut a).unwrap();
        let db = divider(9).divide(&mut b).unwrap();
        assert_eq!(da, db);
    }

    #[test]
    fn bounds_clamp_positions() {
        let bounds = SpaceBounds::new(0.0, 250.0).unwrap();
        assert!(bounds.min().abs() < f64::EPSILON);
        let mut cell = Cell::new(Position::new(-1.0, 300.0, 20.0), 2.0, LineageType::Stem);
        bounds.apply(&mut cell);
        assert_eq!(cell.position.to_array(), [0.0, 250.0, 20.0]);
    }

    #[test]
    fn inverted_bounds_rejected() {
        assert!(matches!(
            SpaceBounds::new(10.0, 0.0),
            Err(WorldError::InvalidRange { .. })
        ));
    }
}

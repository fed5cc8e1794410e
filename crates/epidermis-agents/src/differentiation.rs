//! Lineage differentiation rules: stem -> transit-amplifying -> differentiated.
//!
//! Each step the scheduler runs the rule attached to every cell. A rule reads
//! the cell's diameter and lineage and picks exactly one branch:
//!
//! | Rule               | Diameter        | Action | Daughter lineage   |
//! |--------------------|-----------------|--------|--------------------|
//! | Stem               | `d < 5`         | divide | Stem               |
//! | Stem               | `5 <= d < 8`    | divide | `TransitAmplifying`|
//! | Stem               | `d >= 8`        | retire | --                 |
//! | `TransitAmplifying`| `d < 8`         | divide | `TransitAmplifying`|
//! | `TransitAmplifying`| `8 <= d < 10`   | divide | Differentiated     |
//! | `TransitAmplifying`| `d >= 10`       | retire | --                 |
//! | Differentiated     | `d > 10`        | relabel| --                 |
//!
//! Dividing rules also require the cell's lineage to match the rule; a
//! mismatch falls through to retirement. A retired cell (`can_divide ==
//! false`) is skipped before any threshold is looked at, so retirement is
//! permanent and a retired cell is never handed to the division primitive.
//!
//! The mother keeps her lineage on every division, including the
//! progression branch: only the daughter advances.
//!
//! Branch selection ([`decide`]) is pure; [`run_rule`] applies the chosen
//! branch to the cell and, for divisions, calls the substrate's
//! [`DivisionPrimitive`].

use epidermis_types::{Cell, LineageRule, LineageType};
use epidermis_world::DivisionPrimitive;

use crate::error::AgentError;

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Diameter thresholds of a dividing rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DivisionLadder {
    /// Lineage the rule governs.
    pub lineage: LineageType,
    /// Below this diameter the cell self-renews.
    pub self_renewal_below: f64,
    /// Below this diameter (and at or above `self_renewal_below`) the
    /// daughter advances to `progeny`.
    pub progression_below: f64,
    /// Lineage given to daughters on the progression branch.
    pub progeny: LineageType,
}

/// Thresholds of the stem rule.
pub const STEM_LADDER: DivisionLadder = DivisionLadder {
    lineage: LineageType::Stem,
    self_renewal_below: 5.0,
    progression_below: 8.0,
    progeny: LineageType::TransitAmplifying,
};

/// Thresholds of the transit-amplifying rule.
pub const TRANSIT_AMPLIFYING_LADDER: DivisionLadder = DivisionLadder {
    lineage: LineageType::TransitAmplifying,
    self_renewal_below: 8.0,
    progression_below: 10.0,
    progeny: LineageType::Differentiated,
};

/// Diameter above which the differentiated rule re-affirms its lineage.
pub const DIFFERENTIATED_RELABEL_ABOVE: f64 = 10.0;

/// Thresholds of a dividing rule, or `None` for the differentiated rule.
pub const fn ladder(rule: LineageRule) -> Option<DivisionLadder> {
    match rule {
        LineageRule::Stem => Some(STEM_LADDER),
        LineageRule::TransitAmplifying => Some(TRANSIT_AMPLIFYING_LADDER),
        LineageRule::Differentiated => None,
    }
}

// ---------------------------------------------------------------------------
// Branch selection
// ---------------------------------------------------------------------------

/// The branch a rule takes for one cell in one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The cell is retired; nothing happens.
    Inactive,
    /// Divide; the daughter gets `progeny`.
    Divide {
        /// Lineage assigned to the daughter.
        progeny: LineageType,
    },
    /// Clear the division flag.
    Retire,
    /// Re-affirm the differentiated lineage.
    Relabel,
    /// Differentiated cell below the relabel threshold; nothing happens.
    Idle,
}

/// Pick the branch for a cell with the given attached rule, recorded
/// lineage, diameter and division flag.
///
/// Every input maps to exactly one branch. A NaN diameter fails every
/// comparison and therefore retires a dividing cell.
pub fn select_branch(
    rule: LineageRule,
    lineage: LineageType,
    diameter: f64,
    can_divide: bool,
) -> Decision {
    if !can_divide {
        return Decision::Inactive;
    }
    let Some(thresholds) = ladder(rule) else {
        return if diameter > DIFFERENTIATED_RELABEL_ABOVE {
            Decision::Relabel
        } else {
            Decision::Idle
        };
    };
    let matches = lineage == thresholds.lineage;
    if matches && diameter < thresholds.self_renewal_below {
        Decision::Divide {
            progeny: thresholds.lineage,
        }
    } else if matches && diameter < thresholds.progression_below {
        Decision::Divide {
            progeny: thresholds.progeny,
        }
    } else {
        Decision::Retire
    }
}

/// Pick the branch the cell's attached rule takes this step.
pub fn decide(cell: &Cell) -> Decision {
    select_branch(cell.rule(), cell.lineage(), cell.diameter, cell.can_divide())
}

// ---------------------------------------------------------------------------
// Rule application
// ---------------------------------------------------------------------------

/// What running a rule did to a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// The cell divided. The daughter has its lineage and rule set and is not
    /// yet registered in any population.
    Divided(Cell),
    /// The cell's division flag was cleared.
    Retired,
    /// A differentiated cell re-affirmed its lineage.
    Relabelled,
    /// The rule ran and changed nothing.
    Unchanged,
    /// The cell was already retired; the rule did not run.
    Inactive,
}

/// Run the cell's attached rule for one step.
///
/// # Errors
///
/// Returns [`AgentError::Division`] if the division primitive fails. The
/// cell's lineage and flag are untouched in that case.
pub fn run_rule(
    cell: &mut Cell,
    divider: &mut dyn DivisionPrimitive,
) -> Result<RuleOutcome, AgentError> {
    match decide(cell) {
        Decision::Inactive => Ok(RuleOutcome::Inactive),
        Decision::Idle => Ok(RuleOutcome::Unchanged),
        Decision::Retire => {
            cell.set_can_divide(false);
            Ok(RuleOutcome::Retired)
        }
        Decision::Relabel => {
            cell.set_lineage(LineageType::Differentiated);
            Ok(RuleOutcome::Relabelled)
        }
        Decision::Divide { progeny } => {
            let rule = cell.rule();
            let mut daughter = divider
                .divide(cell)
                .map_err(|source| AgentError::Division { rule, source })?;
            daughter.set_lineage(progeny);
            daughter.set_can_divide(true);
            Ok(RuleOutcome::Divided(daughter))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use epidermis_types::Position;
    use epidermis_world::DivisionError;

    use super::*;

    /// Division primitive that copies the mother unchanged and counts calls.
    #[derive(Default)]
    struct CloningDivider {
        calls: u32,
    }

    impl DivisionPrimitive for CloningDivider {
        fn divide(&mut self, mother: &mut Cell) -> Result<Cell, DivisionError> {
            self.calls = self.calls.saturating_add(1);
            Ok(mother.clone())
        }
    }

    /// Division primitive that always fails.
    struct BrokenDivider;

    impl DivisionPrimitive for BrokenDivider {
        fn divide(&mut self, mother: &mut Cell) -> Result<Cell, DivisionError> {
            Err(DivisionError::InvalidMother {
                diameter: mother.diameter,
            })
        }
    }

    fn cell(lineage: LineageType, diameter: f64) -> Cell {
        Cell::new(Position::new(1.0, 2.0, 0.0), diameter, lineage)
    }

    fn daughter_of(outcome: RuleOutcome) -> Cell {
        match outcome {
            RuleOutcome::Divided(daughter) => daughter,
            other => panic!("expected a division, got {other:?}"),
        }
    }

    // --- Scenarios ---------------------------------------------------------

    #[test]
    fn small_stem_self_renews() {
        let mut stem = cell(LineageType::Stem, 2.0);
        let mut divider = CloningDivider::default();
        let daughter = daughter_of(run_rule(&mut stem, &mut divider).unwrap());

        assert_eq!(daughter.lineage(), LineageType::Stem);
        assert_eq!(daughter.rule(), LineageRule::Stem);
        assert!(daughter.can_divide());
        assert_eq!(stem.lineage(), LineageType::Stem);
        assert!(stem.can_divide());
        assert_eq!(divider.calls, 1);
    }

    #[test]
    fn mid_stem_emits_transit_amplifying_and_stays_stem() {
        let mut stem = cell(LineageType::Stem, 6.0);
        let daughter = daughter_of(run_rule(&mut stem, &mut CloningDivider::default()).unwrap());

        assert_eq!(daughter.lineage(), LineageType::TransitAmplifying);
        assert_eq!(daughter.rule(), LineageRule::TransitAmplifying);
        assert!(daughter.can_divide());
        assert_eq!(stem.lineage(), LineageType::Stem);
        assert_eq!(stem.rule(), LineageRule::Stem);
        assert!(stem.can_divide());
    }

    #[test]
    fn large_stem_retires_without_dividing() {
        let mut stem = cell(LineageType::Stem, 9.0);
        let mut divider = CloningDivider::default();
        assert_eq!(run_rule(&mut stem, &mut divider).unwrap(), RuleOutcome::Retired);
        assert!(!stem.can_divide());
        assert_eq!(stem.lineage(), LineageType::Stem);
        assert_eq!(divider.calls, 0);
    }

    #[test]
    fn small_transit_amplifying_self_renews() {
        let mut ta = cell(LineageType::TransitAmplifying, 7.5);
        let daughter = daughter_of(run_rule(&mut ta, &mut CloningDivider::default()).unwrap());
        assert_eq!(daughter.lineage(), LineageType::TransitAmplifying);
        assert_eq!(ta.lineage(), LineageType::TransitAmplifying);
    }

    #[test]
    fn mid_transit_amplifying_emits_differentiated() {
        let mut ta = cell(LineageType::TransitAmplifying, 9.0);
        let daughter = daughter_of(run_rule(&mut ta, &mut CloningDivider::default()).unwrap());
        assert_eq!(daughter.lineage(), LineageType::Differentiated);
        assert_eq!(daughter.rule(), LineageRule::Differentiated);
        assert!(daughter.can_divide());
        assert_eq!(ta.lineage(), LineageType::TransitAmplifying);
        assert!(ta.can_divide());
    }

    #[test]
    fn large_transit_amplifying_retires() {
        let mut ta = cell(LineageType::TransitAmplifying, 11.0);
        let mut divider = CloningDivider::default();
        assert_eq!(run_rule(&mut ta, &mut divider).unwrap(), RuleOutcome::Retired);
        assert!(!ta.can_divide());
        assert_eq!(divider.calls, 0);
    }

    #[test]
    fn large_differentiated_relabels_without_other_effects() {
        let mut diff = cell(LineageType::Differentiated, 12.0);
        let mut divider = CloningDivider::default();
        assert_eq!(run_rule(&mut diff, &mut divider).unwrap(), RuleOutcome::Relabelled);
        assert_eq!(diff.lineage(), LineageType::Differentiated);
        assert!(diff.can_divide());
        assert_eq!(divider.calls, 0);
    }

    // --- Properties --------------------------------------------------------

    #[test]
    fn differentiated_rule_is_idempotent() {
        let mut divider = CloningDivider::default();
        for diameter in [0.0, 5.0, 10.0, 10.5, 40.0] {
            let mut diff = cell(LineageType::Differentiated, diameter);
            let before = diff.clone();
            for _ in 0..5 {
                let outcome = run_rule(&mut diff, &mut divider).unwrap();
                assert!(matches!(outcome, RuleOutcome::Relabelled | RuleOutcome::Unchanged));
                assert_eq!(diff, before);
            }
        }
        assert_eq!(divider.calls, 0);
    }

    #[test]
    fn retirement_is_sticky_for_every_rule() {
        let mut divider = CloningDivider::default();
        for lineage in LineageType::ALL {
            for diameter in [1.0, 6.0, 9.0, 12.0] {
                let mut retired = cell(lineage, diameter);
                retired.set_can_divide(false);
                let before = retired.clone();
                for _ in 0..3 {
                    assert_eq!(
                        run_rule(&mut retired, &mut divider).unwrap(),
                        RuleOutcome::Inactive
                    );
                    assert_eq!(retired, before);
                }
            }
        }
        assert_eq!(divider.calls, 0);
    }

    #[test]
    fn stem_ladder_partitions_the_real_line() {
        let expected = |d: f64| {
            if d < 5.0 {
                Decision::Divide { progeny: LineageType::Stem }
            } else if d < 8.0 {
                Decision::Divide { progeny: LineageType::TransitAmplifying }
            } else {
                Decision::Retire
            }
        };
        for d in boundary_samples() {
            let got = select_branch(LineageRule::Stem, LineageType::Stem, d, true);
            if d.is_nan() {
                assert_eq!(got, Decision::Retire);
            } else {
                assert_eq!(got, expected(d), "diameter {d}");
            }
        }
    }

    #[test]
    fn transit_amplifying_ladder_partitions_the_real_line() {
        let ta = LineageType::TransitAmplifying;
        for d in boundary_samples() {
            let got = select_branch(LineageRule::TransitAmplifying, ta, d, true);
            let want = if d < 8.0 {
                Decision::Divide { progeny: ta }
            } else if d < 10.0 {
                Decision::Divide { progeny: LineageType::Differentiated }
            } else {
                Decision::Retire
            };
            assert_eq!(got, want, "diameter {d}");
        }
    }

    #[test]
    fn differentiated_threshold_is_strict() {
        let diff = LineageType::Differentiated;
        assert_eq!(
            select_branch(LineageRule::Differentiated, diff, 10.0, true),
            Decision::Idle
        );
        assert_eq!(
            select_branch(LineageRule::Differentiated, diff, 10.000_001, true),
            Decision::Relabel
        );
        assert_eq!(
            select_branch(LineageRule::Differentiated, diff, f64::NAN, true),
            Decision::Idle
        );
    }

    #[test]
    fn boundaries_belong_to_the_upper_branch() {
        let stem = |d| select_branch(LineageRule::Stem, LineageType::Stem, d, true);
        assert_eq!(stem(5.0), Decision::Divide { progeny: LineageType::TransitAmplifying });
        assert_eq!(stem(8.0), Decision::Retire);
    }

    #[test]
    fn lineage_mismatch_retires() {
        assert_eq!(
            select_branch(LineageRule::Stem, LineageType::TransitAmplifying, 2.0, true),
            Decision::Retire
        );
        assert_eq!(
            select_branch(LineageRule::TransitAmplifying, LineageType::Stem, 2.0, true),
            Decision::Retire
        );
    }

    #[test]
    fn division_failure_leaves_cell_untouched() {
        let mut stem = cell(LineageType::Stem, 2.0);
        let before = stem.clone();
        let err = run_rule(&mut stem, &mut BrokenDivider).unwrap_err();
        assert!(matches!(err, AgentError::Division { rule: LineageRule::Stem, .. }));
        assert_eq!(stem, before);
    }

    #[test]
    fn daughter_rule_always_matches_daughter_lineage() {
        let mut divider = CloningDivider::default();
        for lineage in [LineageType::Stem, LineageType::TransitAmplifying] {
            for d in boundary_samples() {
                let mut mother = cell(lineage, d);
                if let RuleOutcome::Divided(daughter) = run_rule(&mut mother, &mut divider).unwrap()
                {
                    assert_eq!(daughter.rule(), LineageRule::for_lineage(daughter.lineage()));
                }
                assert_eq!(mother.rule(), LineageRule::for_lineage(mother.lineage()));
            }
        }
    }

    fn boundary_samples() -> Vec<f64> {
        let mut samples = vec![
            f64::NEG_INFINITY,
            -1.0,
            0.0,
            f64::MIN_POSITIVE,
            f64::INFINITY,
            f64::NAN,
        ];
        for threshold in [5.0_f64, 8.0, 10.0] {
            samples.push(threshold);
            samples.push(threshold - 1e-9);
            samples.push(threshold + 1e-9);
        }
        samples.extend((1..56).map(|quarter| f64::from(quarter) * 0.25));
        samples
    }
}

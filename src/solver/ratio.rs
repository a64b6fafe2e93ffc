// Copyright 2019-2024 linprog developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Harris two-pass ratio test
//!
//! Pass 1 relaxes every bound by `10·feas_tol` and computes the largest step `θ̂`
//! which keeps all basic variables inside the relaxed bounds. Pass 2 picks, among the
//! rows whose exact step fits under `θ̂ + feas_tol`, the one with the largest pivot
//! magnitude; this trades a tolerable bound violation for a numerically safer pivot.
//!
//! In Phase I, a basic variable which currently violates a bound only blocks when
//! the step carries it *onto* that bound (where it becomes feasible and leaves the
//! basis).
//!
//! ## Reference
//!
//! P. M. J. Harris, "Pivot selection methods of the Devex LP code", Mathematical
//! Programming 5, 1973.

use crate::basis::VarStatus;
use crate::core::LpFloat;

/// Outcome of the ratio test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum RatioResult<F> {
    /// A basic variable blocks after `step`; it leaves towards `exit_status`
    Step {
        /// Blocking basis position
        row: usize,
        /// Step length of the entering variable
        step: F,
        /// Status the leaving variable assumes (which bound it exits to)
        exit_status: VarStatus,
    },
    /// The entering variable reaches its opposite bound before any basic variable
    /// blocks; the basis stays unchanged
    BoundFlip {
        /// Step length (the entering variable's bound range)
        step: F,
    },
    /// No finite step exists
    Unbounded,
}

/// Candidate limit of one basic position.
#[derive(Debug, Clone, Copy)]
struct Limit<F> {
    row: usize,
    relaxed: F,
    exact: F,
    magnitude: F,
    exit_status: VarStatus,
}

/// Run the two-pass ratio test.
///
/// `alpha` is the direction-scaled pivot column: the basic values move as
/// `x_B(θ) = x_B − θ·alpha`. `entering_range` is the entering variable's own bound
/// range (`∞` when one side is unbounded).
#[allow(clippy::too_many_arguments)]
pub(crate) fn harris<F>(
    alpha: &[F],
    x_basic: &[F],
    basic_vars: &[usize],
    lb: &[F],
    ub: &[F],
    entering_range: F,
    phase1: bool,
    feas_tol: F,
    pivot_tol: F,
) -> RatioResult<F>
where
    F: LpFloat,
{
    let delta = float!(10.0) * feas_tol;
    let mut limits: Vec<Limit<F>> = Vec::new();

    for (i, (&a, &x)) in alpha.iter().zip(x_basic.iter()).enumerate() {
        if a.abs() <= pivot_tol {
            continue;
        }
        let v = basic_vars[i];
        let (lo, hi) = (lb[v], ub[v]);
        let limit = if phase1 && x < lo - feas_tol {
            // infeasible below: blocks only while moving up onto its lower bound
            if a < F::zero() {
                Some(((x - (lo + delta)) / a, (x - lo) / a, VarStatus::AtLower))
            } else {
                None
            }
        } else if phase1 && x > hi + feas_tol {
            // infeasible above: blocks only while moving down onto its upper bound
            if a > F::zero() {
                Some(((x - (hi - delta)) / a, (x - hi) / a, VarStatus::AtUpper))
            } else {
                None
            }
        } else if a > F::zero() {
            // x decreases towards its lower bound
            if lo.is_finite() {
                Some(((x - (lo - delta)) / a, (x - lo) / a, VarStatus::AtLower))
            } else {
                None
            }
        } else {
            // x increases towards its upper bound
            if hi.is_finite() {
                Some(((x - (hi + delta)) / a, (x - hi) / a, VarStatus::AtUpper))
            } else {
                None
            }
        };
        if let Some((relaxed, exact, exit_status)) = limit {
            limits.push(Limit {
                row: i,
                relaxed,
                exact,
                magnitude: a.abs(),
                exit_status,
            });
        }
    }

    // pass 1: largest step under the relaxed bounds
    let mut theta_hat = F::infinity();
    for l in limits.iter() {
        if l.relaxed < theta_hat {
            theta_hat = l.relaxed;
        }
    }
    if theta_hat < F::zero() {
        theta_hat = F::zero();
    }

    // the entering variable's own bound flip supersedes any longer basic step
    if entering_range.is_finite() && entering_range < theta_hat {
        return RatioResult::BoundFlip {
            step: entering_range,
        };
    }

    if theta_hat.is_infinite() {
        return RatioResult::Unbounded;
    }

    // pass 2: best pivot among the rows within the relaxed step
    let cutoff = theta_hat + feas_tol;
    let mut chosen: Option<Limit<F>> = None;
    for l in limits.iter() {
        if l.exact > cutoff {
            continue;
        }
        chosen = match chosen {
            None => Some(*l),
            Some(b) => {
                if l.magnitude > b.magnitude {
                    Some(*l)
                } else if l.magnitude < b.magnitude {
                    Some(b)
                } else if l.row < b.row {
                    Some(*l)
                } else {
                    Some(b)
                }
            }
        };
    }

    // the pass-1 row always fits under the cutoff, so a candidate exists; fall back
    // to the tightest exact step against rounding in the cutoff comparison
    let chosen = chosen.or_else(|| {
        limits
            .iter()
            .copied()
            .min_by(|a, b| a.exact.partial_cmp(&b.exact).unwrap_or(std::cmp::Ordering::Equal))
    });

    match chosen {
        Some(l) => RatioResult::Step {
            row: l.row,
            step: l.exact.max(F::zero()),
            exit_status: l.exit_status,
        },
        None => RatioResult::Unbounded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FEAS: f64 = 1e-6;
    const PIV: f64 = 1e-7;

    fn simple_bounds(n: usize) -> (Vec<f64>, Vec<f64>) {
        (vec![0.0; n], vec![f64::INFINITY; n])
    }

    #[test]
    fn test_minimum_ratio_is_selected() {
        // x_B = [4, 6, 8], alpha = [2, 3, 1] -> steps to the lower bound 2, 2, 8
        let alpha = vec![2.0, 3.0, 1.0];
        let x = vec![4.0, 6.0, 8.0];
        let basic = vec![0, 1, 2];
        let (lb, ub) = simple_bounds(3);
        match harris(&alpha, &x, &basic, &lb, &ub, f64::INFINITY, false, FEAS, PIV) {
            RatioResult::Step {
                row,
                step,
                exit_status,
            } => {
                // rows 0 and 1 tie on the step; row 1 has the larger pivot
                assert_eq!(row, 1);
                assert_relative_eq!(step, 2.0, epsilon = 1e-9);
                assert_eq!(exit_status, VarStatus::AtLower);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_harris_prefers_larger_pivot_among_near_ties() {
        // both rows block at (almost) the same step, but row 1 has a tiny pivot
        let alpha = vec![1.0, 1e-4];
        let x = vec![1.0, 1e-4 + 1e-9];
        let basic = vec![0, 1];
        let (lb, ub) = simple_bounds(2);
        match harris(&alpha, &x, &basic, &lb, &ub, f64::INFINITY, false, FEAS, PIV) {
            RatioResult::Step { row, .. } => assert_eq!(row, 0),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_pass2_never_selects_pivot_below_tolerance() {
        // the only tight row has a pivot below tolerance and must be ignored
        let alpha = vec![1e-9, 0.5];
        let x = vec![1e-12, 4.0];
        let basic = vec![0, 1];
        let (lb, ub) = simple_bounds(2);
        match harris(&alpha, &x, &basic, &lb, &ub, f64::INFINITY, false, FEAS, PIV) {
            RatioResult::Step { row, .. } => assert_eq!(row, 1),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_unbounded_when_no_row_blocks() {
        // alpha negative everywhere and upper bounds infinite: x_B only increases
        let alpha = vec![-1.0, -2.0];
        let x = vec![1.0, 1.0];
        let basic = vec![0, 1];
        let (lb, ub) = simple_bounds(2);
        let res = harris(&alpha, &x, &basic, &lb, &ub, f64::INFINITY, false, FEAS, PIV);
        assert_eq!(res, RatioResult::Unbounded);
    }

    #[test]
    fn test_bound_flip_supersedes_basis_change() {
        // the entering variable's range (1.5) is shorter than the blocking step (4)
        let alpha = vec![1.0];
        let x = vec![4.0];
        let basic = vec![0];
        let (lb, ub) = simple_bounds(1);
        match harris(&alpha, &x, &basic, &lb, &ub, 1.5, false, FEAS, PIV) {
            RatioResult::BoundFlip { step } => assert_relative_eq!(step, 1.5, epsilon = 1e-12),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_upper_bound_blocks_increasing_basic() {
        // alpha < 0: x increases towards its upper bound 5
        let alpha = vec![-2.0];
        let x = vec![1.0];
        let basic = vec![0];
        let lb = vec![0.0];
        let ub = vec![5.0];
        match harris(&alpha, &x, &basic, &lb, &ub, f64::INFINITY, false, FEAS, PIV) {
            RatioResult::Step {
                row,
                step,
                exit_status,
            } => {
                assert_eq!(row, 0);
                assert_relative_eq!(step, 2.0, epsilon = 1e-9);
                assert_eq!(exit_status, VarStatus::AtUpper);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_phase1_violated_row_blocks_at_violated_bound() {
        // x = -3 violates its lower bound 0; moving up (alpha < 0) blocks at 0
        let alpha = vec![-1.0];
        let x = vec![-3.0];
        let basic = vec![0];
        let (lb, ub) = simple_bounds(1);
        match harris(&alpha, &x, &basic, &lb, &ub, f64::INFINITY, true, FEAS, PIV) {
            RatioResult::Step {
                row,
                step,
                exit_status,
            } => {
                assert_eq!(row, 0);
                assert_relative_eq!(step, 3.0, epsilon = 1e-9);
                assert_eq!(exit_status, VarStatus::AtLower);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_phase1_worsening_direction_does_not_block() {
        // x = -3 below its bound and still decreasing: the row itself cannot block,
        // and with no other limit the step is unbounded
        let alpha = vec![1.0];
        let x = vec![-3.0];
        let basic = vec![0];
        let (lb, ub) = simple_bounds(1);
        let res = harris(&alpha, &x, &basic, &lb, &ub, f64::INFINITY, true, FEAS, PIV);
        assert_eq!(res, RatioResult::Unbounded);
    }

    #[test]
    fn test_degenerate_step_is_clamped_to_zero() {
        // basic variable marginally below its bound: the exact step is negative but
        // the returned step must be 0
        let alpha = vec![1.0];
        let x = vec![-1e-9];
        let basic = vec![0];
        let (lb, ub) = simple_bounds(1);
        match harris(&alpha, &x, &basic, &lb, &ub, f64::INFINITY, false, FEAS, PIV) {
            RatioResult::Step { step, .. } => {
                assert_relative_eq!(step, 0.0, epsilon = 1e-12);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }
}

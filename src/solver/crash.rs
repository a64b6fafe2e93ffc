// Copyright 2019-2024 linprog developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Crash basis
//!
//! Scored heuristic selection of an initial basis, one variable per row. Slacks of
//! inequality rows are strong default candidates; structural variables compete on
//! magnitude, bound range, objective cost, sign structure and whether zero is
//! feasible for them.

use crate::basis::VarStatus;
use crate::core::{ConstraintSense, LpFloat, SolverConfig};
use crate::solver::work::WorkLp;

/// Score granted to the slack of an inequality row.
const SLACK_SCORE: f64 = 1000.0;

/// Pick a starting basis: `basic_vars` and the full status vector.
pub(crate) fn crash_basis<F>(
    work: &WorkLp<F>,
    config: &SolverConfig<F>,
) -> (Vec<usize>, Vec<VarStatus>)
where
    F: LpFloat,
{
    let m = work.m;
    let n = work.n;
    let total = work.total_vars();
    let csr = work.cols.to_csr();
    let mut used = vec![false; total];
    let mut basic_vars = vec![0usize; m];

    for i in 0..m {
        let slack_score: F = match work.senses[i] {
            ConstraintSense::Le | ConstraintSense::Ge => float!(SLACK_SCORE),
            ConstraintSense::Eq => float!(-1e30),
        };
        let mut best_var = n + i; // slack fallback
        let mut best_score = slack_score;
        let (cols, vals) = csr.row(i);
        for (&j, &a) in cols.iter().zip(vals.iter()) {
            if used[j] || a.abs() < config.pivot_tol {
                continue;
            }
            let range = work.ub[j] - work.lb[j];
            if range < config.fix_tol {
                continue;
            }
            let mut score = float!(100.0) * a.abs();
            if range.is_finite() {
                score = score + float!(50.0) / (F::one() + range);
            }
            score = score - float!(10.0) * work.obj[j].abs();
            if work.lb[j] <= F::zero() && work.ub[j] >= F::zero() {
                score = score + float!(30.0);
            }
            if work.obj[j] * a < F::zero() {
                score = score + float!(20.0);
            }
            if score > best_score {
                best_score = score;
                best_var = j;
            }
        }
        basic_vars[i] = best_var;
        used[best_var] = true;
    }

    let mut var_status = vec![VarStatus::Free; total];
    for j in 0..total {
        var_status[j] = nonbasic_status(work.lb[j], work.ub[j], config.fix_tol);
    }
    for (i, &v) in basic_vars.iter().enumerate() {
        var_status[v] = VarStatus::Basic(i);
    }
    (basic_vars, var_status)
}

/// Default nonbasic status for a variable with the given bounds.
pub(crate) fn nonbasic_status<F: LpFloat>(lb: F, ub: F, fix_tol: F) -> VarStatus {
    if ub - lb < fix_tol && lb.is_finite() {
        VarStatus::Fixed
    } else if lb.is_finite() {
        VarStatus::AtLower
    } else if ub.is_finite() {
        VarStatus::AtUpper
    } else {
        VarStatus::Free
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::SparseMatrix;

    fn work(senses: Vec<ConstraintSense>) -> WorkLp<f64> {
        // A = [[1, 4], [2, 0]]
        let cols =
            SparseMatrix::from_csc(2, 2, vec![0, 2, 3], vec![0, 1, 0], vec![1.0, 2.0, 4.0])
                .unwrap();
        WorkLp {
            m: 2,
            n: 2,
            cols,
            obj: vec![0.0, 0.0, 0.0, 0.0],
            lb: vec![0.0, 0.0, 0.0, 0.0],
            ub: vec![
                f64::INFINITY,
                f64::INFINITY,
                f64::INFINITY,
                f64::INFINITY,
            ],
            rhs: vec![4.0, 2.0],
            senses,
        }
    }

    #[test]
    fn test_inequality_rows_prefer_slack() {
        let w = work(vec![ConstraintSense::Le, ConstraintSense::Le]);
        let config = SolverConfig::default();
        let (basic, status) = crash_basis(&w, &config);
        assert_eq!(basic, vec![2, 3]);
        assert_eq!(status[2], VarStatus::Basic(0));
        assert_eq!(status[3], VarStatus::Basic(1));
        assert_eq!(status[0], VarStatus::AtLower);
    }

    #[test]
    fn test_equality_rows_pick_structural_columns() {
        let w = work(vec![ConstraintSense::Eq, ConstraintSense::Eq]);
        let config = SolverConfig::default();
        let (basic, status) = crash_basis(&w, &config);
        // row 0 picks the largest coefficient (variable 1, |a| = 4); row 1 has only
        // variable 0 available
        assert_eq!(basic, vec![1, 0]);
        assert!(status[0].is_basic());
        assert!(status[1].is_basic());
    }

    #[test]
    fn test_no_variable_is_used_twice() {
        // both rows see only variable 0; the second must fall back to its slack
        let cols = SparseMatrix::from_csc(2, 1, vec![0, 2], vec![0, 1], vec![1.0, 1.0]).unwrap();
        let w = WorkLp {
            m: 2,
            n: 1,
            cols,
            obj: vec![0.0, 0.0, 0.0],
            lb: vec![0.0, 0.0, 0.0],
            ub: vec![f64::INFINITY, f64::INFINITY, f64::INFINITY],
            rhs: vec![1.0, 1.0],
            senses: vec![ConstraintSense::Eq, ConstraintSense::Eq],
        };
        let config = SolverConfig::default();
        let (basic, _) = crash_basis(&w, &config);
        assert_eq!(basic[0], 0);
        assert_eq!(basic[1], 2); // slack of row 1
    }

    #[test]
    fn test_fixed_variables_are_never_selected() {
        let mut w = work(vec![ConstraintSense::Eq, ConstraintSense::Eq]);
        // fix variable 1 tightly; row 0 must pick variable 0 instead
        w.lb[1] = 1.0;
        w.ub[1] = 1.0;
        let config = SolverConfig::default();
        let (basic, status) = crash_basis(&w, &config);
        assert!(!basic.contains(&1));
        assert_eq!(status[1], VarStatus::Fixed);
    }

    #[test]
    fn test_nonbasic_status_codes() {
        let fix_tol = 1e-9;
        assert_eq!(
            nonbasic_status(0.0, f64::INFINITY, fix_tol),
            VarStatus::AtLower
        );
        assert_eq!(
            nonbasic_status(f64::NEG_INFINITY, 5.0, fix_tol),
            VarStatus::AtUpper
        );
        assert_eq!(
            nonbasic_status(f64::NEG_INFINITY, f64::INFINITY, fix_tol),
            VarStatus::Free
        );
        assert_eq!(nonbasic_status(2.0, 2.0, fix_tol), VarStatus::Fixed);
    }
}

// Copyright 2019-2024 linprog developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Scaled working form of the problem.
//!
//! The iteration loop runs over the augmented matrix `[A | I]`: structural variables
//! `0..n` map to (scaled) matrix columns, slack variables `n..n+m` map to unit
//! columns whose bounds encode the constraint senses.

use crate::basis::{ColumnSource, VarStatus};
use crate::core::{ConstraintSense, LpFloat};
use crate::linalg::{sparse_dot, SparseMatrix};

/// The problem as seen by the iteration loop: presolved, scaled, augmented.
#[derive(Debug, Clone)]
pub(crate) struct WorkLp<F> {
    /// Number of rows
    pub m: usize,
    /// Number of structural (non-slack) variables
    pub n: usize,
    /// Scaled constraint matrix
    pub cols: SparseMatrix<F>,
    /// Objective over all `n + m` variables (slacks cost nothing)
    pub obj: Vec<F>,
    /// Lower bounds over all `n + m` variables
    pub lb: Vec<F>,
    /// Upper bounds over all `n + m` variables
    pub ub: Vec<F>,
    /// Scaled right-hand sides
    pub rhs: Vec<F>,
    /// Constraint senses (kept for slack interpretation and extraction)
    pub senses: Vec<ConstraintSense>,
}

impl<F> WorkLp<F>
where
    F: LpFloat,
{
    /// Total number of variables including slacks.
    pub fn total_vars(&self) -> usize {
        self.n + self.m
    }

    /// Bounds of the slack variable of a row with the given sense.
    pub fn slack_bounds(sense: ConstraintSense) -> (F, F) {
        match sense {
            ConstraintSense::Le => (F::zero(), F::infinity()),
            ConstraintSense::Ge => (F::neg_infinity(), F::zero()),
            ConstraintSense::Eq => (F::zero(), F::zero()),
        }
    }

    /// Value a nonbasic variable takes under `status`.
    pub fn nonbasic_value(&self, j: usize, status: VarStatus) -> F {
        match status {
            VarStatus::AtLower | VarStatus::Fixed => self.lb[j],
            VarStatus::AtUpper => self.ub[j],
            VarStatus::Free => F::zero(),
            VarStatus::Basic(_) => unreachable!("nonbasic_value called on a basic variable"),
        }
    }

    /// Dot product of augmented column `j` with a dense row-space vector.
    pub fn col_dot(&self, j: usize, dense: &[F]) -> F {
        if j < self.n {
            let (idx, val) = self.cols.col(j);
            sparse_dot(idx, val, dense)
        } else {
            dense[j - self.n]
        }
    }

    /// Right-hand side reduced by the nonbasic contributions: `b − N·x_N`.
    pub fn reduced_rhs(&self, var_status: &[VarStatus]) -> Vec<F> {
        let mut r = self.rhs.clone();
        for j in 0..self.total_vars() {
            let status = var_status[j];
            if status.is_basic() {
                continue;
            }
            let xj = self.nonbasic_value(j, status);
            if xj.is_zero() {
                continue;
            }
            if j < self.n {
                let (idx, val) = self.cols.col(j);
                for (&i, &v) in idx.iter().zip(val.iter()) {
                    r[i] = r[i] - v * xj;
                }
            } else {
                r[j - self.n] = r[j - self.n] - xj;
            }
        }
        r
    }
}

impl<F> ColumnSource<F> for WorkLp<F>
where
    F: LpFloat,
{
    fn num_rows(&self) -> usize {
        self.m
    }

    fn column_into(&self, j: usize, out: &mut Vec<(usize, F)>) {
        if j < self.n {
            let (idx, val) = self.cols.col(j);
            for (&i, &v) in idx.iter().zip(val.iter()) {
                out.push((i, v));
            }
        } else {
            out.push((j - self.n, F::one()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn work() -> WorkLp<f64> {
        // A = [[1, 2], [0, 3]]
        let cols = SparseMatrix::from_csc(
            2,
            2,
            vec![0, 1, 3],
            vec![0, 0, 1],
            vec![1.0, 2.0, 3.0],
        )
        .unwrap();
        WorkLp {
            m: 2,
            n: 2,
            cols,
            obj: vec![1.0, -1.0, 0.0, 0.0],
            lb: vec![0.0, 1.0, 0.0, f64::NEG_INFINITY],
            ub: vec![4.0, 2.0, f64::INFINITY, 0.0],
            rhs: vec![10.0, 9.0],
            senses: vec![ConstraintSense::Le, ConstraintSense::Ge],
        }
    }

    #[test]
    fn test_column_into_slack() {
        let w = work();
        let mut out = Vec::new();
        w.column_into(3, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, 1);
        assert_relative_eq!(out[0].1, 1.0, epsilon = f64::EPSILON);
    }

    #[test]
    fn test_col_dot() {
        let w = work();
        let dense = vec![2.0, 5.0];
        assert_relative_eq!(w.col_dot(0, &dense), 2.0, epsilon = f64::EPSILON);
        assert_relative_eq!(w.col_dot(1, &dense), 19.0, epsilon = f64::EPSILON);
        assert_relative_eq!(w.col_dot(2, &dense), 2.0, epsilon = f64::EPSILON);
    }

    #[test]
    fn test_reduced_rhs() {
        let w = work();
        // variable 1 nonbasic at its lower bound (1.0), slack 3 free at 0
        let status = vec![
            VarStatus::Basic(0),
            VarStatus::AtLower,
            VarStatus::Basic(1),
            VarStatus::Free,
        ];
        let r = w.reduced_rhs(&status);
        // column 1 = [2, 3], x_1 = 1 -> r = [10 - 2, 9 - 3]
        assert_relative_eq!(r[0], 8.0, epsilon = f64::EPSILON);
        assert_relative_eq!(r[1], 6.0, epsilon = f64::EPSILON);
    }

    #[test]
    fn test_slack_bounds() {
        let (lo, hi) = WorkLp::<f64>::slack_bounds(ConstraintSense::Le);
        assert_relative_eq!(lo, 0.0, epsilon = f64::EPSILON);
        assert!(hi.is_infinite() && hi.is_sign_positive());
        let (lo, hi) = WorkLp::<f64>::slack_bounds(ConstraintSense::Ge);
        assert!(lo.is_infinite() && lo.is_sign_negative());
        assert_relative_eq!(hi, 0.0, epsilon = f64::EPSILON);
        let (lo, hi) = WorkLp::<f64>::slack_bounds(ConstraintSense::Eq);
        assert_relative_eq!(lo, 0.0, epsilon = f64::EPSILON);
        assert_relative_eq!(hi, 0.0, epsilon = f64::EPSILON);
    }
}

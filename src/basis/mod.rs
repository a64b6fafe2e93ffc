// Copyright 2019-2024 linprog developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Basis
//!
//! The current basis matrix `B` is owned as an LU factorization of some earlier basis
//! `B₀` together with an ordered chain of eta transforms `E₁…E_k` such that
//! `B = B₀·E₁·…·E_k`. FTRAN and BTRAN dispatch to the LU triangular solves and then
//! walk the eta chain; pivots append one eta each, and refactorization discards the
//! chain and rebuilds the LU factors from the present basis.

pub mod eta;
pub mod lu;

use crate::core::{Error, LpFloat, SolverConfig};
use eta::EtaStore;
use lu::LuFactors;
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Access to columns of the augmented constraint matrix `[A | I]`.
///
/// Structural variables map to matrix columns; slack variables map to unit columns.
/// The basis only ever reads columns through this trait, which keeps the
/// factorization independent of how the driver stores the (scaled) problem.
pub trait ColumnSource<F> {
    /// Number of rows of the matrix.
    fn num_rows(&self) -> usize;

    /// Append the nonzeros of column `j` of `[A | I]` to `out`.
    fn column_into(&self, j: usize, out: &mut Vec<(usize, F)>);
}

/// Status of a variable with respect to the current basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum VarStatus {
    /// Basic at the given basis position
    Basic(usize),
    /// Nonbasic at its lower bound
    AtLower,
    /// Nonbasic at its upper bound
    AtUpper,
    /// Nonbasic free (value 0)
    Free,
    /// Nonbasic fixed (`lb = ub`)
    Fixed,
}

impl VarStatus {
    /// Returns `true` for basic variables.
    pub fn is_basic(self) -> bool {
        matches!(self, VarStatus::Basic(_))
    }
}

/// Verdict of [`Basis::refactor_check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefactorDecision {
    /// Keep going
    NotNeeded,
    /// A refactorization would be beneficial
    Recommended,
    /// The eta chain must be discarded now
    Required,
}

/// Outcome of [`Basis::pivot_update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotOutcome {
    /// The pivot was applied and an eta recorded
    Applied,
    /// The pivot element is below tolerance; refactorize and retry
    Rejected,
}

/// The basis of the simplex method: `m` columns drawn from `[A | I]`.
///
/// Invariants: exactly `m` variables have a `Basic` status; for every basic variable
/// `v` at position `r`, `basic_vars[r] = v` and `var_status[v] = Basic(r)`; no two
/// positions share a variable. [`Basis::validate`] checks all of these.
#[derive(Debug, Clone)]
pub struct Basis<F> {
    m: usize,
    /// For each basis position, the variable occupying it
    pub basic_vars: Vec<usize>,
    /// Status of every variable of `[A | I]`
    pub var_status: Vec<VarStatus>,
    lu: LuFactors<F>,
    etas: EtaStore<F>,
    pivots_since_refactor: usize,
    ftran_ops: u64,
    ftran_calls: u64,
    baseline_ops: u64,
    work: Vec<F>,
}

impl<F> Basis<F>
where
    F: LpFloat,
{
    /// Create a basis for `m` rows and `total_vars = n + m` variables.
    ///
    /// All variables start nonbasic at their lower bound; the driver installs the
    /// actual starting basis afterwards.
    pub fn new(m: usize, total_vars: usize) -> Self {
        Basis {
            m,
            basic_vars: vec![0; m],
            var_status: vec![VarStatus::AtLower; total_vars],
            lu: LuFactors::new(m),
            etas: EtaStore::new(),
            pivots_since_refactor: 0,
            ftran_ops: 0,
            ftran_calls: 0,
            baseline_ops: 0,
            work: Vec::new(),
        }
    }

    /// Basis dimension.
    pub fn dim(&self) -> usize {
        self.m
    }

    /// Number of eta factors currently stacked on the LU factors.
    pub fn eta_count(&self) -> usize {
        self.etas.len()
    }

    /// Number of pivots since the last refactorization.
    pub fn pivots_since_refactor(&self) -> usize {
        self.pivots_since_refactor
    }

    /// The LU factors of the anchor basis.
    pub fn lu(&self) -> &LuFactors<F> {
        &self.lu
    }

    /// Install a starting basis.
    ///
    /// `basic_vars` and `var_status` must already be mutually consistent; this is
    /// validated before anything is stored.
    pub fn install(
        &mut self,
        basic_vars: Vec<usize>,
        var_status: Vec<VarStatus>,
    ) -> Result<(), Error> {
        if basic_vars.len() != self.m || var_status.len() != self.var_status.len() {
            return Err(lp_error!(
                InvalidParameter,
                format!(
                    "`Basis`: starting basis dimensions {}/{} do not match {}/{}.",
                    basic_vars.len(),
                    var_status.len(),
                    self.m,
                    self.var_status.len()
                )
            ));
        }
        let old_vars = std::mem::replace(&mut self.basic_vars, basic_vars);
        let old_status = std::mem::replace(&mut self.var_status, var_status);
        if let Err(e) = self.validate() {
            self.basic_vars = old_vars;
            self.var_status = old_status;
            return Err(e);
        }
        Ok(())
    }

    /// Check the mutual-consistency invariants of the basis.
    ///
    /// Calling this twice without intervening mutation returns the same verdict.
    pub fn validate(&self) -> Result<(), Error> {
        let mut seen = vec![false; self.var_status.len()];
        for (r, &v) in self.basic_vars.iter().enumerate() {
            if v >= self.var_status.len() {
                return Err(lp_error!(
                    ConditionViolated,
                    format!("`Basis`: basic variable {} out of range.", v)
                ));
            }
            if seen[v] {
                return Err(lp_error!(
                    ConditionViolated,
                    format!("`Basis`: variable {} occupies two basis positions.", v)
                ));
            }
            seen[v] = true;
            match self.var_status[v] {
                VarStatus::Basic(row) if row == r => {}
                _ => {
                    return Err(lp_error!(
                        ConditionViolated,
                        format!(
                            "`Basis`: status of variable {} does not point back at row {}.",
                            v, r
                        )
                    ));
                }
            }
        }
        let basic_count = self
            .var_status
            .iter()
            .filter(|s| s.is_basic())
            .count();
        if basic_count != self.m {
            return Err(lp_error!(
                ConditionViolated,
                format!(
                    "`Basis`: {} variables are basic, expected {}.",
                    basic_count, self.m
                )
            ));
        }
        Ok(())
    }

    /// Rebuild the LU factors from the current `basic_vars` and drop the eta chain.
    ///
    /// The actual basis is factorized in every case; a singular basis is fatal for
    /// the solve and reported as an error.
    pub fn refactor<S: ColumnSource<F>>(
        &mut self,
        source: &S,
        config: &SolverConfig<F>,
    ) -> Result<(), Error> {
        self.lu.factorize(
            &self.basic_vars,
            source,
            config.min_pivot,
            config.markowitz_threshold,
        )?;
        self.etas.reset();
        self.pivots_since_refactor = 0;
        self.ftran_ops = 0;
        self.ftran_calls = 0;
        self.baseline_ops = (self.lu.nnz() + self.m) as u64;
        Ok(())
    }

    /// FTRAN: `x ← B⁻¹·x`.
    ///
    /// `x` enters as a dense right-hand side over rows and leaves indexed by basis
    /// position. The LU solves run first, then the eta chain oldest to newest.
    pub fn ftran(&mut self, x: &mut [F]) {
        debug_assert_eq!(x.len(), self.m);
        let mut work = std::mem::take(&mut self.work);
        self.lu.solve(x, &mut work);
        self.work = work;
        for eta in self.etas.iter() {
            let factor = x[eta.row] / eta.pivot;
            x[eta.row] = factor;
            if factor.is_zero() {
                continue;
            }
            for (&i, &v) in eta.idx.iter().zip(eta.val.iter()) {
                x[i] = x[i] - v * factor;
            }
        }
        self.ftran_ops += (self.lu.nnz() + self.m + self.etas.total_nnz()) as u64;
        self.ftran_calls += 1;
    }

    /// BTRAN: `y ← B⁻ᵀ·y`.
    ///
    /// `y` enters indexed by basis position and leaves as a dense vector over rows.
    /// The eta chain is walked newest to oldest, then the LU transpose solves run.
    pub fn btran(&mut self, y: &mut [F]) {
        debug_assert_eq!(y.len(), self.m);
        for eta in self.etas.iter_rev() {
            let mut temp = F::zero();
            for (&i, &v) in eta.idx.iter().zip(eta.val.iter()) {
                temp = temp + v * y[i];
            }
            y[eta.row] = (y[eta.row] - temp) / eta.pivot;
        }
        let mut work = std::mem::take(&mut self.work);
        self.lu.solve_transpose(y, &mut work);
        self.work = work;
    }

    /// BTRAN of the unit vector `e_row`: row `row` of `B⁻¹`.
    pub fn btran_unit(&mut self, row: usize, out: &mut Vec<F>) {
        out.clear();
        out.resize(self.m, F::zero());
        out[row] = F::one();
        self.btran(out);
    }

    /// Apply a pivot: variable `entering` replaces `leaving` at basis position
    /// `pivot_row`, with `column = B⁻¹·A_entering` as computed by FTRAN.
    ///
    /// If the pivot element is below `pivot_tol` the update is refused and the caller
    /// is expected to refactorize and retry; the basis is left untouched. Otherwise
    /// an eta is appended (entries below `zero_tol` dropped) and the statuses are
    /// updated: the leaving variable receives `leaving_status`, which the caller
    /// derives from the exit direction of the ratio test.
    pub fn pivot_update(
        &mut self,
        pivot_row: usize,
        entering: usize,
        leaving: usize,
        column: &[F],
        leaving_status: VarStatus,
        config: &SolverConfig<F>,
    ) -> Result<PivotOutcome, Error> {
        debug_assert_eq!(column.len(), self.m);
        debug_assert_eq!(self.basic_vars[pivot_row], leaving);
        debug_assert!(!leaving_status.is_basic());
        let pivot = column[pivot_row];
        if pivot.abs() < config.pivot_tol {
            return Ok(PivotOutcome::Rejected);
        }
        let mut idx = Vec::with_capacity(column.len());
        let mut val = Vec::with_capacity(column.len());
        for (i, &v) in column.iter().enumerate() {
            if i == pivot_row {
                continue;
            }
            if v.abs() >= config.zero_tol {
                idx.push(i);
                val.push(v);
            }
        }
        self.etas.append(pivot_row, pivot, &idx, &val)?;
        self.basic_vars[pivot_row] = entering;
        self.var_status[entering] = VarStatus::Basic(pivot_row);
        self.var_status[leaving] = leaving_status;
        self.pivots_since_refactor += 1;
        Ok(PivotOutcome::Applied)
    }

    /// Decide whether a refactorization is due.
    ///
    /// Required: the eta chain or its memory hit their caps. Recommended: the pivot
    /// interval elapsed, or the running average FTRAN cost exceeds three times the
    /// post-refactor baseline.
    pub fn refactor_check(&self, config: &SolverConfig<F>) -> RefactorDecision {
        if self.etas.len() >= config.max_eta_count {
            return RefactorDecision::Required;
        }
        if self.etas.memory_bytes() >= config.max_eta_memory {
            return RefactorDecision::Required;
        }
        if self.pivots_since_refactor >= config.refactor_interval {
            return RefactorDecision::Recommended;
        }
        if self.ftran_calls > 0 && self.baseline_ops > 0 {
            let avg = self.ftran_ops / self.ftran_calls;
            if avg > 3 * self.baseline_ops {
                return RefactorDecision::Recommended;
            }
        }
        RefactorDecision::NotNeeded
    }
}

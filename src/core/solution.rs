// Copyright 2019-2024 linprog developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Solution and statistics

use crate::core::{LpFloat, SolveStatus};
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Statistics collected during a solve
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct SolveStats {
    /// Total number of simplex iterations
    pub iterations: u64,
    /// Iterations spent in Phase I
    pub phase1_iterations: u64,
    /// Number of basis refactorizations
    pub refactorizations: usize,
    /// Largest number of eta factors stacked on the basis at any point
    pub peak_eta_count: usize,
    /// Number of bound flips performed instead of basis changes
    pub bound_flips: u64,
    /// Wall-clock time of the solve
    #[cfg_attr(feature = "serde1", serde(skip))]
    pub time: Option<instant::Duration>,
}

/// Result of a solve
///
/// Carries the terminal [`SolveStatus`] together with the primal assignment, dual
/// prices, reduced costs and row slacks in the *original* problem space (presolve
/// reductions and scaling are undone before extraction).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Solution<F> {
    /// Terminal status
    pub status: SolveStatus,
    /// Objective value of the returned primal assignment
    pub objective: F,
    /// Primal values, length `n`
    pub x: Vec<F>,
    /// Reduced costs, length `n`
    pub reduced_costs: Vec<F>,
    /// Dual prices, length `m`
    pub duals: Vec<F>,
    /// Row slacks `b − A·x`, length `m`
    pub slack: Vec<F>,
    /// Row (or presolve-detected variable) witnessing infeasibility, if any
    pub infeasible_row: Option<usize>,
    /// Solve statistics
    pub stats: SolveStats,
}

impl<F> Solution<F>
where
    F: LpFloat,
{
    /// Create an empty solution for a problem with `m` rows and `n` variables.
    pub(crate) fn empty(status: SolveStatus, m: usize, n: usize) -> Self {
        Solution {
            status,
            objective: F::zero(),
            x: vec![F::zero(); n],
            reduced_costs: vec![F::zero(); n],
            duals: vec![F::zero(); m],
            slack: vec![F::zero(); m],
            infeasible_row: None,
            stats: SolveStats::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    test_trait_impl!(solution, Solution<f64>);

    #[test]
    fn test_empty_dimensions() {
        let solution: Solution<f64> = Solution::empty(SolveStatus::Infeasible, 3, 5);
        assert_eq!(solution.status, SolveStatus::Infeasible);
        assert_eq!(solution.x.len(), 5);
        assert_eq!(solution.reduced_costs.len(), 5);
        assert_eq!(solution.duals.len(), 3);
        assert_eq!(solution.slack.len(), 3);
        assert!(solution.infeasible_row.is_none());
    }
}

// Copyright 2019-2024 linprog developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Terminal statuses of a solve
///
/// Model outcomes (`Optimal`, `Infeasible`, `Unbounded`), limit outcomes
/// (`IterationLimit`, `TimeLimit`, `Interrupted`) and numerical breakdown
/// (`Numerical`) all live in this sum type. Faults such as invalid input are
/// reported as [`LpError`](`crate::core::LpError`) instead.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum SolveStatus {
    /// The solve is still in progress
    NotTerminated,
    /// An optimal basic solution was found
    Optimal,
    /// The problem has no feasible point
    Infeasible,
    /// The objective is unbounded below on the feasible set
    Unbounded,
    /// Reached maximum number of iterations
    IterationLimit,
    /// Reached the wall-clock time limit
    TimeLimit,
    /// The cooperative terminate flag was set
    Interrupted,
    /// Numerical difficulties (singular basis or repeated pivot rejection)
    Numerical,
}

impl SolveStatus {
    /// Returns `true` if the solve terminated and `false` otherwise.
    ///
    /// # Example
    ///
    /// ```
    /// use linprog::core::SolveStatus;
    ///
    /// assert!(SolveStatus::Optimal.terminated());
    /// assert!(SolveStatus::Infeasible.terminated());
    /// assert!(SolveStatus::Unbounded.terminated());
    /// assert!(SolveStatus::IterationLimit.terminated());
    /// assert!(SolveStatus::TimeLimit.terminated());
    /// assert!(SolveStatus::Interrupted.terminated());
    /// assert!(SolveStatus::Numerical.terminated());
    /// assert!(!SolveStatus::NotTerminated.terminated());
    /// ```
    pub fn terminated(self) -> bool {
        !matches!(self, SolveStatus::NotTerminated)
    }

    /// Returns a textual representation of the status.
    ///
    /// # Example
    ///
    /// ```
    /// use linprog::core::SolveStatus;
    ///
    /// assert_eq!(SolveStatus::Optimal.text(), "Optimal solution found");
    /// assert_eq!(SolveStatus::Infeasible.text(), "Problem is infeasible");
    /// assert_eq!(SolveStatus::NotTerminated.text(), "Not terminated");
    /// ```
    pub fn text(&self) -> &str {
        match *self {
            SolveStatus::NotTerminated => "Not terminated",
            SolveStatus::Optimal => "Optimal solution found",
            SolveStatus::Infeasible => "Problem is infeasible",
            SolveStatus::Unbounded => "Problem is unbounded",
            SolveStatus::IterationLimit => "Maximum number of iterations reached",
            SolveStatus::TimeLimit => "Time limit reached",
            SolveStatus::Interrupted => "Solve interrupted",
            SolveStatus::Numerical => "Numerical difficulties encountered",
        }
    }
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text())
    }
}

impl Default for SolveStatus {
    fn default() -> Self {
        SolveStatus::NotTerminated
    }
}

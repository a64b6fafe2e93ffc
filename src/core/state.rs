// Copyright 2019-2024 linprog developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Iteration state
//!
//! Maintains the state from iteration to iteration of the simplex driver. A reference
//! is handed to every [`Observe`](`crate::core::observers::Observe`) implementation
//! after each iteration.

use crate::core::{LpFloat, SolveStatus};
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Simplex phase
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum Phase {
    /// Phase I: minimize the sum of bound violations
    One,
    /// Phase II: minimize the actual objective
    Two,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::One => write!(f, "1"),
            Phase::Two => write!(f, "2"),
        }
    }
}

/// Maintains the state from iteration to iteration of the simplex driver
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct SolveState<F> {
    /// Current iteration
    pub iter: u64,
    /// Iterations spent in Phase I
    pub phase1_iters: u64,
    /// Maximum number of iterations
    pub max_iters: u64,
    /// Current phase
    pub phase: Phase,
    /// Current objective value (Phase II) or infeasibility sum (Phase I)
    pub cost: F,
    /// Current sum of bound violations of the basic variables
    pub infeasibility: F,
    /// Number of eta factors currently stacked on the basis
    pub eta_count: usize,
    /// Largest eta count observed so far
    pub peak_eta_count: usize,
    /// Number of refactorizations performed so far
    pub refactorizations: usize,
    /// Number of bound flips performed so far
    pub bound_flips: u64,
    /// Time required so far
    #[cfg_attr(feature = "serde1", serde(skip))]
    pub time: Option<instant::Duration>,
    /// Status of the solve
    pub status: SolveStatus,
}

impl<F> SolveState<F>
where
    F: LpFloat,
{
    /// Create a new `SolveState`
    pub fn new() -> Self {
        SolveState {
            iter: 0,
            phase1_iters: 0,
            max_iters: std::u64::MAX,
            phase: Phase::One,
            cost: F::infinity(),
            infeasibility: F::infinity(),
            eta_count: 0,
            peak_eta_count: 0,
            refactorizations: 0,
            bound_flips: 0,
            time: Some(instant::Duration::new(0, 0)),
            status: SolveStatus::NotTerminated,
        }
    }

    /// Set maximum number of iterations
    #[must_use]
    pub fn max_iters(mut self, iters: u64) -> Self {
        self.max_iters = iters;
        self
    }

    /// Set the solve status
    #[must_use]
    pub fn status(mut self, status: SolveStatus) -> Self {
        self.status = status;
        self
    }

    /// Increment the number of iterations by one
    pub fn increment_iter(&mut self) {
        self.iter += 1;
        if matches!(self.phase, Phase::One) {
            self.phase1_iters += 1;
        }
    }

    /// Record the current eta count, tracking the peak
    pub fn record_eta_count(&mut self, count: usize) {
        self.eta_count = count;
        if count > self.peak_eta_count {
            self.peak_eta_count = count;
        }
    }

    /// Returns current number of iterations
    pub fn get_iter(&self) -> u64 {
        self.iter
    }

    /// Returns maximum number of iterations
    pub fn get_max_iters(&self) -> u64 {
        self.max_iters
    }

    /// Returns the solve status
    pub fn get_status(&self) -> SolveStatus {
        self.status
    }

    /// Returns the time elapsed since the start of the solve
    pub fn get_time(&self) -> Option<instant::Duration> {
        self.time
    }

    /// Return whether the solve has terminated or not
    pub fn terminated(&self) -> bool {
        self.status.terminated()
    }
}

impl<F: LpFloat> Default for SolveState<F> {
    fn default() -> Self {
        SolveState::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    send_sync_test!(solve_state, SolveState<f64>);

    #[test]
    fn test_increment_iter_tracks_phase1() {
        let mut state: SolveState<f64> = SolveState::new();
        state.increment_iter();
        state.increment_iter();
        state.phase = Phase::Two;
        state.increment_iter();
        assert_eq!(state.iter, 3);
        assert_eq!(state.phase1_iters, 2);
    }

    #[test]
    fn test_record_eta_count_tracks_peak() {
        let mut state: SolveState<f64> = SolveState::new();
        state.record_eta_count(3);
        state.record_eta_count(7);
        state.record_eta_count(2);
        assert_eq!(state.eta_count, 2);
        assert_eq!(state.peak_eta_count, 7);
    }
}

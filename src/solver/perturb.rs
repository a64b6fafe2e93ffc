// Copyright 2019-2024 linprog developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Bound perturbation
//!
//! Degeneracy breaker: tiny pseudo-random amounts are added to the finite lower
//! bounds and subtracted from the finite upper bounds early in the solve, and the
//! originals are restored near optimality. The generator is seeded from the
//! configuration so runs are reproducible. After restoring, the driver recomputes
//! the basic values with a fresh FTRAN so that `x_B` sits on the true bounds.

use crate::core::{LpFloat, SolverConfig};
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Side store of the unperturbed bounds.
#[derive(Debug, Clone)]
pub(crate) struct Perturbation<F> {
    orig_lb: Vec<F>,
    orig_ub: Vec<F>,
    /// Whether a perturbation is currently applied
    pub active: bool,
}

impl<F> Perturbation<F>
where
    F: LpFloat,
{
    /// Create an inactive record.
    pub fn new() -> Self {
        Perturbation {
            orig_lb: Vec::new(),
            orig_ub: Vec::new(),
            active: false,
        }
    }

    /// Perturb `lb` and `ub` in place, keeping the originals.
    ///
    /// Every finite bound moves inward by `ε ∈ [feas_tol, 10·feas_tol]`. Variables
    /// whose bounds are too close (fixed or nearly so) are left alone, as shrinking
    /// their range could invert it.
    pub fn apply(&mut self, lb: &mut [F], ub: &mut [F], config: &SolverConfig<F>) {
        debug_assert!(!self.active);
        self.orig_lb = lb.to_vec();
        self.orig_ub = ub.to_vec();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.perturb_seed);
        let nine = float!(9.0);
        let span = float!(21.0) * config.feas_tol;
        for j in 0..lb.len() {
            if ub[j] - lb[j] <= span {
                continue;
            }
            if lb[j].is_finite() {
                let u = float!(rng.gen::<f64>());
                lb[j] = lb[j] + config.feas_tol * (F::one() + nine * u);
            }
            if ub[j].is_finite() {
                let u = float!(rng.gen::<f64>());
                ub[j] = ub[j] - config.feas_tol * (F::one() + nine * u);
            }
        }
        self.active = true;
    }

    /// Restore the original bounds byte for byte.
    pub fn remove(&mut self, lb: &mut [F], ub: &mut [F]) {
        debug_assert!(self.active);
        lb.copy_from_slice(&self.orig_lb);
        ub.copy_from_slice(&self.orig_ub);
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64) -> SolverConfig<f64> {
        SolverConfig::default().with_perturb_seed(seed)
    }

    #[test]
    fn test_bounds_move_inward() {
        let mut p = Perturbation::new();
        let mut lb = vec![0.0, -1.0, f64::NEG_INFINITY];
        let mut ub = vec![10.0, f64::INFINITY, 5.0];
        let cfg = config(7);
        p.apply(&mut lb, &mut ub, &cfg);
        assert!(p.active);
        for &v in lb.iter().take(2) {
            assert!(v.is_finite());
        }
        assert!(lb[0] > 0.0 && lb[0] <= 10.0 * cfg.feas_tol);
        assert!(lb[1] > -1.0);
        assert!(ub[0] < 10.0);
        assert!(ub[2] < 5.0);
        // infinite bounds stay infinite
        assert!(lb[2].is_infinite());
        assert!(ub[1].is_infinite());
    }

    #[test]
    fn test_remove_is_a_left_inverse() {
        let mut p = Perturbation::new();
        let orig_lb = vec![0.0, -2.5, 3.0];
        let orig_ub = vec![1.0, 7.5, f64::INFINITY];
        let mut lb = orig_lb.clone();
        let mut ub = orig_ub.clone();
        let cfg = config(42);
        p.apply(&mut lb, &mut ub, &cfg);
        p.remove(&mut lb, &mut ub);
        assert!(!p.active);
        for (a, b) in lb.iter().zip(orig_lb.iter()) {
            assert_eq!(a.to_ne_bytes(), b.to_ne_bytes());
        }
        for (a, b) in ub.iter().zip(orig_ub.iter()) {
            assert_eq!(a.to_ne_bytes(), b.to_ne_bytes());
        }
    }

    #[test]
    fn test_same_seed_reproduces_same_perturbation() {
        let cfg = config(1234);
        let mut p1 = Perturbation::new();
        let mut lb1 = vec![0.0; 16];
        let mut ub1 = vec![100.0; 16];
        p1.apply(&mut lb1, &mut ub1, &cfg);

        let mut p2 = Perturbation::new();
        let mut lb2 = vec![0.0; 16];
        let mut ub2 = vec![100.0; 16];
        p2.apply(&mut lb2, &mut ub2, &cfg);

        for (a, b) in lb1.iter().zip(lb2.iter()) {
            assert_eq!(a.to_ne_bytes(), b.to_ne_bytes());
        }
        for (a, b) in ub1.iter().zip(ub2.iter()) {
            assert_eq!(a.to_ne_bytes(), b.to_ne_bytes());
        }
    }

    #[test]
    fn test_fixed_variables_are_not_perturbed() {
        let mut p = Perturbation::new();
        let mut lb = vec![2.0];
        let mut ub = vec![2.0];
        p.apply(&mut lb, &mut ub, &config(3));
        assert_eq!(lb[0].to_ne_bytes(), 2.0f64.to_ne_bytes());
        assert_eq!(ub[0].to_ne_bytes(), 2.0f64.to_ne_bytes());
    }
}

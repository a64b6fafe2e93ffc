// Copyright 2019-2024 linprog developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Solver configuration
//!
//! Tolerances, limits and strategy choices consumed by the simplex driver. All knobs
//! live in this explicit struct; the engine keeps no global mutable state.

use crate::core::{Error, LpFloat};
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Pricing strategy for entering-variable selection
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum PricingStrategy {
    /// Largest reduced cost
    Dantzig,
    /// Dantzig scores over rotating sections of the nonbasic variables
    Partial,
    /// Reduced cost normalized by the edge length
    SteepestEdge,
    /// Steepest edge approximation with cheap reference-weight updates
    Devex,
}

/// Configuration of the simplex solver
///
/// Construct with [`SolverConfig::default`] and adjust individual knobs with the
/// `with_*` methods, which validate their arguments.
///
/// # Example
///
/// ```
/// # use linprog::core::{Error, PricingStrategy, SolverConfig};
/// # fn main() -> Result<(), Error> {
/// let config = SolverConfig::default()
///     .with_max_iters(5_000)
///     .with_pricing(PricingStrategy::Devex)
///     .with_feas_tol(1e-7)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct SolverConfig<F> {
    /// Primal feasibility tolerance
    pub feas_tol: F,
    /// Dual (optimality) tolerance on reduced costs
    pub opt_tol: F,
    /// Smallest pivot magnitude accepted by the ratio test and the eta update
    pub pivot_tol: F,
    /// Smallest diagonal magnitude accepted by the LU factorization
    pub min_pivot: F,
    /// Bound range below which a variable is treated as fixed
    pub fix_tol: F,
    /// Magnitude below which eta entries are dropped
    pub zero_tol: F,
    /// Markowitz threshold-pivoting factor
    pub markowitz_threshold: F,
    /// Maximum number of simplex iterations
    pub max_iters: u64,
    /// Wall-clock time limit in seconds (`None` = unlimited)
    pub time_limit: Option<f64>,
    /// Number of eta factors which forces a refactorization
    pub max_eta_count: usize,
    /// Accumulated eta memory (bytes) which forces a refactorization
    pub max_eta_memory: usize,
    /// Number of pivots after which a refactorization is recommended
    pub refactor_interval: usize,
    /// Number of early iterations protected by bound perturbation (0 disables)
    pub perturb_iters: u64,
    /// Seed of the perturbation generator
    pub perturb_seed: u64,
    /// Pricing strategy
    pub pricing: PricingStrategy,
    /// Number of partial-pricing sections
    pub partial_sections: usize,
    /// Number of candidate-list levels (level 0 is the full nonbasic set)
    pub max_levels: usize,
    /// Lower clamp for steepest-edge and Devex weights
    pub gamma_min: F,
    /// Enable the presolve reductions
    pub presolve: bool,
    /// Enable geometric-mean scaling
    pub scaling: bool,
    /// Maximum number of bound-propagation passes
    pub max_propagation_passes: usize,
}

impl<F> Default for SolverConfig<F>
where
    F: LpFloat,
{
    fn default() -> Self {
        SolverConfig {
            feas_tol: float!(1e-6),
            opt_tol: float!(1e-6),
            pivot_tol: float!(1e-7),
            min_pivot: float!(1e-10),
            fix_tol: float!(1e-9),
            zero_tol: float!(1e-12),
            markowitz_threshold: float!(0.1),
            max_iters: 50_000,
            time_limit: None,
            max_eta_count: 200,
            max_eta_memory: 4 << 20,
            refactor_interval: 100,
            perturb_iters: 100,
            perturb_seed: 0,
            pricing: PricingStrategy::SteepestEdge,
            partial_sections: 10,
            max_levels: 2,
            gamma_min: float!(1.0),
            presolve: true,
            scaling: true,
            max_propagation_passes: 10,
        }
    }
}

impl<F> SolverConfig<F>
where
    F: LpFloat,
{
    /// Set the primal feasibility tolerance.
    ///
    /// Must be larger than `0`.
    pub fn with_feas_tol(mut self, feas_tol: F) -> Result<Self, Error> {
        if feas_tol <= F::zero() {
            return Err(lp_error!(
                InvalidParameter,
                "`SolverConfig`: feasibility tolerance must be > 0."
            ));
        }
        self.feas_tol = feas_tol;
        Ok(self)
    }

    /// Set the optimality tolerance on reduced costs.
    ///
    /// Must be larger than `0`.
    pub fn with_opt_tol(mut self, opt_tol: F) -> Result<Self, Error> {
        if opt_tol <= F::zero() {
            return Err(lp_error!(
                InvalidParameter,
                "`SolverConfig`: optimality tolerance must be > 0."
            ));
        }
        self.opt_tol = opt_tol;
        Ok(self)
    }

    /// Set the smallest pivot magnitude accepted during updates.
    ///
    /// Must be larger than `0`.
    pub fn with_pivot_tol(mut self, pivot_tol: F) -> Result<Self, Error> {
        if pivot_tol <= F::zero() {
            return Err(lp_error!(
                InvalidParameter,
                "`SolverConfig`: pivot tolerance must be > 0."
            ));
        }
        self.pivot_tol = pivot_tol;
        Ok(self)
    }

    /// Set the Markowitz threshold-pivoting factor.
    ///
    /// Must lie in `(0, 1]`.
    pub fn with_markowitz_threshold(mut self, threshold: F) -> Result<Self, Error> {
        if threshold <= F::zero() || threshold > F::one() {
            return Err(lp_error!(
                InvalidParameter,
                "`SolverConfig`: Markowitz threshold must be in (0, 1]."
            ));
        }
        self.markowitz_threshold = threshold;
        Ok(self)
    }

    /// Set the maximum number of simplex iterations.
    #[must_use]
    pub fn with_max_iters(mut self, max_iters: u64) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set the wall-clock time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Result<Self, Error> {
        if seconds <= 0.0 {
            return Err(lp_error!(
                InvalidParameter,
                "`SolverConfig`: time limit must be > 0."
            ));
        }
        self.time_limit = Some(seconds);
        Ok(self)
    }

    /// Set the number of eta factors which forces a refactorization.
    ///
    /// Must be larger than `0`.
    pub fn with_max_eta_count(mut self, max_eta_count: usize) -> Result<Self, Error> {
        if max_eta_count == 0 {
            return Err(lp_error!(
                InvalidParameter,
                "`SolverConfig`: maximum eta count must be > 0."
            ));
        }
        self.max_eta_count = max_eta_count;
        Ok(self)
    }

    /// Set the number of pivots after which a refactorization is performed.
    ///
    /// Must be larger than `0`.
    pub fn with_refactor_interval(mut self, interval: usize) -> Result<Self, Error> {
        if interval == 0 {
            return Err(lp_error!(
                InvalidParameter,
                "`SolverConfig`: refactorization interval must be > 0."
            ));
        }
        self.refactor_interval = interval;
        Ok(self)
    }

    /// Set the number of early iterations protected by bound perturbation.
    ///
    /// `0` disables perturbation.
    #[must_use]
    pub fn with_perturb_iters(mut self, iters: u64) -> Self {
        self.perturb_iters = iters;
        self
    }

    /// Set the seed of the perturbation generator.
    #[must_use]
    pub fn with_perturb_seed(mut self, seed: u64) -> Self {
        self.perturb_seed = seed;
        self
    }

    /// Set the pricing strategy.
    #[must_use]
    pub fn with_pricing(mut self, pricing: PricingStrategy) -> Self {
        self.pricing = pricing;
        self
    }

    /// Enable or disable the presolve reductions.
    #[must_use]
    pub fn with_presolve(mut self, presolve: bool) -> Self {
        self.presolve = presolve;
        self
    }

    /// Enable or disable geometric-mean scaling.
    #[must_use]
    pub fn with_scaling(mut self, scaling: bool) -> Self {
        self.scaling = scaling;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LpError;

    test_trait_impl!(solver_config, SolverConfig<f64>);

    #[test]
    fn test_default_tolerances() {
        let config: SolverConfig<f64> = SolverConfig::default();
        assert_eq!(config.feas_tol.to_ne_bytes(), 1e-6f64.to_ne_bytes());
        assert_eq!(config.opt_tol.to_ne_bytes(), 1e-6f64.to_ne_bytes());
        assert_eq!(
            config.markowitz_threshold.to_ne_bytes(),
            0.1f64.to_ne_bytes()
        );
        assert_eq!(config.gamma_min.to_ne_bytes(), 1.0f64.to_ne_bytes());
        assert_eq!(config.pricing, PricingStrategy::SteepestEdge);
        assert!(config.presolve);
        assert!(config.scaling);
    }

    #[test]
    fn test_with_feas_tol_errors() {
        let res = SolverConfig::<f64>::default().with_feas_tol(0.0);
        assert_error!(
            res,
            LpError,
            "Invalid parameter: \"`SolverConfig`: feasibility tolerance must be > 0.\""
        );

        let res = SolverConfig::<f64>::default().with_feas_tol(-1.0);
        assert_error!(
            res,
            LpError,
            "Invalid parameter: \"`SolverConfig`: feasibility tolerance must be > 0.\""
        );
    }

    #[test]
    fn test_with_markowitz_threshold_errors() {
        let res = SolverConfig::<f64>::default().with_markowitz_threshold(1.5);
        assert_error!(
            res,
            LpError,
            "Invalid parameter: \"`SolverConfig`: Markowitz threshold must be in (0, 1].\""
        );
    }

    #[test]
    fn test_builder_chain() {
        let config = SolverConfig::<f64>::default()
            .with_max_iters(123)
            .with_pricing(PricingStrategy::Dantzig)
            .with_perturb_seed(7)
            .with_refactor_interval(5)
            .unwrap();
        assert_eq!(config.max_iters, 123);
        assert_eq!(config.pricing, PricingStrategy::Dantzig);
        assert_eq!(config.perturb_seed, 7);
        assert_eq!(config.refactor_interval, 5);
    }
}

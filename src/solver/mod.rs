// Copyright 2019-2024 linprog developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Simplex solver
//!
//! The two-phase revised simplex driver and its components. A solve runs through
//! crash basis selection, presolve, optional bound perturbation, the pricing /
//! FTRAN / ratio test / pivot / BTRAN iteration loop with scheduled
//! refactorizations, perturbation removal, iterative refinement and solution
//! extraction.
//!
//! All mutable state is owned by the driver; a single solve runs on a single
//! cooperative thread. The only cross-thread touchpoint is the terminate flag
//! returned by [`Simplex::interrupt_handle`], which is read at iteration
//! boundaries.

/// Crash basis
pub mod crash;
/// Bound perturbation
pub mod perturb;
/// Presolve reductions
pub mod presolve;
/// Pricing strategies and candidate management
pub mod pricing;
/// Harris two-pass ratio test
pub mod ratio;
/// Iterative refinement
pub mod refine;
/// Working form of the problem
mod work;

use crate::basis::{Basis, ColumnSource, PivotOutcome, RefactorDecision, VarStatus};
use crate::core::observers::{Observe, ObserverMode, Observers};
use crate::core::{
    Error, LinearProgram, LpFloat, Phase, Solution, SolveState, SolveStatus, SolverConfig,
};
use crate::linalg::dot;
use crash::{crash_basis, nonbasic_status};
use perturb::Perturbation;
use presolve::{presolve, Postsolve, PresolveOutcome};
use pricing::Pricing;
use ratio::{harris, RatioResult};
use refine::refine;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use work::WorkLp;

/// # Revised simplex driver
///
/// Two-phase primal simplex over a sparse LU basis factorization with product-form
/// eta updates. Phase I minimizes the sum of bound violations; once it drops below
/// the feasibility tolerance the actual objective takes over.
///
/// ## Requirements on the problem
///
/// The problem must be a fully built [`LinearProgram`]: matrix, objective, bounds
/// and constraints. The matrix is treated as read-only during the solve.
///
/// # Example
///
/// ```
/// # use linprog::core::{ConstraintSense, Error, LinearProgram, SolveStatus, SolverConfig};
/// # use linprog::linalg::SparseMatrix;
/// # use linprog::solver::Simplex;
/// # fn main() -> Result<(), Error> {
/// // minimize -x subject to x <= 5, x >= 0
/// let matrix = SparseMatrix::from_csc(1, 1, vec![0, 1], vec![0], vec![1.0])?;
/// let lp = LinearProgram::new(matrix, vec![-1.0])?
///     .constraints(vec![5.0], vec![ConstraintSense::Le])?;
/// let solution = Simplex::new(SolverConfig::default()).solve(&lp)?;
/// assert_eq!(solution.status, SolveStatus::Optimal);
/// # Ok(())
/// # }
/// ```
pub struct Simplex<F> {
    config: SolverConfig<F>,
    observers: Observers<F>,
    terminate: Arc<AtomicBool>,
    warm_start: Option<(Vec<usize>, Vec<VarStatus>)>,
}

impl<F> Simplex<F>
where
    F: LpFloat,
{
    /// Name reported to observers.
    pub const NAME: &'static str = "Simplex";

    /// Create a new driver with the given configuration.
    pub fn new(config: SolverConfig<F>) -> Self {
        Simplex {
            config,
            observers: Observers::new(),
            terminate: Arc::new(AtomicBool::new(false)),
            warm_start: None,
        }
    }

    /// Provide a warm-start basis in the original variable space
    /// (`basic_vars[m]`, `var_status[n + m]` with slacks after the structurals).
    ///
    /// The basis is validated and factorized for real before use; if it cannot be
    /// applied (inconsistent, singular, or referring to presolved-away variables),
    /// the driver falls back to the crash heuristic.
    #[must_use]
    pub fn with_initial_basis(
        mut self,
        basic_vars: Vec<usize>,
        var_status: Vec<VarStatus>,
    ) -> Self {
        self.warm_start = Some((basic_vars, var_status));
        self
    }

    /// Attach an observer.
    #[must_use]
    pub fn add_observer<OBS: Observe<F> + Send + 'static>(
        mut self,
        observer: OBS,
        mode: ObserverMode,
    ) -> Self {
        self.observers.push(observer, mode);
        self
    }

    /// Clone the cooperative terminate flag.
    ///
    /// Any thread may set it; the driver completes the current iteration (so the
    /// basis stays consistent) and returns with [`SolveStatus::Interrupted`].
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.terminate.clone()
    }

    /// Route Ctrl-C to the terminate flag.
    ///
    /// Only available with the `ctrlc` feature.
    #[cfg(feature = "ctrlc")]
    pub fn interrupt_on_ctrlc(self) -> Result<Self, Error> {
        let flag = self.terminate.clone();
        match ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
        }) {
            Err(ctrlc::Error::MultipleHandlers) => Ok(()),
            r => r,
        }?;
        Ok(self)
    }

    /// Solve the linear program.
    ///
    /// Model outcomes (optimal, infeasible, unbounded, limits, numerical
    /// breakdown) are reported through [`Solution::status`]; an `Err` is returned
    /// only for faults such as an incompletely built problem.
    pub fn solve(&mut self, lp: &LinearProgram<F>) -> Result<Solution<F>, Error> {
        lp.check_ready()?;
        let started = instant::Instant::now();
        let m = lp.num_rows();
        let n_orig = lp.num_vars();
        let mut state: SolveState<F> = SolveState::new().max_iters(self.config.max_iters);

        // presolve and scaling; may already prove infeasibility
        let (mut work, post) = match presolve(lp, &self.config)? {
            PresolveOutcome::Reduced(boxed) => *boxed,
            PresolveOutcome::Infeasible { row } => {
                let mut solution = Solution::empty(SolveStatus::Infeasible, m, n_orig);
                solution.infeasible_row = row;
                solution.stats.time = Some(started.elapsed());
                return Ok(solution);
            }
        };
        let total = work.total_vars();

        // starting basis: warm start when usable, crash heuristic otherwise
        let mut basis: Basis<F> = Basis::new(m, total);
        let installed = self
            .try_warm_start(&work, &post, n_orig, &mut basis)
            .unwrap_or(false);
        if !installed {
            let (bv, vs) = crash_basis(&work, &self.config);
            basis.install(bv, vs)?;
        }
        if basis.refactor(&work, &self.config).is_err() {
            // the crash (or warm) basis is singular; the all-slack basis never is
            let (bv, vs) = all_slack_basis(&work, &self.config);
            basis.install(bv, vs)?;
            basis.refactor(&work, &self.config)?;
        }
        state.refactorizations += 1;

        // bound perturbation against degeneracy
        let mut perturbation = Perturbation::new();
        if self.config.perturb_iters > 0 {
            perturbation.apply(&mut work.lb, &mut work.ub, &self.config);
        }

        // primal values of the basic variables
        let mut x_basic = work.reduced_rhs(&basis.var_status);
        basis.ftran(&mut x_basic);

        let mut phase = if infeasibility(&work, &basis, &x_basic, self.config.feas_tol)
            > self.config.feas_tol
        {
            Phase::One
        } else {
            Phase::Two
        };
        state.phase = phase;

        let mut pricing = Pricing::new(total, &self.config);
        let mut cost: Vec<F> = phase_cost(phase, &work);
        let mut pi = phase_duals(&mut basis, &work, &x_basic, phase, self.config.feas_tol);
        if matches!(phase, Phase::Two) {
            state.cost = current_objective(&work, &basis, &x_basic);
        }

        if !self.observers.is_empty() {
            let kv = make_kv!(
                "rows" => m;
                "cols" => n_orig;
                "max_iters" => state.max_iters;
            );
            self.observers.observe_init(Self::NAME, &kv)?;
        }

        let time_limit = self.config.time_limit;
        let mut consecutive_rejections = 0usize;
        let mut basis_broken = false;
        let mut alpha: Vec<F> = Vec::new();
        let mut beta: Vec<F> = Vec::new();
        let mut col_buf: Vec<(usize, F)> = Vec::new();

        loop {
            // termination checks at the iteration boundary
            if self.terminate.load(Ordering::SeqCst) {
                state.status = SolveStatus::Interrupted;
                break;
            }
            if state.iter >= state.max_iters {
                state.status = SolveStatus::IterationLimit;
                break;
            }
            if let Some(limit) = time_limit {
                if started.elapsed().as_secs_f64() >= limit {
                    state.status = SolveStatus::TimeLimit;
                    break;
                }
            }

            // Phase-I costs are piecewise in x_B, so the duals are refreshed every
            // iteration; Phase-II duals are maintained incrementally across pivots
            if matches!(phase, Phase::One) {
                pi = phase_duals(&mut basis, &work, &x_basic, phase, self.config.feas_tol);
            }

            let candidate = pricing.select(
                &work,
                &basis.var_status,
                &pi,
                &cost,
                state.iter,
                &self.config,
            );
            let Some(cand) = candidate else {
                match phase {
                    Phase::One => {
                        let infeas =
                            infeasibility(&work, &basis, &x_basic, self.config.feas_tol);
                        if infeas <= self.config.feas_tol {
                            phase = Phase::Two;
                            state.phase = phase;
                            cost = phase_cost(phase, &work);
                            pi = phase_duals(
                                &mut basis,
                                &work,
                                &x_basic,
                                phase,
                                self.config.feas_tol,
                            );
                            state.cost = current_objective(&work, &basis, &x_basic);
                            pricing.invalidate();
                            continue;
                        }
                        state.status = SolveStatus::Infeasible;
                        break;
                    }
                    Phase::Two => {
                        if perturbation.active {
                            // optimal for the perturbed bounds: restore the real
                            // ones, reproject the basics and keep iterating
                            perturbation.remove(&mut work.lb, &mut work.ub);
                            x_basic = work.reduced_rhs(&basis.var_status);
                            basis.ftran(&mut x_basic);
                            pricing.invalidate();
                            let infeas =
                                infeasibility(&work, &basis, &x_basic, self.config.feas_tol);
                            if infeas > self.config.feas_tol {
                                phase = Phase::One;
                                state.phase = phase;
                                cost = phase_cost(phase, &work);
                            } else {
                                state.cost = current_objective(&work, &basis, &x_basic);
                            }
                            continue;
                        }
                        state.status = SolveStatus::Optimal;
                        break;
                    }
                }
            };

            // FTRAN: pivot column of the entering variable
            alpha.clear();
            alpha.resize(m, F::zero());
            col_buf.clear();
            work.column_into(cand.var, &mut col_buf);
            for &(i, v) in col_buf.iter() {
                alpha[i] = v;
            }
            basis.ftran(&mut alpha);

            let sigma = cand.direction;
            let alpha_dir: Vec<F> = alpha.iter().map(|&a| a * sigma).collect();
            let entering_range = work.ub[cand.var] - work.lb[cand.var];

            let outcome = harris(
                &alpha_dir,
                &x_basic,
                &basis.basic_vars,
                &work.lb,
                &work.ub,
                entering_range,
                matches!(phase, Phase::One),
                self.config.feas_tol,
                self.config.pivot_tol,
            );

            let mut iter_kv = (!self.observers.is_empty()).then(|| {
                let mut kv = make_kv!("enter" => cand.var;);
                kv.push("d", cand.reduced_cost);
                kv
            });

            match outcome {
                RatioResult::Unbounded => {
                    state.status = if matches!(phase, Phase::Two) {
                        SolveStatus::Unbounded
                    } else {
                        // a Phase-I ray means the infeasibility could not be
                        // reduced along a blocking-free direction
                        SolveStatus::Numerical
                    };
                    break;
                }
                RatioResult::BoundFlip { step } => {
                    let new_status = match basis.var_status[cand.var] {
                        VarStatus::AtLower => VarStatus::AtUpper,
                        VarStatus::AtUpper => VarStatus::AtLower,
                        other => other,
                    };
                    basis.var_status[cand.var] = new_status;
                    for (x, &a) in x_basic.iter_mut().zip(alpha_dir.iter()) {
                        *x = *x - step * a;
                    }
                    state.bound_flips += 1;
                    if matches!(phase, Phase::Two) {
                        state.cost = state.cost + cand.reduced_cost * sigma * step;
                    }
                    pricing.invalidate();
                    if let Some(kv) = iter_kv.as_mut() {
                        kv.push("flip", step);
                    }
                }
                RatioResult::Step {
                    row,
                    step,
                    exit_status,
                } => {
                    let leaving = basis.basic_vars[row];
                    basis.btran_unit(row, &mut beta);

                    let taus: Vec<(usize, F)> = if pricing.needs_taus() {
                        let mut t = Vec::new();
                        for j in 0..total {
                            if basis.var_status[j].is_basic() {
                                continue;
                            }
                            let tau = work.col_dot(j, &beta);
                            if tau.abs() > self.config.zero_tol {
                                t.push((j, tau));
                            }
                        }
                        t
                    } else {
                        Vec::new()
                    };

                    // the leaving direction decides which bound the variable exits
                    // to; fixed-range variables always exit as fixed
                    let exit = if work.ub[leaving] - work.lb[leaving] < self.config.fix_tol {
                        VarStatus::Fixed
                    } else {
                        exit_status
                    };
                    let entering_value =
                        work.nonbasic_value(cand.var, basis.var_status[cand.var])
                            + sigma * step;

                    match basis.pivot_update(
                        row,
                        cand.var,
                        leaving,
                        &alpha,
                        exit,
                        &self.config,
                    )? {
                        PivotOutcome::Rejected => {
                            consecutive_rejections += 1;
                            if consecutive_rejections >= 2 {
                                state.status = SolveStatus::Numerical;
                                break;
                            }
                            // forced refactorization, then retry with the prior basis
                            if basis.refactor(&work, &self.config).is_err() {
                                state.status = SolveStatus::Numerical;
                                basis_broken = true;
                                break;
                            }
                            state.refactorizations += 1;
                            x_basic = work.reduced_rhs(&basis.var_status);
                            basis.ftran(&mut x_basic);
                            pi = phase_duals(
                                &mut basis,
                                &work,
                                &x_basic,
                                phase,
                                self.config.feas_tol,
                            );
                            pricing.invalidate();
                            continue;
                        }
                        PivotOutcome::Applied => {
                            consecutive_rejections = 0;
                            for (x, &a) in x_basic.iter_mut().zip(alpha_dir.iter()) {
                                *x = *x - step * a;
                            }
                            x_basic[row] = entering_value;
                            if matches!(phase, Phase::Two) {
                                state.cost = state.cost + cand.reduced_cost * sigma * step;
                                // π' = π + (d_in/α_q)·β zeroes the entering reduced cost
                                let f = cand.reduced_cost / alpha[row];
                                for (p, &b) in pi.iter_mut().zip(beta.iter()) {
                                    *p = *p + f * b;
                                }
                            }
                            if pricing.needs_taus() {
                                pricing.on_pivot(
                                    cand.var,
                                    leaving,
                                    alpha[row],
                                    &taus,
                                    &self.config,
                                );
                            }
                            pricing.invalidate();
                            if let Some(kv) = iter_kv.as_mut() {
                                kv.push("leave", leaving);
                                kv.push("step", step);
                            }
                        }
                    }
                }
            }

            // post-iteration housekeeping
            if matches!(phase, Phase::One) {
                let infeas = infeasibility(&work, &basis, &x_basic, self.config.feas_tol);
                state.infeasibility = infeas;
                state.cost = infeas;
                if infeas <= self.config.feas_tol {
                    phase = Phase::Two;
                    state.phase = phase;
                    cost = phase_cost(phase, &work);
                    pi = phase_duals(&mut basis, &work, &x_basic, phase, self.config.feas_tol);
                    state.cost = current_objective(&work, &basis, &x_basic);
                    pricing.invalidate();
                }
            } else {
                state.infeasibility = F::zero();
            }
            state.record_eta_count(basis.eta_count());

            match basis.refactor_check(&self.config) {
                RefactorDecision::NotNeeded => {}
                RefactorDecision::Recommended | RefactorDecision::Required => {
                    if basis.refactor(&work, &self.config).is_err() {
                        state.status = SolveStatus::Numerical;
                        basis_broken = true;
                        break;
                    }
                    state.refactorizations += 1;
                    x_basic = work.reduced_rhs(&basis.var_status);
                    basis.ftran(&mut x_basic);
                    pi = phase_duals(&mut basis, &work, &x_basic, phase, self.config.feas_tol);
                    pricing.invalidate();
                    state.record_eta_count(basis.eta_count());
                }
            }

            if let Some(kv) = iter_kv.take() {
                self.observers.observe_iter(&state, &kv)?;
            }
            state.increment_iter();
            state.time = Some(started.elapsed());
        }

        // leave no perturbation behind, whatever the exit path
        if perturbation.active {
            perturbation.remove(&mut work.lb, &mut work.ub);
            if !basis_broken {
                x_basic = work.reduced_rhs(&basis.var_status);
                basis.ftran(&mut x_basic);
            }
        }

        if basis_broken {
            let mut solution = Solution::empty(state.status, m, n_orig);
            solution.stats = stats_from(&state, started);
            return Ok(solution);
        }

        if matches!(state.status, SolveStatus::Optimal) {
            refine(&mut basis, &work, &mut x_basic, self.config.feas_tol);
        }

        // extraction back to the original space
        let mut work_x = vec![F::zero(); total];
        for (j, out) in work_x.iter_mut().enumerate() {
            *out = match basis.var_status[j] {
                VarStatus::Basic(pos) => x_basic[pos],
                s => work.nonbasic_value(j, s),
            };
        }
        let x = post.restore_primal(&work_x);
        let pi_work = phase_duals(&mut basis, &work, &x_basic, Phase::Two, self.config.feas_tol);
        let duals = post.restore_duals(&pi_work);

        let mut at_pi = vec![F::zero(); n_orig];
        lp.matrix.mat_t_vec(&duals, &mut at_pi);
        let reduced_costs: Vec<F> = lp
            .obj
            .iter()
            .zip(at_pi.iter())
            .map(|(&c, &ap)| c - ap)
            .collect();

        let mut ax = vec![F::zero(); m];
        lp.matrix.mat_vec(&x, &mut ax, F::zero());
        let slack: Vec<F> = lp
            .rhs
            .iter()
            .zip(ax.iter())
            .map(|(&b, &a)| b - a)
            .collect();

        let infeasible_row = if matches!(state.status, SolveStatus::Infeasible) {
            most_violated_row(&work, &basis, &x_basic, self.config.feas_tol)
        } else {
            None
        };

        Ok(Solution {
            status: state.status,
            objective: dot(&lp.obj, &x),
            x,
            reduced_costs,
            duals,
            slack,
            infeasible_row,
            stats: stats_from(&state, started),
        })
    }

    /// Try to map and install the user-provided warm start. Returns `Ok(true)` on
    /// success; any inconsistency makes the driver fall back to the crash basis.
    fn try_warm_start(
        &self,
        work: &WorkLp<F>,
        post: &Postsolve<F>,
        n_orig: usize,
        basis: &mut Basis<F>,
    ) -> Result<bool, Error> {
        let Some((ref warm_bv, ref warm_vs)) = self.warm_start else {
            return Ok(false);
        };
        if warm_bv.len() != work.m || warm_vs.len() != n_orig + work.m {
            return Ok(false);
        }
        let map = |v: usize| -> Option<usize> {
            if v < n_orig {
                post.col_map[v]
            } else {
                Some(work.n + (v - n_orig))
            }
        };
        let mut bv = Vec::with_capacity(work.m);
        for &v in warm_bv.iter() {
            match map(v) {
                Some(jw) => bv.push(jw),
                None => return Ok(false),
            }
        }
        let mut vs = vec![VarStatus::Free; work.total_vars()];
        for (jw, status) in vs.iter_mut().enumerate() {
            *status = nonbasic_status(work.lb[jw], work.ub[jw], self.config.fix_tol);
        }
        for v in 0..(n_orig + work.m) {
            if let Some(jw) = map(v) {
                match warm_vs[v] {
                    VarStatus::Basic(_) => {}
                    VarStatus::AtLower if !work.lb[jw].is_finite() => return Ok(false),
                    VarStatus::AtUpper if !work.ub[jw].is_finite() => return Ok(false),
                    s => vs[jw] = s,
                }
            }
        }
        for (r, &jw) in bv.iter().enumerate() {
            vs[jw] = VarStatus::Basic(r);
        }
        Ok(basis.install(bv, vs).is_ok())
    }
}

/// All-slack fallback basis; its matrix is the identity and always factorizes.
fn all_slack_basis<F: LpFloat>(
    work: &WorkLp<F>,
    config: &SolverConfig<F>,
) -> (Vec<usize>, Vec<VarStatus>) {
    let mut vs = vec![VarStatus::Free; work.total_vars()];
    for (j, status) in vs.iter_mut().enumerate() {
        *status = nonbasic_status(work.lb[j], work.ub[j], config.fix_tol);
    }
    let mut bv = Vec::with_capacity(work.m);
    for i in 0..work.m {
        bv.push(work.n + i);
        vs[work.n + i] = VarStatus::Basic(i);
    }
    (bv, vs)
}

/// Sum of bound violations of the basic variables.
fn infeasibility<F: LpFloat>(
    work: &WorkLp<F>,
    basis: &Basis<F>,
    x_basic: &[F],
    feas_tol: F,
) -> F {
    let mut sum = F::zero();
    for (pos, &x) in x_basic.iter().enumerate() {
        let v = basis.basic_vars[pos];
        if x < work.lb[v] - feas_tol {
            sum = sum + (work.lb[v] - x);
        } else if x > work.ub[v] + feas_tol {
            sum = sum + (x - work.ub[v]);
        }
    }
    sum
}

/// Basis position with the largest bound violation, as an infeasibility witness.
fn most_violated_row<F: LpFloat>(
    work: &WorkLp<F>,
    basis: &Basis<F>,
    x_basic: &[F],
    feas_tol: F,
) -> Option<usize> {
    let mut worst: Option<(usize, F)> = None;
    for (pos, &x) in x_basic.iter().enumerate() {
        let v = basis.basic_vars[pos];
        let violation = if x < work.lb[v] - feas_tol {
            work.lb[v] - x
        } else if x > work.ub[v] + feas_tol {
            x - work.ub[v]
        } else {
            continue;
        };
        worst = match worst {
            Some((_, w)) if w >= violation => worst,
            _ => Some((pos, violation)),
        };
    }
    worst.map(|(pos, _)| pos)
}

/// Cost vector of the active phase: zeros in Phase I (the violation costs live on
/// the basic side and enter through the duals), the actual objective in Phase II.
fn phase_cost<F: LpFloat>(phase: Phase, work: &WorkLp<F>) -> Vec<F> {
    match phase {
        Phase::One => vec![F::zero(); work.total_vars()],
        Phase::Two => work.obj.clone(),
    }
}

/// Dual prices for the active phase: `π = B⁻ᵀ·c_B` with the Phase-I violation
/// signs or the Phase-II objective coefficients on the basic variables.
fn phase_duals<F: LpFloat>(
    basis: &mut Basis<F>,
    work: &WorkLp<F>,
    x_basic: &[F],
    phase: Phase,
    feas_tol: F,
) -> Vec<F> {
    let mut cb = vec![F::zero(); work.m];
    for (pos, c) in cb.iter_mut().enumerate() {
        let v = basis.basic_vars[pos];
        *c = match phase {
            Phase::Two => work.obj[v],
            Phase::One => {
                if x_basic[pos] < work.lb[v] - feas_tol {
                    -F::one()
                } else if x_basic[pos] > work.ub[v] + feas_tol {
                    F::one()
                } else {
                    F::zero()
                }
            }
        };
    }
    basis.btran(&mut cb);
    cb
}

/// Objective of the current (work-space) point.
fn current_objective<F: LpFloat>(work: &WorkLp<F>, basis: &Basis<F>, x_basic: &[F]) -> F {
    let mut z = F::zero();
    for j in 0..work.total_vars() {
        let xj = match basis.var_status[j] {
            VarStatus::Basic(pos) => x_basic[pos],
            s => work.nonbasic_value(j, s),
        };
        z = z + work.obj[j] * xj;
    }
    z
}

/// Copy the driver state into the user-facing statistics.
fn stats_from<F: LpFloat>(
    state: &SolveState<F>,
    started: instant::Instant,
) -> crate::core::SolveStats {
    crate::core::SolveStats {
        iterations: state.iter,
        phase1_iterations: state.phase1_iters,
        refactorizations: state.refactorizations,
        peak_eta_count: state.peak_eta_count,
        bound_flips: state.bound_flips,
        time: Some(started.elapsed()),
    }
}

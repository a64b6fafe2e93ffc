// Copyright 2019-2024 linprog developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Presolve
//!
//! Reductions applied once before the iteration loop: fixed-variable elimination,
//! singleton-row bound derivation, bound propagation and geometric-mean scaling.
//! Every reduction is reversible; the [`Postsolve`] record carries enough state to
//! map the working solution back to the original space.

use crate::core::{ConstraintSense, Error, LinearProgram, LpFloat, SolverConfig};
use crate::linalg::SparseMatrix;
use crate::solver::work::WorkLp;

/// Reversal record for the presolve reductions.
#[derive(Debug, Clone)]
pub(crate) struct Postsolve<F> {
    /// Maps an original column to its working column, or `None` if eliminated
    pub col_map: Vec<Option<usize>>,
    /// Values of eliminated (fixed) variables, indexed by original column
    pub fixed_value: Vec<Option<F>>,
    /// Row scales applied to the working matrix
    pub row_scale: Vec<F>,
    /// Column scales applied to the working matrix, indexed by working column
    pub col_scale: Vec<F>,
}

impl<F> Postsolve<F>
where
    F: LpFloat,
{
    /// Map the working primal assignment back to the original variable space.
    pub fn restore_primal(&self, work_x: &[F]) -> Vec<F> {
        let mut x = vec![F::zero(); self.col_map.len()];
        for (j, out) in x.iter_mut().enumerate() {
            *out = match self.col_map[j] {
                Some(jw) => self.col_scale[jw] * work_x[jw],
                None => self.fixed_value[j].unwrap_or_else(F::zero),
            };
        }
        x
    }

    /// Map working dual prices back to the original row space.
    pub fn restore_duals(&self, work_pi: &[F]) -> Vec<F> {
        work_pi
            .iter()
            .zip(self.row_scale.iter())
            .map(|(&p, &r)| p * r)
            .collect()
    }
}

/// Result of the presolve pass.
pub(crate) enum PresolveOutcome<F> {
    /// The reduced, scaled working problem together with its reversal record
    Reduced(Box<(WorkLp<F>, Postsolve<F>)>),
    /// Presolve proved infeasibility; the row (or variable) is the witness
    Infeasible {
        /// Offending row, if the contradiction surfaced in a constraint
        row: Option<usize>,
    },
}

/// Run the presolve reductions on `lp`.
///
/// With `config.presolve` disabled only the working form (slack bounds, optional
/// scaling) is built.
pub(crate) fn presolve<F>(
    lp: &LinearProgram<F>,
    config: &SolverConfig<F>,
) -> Result<PresolveOutcome<F>, Error>
where
    F: LpFloat,
{
    let m = lp.num_rows();
    let n = lp.num_vars();

    let lb = lp.lb.clone();
    let ub = lp.ub.clone();
    let mut rhs = lp.rhs.clone();
    let mut fixed_value: Vec<Option<F>> = vec![None; n];

    // 1. fixed-variable elimination: substitute the midpoint into the rows
    if config.presolve {
        for j in 0..n {
            if ub[j] - lb[j] < config.fix_tol && lb[j].is_finite() {
                let value = (lb[j] + ub[j]) / float!(2.0);
                fixed_value[j] = Some(value);
                if !value.is_zero() {
                    let (idx, val) = lp.matrix.col(j);
                    for (&i, &v) in idx.iter().zip(val.iter()) {
                        rhs[i] = rhs[i] - v * value;
                    }
                }
            }
        }
    }

    // build the reduced matrix without the eliminated columns
    let mut col_map: Vec<Option<usize>> = vec![None; n];
    let mut kept = 0usize;
    for j in 0..n {
        if fixed_value[j].is_none() {
            col_map[j] = Some(kept);
            kept += 1;
        }
    }
    let mut col_ptr = Vec::with_capacity(kept + 1);
    let mut row_idx = Vec::new();
    let mut values = Vec::new();
    col_ptr.push(0);
    let mut wlb = Vec::with_capacity(kept);
    let mut wub = Vec::with_capacity(kept);
    let mut wobj = Vec::with_capacity(kept);
    for j in 0..n {
        if col_map[j].is_none() {
            continue;
        }
        let (idx, val) = lp.matrix.col(j);
        row_idx.extend_from_slice(idx);
        values.extend_from_slice(val);
        col_ptr.push(row_idx.len());
        wlb.push(lb[j]);
        wub.push(ub[j]);
        wobj.push(lp.obj[j]);
    }
    let reduced = SparseMatrix::from_csc(m, kept, col_ptr, row_idx, values)?;

    if config.presolve {
        // row-oriented view for the row-driven reductions
        let csr = reduced.to_csr();

        // 2. singleton rows: derive bounds on the single remaining variable
        for i in 0..m {
            let (cols, vals) = csr.row(i);
            if cols.len() != 1 {
                continue;
            }
            let (j, a) = (cols[0], vals[0]);
            if a.abs() < config.fix_tol {
                continue;
            }
            let bound = rhs[i] / a;
            let (tighten_lb, tighten_ub) = match (lp.senses[i], a > F::zero()) {
                (ConstraintSense::Le, true) | (ConstraintSense::Ge, false) => (false, true),
                (ConstraintSense::Le, false) | (ConstraintSense::Ge, true) => (true, false),
                (ConstraintSense::Eq, _) => (true, true),
            };
            if tighten_ub && bound < wub[j] {
                wub[j] = bound;
            }
            if tighten_lb && bound > wlb[j] {
                wlb[j] = bound;
            }
            if wlb[j] > wub[j] + config.feas_tol {
                return Ok(PresolveOutcome::Infeasible { row: Some(i) });
            }
        }

        // 3. bound propagation over row activities
        for _pass in 0..config.max_propagation_passes {
            let mut changed = false;
            for i in 0..m {
                let (cols, vals) = csr.row(i);
                if cols.is_empty() {
                    continue;
                }
                // [lhs_min, lhs_max] with explicit infinity counting
                let mut min_sum = F::zero();
                let mut max_sum = F::zero();
                let mut min_inf = 0usize;
                let mut max_inf = 0usize;
                for (&j, &a) in cols.iter().zip(vals.iter()) {
                    let (lo, hi) = if a > F::zero() {
                        (wlb[j], wub[j])
                    } else {
                        (wub[j], wlb[j])
                    };
                    if lo.is_finite() {
                        min_sum = min_sum + a * lo;
                    } else {
                        min_inf += 1;
                    }
                    if hi.is_finite() {
                        max_sum = max_sum + a * hi;
                    } else {
                        max_inf += 1;
                    }
                }
                for (&j, &a) in cols.iter().zip(vals.iter()) {
                    if a.abs() < config.fix_tol {
                        continue;
                    }
                    let (own_lo, own_hi) = if a > F::zero() {
                        (wlb[j], wub[j])
                    } else {
                        (wub[j], wlb[j])
                    };
                    // activity of the rest of the row
                    let rest_min = if min_inf == 0 {
                        Some(min_sum - if own_lo.is_finite() { a * own_lo } else { F::zero() })
                    } else if min_inf == 1 && !own_lo.is_finite() {
                        Some(min_sum)
                    } else {
                        None
                    };
                    let rest_max = if max_inf == 0 {
                        Some(max_sum - if own_hi.is_finite() { a * own_hi } else { F::zero() })
                    } else if max_inf == 1 && !own_hi.is_finite() {
                        Some(max_sum)
                    } else {
                        None
                    };
                    // ax ≤ b implies a_j x_j ≤ b − rest_min
                    if !matches!(lp.senses[i], ConstraintSense::Ge) {
                        if let Some(rest) = rest_min {
                            let limit = (rhs[i] - rest) / a;
                            if a > F::zero() {
                                if limit < wub[j] - config.feas_tol {
                                    wub[j] = limit;
                                    changed = true;
                                }
                            } else if limit > wlb[j] + config.feas_tol {
                                wlb[j] = limit;
                                changed = true;
                            }
                        }
                    }
                    // ax ≥ b implies a_j x_j ≥ b − rest_max
                    if !matches!(lp.senses[i], ConstraintSense::Le) {
                        if let Some(rest) = rest_max {
                            let limit = (rhs[i] - rest) / a;
                            if a > F::zero() {
                                if limit > wlb[j] + config.feas_tol {
                                    wlb[j] = limit;
                                    changed = true;
                                }
                            } else if limit < wub[j] - config.feas_tol {
                                wub[j] = limit;
                                changed = true;
                            }
                        }
                    }
                    if wlb[j] > wub[j] + config.feas_tol {
                        return Ok(PresolveOutcome::Infeasible { row: Some(i) });
                    }
                }
            }
            if !changed {
                break;
            }
        }
    }

    // 4. geometric-mean scaling
    let scale_floor = float!(1e-6);
    let scale_ceil = float!(1e6);
    let mut row_scale = vec![F::one(); m];
    let mut col_scale = vec![F::one(); kept];
    if config.scaling && reduced.nnz() > 0 {
        // row scales from the raw magnitudes
        let csr = reduced.to_csr();
        for i in 0..m {
            let (_, vals) = csr.row(i);
            if let Some(s) = geometric_scale(vals.iter().map(|v| v.abs()), scale_floor, scale_ceil)
            {
                row_scale[i] = s;
            }
        }
        // column scales from the row-scaled magnitudes
        for jw in 0..kept {
            let (idx, vals) = reduced.col(jw);
            if let Some(s) = geometric_scale(
                idx.iter()
                    .zip(vals.iter())
                    .map(|(&i, &v)| (v * row_scale[i]).abs()),
                scale_floor,
                scale_ceil,
            ) {
                col_scale[jw] = s;
            }
        }
    }

    // assemble the scaled working problem with slack columns appended
    let mut scaled_values = Vec::with_capacity(reduced.nnz());
    for jw in 0..kept {
        let (idx, vals) = reduced.col(jw);
        for (&i, &v) in idx.iter().zip(vals.iter()) {
            scaled_values.push(v * row_scale[i] * col_scale[jw]);
        }
    }
    let scaled = SparseMatrix::from_csc(
        m,
        kept,
        reduced.col_ptr().to_vec(),
        {
            let mut all = Vec::with_capacity(reduced.nnz());
            for jw in 0..kept {
                all.extend_from_slice(reduced.col(jw).0);
            }
            all
        },
        scaled_values,
    )?;

    let total = kept + m;
    let mut obj = Vec::with_capacity(total);
    let mut lbw = Vec::with_capacity(total);
    let mut ubw = Vec::with_capacity(total);
    for jw in 0..kept {
        obj.push(wobj[jw] * col_scale[jw]);
        lbw.push(wlb[jw] / col_scale[jw]);
        ubw.push(wub[jw] / col_scale[jw]);
    }
    for i in 0..m {
        obj.push(F::zero());
        let (lo, hi) = WorkLp::<F>::slack_bounds(lp.senses[i]);
        lbw.push(lo);
        ubw.push(hi);
    }
    let srhs: Vec<F> = rhs
        .iter()
        .zip(row_scale.iter())
        .map(|(&b, &r)| b * r)
        .collect();

    let work = WorkLp {
        m,
        n: kept,
        cols: scaled,
        obj,
        lb: lbw,
        ub: ubw,
        rhs: srhs,
        senses: lp.senses.clone(),
    };
    let post = Postsolve {
        col_map,
        fixed_value,
        row_scale,
        col_scale,
    };
    Ok(PresolveOutcome::Reduced(Box::new((work, post))))
}

/// `clamp(1/√(min·max), floor, ceil)` over the nonzero magnitudes, or `None` if the
/// row/column is empty.
fn geometric_scale<F: LpFloat>(
    mags: impl Iterator<Item = F>,
    floor: F,
    ceil: F,
) -> Option<F> {
    let mut min = F::infinity();
    let mut max = F::zero();
    let mut any = false;
    for v in mags {
        if v.is_zero() {
            continue;
        }
        any = true;
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    if !any {
        return None;
    }
    let s = F::one() / (min * max).sqrt();
    Some(s.max(floor).min(ceil))
}

// Copyright 2019-2024 linprog developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Iterative refinement and bound snapping
//!
//! Final polish of the primal values: `x_B` is recomputed from a fresh FTRAN, up to
//! two refinement corrections reduce the residual `b − B·x_B`, then values within
//! tolerance of a bound are snapped onto it and near-zeros are cleaned to exact
//! zero.

use crate::basis::{Basis, ColumnSource};
use crate::core::LpFloat;
use crate::linalg::norm_inf;
use crate::solver::work::WorkLp;

/// Number of refinement corrections.
const REFINE_STEPS: usize = 2;

/// Recompute and polish the basic values in place.
pub(crate) fn refine<F>(
    basis: &mut Basis<F>,
    work: &WorkLp<F>,
    x_basic: &mut Vec<F>,
    feas_tol: F,
) where
    F: LpFloat,
{
    let m = work.m;
    let rhs = work.reduced_rhs(&basis.var_status);

    // fresh solve of B x_B = b − N x_N
    x_basic.clear();
    x_basic.extend_from_slice(&rhs);
    basis.ftran(x_basic);

    // residual corrections: r = rhs − B·x_B, B·dx = r, x_B += dx
    let mut col_buf: Vec<(usize, F)> = Vec::new();
    for _ in 0..REFINE_STEPS {
        let mut residual = rhs.clone();
        for (pos, &xb) in x_basic.iter().enumerate() {
            if xb.is_zero() {
                continue;
            }
            col_buf.clear();
            work.column_into(basis.basic_vars[pos], &mut col_buf);
            for &(i, v) in col_buf.iter() {
                residual[i] = residual[i] - v * xb;
            }
        }
        let worst = norm_inf(&residual);
        if worst <= feas_tol * float!(1e-3) {
            break;
        }
        basis.ftran(&mut residual);
        for (xb, dx) in x_basic.iter_mut().zip(residual.iter()) {
            *xb = *xb + *dx;
        }
    }

    // snap onto bounds and clean dust
    let tiny = float!(1e-12);
    for pos in 0..m {
        let v = basis.basic_vars[pos];
        let x = x_basic[pos];
        if (x - work.lb[v]).abs() < feas_tol {
            x_basic[pos] = work.lb[v];
        } else if (x - work.ub[v]).abs() < feas_tol {
            x_basic[pos] = work.ub[v];
        }
        if x_basic[pos].abs() < tiny {
            x_basic[pos] = F::zero();
        }
    }
}

// Copyright 2019-2024 linprog developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Markowitz LU factorization
//!
//! Sparse LU factorization of a basis matrix with Markowitz ordering and threshold
//! pivoting. The working matrix is materialized densely (the nonzero structure is
//! still tracked through row/column counts, which drive the ordering); `L` and `U`
//! are packed column-wise with cumulative pointers afterwards.
//!
//! ## Reference
//!
//! H. M. Markowitz, "The elimination form of the inverse and its application to
//! linear programming", Management Science 3(3), 1957.

use crate::basis::ColumnSource;
use crate::core::{Error, LpFloat};
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// LU factors of a basis matrix
///
/// When valid, `P·B·Q = L·U` within numerical tolerance, with `L` unit lower
/// triangular, `U` upper triangular with explicit diagonal, and
/// `|U_diag[k]| ≥ min_pivot` for every `k`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct LuFactors<F> {
    m: usize,
    valid: bool,
    /// `L` off-diagonals, packed by pivot-order columns
    l_col_ptr: Vec<usize>,
    l_row: Vec<usize>,
    l_val: Vec<F>,
    /// `U` off-diagonals, packed by pivot-order columns
    u_col_ptr: Vec<usize>,
    u_row: Vec<usize>,
    u_val: Vec<F>,
    /// Explicit diagonal of `U`
    u_diag: Vec<F>,
    /// `p[k]` is the original row eliminated at step `k`
    p: Vec<usize>,
    /// `q[k]` is the original column eliminated at step `k`
    q: Vec<usize>,
    inv_p: Vec<usize>,
}

impl<F> LuFactors<F>
where
    F: LpFloat,
{
    /// Create an empty, invalid factorization for an `m × m` basis.
    pub fn new(m: usize) -> Self {
        LuFactors {
            m,
            valid: false,
            l_col_ptr: Vec::new(),
            l_row: Vec::new(),
            l_val: Vec::new(),
            u_col_ptr: Vec::new(),
            u_row: Vec::new(),
            u_val: Vec::new(),
            u_diag: Vec::new(),
            p: Vec::new(),
            q: Vec::new(),
            inv_p: Vec::new(),
        }
    }

    /// Whether the factors currently satisfy `P·B·Q = L·U`.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Mark the factors stale.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Basis dimension.
    pub fn dim(&self) -> usize {
        self.m
    }

    /// Explicit diagonal of `U` (empty while invalid).
    pub fn u_diag(&self) -> &[F] {
        &self.u_diag
    }

    /// Number of stored nonzeros across `L`, `U` and the diagonal.
    pub fn nnz(&self) -> usize {
        self.l_val.len() + self.u_val.len() + self.u_diag.len()
    }

    /// Factorize the basis selected by `basic_vars` from the augmented matrix
    /// `[A | I]` provided by `source`.
    ///
    /// Pivots are chosen by Markowitz cost `(row_count−1)·(col_count−1)` among
    /// candidates within `threshold` of the column maximum and above `min_pivot`;
    /// ties prefer the larger magnitude, then the lowest row and column index. On
    /// failure the factors are left invalid and a singular-basis error is returned.
    pub fn factorize<S: ColumnSource<F>>(
        &mut self,
        basic_vars: &[usize],
        source: &S,
        min_pivot: F,
        threshold: F,
    ) -> Result<(), Error> {
        let m = basic_vars.len();
        debug_assert_eq!(m, source.num_rows());
        self.valid = false;
        self.m = m;

        // dense working copy of the basis, column-major
        let mut work = vec![F::zero(); m * m];
        let mut row_count = vec![0usize; m];
        let mut col_count = vec![0usize; m];
        let mut col_buf: Vec<(usize, F)> = Vec::new();
        for (pos, &var) in basic_vars.iter().enumerate() {
            col_buf.clear();
            source.column_into(var, &mut col_buf);
            for &(i, v) in col_buf.iter() {
                if v.is_zero() {
                    continue;
                }
                work[i + pos * m] = v;
                row_count[i] += 1;
                col_count[pos] += 1;
            }
        }

        let mut row_elim = vec![false; m];
        let mut col_elim = vec![false; m];
        self.p.clear();
        self.q.clear();
        self.u_diag.clear();
        self.l_col_ptr.clear();
        self.l_row.clear();
        self.l_val.clear();
        self.l_col_ptr.push(0);
        // L rows are recorded as original indices and remapped once `P` is complete
        let mut prow: Vec<(usize, F)> = Vec::new();

        for _step in 0..m {
            let Some((r, c)) = pick_pivot(
                &work,
                m,
                &row_elim,
                &col_elim,
                &row_count,
                &col_count,
                min_pivot,
                threshold,
            ) else {
                return Err(lp_error!(
                    SingularBasis,
                    "`LuFactors`: no admissible pivot; basis is singular."
                ));
            };

            let piv = work[r + c * m];
            self.p.push(r);
            self.q.push(c);
            self.u_diag.push(piv);

            // pivot row over the remaining columns
            prow.clear();
            for j in 0..m {
                if col_elim[j] || j == c {
                    continue;
                }
                let v = work[r + j * m];
                if !v.is_zero() {
                    prow.push((j, v));
                    col_count[j] -= 1;
                }
            }

            // eliminate the pivot column and update the remaining submatrix
            for i in 0..m {
                if row_elim[i] || i == r {
                    continue;
                }
                let a = work[i + c * m];
                if a.is_zero() {
                    continue;
                }
                let mult = a / piv;
                self.l_row.push(i);
                self.l_val.push(mult);
                work[i + c * m] = F::zero();
                row_count[i] -= 1;
                for &(j, urj) in prow.iter() {
                    let idx = i + j * m;
                    let old = work[idx];
                    let new = old - mult * urj;
                    if old.is_zero() {
                        if !new.is_zero() {
                            row_count[i] += 1;
                            col_count[j] += 1;
                        }
                    } else if new.is_zero() {
                        row_count[i] -= 1;
                        col_count[j] -= 1;
                    }
                    work[idx] = new;
                }
            }
            self.l_col_ptr.push(self.l_val.len());
            row_elim[r] = true;
            col_elim[c] = true;
        }

        // remap L rows into pivot order
        self.inv_p = vec![0usize; m];
        for (k, &r) in self.p.iter().enumerate() {
            self.inv_p[r] = k;
        }
        for r in self.l_row.iter_mut() {
            *r = self.inv_p[*r];
        }

        // pack U column-wise: entry (k, k') is the final value of the pivot row k in
        // the column eliminated at step k' > k
        self.u_col_ptr.clear();
        self.u_row.clear();
        self.u_val.clear();
        self.u_col_ptr.push(0);
        for kk in 0..m {
            let c = self.q[kk];
            for (k, &r) in self.p.iter().enumerate().take(kk) {
                let v = work[r + c * m];
                if !v.is_zero() {
                    self.u_row.push(k);
                    self.u_val.push(v);
                }
            }
            self.u_col_ptr.push(self.u_val.len());
        }

        self.valid = true;
        Ok(())
    }

    /// Solve `B·z = x` in place. `x` enters in row space and leaves indexed by basis
    /// position. `work` is scratch of length `m`.
    pub fn solve(&self, x: &mut [F], work: &mut Vec<F>) {
        debug_assert!(self.valid);
        let m = self.m;
        work.resize(m, F::zero());
        // apply P
        for k in 0..m {
            work[k] = x[self.p[k]];
        }
        self.solve_l(work);
        self.solve_u(work);
        // apply Qᵀ: scatter into basis positions
        for k in 0..m {
            x[self.q[k]] = work[k];
        }
    }

    /// Solve `Bᵀ·y = x` in place. `x` enters indexed by basis position and leaves in
    /// row space. `work` is scratch of length `m`.
    pub fn solve_transpose(&self, x: &mut [F], work: &mut Vec<F>) {
        debug_assert!(self.valid);
        let m = self.m;
        work.resize(m, F::zero());
        // apply Q
        for k in 0..m {
            work[k] = x[self.q[k]];
        }
        self.solve_ut(work);
        self.solve_lt(work);
        // apply Pᵀ
        for k in 0..m {
            x[self.p[k]] = work[k];
        }
    }

    /// Forward substitution `L·y = b` (unit diagonal, column-oriented).
    fn solve_l(&self, b: &mut [F]) {
        for k in 0..self.m {
            let xk = b[k];
            if xk.is_zero() {
                continue;
            }
            for t in self.l_col_ptr[k]..self.l_col_ptr[k + 1] {
                b[self.l_row[t]] = b[self.l_row[t]] - self.l_val[t] * xk;
            }
        }
    }

    /// Backward substitution `U·z = y` using the explicit diagonal.
    fn solve_u(&self, b: &mut [F]) {
        for k in (0..self.m).rev() {
            let zk = b[k] / self.u_diag[k];
            b[k] = zk;
            if zk.is_zero() {
                continue;
            }
            for t in self.u_col_ptr[k]..self.u_col_ptr[k + 1] {
                b[self.u_row[t]] = b[self.u_row[t]] - self.u_val[t] * zk;
            }
        }
    }

    /// Forward substitution `Uᵀ·z = y` (column `k` of `U` is row `k` of `Uᵀ`).
    fn solve_ut(&self, b: &mut [F]) {
        for k in 0..self.m {
            let mut acc = b[k];
            for t in self.u_col_ptr[k]..self.u_col_ptr[k + 1] {
                acc = acc - self.u_val[t] * b[self.u_row[t]];
            }
            b[k] = acc / self.u_diag[k];
        }
    }

    /// Backward substitution `Lᵀ·y = z`.
    fn solve_lt(&self, b: &mut [F]) {
        for k in (0..self.m).rev() {
            let mut acc = b[k];
            for t in self.l_col_ptr[k]..self.l_col_ptr[k + 1] {
                acc = acc - self.l_val[t] * b[self.l_row[t]];
            }
            b[k] = acc;
        }
    }
}

/// Markowitz pivot selection over the uneliminated submatrix.
#[allow(clippy::too_many_arguments)]
fn pick_pivot<F: LpFloat>(
    work: &[F],
    m: usize,
    row_elim: &[bool],
    col_elim: &[bool],
    row_count: &[usize],
    col_count: &[usize],
    min_pivot: F,
    threshold: F,
) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut best_cost = usize::MAX;
    let mut best_mag = F::zero();
    for j in 0..m {
        if col_elim[j] {
            continue;
        }
        let mut col_max = F::zero();
        for i in 0..m {
            if row_elim[i] {
                continue;
            }
            let mag = work[i + j * m].abs();
            if mag > col_max {
                col_max = mag;
            }
        }
        if col_max < min_pivot {
            continue;
        }
        let cutoff = threshold * col_max;
        for i in 0..m {
            if row_elim[i] {
                continue;
            }
            let mag = work[i + j * m].abs();
            if mag < cutoff || mag < min_pivot {
                continue;
            }
            let cost = (row_count[i] - 1) * (col_count[j] - 1);
            let better = if cost < best_cost {
                true
            } else if cost > best_cost {
                false
            } else if mag > best_mag {
                true
            } else if mag < best_mag {
                false
            } else {
                // full tie: lowest row index, then lowest column index
                match best {
                    Some((bi, bj)) => (i, j) < (bi, bj),
                    None => true,
                }
            };
            if better {
                best = Some((i, j));
                best_cost = cost;
                best_mag = mag;
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    test_trait_impl!(lu_factors, LuFactors<f64>);

    /// Column source over a dense column-major matrix, rows = columns = dim.
    struct DenseSource {
        dim: usize,
        data: Vec<f64>,
    }

    impl DenseSource {
        fn new(dim: usize, rows: Vec<Vec<f64>>) -> Self {
            let mut data = vec![0.0; dim * dim];
            for (i, row) in rows.iter().enumerate() {
                for (j, &v) in row.iter().enumerate() {
                    data[i + j * dim] = v;
                }
            }
            DenseSource { dim, data }
        }

        fn apply(&self, x: &[f64]) -> Vec<f64> {
            let mut y = vec![0.0; self.dim];
            for j in 0..self.dim {
                for i in 0..self.dim {
                    y[i] += self.data[i + j * self.dim] * x[j];
                }
            }
            y
        }
    }

    impl ColumnSource<f64> for DenseSource {
        fn num_rows(&self) -> usize {
            self.dim
        }

        fn column_into(&self, j: usize, out: &mut Vec<(usize, f64)>) {
            for i in 0..self.dim {
                let v = self.data[i + j * self.dim];
                if v.abs() > 0.0 {
                    out.push((i, v));
                }
            }
        }
    }

    fn factorize(source: &DenseSource) -> LuFactors<f64> {
        let mut lu = LuFactors::new(source.dim);
        let basic: Vec<usize> = (0..source.dim).collect();
        lu.factorize(&basic, source, 1e-10, 0.1).unwrap();
        lu
    }

    #[test]
    fn test_identity() {
        let source = DenseSource::new(
            3,
            vec![
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.0, 0.0, 1.0],
            ],
        );
        let lu = factorize(&source);
        assert!(lu.is_valid());
        let mut x = vec![1.0, 2.0, 3.0];
        let mut work = Vec::new();
        lu.solve(&mut x, &mut work);
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(x[2], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_solve_3x3() {
        let source = DenseSource::new(
            3,
            vec![
                vec![2.0, -1.0, 0.0],
                vec![-1.0, 2.0, -1.0],
                vec![0.0, -1.0, 2.0],
            ],
        );
        let lu = factorize(&source);
        let b = vec![1.0, 0.0, 1.0];
        let mut x = b.clone();
        let mut work = Vec::new();
        lu.solve(&mut x, &mut work);
        let residual = source.apply(&x);
        for i in 0..3 {
            assert_relative_eq!(residual[i], b[i], epsilon = 1e-10);
        }
    }

    #[test]
    fn test_solve_requires_pivoting() {
        let source = DenseSource::new(2, vec![vec![1e-4, 1.0], vec![1.0, 1.0]]);
        let lu = factorize(&source);
        let b = vec![1.0, 2.0];
        let mut x = b.clone();
        let mut work = Vec::new();
        lu.solve(&mut x, &mut work);
        let residual = source.apply(&x);
        assert_relative_eq!(residual[0], b[0], epsilon = 1e-8);
        assert_relative_eq!(residual[1], b[1], epsilon = 1e-8);
    }

    #[test]
    fn test_solve_transpose() {
        let source = DenseSource::new(
            3,
            vec![
                vec![2.0, 1.0, 0.0],
                vec![1.0, 3.0, 1.0],
                vec![0.0, 1.0, 2.0],
            ],
        );
        let lu = factorize(&source);
        let b = vec![1.0, 2.0, 3.0];
        let mut y = b.clone();
        let mut work = Vec::new();
        lu.solve_transpose(&mut y, &mut work);
        // verify Bᵀy = b by applying the transpose
        let mut residual = vec![0.0; 3];
        for j in 0..3 {
            for i in 0..3 {
                residual[j] += source.data[i + j * 3] * y[i];
            }
        }
        for i in 0..3 {
            assert_relative_eq!(residual[i], b[i], epsilon = 1e-10);
        }
    }

    #[test]
    fn test_singular_matrix_is_rejected() {
        let source = DenseSource::new(2, vec![vec![1.0, 2.0], vec![2.0, 4.0]]);
        let mut lu = LuFactors::new(2);
        let res = lu.factorize(&[0, 1], &source, 1e-10, 0.1);
        assert!(res.is_err());
        assert!(!lu.is_valid());
    }

    #[test]
    fn test_u_diag_respects_min_pivot() {
        let source = DenseSource::new(
            3,
            vec![
                vec![4.0, 1.0, 0.5],
                vec![2.0, 5.0, 1.0],
                vec![0.0, 3.0, 6.0],
            ],
        );
        let lu = factorize(&source);
        for &d in lu.u_diag() {
            assert!(d.abs() >= 1e-10);
        }
    }

    #[test]
    fn test_deterministic_ordering() {
        let rows = vec![
            vec![1.0, 0.0, 2.0, 0.0],
            vec![0.0, 3.0, 0.0, 1.0],
            vec![2.0, 0.0, 4.0, 1.0],
            vec![0.0, 1.0, 1.0, 5.0],
        ];
        let source = DenseSource::new(4, rows);
        let lu1 = factorize(&source);
        let lu2 = factorize(&source);
        assert_eq!(lu1.p, lu2.p);
        assert_eq!(lu1.q, lu2.q);
    }

    #[test]
    fn test_sparse_basis_with_slack_columns() {
        // mixed structural/slack basis typical of a warm LP
        let source = DenseSource::new(
            4,
            vec![
                vec![1.0, 0.0, 0.0, 3.0],
                vec![0.0, 1.0, 0.0, 1.0],
                vec![0.0, 0.0, 1.0, 0.0],
                vec![2.0, 0.0, 0.0, 1.0],
            ],
        );
        let lu = factorize(&source);
        let b = vec![4.0, 3.0, 2.0, 1.0];
        let mut x = b.clone();
        let mut work = Vec::new();
        lu.solve(&mut x, &mut work);
        let residual = source.apply(&x);
        for i in 0..4 {
            assert_relative_eq!(residual[i], b[i], epsilon = 1e-10);
        }
    }
}

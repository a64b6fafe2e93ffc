// Copyright 2019-2024 linprog developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Compressed sparse matrices
//!
//! [`SparseMatrix`] stores nonzeros column by column (CSC); [`CsrMatrix`] is its
//! row-oriented mirror. Conversion between the two is a two-pass counting sort: count
//! entries per target row (column), prefix-sum into pointers, then scatter with a
//! working copy of the offsets.

use crate::core::{Error, LpFloat};
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// A sparse matrix in compressed sparse column form
///
/// Invariants: column pointers are non-decreasing with `col_ptr[0] = 0`, row indices
/// lie in `[0, m)` and the value count equals the last column pointer. These are
/// checked once at construction; the matrix is immutable afterwards.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct SparseMatrix<F> {
    m: usize,
    n: usize,
    col_ptr: Vec<usize>,
    row_idx: Vec<usize>,
    values: Vec<F>,
}

impl<F> SparseMatrix<F>
where
    F: LpFloat,
{
    /// Create a matrix from raw CSC arrays.
    ///
    /// # Example
    ///
    /// ```
    /// # use linprog::core::Error;
    /// use linprog::linalg::SparseMatrix;
    ///
    /// # fn main() -> Result<(), Error> {
    /// // [1 0]
    /// // [2 3]
    /// let a = SparseMatrix::from_csc(2, 2, vec![0, 2, 3], vec![0, 1, 1], vec![1.0, 2.0, 3.0])?;
    /// assert_eq!(a.nnz(), 3);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_csc(
        m: usize,
        n: usize,
        col_ptr: Vec<usize>,
        row_idx: Vec<usize>,
        values: Vec<F>,
    ) -> Result<Self, Error> {
        if col_ptr.len() != n + 1 {
            return Err(lp_error!(
                InvalidParameter,
                format!(
                    "`SparseMatrix`: column pointer length {} does not match {} columns.",
                    col_ptr.len(),
                    n
                )
            ));
        }
        if col_ptr[0] != 0 {
            return Err(lp_error!(
                InvalidParameter,
                "`SparseMatrix`: column pointers must start at 0."
            ));
        }
        if col_ptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(lp_error!(
                InvalidParameter,
                "`SparseMatrix`: column pointers must be non-decreasing."
            ));
        }
        let nnz = col_ptr[n];
        if row_idx.len() != nnz || values.len() != nnz {
            return Err(lp_error!(
                InvalidParameter,
                format!(
                    "`SparseMatrix`: {} row indices and {} values do not match {} nonzeros.",
                    row_idx.len(),
                    values.len(),
                    nnz
                )
            ));
        }
        if row_idx.iter().any(|&i| i >= m) {
            return Err(lp_error!(
                InvalidParameter,
                format!("`SparseMatrix`: row index out of range [0, {}).", m)
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(lp_error!(
                InvalidParameter,
                "`SparseMatrix`: values contain a nonfinite entry."
            ));
        }
        Ok(SparseMatrix {
            m,
            n,
            col_ptr,
            row_idx,
            values,
        })
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.m
    }

    /// Number of columns
    pub fn num_cols(&self) -> usize {
        self.n
    }

    /// Number of explicitly stored nonzeros
    pub fn nnz(&self) -> usize {
        self.col_ptr[self.n]
    }

    /// Raw column pointers
    pub fn col_ptr(&self) -> &[usize] {
        &self.col_ptr
    }

    /// Row indices and values of column `j`
    pub fn col(&self, j: usize) -> (&[usize], &[F]) {
        let range = self.col_ptr[j]..self.col_ptr[j + 1];
        (&self.row_idx[range.clone()], &self.values[range])
    }

    /// `y ← A·x`, skipping columns with `|x_j| ≤ eps`
    pub fn mat_vec(&self, x: &[F], y: &mut [F], eps: F) {
        for v in y.iter_mut() {
            *v = F::zero();
        }
        self.mat_vec_add(x, y, eps);
    }

    /// `y ← y + A·x`, skipping columns with `|x_j| ≤ eps`
    pub fn mat_vec_add(&self, x: &[F], y: &mut [F], eps: F) {
        debug_assert_eq!(x.len(), self.n);
        debug_assert_eq!(y.len(), self.m);
        for (j, &xj) in x.iter().enumerate() {
            if xj.abs() <= eps {
                continue;
            }
            let (idx, val) = self.col(j);
            for (&i, &v) in idx.iter().zip(val.iter()) {
                y[i] = y[i] + v * xj;
            }
        }
    }

    /// `y ← Aᵀ·x`, skipping nothing on the input side but never touching entries of
    /// skipped (empty) columns
    pub fn mat_t_vec(&self, x: &[F], y: &mut [F]) {
        debug_assert_eq!(x.len(), self.m);
        debug_assert_eq!(y.len(), self.n);
        for (j, out) in y.iter_mut().enumerate() {
            let (idx, val) = self.col(j);
            let mut acc = F::zero();
            for (&i, &v) in idx.iter().zip(val.iter()) {
                acc = acc + v * x[i];
            }
            *out = acc;
        }
    }

    /// Build the row-oriented mirror of this matrix.
    ///
    /// Two passes: count the entries of every row, prefix-sum the counts into row
    /// pointers, then scatter values using a working copy of the offsets. Within each
    /// row, entries appear in increasing column order.
    pub fn to_csr(&self) -> CsrMatrix<F> {
        let mut row_ptr = vec![0usize; self.m + 1];
        for &i in self.row_idx.iter() {
            row_ptr[i + 1] += 1;
        }
        for i in 0..self.m {
            row_ptr[i + 1] += row_ptr[i];
        }
        let mut offset = row_ptr[..self.m].to_vec();
        let nnz = self.nnz();
        let mut col_idx = vec![0usize; nnz];
        let mut values = vec![F::zero(); nnz];
        for j in 0..self.n {
            for k in self.col_ptr[j]..self.col_ptr[j + 1] {
                let i = self.row_idx[k];
                let dst = offset[i];
                col_idx[dst] = j;
                values[dst] = self.values[k];
                offset[i] += 1;
            }
        }
        CsrMatrix {
            m: self.m,
            n: self.n,
            row_ptr,
            col_idx,
            values,
        }
    }
}

/// A sparse matrix in compressed sparse row form
///
/// Built lazily from a [`SparseMatrix`]; lists the same nonzeros in row order.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct CsrMatrix<F> {
    m: usize,
    n: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<F>,
}

impl<F> CsrMatrix<F>
where
    F: LpFloat,
{
    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.m
    }

    /// Number of columns
    pub fn num_cols(&self) -> usize {
        self.n
    }

    /// Raw row pointers
    pub fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }

    /// Column indices and values of row `i`
    pub fn row(&self, i: usize) -> (&[usize], &[F]) {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        (&self.col_idx[range.clone()], &self.values[range])
    }

    /// Convert back to column form.
    ///
    /// The same two-pass counting scheme as [`SparseMatrix::to_csr`], transposed.
    /// Round-tripping a matrix with row-ordered columns reconstructs the original
    /// arrays exactly.
    pub fn to_csc(&self) -> SparseMatrix<F> {
        let mut col_ptr = vec![0usize; self.n + 1];
        for &j in self.col_idx.iter() {
            col_ptr[j + 1] += 1;
        }
        for j in 0..self.n {
            col_ptr[j + 1] += col_ptr[j];
        }
        let mut offset = col_ptr[..self.n].to_vec();
        let nnz = self.values.len();
        let mut row_idx = vec![0usize; nnz];
        let mut values = vec![F::zero(); nnz];
        for i in 0..self.m {
            for k in self.row_ptr[i]..self.row_ptr[i + 1] {
                let j = self.col_idx[k];
                let dst = offset[j];
                row_idx[dst] = i;
                values[dst] = self.values[k];
                offset[j] += 1;
            }
        }
        SparseMatrix {
            m: self.m,
            n: self.n,
            col_ptr,
            row_idx,
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LpError;
    use approx::assert_relative_eq;

    test_trait_impl!(sparse_matrix, SparseMatrix<f64>);
    test_trait_impl!(csr_matrix, CsrMatrix<f64>);

    fn example() -> SparseMatrix<f64> {
        // [1 0 2]
        // [0 3 0]
        // [4 0 5]
        SparseMatrix::from_csc(
            3,
            3,
            vec![0, 2, 3, 5],
            vec![0, 2, 1, 0, 2],
            vec![1.0, 4.0, 3.0, 2.0, 5.0],
        )
        .unwrap()
    }

    #[test]
    fn test_from_csc_rejects_bad_pointers() {
        let res = SparseMatrix::from_csc(2, 2, vec![0, 2], vec![0, 1], vec![1.0, 2.0]);
        assert_error!(
            res,
            LpError,
            "Invalid parameter: \"`SparseMatrix`: column pointer length 2 does not match 2 columns.\""
        );

        let res = SparseMatrix::from_csc(2, 2, vec![0, 2, 1], vec![0, 1], vec![1.0, 2.0]);
        assert!(res.is_err());
    }

    #[test]
    fn test_from_csc_rejects_row_out_of_range() {
        let res = SparseMatrix::from_csc(2, 1, vec![0, 1], vec![2], vec![1.0]);
        assert_error!(
            res,
            LpError,
            "Invalid parameter: \"`SparseMatrix`: row index out of range [0, 2).\""
        );
    }

    #[test]
    fn test_from_csc_rejects_nonfinite() {
        let res = SparseMatrix::from_csc(1, 1, vec![0, 1], vec![0], vec![f64::INFINITY]);
        assert!(res.is_err());
    }

    #[test]
    fn test_mat_vec() {
        let a = example();
        let x = vec![1.0, 2.0, 3.0];
        let mut y = vec![0.0; 3];
        a.mat_vec(&x, &mut y, 0.0);
        assert_relative_eq!(y[0], 7.0, epsilon = f64::EPSILON);
        assert_relative_eq!(y[1], 6.0, epsilon = f64::EPSILON);
        assert_relative_eq!(y[2], 19.0, epsilon = f64::EPSILON);
    }

    #[test]
    fn test_mat_vec_skips_small_entries() {
        let a = example();
        let x = vec![1.0, 1e-14, 0.0];
        let mut y = vec![0.0; 3];
        a.mat_vec(&x, &mut y, 1e-12);
        // column 1 (value 3.0 in row 1) must not contribute
        assert_relative_eq!(y[1], 0.0, epsilon = f64::EPSILON);
    }

    #[test]
    fn test_mat_t_vec() {
        let a = example();
        let x = vec![1.0, 2.0, 3.0];
        let mut y = vec![0.0; 3];
        a.mat_t_vec(&x, &mut y);
        assert_relative_eq!(y[0], 13.0, epsilon = f64::EPSILON);
        assert_relative_eq!(y[1], 6.0, epsilon = f64::EPSILON);
        assert_relative_eq!(y[2], 17.0, epsilon = f64::EPSILON);
    }

    #[test]
    fn test_csr_roundtrip_reconstructs_csc_exactly() {
        let a = example();
        let csr = a.to_csr();
        let back = csr.to_csc();
        assert_eq!(back.col_ptr, a.col_ptr);
        assert_eq!(back.row_idx, a.row_idx);
        for (x, y) in back.values.iter().zip(a.values.iter()) {
            assert_eq!(x.to_ne_bytes(), y.to_ne_bytes());
        }
    }

    #[test]
    fn test_csr_lists_rows_in_order() {
        let a = example();
        let csr = a.to_csr();
        let (cols, vals) = csr.row(0);
        assert_eq!(cols, &[0, 2]);
        assert_relative_eq!(vals[0], 1.0, epsilon = f64::EPSILON);
        assert_relative_eq!(vals[1], 2.0, epsilon = f64::EPSILON);
        let (cols, _) = csr.row(2);
        assert_eq!(cols, &[0, 2]);
    }

    #[test]
    fn test_empty_matrix() {
        let a = SparseMatrix::<f64>::from_csc(0, 0, vec![0], vec![], vec![]).unwrap();
        assert_eq!(a.nnz(), 0);
        let back = a.to_csr().to_csc();
        assert_eq!(back.col_ptr, vec![0]);
    }
}

// Copyright 2019-2024 linprog developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Problem definition
//!
//! A linear program in standard form:
//!
//! minimize `cᵀx` subject to `Ax {≤, ≥, =} b` and `lb ≤ x ≤ ub`,
//!
//! with `A` given in compressed sparse column form. The matrix is read-only during a
//! solve; all validation happens while the problem is built, before anything is
//! mutated.

use crate::core::{Error, LpFloat};
use crate::linalg::SparseMatrix;
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Sense of a linear constraint
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum ConstraintSense {
    /// `aᵀx ≤ b`
    Le,
    /// `aᵀx ≥ b`
    Ge,
    /// `aᵀx = b`
    Eq,
}

impl ConstraintSense {
    /// Parse a sense from its conventional character code (`'<'`, `'>'`, `'='`).
    ///
    /// # Example
    ///
    /// ```
    /// use linprog::core::ConstraintSense;
    ///
    /// assert_eq!(ConstraintSense::from_char('<').unwrap(), ConstraintSense::Le);
    /// assert_eq!(ConstraintSense::from_char('>').unwrap(), ConstraintSense::Ge);
    /// assert_eq!(ConstraintSense::from_char('=').unwrap(), ConstraintSense::Eq);
    /// assert!(ConstraintSense::from_char('?').is_err());
    /// ```
    pub fn from_char(c: char) -> Result<Self, Error> {
        match c {
            '<' => Ok(ConstraintSense::Le),
            '>' => Ok(ConstraintSense::Ge),
            '=' => Ok(ConstraintSense::Eq),
            _ => Err(lp_error!(
                InvalidParameter,
                format!("`ConstraintSense`: unknown sense code '{}'.", c)
            )),
        }
    }

    /// The conventional character code of this sense.
    pub fn as_char(self) -> char {
        match self {
            ConstraintSense::Le => '<',
            ConstraintSense::Ge => '>',
            ConstraintSense::Eq => '=',
        }
    }
}

/// Variable type
///
/// The engine treats every variable as continuous; integrality is only signalled so
/// that out-of-core logic (e.g. a branch-and-bound layer) can act on it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum VarType {
    /// Continuous variable
    Continuous,
    /// Integer variable (signalled, relaxed by the engine)
    Integer,
}

/// A linear program in standard form
///
/// # Example
///
/// ```
/// # use linprog::core::{ConstraintSense, Error, LinearProgram};
/// # use linprog::linalg::SparseMatrix;
/// # fn main() -> Result<(), Error> {
/// // minimize -x subject to x <= 5, 0 <= x
/// let matrix = SparseMatrix::from_csc(1, 1, vec![0, 1], vec![0], vec![1.0])?;
/// let lp = LinearProgram::new(matrix, vec![-1.0])?
///     .constraints(vec![5.0], vec![ConstraintSense::Le])?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct LinearProgram<F> {
    /// Constraint matrix in compressed sparse column form
    pub matrix: SparseMatrix<F>,
    /// Objective coefficients, length `n`
    pub obj: Vec<F>,
    /// Lower bounds, length `n`
    pub lb: Vec<F>,
    /// Upper bounds, length `n`
    pub ub: Vec<F>,
    /// Right-hand sides, length `m`
    pub rhs: Vec<F>,
    /// Constraint senses, length `m`
    pub senses: Vec<ConstraintSense>,
    /// Variable types, length `n`
    pub vtypes: Vec<VarType>,
}

impl<F> LinearProgram<F>
where
    F: LpFloat,
{
    /// Create a new linear program from a constraint matrix and objective coefficients.
    ///
    /// Bounds default to `[0, ∞)`; right-hand sides and senses must be supplied with
    /// [`constraints`](`LinearProgram::constraints`) before solving.
    pub fn new(matrix: SparseMatrix<F>, obj: Vec<F>) -> Result<Self, Error> {
        if obj.len() != matrix.num_cols() {
            return Err(lp_error!(
                InvalidParameter,
                format!(
                    "`LinearProgram`: objective length {} does not match {} columns.",
                    obj.len(),
                    matrix.num_cols()
                )
            ));
        }
        if obj.iter().any(|c| !c.is_finite()) {
            return Err(lp_error!(
                InvalidParameter,
                "`LinearProgram`: objective contains a nonfinite coefficient."
            ));
        }
        let n = matrix.num_cols();
        Ok(LinearProgram {
            matrix,
            obj,
            lb: vec![F::zero(); n],
            ub: vec![F::infinity(); n],
            rhs: Vec::new(),
            senses: Vec::new(),
            vtypes: vec![VarType::Continuous; n],
        })
    }

    /// Set variable bounds.
    ///
    /// Bounds may be infinite but not NaN, and every lower bound must not exceed the
    /// corresponding upper bound.
    pub fn bounds(mut self, lb: Vec<F>, ub: Vec<F>) -> Result<Self, Error> {
        let n = self.matrix.num_cols();
        if lb.len() != n || ub.len() != n {
            return Err(lp_error!(
                InvalidParameter,
                format!(
                    "`LinearProgram`: bound lengths {}/{} do not match {} columns.",
                    lb.len(),
                    ub.len(),
                    n
                )
            ));
        }
        for j in 0..n {
            if lb[j].is_nan() || ub[j].is_nan() {
                return Err(lp_error!(
                    InvalidParameter,
                    format!("`LinearProgram`: bound of variable {} is NaN.", j)
                ));
            }
            if lb[j] > ub[j] {
                return Err(lp_error!(
                    InvalidParameter,
                    format!(
                        "`LinearProgram`: variable {} has lower bound {} above upper bound {}.",
                        j, lb[j], ub[j]
                    )
                ));
            }
        }
        self.lb = lb;
        self.ub = ub;
        Ok(self)
    }

    /// Set right-hand sides and senses of the constraints.
    pub fn constraints(
        mut self,
        rhs: Vec<F>,
        senses: Vec<ConstraintSense>,
    ) -> Result<Self, Error> {
        let m = self.matrix.num_rows();
        if rhs.len() != m || senses.len() != m {
            return Err(lp_error!(
                InvalidParameter,
                format!(
                    "`LinearProgram`: constraint lengths {}/{} do not match {} rows.",
                    rhs.len(),
                    senses.len(),
                    m
                )
            ));
        }
        if rhs.iter().any(|b| !b.is_finite()) {
            return Err(lp_error!(
                InvalidParameter,
                "`LinearProgram`: right-hand side contains a nonfinite value."
            ));
        }
        self.rhs = rhs;
        self.senses = senses;
        Ok(self)
    }

    /// Set variable types.
    pub fn var_types(mut self, vtypes: Vec<VarType>) -> Result<Self, Error> {
        if vtypes.len() != self.matrix.num_cols() {
            return Err(lp_error!(
                InvalidParameter,
                format!(
                    "`LinearProgram`: variable type length {} does not match {} columns.",
                    vtypes.len(),
                    self.matrix.num_cols()
                )
            ));
        }
        self.vtypes = vtypes;
        Ok(self)
    }

    /// Number of constraints
    pub fn num_rows(&self) -> usize {
        self.matrix.num_rows()
    }

    /// Number of structural variables
    pub fn num_vars(&self) -> usize {
        self.matrix.num_cols()
    }

    /// Checks that constraints have been supplied for every row.
    ///
    /// Called by the driver before touching any solver state.
    pub fn check_ready(&self) -> Result<(), Error> {
        if self.rhs.len() != self.matrix.num_rows() {
            return Err(lp_error!(
                NotInitialized,
                "`LinearProgram`: right-hand sides and senses have not been provided. \
                 Please call `constraints` before solving."
            ));
        }
        Ok(())
    }
}

// Copyright 2019-2024 linprog developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! linprog is a revised simplex linear programming engine written entirely in Rust.
//!
//! Given a sparse linear program in standard form (minimize a linear objective subject
//! to linear constraints and variable bounds) it computes an optimal basic solution, or
//! reports infeasibility or unboundedness. The engine is built around a sparse LU
//! factorization of the basis with product-form eta updates, multi-level pricing with
//! steepest-edge weights, and a Harris two-pass ratio test.
//!
//! Observers allow one to track the progress of iterations, either by using the
//! provided terminal logger or by implementing your own.
//!
//! # Highlights
//!
//! * [Observers](`crate::core::observers`)
//! * [Sparse matrix primitives](`crate::linalg`)
//! * [Basis factorization with eta updates](`crate::basis`)
//!
//! # Components
//!
//! - [Simplex driver](`crate::solver::Simplex`)
//!   - [Pricing](`crate::solver::pricing`) (Dantzig, partial, steepest edge, Devex)
//!   - [Harris ratio test](`crate::solver::ratio`)
//!   - [Bound perturbation](`crate::solver::perturb`)
//!   - [Presolve](`crate::solver::presolve`)
//!   - [Crash basis](`crate::solver::crash`)
//!   - [Iterative refinement](`crate::solver::refine`)
//! - [Basis](`crate::basis::Basis`)
//!   - [Markowitz LU factorization](`crate::basis::lu::LuFactors`)
//!   - [Eta store](`crate::basis::eta::EtaStore`)
//!
//! # Example
//!
//! ```
//! use linprog::core::{ConstraintSense, Error, LinearProgram, SolveStatus, SolverConfig};
//! use linprog::linalg::SparseMatrix;
//! use linprog::solver::Simplex;
//!
//! fn run() -> Result<(), Error> {
//!     // maximize x + y subject to x + y <= 4, x <= 2, y <= 3, x, y >= 0,
//!     // stated as a minimization of -x - y.
//!     let matrix = SparseMatrix::from_csc(
//!         3,
//!         2,
//!         vec![0, 2, 4],
//!         vec![0, 1, 0, 2],
//!         vec![1.0, 1.0, 1.0, 1.0],
//!     )?;
//!     let lp = LinearProgram::new(matrix, vec![-1.0, -1.0])?
//!         .bounds(vec![0.0, 0.0], vec![f64::INFINITY, f64::INFINITY])?
//!         .constraints(
//!             vec![4.0, 2.0, 3.0],
//!             vec![
//!                 ConstraintSense::Le,
//!                 ConstraintSense::Le,
//!                 ConstraintSense::Le,
//!             ],
//!         )?;
//!
//!     let solution = Simplex::new(SolverConfig::default()).solve(&lp)?;
//!     assert_eq!(solution.status, SolveStatus::Optimal);
//!     assert!((solution.objective - (-4.0)).abs() < 1e-6);
//!     Ok(())
//! }
//! # fn main() { run().unwrap(); }
//! ```
//!
//! # License
//!
//! Licensed under either of
//!
//!   * Apache License, Version 2.0,
//!     ([LICENSE-APACHE](https://github.com/linprog-rs/linprog/blob/main/LICENSE-APACHE) or
//!     <http://www.apache.org/licenses/LICENSE-2.0>)
//!   * MIT License ([LICENSE-MIT](https://github.com/linprog-rs/linprog/blob/main/LICENSE-MIT) or
//!     <http://opensource.org/licenses/MIT>)
//!
//! at your option.
//!
//! ## Contribution
//!
//! Unless you explicitly state otherwise, any contribution intentionally submitted for inclusion
//! in the work by you, as defined in the Apache-2.0 license, shall be dual licensed as above,
//! without any additional terms or conditions.

#![warn(missing_docs)]
#![allow(unused_attributes)]
// Explicitly disallow EQ comparison of floats. (This clippy lint is denied by default; however,
// this is just to make sure that it will always stay this way.)
#![deny(clippy::float_cmp)]

#[macro_use]
pub mod core;

/// Basis factorization: Markowitz LU, eta store, FTRAN and BTRAN
pub mod basis;

/// Sparse linear algebra primitives
pub mod linalg;

/// Simplex solver
pub mod solver;

// Copyright 2019-2024 linprog developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Errors
//!
//! Faults raised by the engine. Model outcomes (infeasible, unbounded, limits) are
//! *not* errors; they are reported via [`SolveStatus`](`crate::core::SolveStatus`) so
//! that the two cannot be confused at call sites.

use thiserror::Error;

/// linprog error type
#[derive(Debug, Error)]
pub enum LpError {
    /// Indicates an invalid parameter
    #[error("Invalid parameter: {text:?}")]
    InvalidParameter {
        /// Text
        text: String,
    },

    /// Indicates that required data has not been provided
    #[error("Not initialized: {text:?}")]
    NotInitialized {
        /// Text
        text: String,
    },

    /// Indicates that a condition is violated
    #[error("Condition violated: {text:?}")]
    ConditionViolated {
        /// Text
        text: String,
    },

    /// A working buffer could not be grown; the affected data structure is left at its
    /// pre-call state.
    #[error("Out of memory: {text:?}")]
    OutOfMemory {
        /// Text
        text: String,
    },

    /// The basis matrix is numerically singular
    #[error("Singular basis: {text:?}")]
    SingularBasis {
        /// Text
        text: String,
    },

    /// For errors which are likely bugs.
    #[error("Potential bug: {text:?}. This is potentially a bug. Please file a report on https://github.com/linprog-rs/linprog/issues")]
    PotentialBug {
        /// Text
        text: String,
    },
}

// Copyright 2019-2024 linprog developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Core plumbing of the linprog crate
//!
//! This module holds everything which is shared between the components of the engine:
//! error types, the float abstraction, the solver configuration, the problem and
//! solution types, the iteration state handed to observers, and the key-value store
//! used for logging.
//!
//! If you just want to solve a linear program, start at
//! [`Simplex`](`crate::solver::Simplex`) instead.

/// Macros
#[macro_use]
pub mod macros;
/// Solver configuration
mod config;
/// Error handling
mod errors;
/// Float abstraction
mod float;
/// Key value datastructure
mod kv;
/// Observers
pub mod observers;
/// Problem definition
mod problem;
/// Serialization of solver data (feature `serde1`)
mod serialization;
/// Solution and statistics
mod solution;
/// Iteration state
mod state;
/// Definition of solve statuses
mod status;

pub use anyhow::Error;
pub use config::{PricingStrategy, SolverConfig};
pub use errors::LpError;
pub use float::LpFloat;
pub use kv::KV;
pub use problem::{ConstraintSense, LinearProgram, VarType};
pub use serialization::{DeserializeOwnedAlias, SerializeAlias};
pub use solution::{Solution, SolveStats};
pub use state::{Phase, SolveState};
pub use status::SolveStatus;

//! Exact minimum-imbalance partitioning as a mixed-integer program.
//!
//! # Key Components
//!
//! - **Model**: [`MipModel`]: binary and continuous variables, linear
//!   constraints, a linear objective to minimize
//! - **Encoding**: [`AllocationModel`]: the partition problem written as a
//!   [`MipModel`], and decoding of backend answers back into a
//!   [`Partition`](crate::model::Partition)
//! - **Backend**: [`MipBackend`] trait: anything that solves a
//!   [`MipModel`], closures included
//! - **Solver**: [`ExactSolver`]: encode, solve, decode and verify
//!
//! # Backends
//!
//! - [`EnumerationBackend`]: dependency-free branch-and-bound, suitable for
//!   small rosters and tests
//! - `GoodLpBackend` (feature `good-lp`): the `good_lp` modeling layer with
//!   its pure-Rust `microlp` solver
//!
//! # Design
//!
//! The solver never trusts the backend: a returned assignment is decoded,
//! checked for size balance and for every together/apart constraint, and
//! rejected as [`TeamError::Backend`](crate::error::TeamError::Backend) if
//! anything is off.

mod backend;
mod encode;
mod enumerate;
#[cfg(feature = "good-lp")]
mod lp_backend;
mod model;
mod solver;

pub use backend::{BackendConfig, MipBackend, MipSolution, MipStatus};
pub use encode::AllocationModel;
pub use enumerate::EnumerationBackend;
#[cfg(feature = "good-lp")]
pub use lp_backend::GoodLpBackend;
pub use model::{LinearConstraint, MipModel, MipVar, Sense, VarId, VarKind};
pub use solver::{ExactOutcome, ExactSolver};

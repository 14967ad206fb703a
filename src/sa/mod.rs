//! Simulated Annealing (SA) for team balancing.
//!
//! A single-solution trajectory metaheuristic inspired by the physical
//! annealing process. Accepts worsening moves with a probability that
//! decreases over time (temperature), allowing the search to escape
//! local optima.
//!
//! - [`AnnealRunner`]: geometric-cooling loop over any [`AnnealProblem`]
//! - [`BalanceProblem`]: partition imbalance with constraint-checked swaps
//! - [`SwapMoveGenerator`]: the random two-team swap move
//!
//! The runner only ever sees partitions produced by legal swaps, so every
//! candidate it accepts keeps the hard constraints of the starting partition.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Metropolis et al. (1953), "Equation of State Calculations by Fast
//!   Computing Machines"

mod config;
mod moves;
mod problem;
mod runner;
mod types;

pub use config::AnnealConfig;
pub use moves::{MoveOutcome, SwapMoveGenerator};
pub use problem::BalanceProblem;
pub use runner::{AnnealResult, AnnealRunner};
pub use types::AnnealProblem;

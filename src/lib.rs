//! Balanced team partitioning under together/apart constraints.
//!
//! Splits a roster of rated entities into `k` teams whose sizes differ by at
//! most one, minimizing the imbalance (highest team total minus lowest),
//! while keeping together-groups on one team and apart-pairs on different
//! teams. Two solvers are provided:
//!
//! - **Simulated Annealing**: a constraint-respecting initial partition
//!   improved by random legal two-entity swaps under geometric cooling.
//!   Fast, approximate, reproducible from a seed.
//! - **Exact MIP**: the problem encoded as a mixed-integer program and handed
//!   to a pluggable backend. Optimal when the backend finishes in time.
//!
//! # Modules
//!
//! - [`model`]: entities, the roster, partitions and their report
//! - [`constraints`]: together-groups, apart-pairs and swap legality
//! - [`init`]: the initial partition builder
//! - [`sa`]: the annealing runner and the swap move
//! - [`exact`]: the MIP model, backends and the exact solver
//! - [`config`], [`balancer`]: one configuration and a facade over both
//!   solvers
//!
//! # Features
//!
//! - `roster` (default): CSV roster loading
//! - `serde`: serialization of configurations and TOML config files
//! - `good-lp`: a `good_lp`/`microlp` MIP backend
//! - `cli`: the `u-teams` command-line binary

pub mod balancer;
pub mod config;
pub mod constraints;
pub mod error;
pub mod exact;
pub mod init;
pub mod model;
pub mod sa;

pub use error::{Result, TeamError};

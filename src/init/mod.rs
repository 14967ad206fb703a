//! Initial partition construction.
//!
//! [`PartitionInitializer`] produces a proper, size-balanced partition that
//! already honors every together-group and apart-pair, or reports the
//! instance as infeasible. It is the starting point of the annealer.

mod config;
mod initializer;

pub use config::InitConfig;
pub use initializer::PartitionInitializer;

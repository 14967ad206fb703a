//! Entity and partition model.
//!
//! - [`Roster`]: the fixed set of rated [`Entity`] values, addressed by
//!   dense [`EntityId`] handles, with case-insensitive name lookup
//! - [`Partition`]: an index-based assignment of every entity to one team,
//!   with cached team scores and the imbalance objective
//! - [`PartitionReport`]: human-readable dump of a partition

mod entity;
#[cfg(feature = "roster")]
mod load;
mod partition;
mod report;

pub use entity::{Entity, EntityId, Roster};
pub use partition::Partition;
pub use report::PartitionReport;

//! Console report of a partition.

use std::fmt;

use super::entity::Roster;
use super::partition::Partition;

/// `Display` adapter listing each team's members and total rating,
/// followed by the overall imbalance.
///
/// ```text
/// Team 1:
///   Alice (10)
///   Dan (1)
/// Total Rating: 11
/// --------------------
/// ...
/// Imbalance: 0
/// ```
pub struct PartitionReport<'a> {
    partition: &'a Partition,
    roster: &'a Roster,
}

impl<'a> PartitionReport<'a> {
    pub(crate) fn new(partition: &'a Partition, roster: &'a Roster) -> Self {
        Self { partition, roster }
    }
}

impl fmt::Display for PartitionReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (t, team) in self.partition.teams().enumerate() {
            writeln!(f, "Team {}:", t + 1)?;
            for &id in team {
                let entity = self.roster.entity(id);
                writeln!(f, "  {} ({})", entity.name(), entity.rating())?;
            }
            writeln!(f, "Total Rating: {}", self.partition.score(t))?;
            writeln!(f, "{}", "-".repeat(20))?;
        }
        write!(f, "Imbalance: {}", self.partition.imbalance())
    }
}

//! Index-based partition of a roster into teams.

use super::entity::{EntityId, Roster};
use super::report::PartitionReport;
use crate::error::{Result, TeamError};

/// An assignment of every roster entity to exactly one of `num_teams` teams.
///
/// Membership is stored twice: `team_of` maps entity → team index for O(1)
/// membership tests, and `members` keeps the per-team lists used for random
/// selection. Team scores are cached and updated on every swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    team_of: Vec<usize>,
    members: Vec<Vec<EntityId>>,
    scores: Vec<i64>,
}

impl Partition {
    /// Builds a partition from explicit team member lists.
    ///
    /// Fails unless every roster entity appears in exactly one team.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_teams::model::{EntityId, Partition, Roster};
    ///
    /// let roster = Roster::from_pairs([("a", 10), ("b", 10), ("c", 1), ("d", 1)]).unwrap();
    /// let p = Partition::from_teams(
    ///     vec![vec![EntityId(0), EntityId(2)], vec![EntityId(1), EntityId(3)]],
    ///     &roster,
    /// )
    /// .unwrap();
    /// assert_eq!(p.imbalance(), 0);
    /// ```
    pub fn from_teams(teams: Vec<Vec<EntityId>>, roster: &Roster) -> Result<Self> {
        if teams.is_empty() {
            return Err(TeamError::InvalidPartition("no teams".into()));
        }

        let mut team_of = vec![usize::MAX; roster.len()];
        let mut scores = Vec::with_capacity(teams.len());

        for (t, team) in teams.iter().enumerate() {
            let mut score = 0i64;
            for &id in team {
                if !roster.contains(id) {
                    return Err(TeamError::EntityOutOfRange(id.index()));
                }
                if team_of[id.index()] != usize::MAX {
                    return Err(TeamError::InvalidPartition(format!(
                        "{} assigned more than once",
                        roster.entity(id).name()
                    )));
                }
                team_of[id.index()] = t;
                score += roster.rating(id);
            }
            scores.push(score);
        }

        if let Some(missing) = team_of.iter().position(|&t| t == usize::MAX) {
            return Err(TeamError::InvalidPartition(format!(
                "{} not assigned to any team",
                roster.entity(EntityId(missing)).name()
            )));
        }

        Ok(Self {
            team_of,
            members: teams,
            scores,
        })
    }

    /// Number of teams.
    pub fn num_teams(&self) -> usize {
        self.members.len()
    }

    /// Number of entities across all teams.
    pub fn num_entities(&self) -> usize {
        self.team_of.len()
    }

    /// Members of team `t`.
    pub fn team(&self, t: usize) -> &[EntityId] {
        &self.members[t]
    }

    /// Member lists of all teams, in team order.
    pub fn teams(&self) -> impl Iterator<Item = &[EntityId]> {
        self.members.iter().map(Vec::as_slice)
    }

    /// Team index hosting `id`.
    pub fn team_of(&self, id: EntityId) -> usize {
        self.team_of[id.index()]
    }

    /// Whether `a` and `b` are on the same team.
    pub fn same_team(&self, a: EntityId, b: EntityId) -> bool {
        self.team_of[a.index()] == self.team_of[b.index()]
    }

    /// Total rating of team `t`.
    pub fn score(&self, t: usize) -> i64 {
        self.scores[t]
    }

    /// Total ratings of all teams, in team order.
    pub fn scores(&self) -> &[i64] {
        &self.scores
    }

    /// Max team score minus min team score.
    pub fn imbalance(&self) -> i64 {
        let max = self.scores.iter().copied().max().unwrap_or(0);
        let min = self.scores.iter().copied().min().unwrap_or(0);
        max - min
    }

    /// Member count of each team.
    pub fn team_sizes(&self) -> Vec<usize> {
        self.members.iter().map(Vec::len).collect()
    }

    /// Whether team sizes differ by at most one.
    pub fn is_size_balanced(&self) -> bool {
        let max = self.members.iter().map(Vec::len).max().unwrap_or(0);
        let min = self.members.iter().map(Vec::len).min().unwrap_or(0);
        max - min <= 1
    }

    /// Exchanges the member at `pos_a` of team `t1` with the member at
    /// `pos_b` of team `t2`.
    pub(crate) fn swap_members(
        &mut self,
        roster: &Roster,
        t1: usize,
        pos_a: usize,
        t2: usize,
        pos_b: usize,
    ) {
        debug_assert_ne!(t1, t2, "swap within a single team");
        let a = self.members[t1][pos_a];
        let b = self.members[t2][pos_b];
        let delta = roster.rating(b) - roster.rating(a);

        self.members[t1][pos_a] = b;
        self.members[t2][pos_b] = a;
        self.team_of[a.index()] = t2;
        self.team_of[b.index()] = t1;
        self.scores[t1] += delta;
        self.scores[t2] -= delta;
    }

    /// Moves `id` from its current team to team `to`.
    pub(crate) fn move_member(&mut self, roster: &Roster, id: EntityId, to: usize) {
        let from = self.team_of[id.index()];
        if from == to {
            return;
        }
        if let Some(pos) = self.members[from].iter().position(|&m| m == id) {
            self.members[from].swap_remove(pos);
        }
        self.members[to].push(id);
        self.team_of[id.index()] = to;
        let rating = roster.rating(id);
        self.scores[from] -= rating;
        self.scores[to] += rating;
    }

    /// Verifies the proper-partition invariant against `roster`: every
    /// entity in exactly one team, index and member lists agreeing, and
    /// cached scores matching the ratings.
    pub fn check_proper(&self, roster: &Roster) -> Result<()> {
        if self.team_of.len() != roster.len() {
            return Err(TeamError::InvalidPartition(format!(
                "partition covers {} entities, roster has {}",
                self.team_of.len(),
                roster.len()
            )));
        }

        let mut seen = vec![false; roster.len()];
        for (t, team) in self.members.iter().enumerate() {
            let mut score = 0i64;
            for &id in team {
                if !roster.contains(id) {
                    return Err(TeamError::EntityOutOfRange(id.index()));
                }
                if std::mem::replace(&mut seen[id.index()], true) {
                    return Err(TeamError::InvalidPartition(format!(
                        "{id} appears more than once"
                    )));
                }
                if self.team_of[id.index()] != t {
                    return Err(TeamError::InvalidPartition(format!(
                        "{id} listed in team {t} but indexed to team {}",
                        self.team_of[id.index()]
                    )));
                }
                score += roster.rating(id);
            }
            if score != self.scores[t] {
                return Err(TeamError::InvalidPartition(format!(
                    "team {t} cached score {} != {score}",
                    self.scores[t]
                )));
            }
        }

        match seen.iter().position(|&s| !s) {
            Some(missing) => Err(TeamError::InvalidPartition(format!(
                "{} not assigned",
                EntityId(missing)
            ))),
            None => Ok(()),
        }
    }

    /// Human-readable dump of teams, team totals and the imbalance.
    pub fn report<'a>(&'a self, roster: &'a Roster) -> PartitionReport<'a> {
        PartitionReport::new(self, roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster::from_pairs([("a", 10), ("b", 10), ("c", 1), ("d", 1)]).unwrap()
    }

    fn ids(raw: &[usize]) -> Vec<EntityId> {
        raw.iter().copied().map(EntityId).collect()
    }

    #[test]
    fn test_from_teams_computes_scores() {
        let p = Partition::from_teams(vec![ids(&[0, 1]), ids(&[2, 3])], &roster()).unwrap();
        assert_eq!(p.scores(), &[20, 2]);
        assert_eq!(p.imbalance(), 18);
        assert_eq!(p.team_of(EntityId(3)), 1);
        assert!(p.same_team(EntityId(0), EntityId(1)));
        assert!(p.is_size_balanced());
    }

    #[test]
    fn test_from_teams_rejects_duplicates() {
        let err = Partition::from_teams(vec![ids(&[0, 1]), ids(&[1, 2, 3])], &roster());
        assert!(matches!(err, Err(TeamError::InvalidPartition(_))));
    }

    #[test]
    fn test_from_teams_rejects_omissions() {
        let err = Partition::from_teams(vec![ids(&[0, 1]), ids(&[2])], &roster());
        assert!(matches!(err, Err(TeamError::InvalidPartition(_))));
    }

    #[test]
    fn test_from_teams_rejects_foreign_ids() {
        let err = Partition::from_teams(vec![ids(&[0, 1]), ids(&[2, 3, 9])], &roster());
        assert!(matches!(err, Err(TeamError::EntityOutOfRange(9))));
    }

    #[test]
    fn test_swap_members_updates_index_and_scores() {
        let roster = roster();
        let mut p = Partition::from_teams(vec![ids(&[0, 1]), ids(&[2, 3])], &roster).unwrap();
        p.swap_members(&roster, 0, 1, 1, 0);

        assert_eq!(p.team(0), &ids(&[0, 2])[..]);
        assert_eq!(p.team(1), &ids(&[1, 3])[..]);
        assert_eq!(p.team_of(EntityId(1)), 1);
        assert_eq!(p.team_of(EntityId(2)), 0);
        assert_eq!(p.imbalance(), 0);
        p.check_proper(&roster).unwrap();
    }

    #[test]
    fn test_move_member_keeps_partition_proper() {
        let roster = roster();
        let mut p = Partition::from_teams(vec![ids(&[0, 1, 2]), ids(&[3])], &roster).unwrap();
        p.move_member(&roster, EntityId(2), 1);

        assert_eq!(p.team_sizes(), vec![2, 2]);
        assert_eq!(p.scores(), &[20, 2]);
        p.check_proper(&roster).unwrap();
    }

    #[test]
    fn test_size_balance_detects_spread() {
        let p = Partition::from_teams(vec![ids(&[0, 1, 2]), ids(&[]), ids(&[3])], &roster())
            .unwrap();
        assert!(!p.is_size_balanced());
    }
}

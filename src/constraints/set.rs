//! Together-groups and apart-pairs.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::error::{Result, TeamError};
use crate::model::{EntityId, Partition, Roster};

/// A hard constraint broken by a partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Members of together-group `group` are spread over several teams.
    SplitGroup { group: usize },
    /// Two entities that must be apart share team `team`.
    SharedTeam {
        a: EntityId,
        b: EntityId,
        team: usize,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::SplitGroup { group } => write!(f, "together-group {group} is split"),
            Violation::SharedTeam { a, b, team } => {
                write!(f, "{a} and {b} must be apart but share team {team}")
            }
        }
    }
}

/// The hard pairing constraints of an instance.
///
/// Together-groups are kept pairwise disjoint: adding a group that overlaps
/// existing ones merges them, since co-location is transitive. Groups with
/// fewer than two distinct members carry no constraint and are not stored.
///
/// Apart-pairs are stored in both directions.
///
/// # Examples
///
/// ```
/// use u_teams::constraints::ConstraintSet;
/// use u_teams::model::EntityId;
///
/// let mut cs = ConstraintSet::new();
/// cs.add_together([EntityId(0), EntityId(1)]);
/// cs.add_together([EntityId(1), EntityId(2)]);
/// assert_eq!(cs.groups().len(), 1);
///
/// cs.add_apart(EntityId(3), EntityId(4));
/// assert!(cs.is_apart(EntityId(4), EntityId(3)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    groups: Vec<Vec<EntityId>>,
    group_of: HashMap<EntityId, usize>,
    apart: HashMap<EntityId, BTreeSet<EntityId>>,
}

impl ConstraintSet {
    /// Creates an empty constraint set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires all `members` to share one team.
    pub fn add_together(&mut self, members: impl IntoIterator<Item = EntityId>) {
        let mut group: Vec<EntityId> = Vec::new();
        for id in members {
            if !group.contains(&id) {
                group.push(id);
            }
        }

        let mut overlapping: Vec<usize> = group
            .iter()
            .filter_map(|id| self.group_of.get(id).copied())
            .collect();
        overlapping.sort_unstable();
        overlapping.dedup();

        match overlapping.first().copied() {
            None => {
                if group.len() < 2 {
                    return;
                }
                self.groups.push(group);
            }
            Some(target) => {
                // Fold later groups into the earliest one, highest index first
                // so removals do not shift the remaining indices.
                for &other in overlapping[1..].iter().rev() {
                    let absorbed = self.groups.remove(other);
                    self.groups[target].extend(absorbed);
                }
                for id in group {
                    if !self.groups[target].contains(&id) {
                        self.groups[target].push(id);
                    }
                }
            }
        }
        self.reindex_groups();
    }

    /// Requires `a` and `b` to be on different teams. Self-pairs are ignored.
    pub fn add_apart(&mut self, a: EntityId, b: EntityId) {
        if a == b {
            return;
        }
        self.apart.entry(a).or_default().insert(b);
        self.apart.entry(b).or_default().insert(a);
    }

    /// Requires `a` to be apart from every entity in `others`.
    pub fn add_apart_from(&mut self, a: EntityId, others: impl IntoIterator<Item = EntityId>) {
        for b in others {
            self.add_apart(a, b);
        }
    }

    /// Adds a together-group given by entity names.
    pub fn together_by_name(&mut self, roster: &Roster, names: &[&str]) -> Result<()> {
        let ids = names
            .iter()
            .map(|name| resolve(roster, name))
            .collect::<Result<Vec<_>>>()?;
        self.add_together(ids);
        Ok(())
    }

    /// Adds apart-pairs between `name` and each of `others`, by name.
    pub fn apart_by_name(&mut self, roster: &Roster, name: &str, others: &[&str]) -> Result<()> {
        let a = resolve(roster, name)?;
        let others = others
            .iter()
            .map(|other| resolve(roster, other))
            .collect::<Result<Vec<_>>>()?;
        self.add_apart_from(a, others);
        Ok(())
    }

    /// The disjoint together-groups.
    pub fn groups(&self) -> &[Vec<EntityId>] {
        &self.groups
    }

    /// Index of the together-group containing `id`, if any.
    pub fn group_of(&self, id: EntityId) -> Option<usize> {
        self.group_of.get(&id).copied()
    }

    /// Entities that must not share a team with `id`.
    pub fn apart_from(&self, id: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        self.apart.get(&id).into_iter().flatten().copied()
    }

    /// Whether `a` and `b` must be on different teams.
    pub fn is_apart(&self, a: EntityId, b: EntityId) -> bool {
        self.apart.get(&a).is_some_and(|set| set.contains(&b))
    }

    /// Each apart-pair once, as `(lower id, higher id)`, sorted.
    pub fn apart_pairs(&self) -> Vec<(EntityId, EntityId)> {
        let mut pairs: Vec<(EntityId, EntityId)> = self
            .apart
            .iter()
            .flat_map(|(&a, others)| others.iter().filter(move |&&b| a < b).map(move |&b| (a, b)))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Whether the set holds no constraint at all.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.apart.is_empty()
    }

    /// Checks that every referenced entity belongs to `roster`.
    pub fn validate(&self, roster: &Roster) -> Result<()> {
        let referenced = self
            .groups
            .iter()
            .flatten()
            .chain(self.apart.keys())
            .chain(self.apart.values().flatten());
        for &id in referenced {
            if !roster.contains(id) {
                return Err(TeamError::EntityOutOfRange(id.index()));
            }
        }
        Ok(())
    }

    /// First constraint broken by `partition`, if any.
    pub fn first_violation(&self, partition: &Partition) -> Option<Violation> {
        for (g, group) in self.groups.iter().enumerate() {
            let team = partition.team_of(group[0]);
            if group.iter().any(|&m| partition.team_of(m) != team) {
                return Some(Violation::SplitGroup { group: g });
            }
        }
        self.apart_pairs()
            .into_iter()
            .find(|&(a, b)| partition.same_team(a, b))
            .map(|(a, b)| Violation::SharedTeam {
                a,
                b,
                team: partition.team_of(a),
            })
    }

    /// Whether `partition` honors every together-group and apart-pair.
    pub fn is_satisfied_by(&self, partition: &Partition) -> bool {
        self.first_violation(partition).is_none()
    }

    fn reindex_groups(&mut self) {
        self.group_of.clear();
        for (g, group) in self.groups.iter().enumerate() {
            for &id in group {
                self.group_of.insert(id, g);
            }
        }
    }
}

fn resolve(roster: &Roster, name: &str) -> Result<EntityId> {
    roster
        .lookup(name)
        .ok_or_else(|| TeamError::UnknownEntity(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(i: usize) -> EntityId {
        EntityId(i)
    }

    #[test]
    fn test_overlapping_groups_merge() {
        let mut cs = ConstraintSet::new();
        cs.add_together([id(0), id(1)]);
        cs.add_together([id(2), id(3)]);
        cs.add_together([id(1), id(2), id(4)]);

        assert_eq!(cs.groups().len(), 1);
        let mut merged = cs.groups()[0].clone();
        merged.sort();
        assert_eq!(merged, vec![id(0), id(1), id(2), id(3), id(4)]);
        assert_eq!(cs.group_of(id(3)), Some(0));
    }

    #[test]
    fn test_singleton_group_is_dropped() {
        let mut cs = ConstraintSet::new();
        cs.add_together([id(0), id(0)]);
        assert!(cs.groups().is_empty());
        assert!(cs.is_empty());
    }

    #[test]
    fn test_apart_is_symmetric_and_ignores_self() {
        let mut cs = ConstraintSet::new();
        cs.add_apart_from(id(0), [id(1), id(0), id(2)]);
        assert!(cs.is_apart(id(1), id(0)));
        assert!(cs.is_apart(id(2), id(0)));
        assert!(!cs.is_apart(id(0), id(0)));
        assert_eq!(cs.apart_pairs(), vec![(id(0), id(1)), (id(0), id(2))]);
    }

    #[test]
    fn test_by_name_reports_unknown_entities() {
        let roster = Roster::from_pairs([("Alice", 1), ("Bob", 2)]).unwrap();
        let mut cs = ConstraintSet::new();
        cs.together_by_name(&roster, &["alice", "BOB"]).unwrap();
        assert_eq!(cs.group_of(id(1)), Some(0));

        let err = cs.apart_by_name(&roster, "Alice", &["Carol"]).unwrap_err();
        assert!(matches!(err, TeamError::UnknownEntity(name) if name == "Carol"));
    }

    #[test]
    fn test_validate_rejects_foreign_ids() {
        let roster = Roster::from_pairs([("a", 1), ("b", 2)]).unwrap();
        let mut cs = ConstraintSet::new();
        cs.add_apart(id(0), id(5));
        assert!(matches!(cs.validate(&roster), Err(TeamError::EntityOutOfRange(5))));
    }

    #[test]
    fn test_first_violation() {
        let roster = Roster::from_pairs([("a", 1), ("b", 2), ("c", 3), ("d", 4)]).unwrap();
        let p = Partition::from_teams(vec![vec![id(0), id(2)], vec![id(1), id(3)]], &roster)
            .unwrap();

        let mut together = ConstraintSet::new();
        together.add_together([id(0), id(1)]);
        assert_eq!(
            together.first_violation(&p),
            Some(Violation::SplitGroup { group: 0 })
        );

        let mut apart = ConstraintSet::new();
        apart.add_apart(id(3), id(1));
        assert_eq!(
            apart.first_violation(&p),
            Some(Violation::SharedTeam {
                a: id(1),
                b: id(3),
                team: 1
            })
        );

        let mut ok = ConstraintSet::new();
        ok.add_together([id(0), id(2)]);
        ok.add_apart(id(0), id(1));
        assert!(ok.is_satisfied_by(&p));
    }
}

//! Legality checks for a two-entity swap.

use super::set::ConstraintSet;
use crate::model::{EntityId, Partition};

/// How together-groups restrict swaps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum TogetherRule {
    /// Reject any swap touching a team that hosts a complete together-group,
    /// whether or not the swapped entity belongs to it. Teams holding a group
    /// are therefore frozen for the whole search.
    #[default]
    Conservative,

    /// Reject only swaps that move a member of a together-group. Entities
    /// sharing a team with a group stay movable.
    MemberAware,
}

/// Decides whether swapping entity `a` (team `t1`) with entity `b`
/// (team `t2`) keeps every hard constraint satisfied.
///
/// # Examples
///
/// ```
/// use u_teams::constraints::{ConstraintSet, MoveValidator};
/// use u_teams::model::{EntityId, Partition, Roster};
///
/// let roster = Roster::from_pairs([("a", 1), ("b", 2), ("c", 3), ("d", 4)]).unwrap();
/// let p = Partition::from_teams(
///     vec![vec![EntityId(0), EntityId(1)], vec![EntityId(2), EntityId(3)]],
///     &roster,
/// )
/// .unwrap();
///
/// let mut cs = ConstraintSet::new();
/// cs.add_apart(EntityId(2), EntityId(1));
/// let validator = MoveValidator::new(&cs);
///
/// // c would join b's team.
/// assert!(!validator.is_legal(&p, EntityId(0), EntityId(2)));
/// assert!(validator.is_legal(&p, EntityId(0), EntityId(3)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MoveValidator<'a> {
    constraints: &'a ConstraintSet,
    rule: TogetherRule,
}

impl<'a> MoveValidator<'a> {
    /// Creates a validator using [`TogetherRule::Conservative`].
    pub fn new(constraints: &'a ConstraintSet) -> Self {
        Self {
            constraints,
            rule: TogetherRule::default(),
        }
    }

    /// Selects the together rule applied by [`is_legal`](Self::is_legal).
    pub fn with_rule(mut self, rule: TogetherRule) -> Self {
        self.rule = rule;
        self
    }

    /// The together rule in use.
    pub fn rule(&self) -> TogetherRule {
        self.rule
    }

    /// True if any together-group lies entirely inside team `t1` or team `t2`.
    pub fn breaks_together(&self, partition: &Partition, t1: usize, t2: usize) -> bool {
        self.constraints.groups().iter().any(|group| {
            let team = partition.team_of(group[0]);
            (team == t1 || team == t2) && group.iter().all(|&m| partition.team_of(m) == team)
        })
    }

    /// True if `a` or `b` belongs to a together-group.
    pub fn breaks_together_member_aware(&self, a: EntityId, b: EntityId) -> bool {
        self.constraints.group_of(a).is_some() || self.constraints.group_of(b).is_some()
    }

    /// True if `b` would land next to an entity it must avoid on `t1`, or `a`
    /// next to one on `t2`. The outgoing entity of each team is not counted.
    pub fn breaks_apart(
        &self,
        partition: &Partition,
        a: EntityId,
        b: EntityId,
        t1: usize,
        t2: usize,
    ) -> bool {
        self.constraints
            .apart_from(b)
            .any(|x| x != a && partition.team_of(x) == t1)
            || self
                .constraints
                .apart_from(a)
                .any(|x| x != b && partition.team_of(x) == t2)
    }

    /// Whether swapping `a` and `b` is allowed. Entities on the same team
    /// never form a legal swap.
    pub fn is_legal(&self, partition: &Partition, a: EntityId, b: EntityId) -> bool {
        let t1 = partition.team_of(a);
        let t2 = partition.team_of(b);
        if t1 == t2 {
            return false;
        }
        let together = match self.rule {
            TogetherRule::Conservative => self.breaks_together(partition, t1, t2),
            TogetherRule::MemberAware => self.breaks_together_member_aware(a, b),
        };
        !together && !self.breaks_apart(partition, a, b, t1, t2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Roster;

    fn id(i: usize) -> EntityId {
        EntityId(i)
    }

    // Teams: {0, 1, 2} and {3, 4, 5}
    fn setup() -> (Roster, Partition) {
        let roster =
            Roster::from_pairs([("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 5), ("f", 6)])
                .unwrap();
        let p = Partition::from_teams(
            vec![vec![id(0), id(1), id(2)], vec![id(3), id(4), id(5)]],
            &roster,
        )
        .unwrap();
        (roster, p)
    }

    #[test]
    fn test_conservative_rule_freezes_group_teams() {
        let (_, p) = setup();
        let mut cs = ConstraintSet::new();
        cs.add_together([id(0), id(1)]);
        let v = MoveValidator::new(&cs);

        assert!(v.breaks_together(&p, 0, 1));
        assert!(v.breaks_together(&p, 1, 0));
        // Entity 2 is not in the group, but its team hosts one.
        assert!(!v.is_legal(&p, id(2), id(3)));
    }

    #[test]
    fn test_member_aware_rule_allows_unrelated_entities() {
        let (_, p) = setup();
        let mut cs = ConstraintSet::new();
        cs.add_together([id(0), id(1)]);
        let v = MoveValidator::new(&cs).with_rule(TogetherRule::MemberAware);

        assert!(v.is_legal(&p, id(2), id(3)));
        assert!(!v.is_legal(&p, id(0), id(3)));
        // The conservative predicate keeps its meaning regardless of the rule.
        assert!(v.breaks_together(&p, 0, 1));
    }

    #[test]
    fn test_split_group_does_not_count_as_hosted() {
        let roster = Roster::from_pairs([("a", 1), ("b", 2), ("c", 3), ("d", 4)]).unwrap();
        let p = Partition::from_teams(vec![vec![id(0), id(2)], vec![id(1), id(3)]], &roster)
            .unwrap();
        let mut cs = ConstraintSet::new();
        cs.add_together([id(0), id(1)]);
        let v = MoveValidator::new(&cs);
        assert!(!v.breaks_together(&p, 0, 1));
    }

    #[test]
    fn test_breaks_apart_checks_receiving_team() {
        let (_, p) = setup();
        let mut cs = ConstraintSet::new();
        cs.add_apart(id(3), id(1));
        let v = MoveValidator::new(&cs);

        // 3 would join 1 on team 0.
        assert!(v.breaks_apart(&p, id(0), id(3), 0, 1));
        // 1 would join 3 on team 1.
        assert!(v.breaks_apart(&p, id(1), id(4), 0, 1));
        // 1 and 3 trade places: they stay apart.
        assert!(!v.breaks_apart(&p, id(1), id(3), 0, 1));
        assert!(v.is_legal(&p, id(1), id(3)));
        assert!(v.is_legal(&p, id(2), id(5)));
    }

    #[test]
    fn test_same_team_swap_is_illegal() {
        let (_, p) = setup();
        let cs = ConstraintSet::new();
        assert!(!MoveValidator::new(&cs).is_legal(&p, id(0), id(1)));
    }
}

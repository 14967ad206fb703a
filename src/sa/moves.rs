//! Random two-team swap moves.

use rand::Rng;
use tracing::trace;

use crate::constraints::{ConstraintSet, MoveValidator, TogetherRule};
use crate::model::{EntityId, Partition, Roster};

/// What happened to a proposed swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// `a` and `b` traded teams.
    Applied { a: EntityId, b: EntityId },
    /// The swap would break a constraint (or no swap was possible); the
    /// partition is unchanged.
    Rejected,
}

/// Proposes one swap between two distinct random teams and applies it if
/// the [`MoveValidator`] allows it.
pub struct SwapMoveGenerator<'a> {
    roster: &'a Roster,
    validator: MoveValidator<'a>,
}

impl<'a> SwapMoveGenerator<'a> {
    pub fn new(roster: &'a Roster, constraints: &'a ConstraintSet) -> Self {
        Self {
            roster,
            validator: MoveValidator::new(constraints),
        }
    }

    pub fn with_rule(mut self, rule: TogetherRule) -> Self {
        self.validator = self.validator.with_rule(rule);
        self
    }

    /// The validator consulted for every proposal.
    pub fn validator(&self) -> &MoveValidator<'a> {
        &self.validator
    }

    /// Picks two distinct teams uniformly, one member of each uniformly,
    /// and swaps them in place when legal.
    ///
    /// Partitions with fewer than two teams, or an empty chosen team, yield
    /// [`MoveOutcome::Rejected`].
    pub fn apply<R: Rng>(&self, partition: &mut Partition, rng: &mut R) -> MoveOutcome {
        let k = partition.num_teams();
        if k < 2 {
            return MoveOutcome::Rejected;
        }

        let t1 = rng.random_range(0..k);
        let mut t2 = rng.random_range(0..k - 1);
        if t2 >= t1 {
            t2 += 1;
        }

        let (len1, len2) = (partition.team(t1).len(), partition.team(t2).len());
        if len1 == 0 || len2 == 0 {
            return MoveOutcome::Rejected;
        }
        let pos_a = rng.random_range(0..len1);
        let pos_b = rng.random_range(0..len2);
        let a = partition.team(t1)[pos_a];
        let b = partition.team(t2)[pos_b];

        if !self.validator.is_legal(partition, a, b) {
            trace!(%a, %b, t1, t2, "swap rejected");
            return MoveOutcome::Rejected;
        }

        partition.swap_members(self.roster, t1, pos_a, t2, pos_b);
        MoveOutcome::Applied { a, b }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use u_numflow::random::create_rng;

    fn id(i: usize) -> EntityId {
        EntityId(i)
    }

    fn setup() -> (Roster, Partition) {
        let roster =
            Roster::from_pairs([("a", 10), ("b", 10), ("c", 1), ("d", 1), ("e", 4), ("f", 6)])
                .unwrap();
        let p = Partition::from_teams(
            vec![vec![id(0), id(1)], vec![id(2), id(3)], vec![id(4), id(5)]],
            &roster,
        )
        .unwrap();
        (roster, p)
    }

    #[test]
    fn test_applied_swap_moves_entities_across_teams() {
        let (roster, mut p) = setup();
        let cs = ConstraintSet::new();
        let moves = SwapMoveGenerator::new(&roster, &cs);
        let mut rng = create_rng(42);

        for _ in 0..50 {
            let before = p.clone();
            match moves.apply(&mut p, &mut rng) {
                MoveOutcome::Applied { a, b } => {
                    assert_eq!(p.team_of(a), before.team_of(b));
                    assert_eq!(p.team_of(b), before.team_of(a));
                    assert_ne!(before.team_of(a), before.team_of(b));
                }
                MoveOutcome::Rejected => panic!("unconstrained swap rejected"),
            }
            p.check_proper(&roster).unwrap();
            assert_eq!(p.team_sizes(), vec![2, 2, 2]);
        }
    }

    #[test]
    fn test_rejected_swap_leaves_partition_untouched() {
        let (roster, mut p) = setup();
        let mut cs = ConstraintSet::new();
        // Every team hosts a complete group: nothing may move.
        cs.add_together([id(0), id(1)]);
        cs.add_together([id(2), id(3)]);
        cs.add_together([id(4), id(5)]);
        let moves = SwapMoveGenerator::new(&roster, &cs);
        let mut rng = create_rng(7);

        let before = p.clone();
        for _ in 0..20 {
            assert_eq!(moves.apply(&mut p, &mut rng), MoveOutcome::Rejected);
        }
        assert_eq!(p, before);
    }

    #[test]
    fn test_apart_pairs_never_meet() {
        let (roster, mut p) = setup();
        let mut cs = ConstraintSet::new();
        cs.add_apart(id(0), id(2));
        cs.add_apart(id(0), id(4));
        let moves = SwapMoveGenerator::new(&roster, &cs);
        let mut rng = create_rng(3);

        for _ in 0..200 {
            moves.apply(&mut p, &mut rng);
            assert!(cs.is_satisfied_by(&p));
        }
    }

    #[test]
    fn test_single_team_is_noop() {
        let roster = Roster::from_pairs([("a", 1), ("b", 2)]).unwrap();
        let mut p = Partition::from_teams(vec![vec![id(0), id(1)]], &roster).unwrap();
        let cs = ConstraintSet::new();
        let moves = SwapMoveGenerator::new(&roster, &cs);
        assert_eq!(moves.apply(&mut p, &mut create_rng(0)), MoveOutcome::Rejected);
    }

    #[test]
    fn test_member_aware_rule_moves_group_neighbours() {
        let roster = Roster::from_pairs([("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 5), ("f", 6)])
            .unwrap();
        let mut p = Partition::from_teams(
            vec![vec![id(0), id(1), id(2)], vec![id(3), id(4), id(5)]],
            &roster,
        )
        .unwrap();
        let mut cs = ConstraintSet::new();
        cs.add_together([id(0), id(1)]);
        let moves = SwapMoveGenerator::new(&roster, &cs).with_rule(TogetherRule::MemberAware);
        let mut rng = create_rng(9);

        let mut moved = false;
        for _ in 0..100 {
            if let MoveOutcome::Applied { .. } = moves.apply(&mut p, &mut rng) {
                moved = true;
            }
            assert!(p.same_team(id(0), id(1)));
        }
        assert!(moved);
    }
}

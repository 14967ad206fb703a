//! Team balancing as an annealing problem.

use rand::Rng;

use super::moves::{MoveOutcome, SwapMoveGenerator};
use super::types::AnnealProblem;
use crate::constraints::{ConstraintSet, TogetherRule};
use crate::model::{Partition, Roster};

/// Minimizes partition imbalance with constraint-checked swaps.
pub struct BalanceProblem<'a> {
    roster: &'a Roster,
    moves: SwapMoveGenerator<'a>,
}

impl<'a> BalanceProblem<'a> {
    pub fn new(roster: &'a Roster, constraints: &'a ConstraintSet, rule: TogetherRule) -> Self {
        Self {
            roster,
            moves: SwapMoveGenerator::new(roster, constraints).with_rule(rule),
        }
    }
}

impl AnnealProblem for BalanceProblem<'_> {
    type Solution = Partition;

    fn cost(&self, partition: &Partition) -> f64 {
        partition.imbalance() as f64
    }

    fn perturb<R: Rng>(&self, partition: &mut Partition, rng: &mut R) -> bool {
        let outcome = self.moves.apply(partition, rng);
        debug_assert!(
            partition.check_proper(self.roster).is_ok(),
            "swap produced an improper partition"
        );
        matches!(outcome, MoveOutcome::Applied { .. })
    }
}

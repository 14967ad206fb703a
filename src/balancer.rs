//! One-stop entry point tying the initializer, the annealer and the exact
//! solver to a single [`BalanceConfig`].

use rand::Rng;
use u_numflow::random::create_rng;

use crate::config::BalanceConfig;
use crate::constraints::ConstraintSet;
use crate::error::{Result, TeamError};
use crate::exact::{ExactOutcome, ExactSolver, MipBackend};
use crate::init::PartitionInitializer;
use crate::model::{Partition, Roster};
use crate::sa::{AnnealRunner, BalanceProblem};

/// Result of [`TeamBalancer::anneal`].
#[derive(Debug, Clone)]
pub struct AnnealOutcome {
    /// Best partition found.
    pub partition: Partition,
    /// Its imbalance.
    pub imbalance: i64,
    /// Imbalance of the initializer's partition.
    pub initial_imbalance: i64,
    /// Annealing iterations run.
    pub iterations: usize,
    /// Accepted candidates.
    pub accepted_moves: usize,
    /// Swap proposals rejected as illegal.
    pub rejected_moves: usize,
    /// Best imbalance sampled during the run, non-increasing.
    pub cost_history: Vec<f64>,
}

/// Balances one roster under one constraint set.
///
/// # Examples
///
/// ```
/// use u_teams::balancer::TeamBalancer;
/// use u_teams::config::BalanceConfig;
/// use u_teams::constraints::ConstraintSet;
/// use u_teams::exact::EnumerationBackend;
/// use u_teams::model::Roster;
///
/// let roster = Roster::from_pairs([("a", 10), ("b", 10), ("c", 1), ("d", 1)]).unwrap();
/// let constraints = ConstraintSet::new();
/// let config = BalanceConfig::default()
///     .with_num_teams(2)
///     .with_initial_temp(10.0)
///     .with_min_temp(0.01)
///     .with_cooling_rate(0.99)
///     .with_seed(1);
///
/// let balancer = TeamBalancer::new(&roster, &constraints, config).unwrap();
/// let annealed = balancer.anneal().unwrap();
/// let exact = balancer.solve_exact(EnumerationBackend::new()).unwrap();
/// assert_eq!(exact.imbalance, 0);
/// assert!(exact.imbalance <= annealed.imbalance);
/// ```
#[derive(Debug, Clone)]
pub struct TeamBalancer<'a> {
    roster: &'a Roster,
    constraints: &'a ConstraintSet,
    config: BalanceConfig,
}

impl<'a> TeamBalancer<'a> {
    /// Validates `config` and the constraint ids against `roster`.
    pub fn new(
        roster: &'a Roster,
        constraints: &'a ConstraintSet,
        config: BalanceConfig,
    ) -> Result<Self> {
        config.validate()?;
        constraints.validate(roster)?;
        if roster.is_empty() {
            return Err(TeamError::InvalidConfig("roster is empty".into()));
        }
        Ok(Self {
            roster,
            constraints,
            config,
        })
    }

    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    pub fn roster(&self) -> &'a Roster {
        self.roster
    }

    pub fn constraints(&self) -> &'a ConstraintSet {
        self.constraints
    }

    /// A constraint-respecting starting partition.
    pub fn initial_partition<R: Rng>(&self, rng: &mut R) -> Result<Partition> {
        PartitionInitializer::new(self.roster, self.constraints, self.config.num_teams)
            .with_config(self.config.init_config())
            .build(rng)
    }

    /// Initializes and anneals with an RNG seeded from the configuration.
    pub fn anneal(&self) -> Result<AnnealOutcome> {
        let mut rng = create_rng(self.config.seed.unwrap_or_else(rand::random));
        self.anneal_with_rng(&mut rng)
    }

    /// Initializes and anneals with a caller-supplied RNG. The configured
    /// seed is ignored.
    pub fn anneal_with_rng<R: Rng>(&self, rng: &mut R) -> Result<AnnealOutcome> {
        let initial = self.initial_partition(rng)?;
        let initial_imbalance = initial.imbalance();

        let anneal = self.config.anneal_config();
        let problem = BalanceProblem::new(self.roster, self.constraints, anneal.together_rule);
        let result = AnnealRunner::run_with_rng(&problem, initial, &anneal, rng)?;

        Ok(AnnealOutcome {
            imbalance: result.best.imbalance(),
            partition: result.best,
            initial_imbalance,
            iterations: result.iterations,
            accepted_moves: result.accepted_moves,
            rejected_moves: result.rejected_moves,
            cost_history: result.cost_history,
        })
    }

    /// Solves to optimality with `backend`, bounded by the configured
    /// `solver_time_limit`.
    pub fn solve_exact<B: MipBackend>(&self, backend: B) -> Result<ExactOutcome> {
        ExactSolver::new(backend)
            .with_config(self.config.backend_config())
            .solve(self.roster, self.constraints, self.config.num_teams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exact::EnumerationBackend;
    use crate::model::EntityId;

    fn config(k: usize) -> BalanceConfig {
        BalanceConfig::default()
            .with_num_teams(k)
            .with_initial_temp(10.0)
            .with_min_temp(0.01)
            .with_cooling_rate(0.99)
            .with_seed(3)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let roster = Roster::from_pairs([("a", 1), ("b", 2)]).unwrap();
        let cs = ConstraintSet::new();
        assert!(TeamBalancer::new(&roster, &cs, config(0)).is_err());
    }

    #[test]
    fn test_out_of_range_constraint_rejected() {
        let roster = Roster::from_pairs([("a", 1), ("b", 2)]).unwrap();
        let mut cs = ConstraintSet::new();
        cs.add_apart(EntityId(0), EntityId(5));
        let err = TeamBalancer::new(&roster, &cs, config(2)).unwrap_err();
        assert!(matches!(err, TeamError::EntityOutOfRange(5)));
    }

    #[test]
    fn test_apart_pair_two_entities() {
        let roster = Roster::from_pairs([("a", 4), ("b", 6)]).unwrap();
        let mut cs = ConstraintSet::new();
        cs.apart_by_name(&roster, "A", &["b"]).unwrap();

        let two = TeamBalancer::new(&roster, &cs, config(2)).unwrap();
        let annealed = two.anneal().unwrap();
        assert!(!annealed.partition.same_team(EntityId(0), EntityId(1)));
        assert_eq!(two.solve_exact(EnumerationBackend::new()).unwrap().imbalance, 2);

        let one = TeamBalancer::new(&roster, &cs, config(1)).unwrap();
        assert!(matches!(one.anneal(), Err(TeamError::Infeasible(_))));
        assert!(matches!(
            one.solve_exact(EnumerationBackend::new()),
            Err(TeamError::Infeasible(_))
        ));
    }

    #[test]
    fn test_anneal_is_seeded() {
        let roster = Roster::from_pairs(
            [9, 8, 7, 5, 4, 4, 2, 1, 1]
                .iter()
                .enumerate()
                .map(|(i, &r)| (format!("p{i}"), r)),
        )
        .unwrap();
        let cs = ConstraintSet::new();
        let balancer = TeamBalancer::new(&roster, &cs, config(3)).unwrap();

        let a = balancer.anneal().unwrap();
        let b = balancer.anneal().unwrap();
        assert_eq!(a.partition, b.partition);
        assert_eq!(a.cost_history, b.cost_history);
        assert!(a.imbalance <= a.initial_imbalance);
    }
}

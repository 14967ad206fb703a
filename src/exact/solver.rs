//! Exact partitioning through a MIP backend.

use std::time::Duration;

use tracing::{info, warn};

use super::backend::{BackendConfig, MipBackend, MipStatus};
use super::encode::AllocationModel;
use crate::constraints::ConstraintSet;
use crate::error::{Result, TeamError};
use crate::model::{Partition, Roster};

/// Outcome of an exact solve.
#[derive(Debug, Clone)]
pub struct ExactOutcome {
    /// The decoded partition.
    pub partition: Partition,
    /// Its imbalance.
    pub imbalance: i64,
    /// Whether the backend proved optimality. `false` means the time limit
    /// cut the search and this is the best partition found so far.
    pub optimal: bool,
    /// Backend wall-clock time.
    pub solve_time: Duration,
}

/// Solves the balanced partition problem to optimality with an injected
/// [`MipBackend`].
///
/// # Examples
///
/// ```
/// use u_teams::constraints::ConstraintSet;
/// use u_teams::exact::{EnumerationBackend, ExactSolver};
/// use u_teams::model::Roster;
///
/// let roster = Roster::from_pairs([("a", 10), ("b", 10), ("c", 1), ("d", 1)]).unwrap();
/// let outcome = ExactSolver::new(EnumerationBackend::new())
///     .solve(&roster, &ConstraintSet::new(), 2)
///     .unwrap();
/// assert!(outcome.optimal);
/// assert_eq!(outcome.imbalance, 0);
/// ```
#[derive(Debug, Clone)]
pub struct ExactSolver<B> {
    backend: B,
    config: BackendConfig,
}

impl<B: MipBackend> ExactSolver<B> {
    /// Creates a solver with the default time limit.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            config: BackendConfig::default(),
        }
    }

    /// Replaces the backend configuration.
    pub fn with_config(mut self, config: BackendConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the time limit handed to the backend.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.config.time_limit = Some(limit);
        self
    }

    /// The injected backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The configuration passed on every solve.
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Finds a minimum-imbalance partition into `num_teams` teams.
    ///
    /// # Errors
    ///
    /// - [`TeamError::Infeasible`] if fewer entities than teams exist or the
    ///   backend proves no partition satisfies the constraints
    /// - [`TeamError::NoSolution`] if the time limit passed before any
    ///   feasible assignment was found
    /// - [`TeamError::Backend`] for any other backend status, or an
    ///   assignment that is not a valid balanced partition
    pub fn solve(
        &self,
        roster: &Roster,
        constraints: &ConstraintSet,
        num_teams: usize,
    ) -> Result<ExactOutcome> {
        let encoded = AllocationModel::build(roster, constraints, num_teams)?;
        if roster.len() < num_teams {
            return Err(TeamError::Infeasible(format!(
                "{} entities cannot fill {num_teams} non-empty teams",
                roster.len()
            )));
        }

        info!(
            entities = roster.len(),
            num_teams,
            variables = encoded.model().variable_count(),
            constraints = encoded.model().constraint_count(),
            "exact solve started"
        );
        let solution = self.backend.solve(encoded.model(), &self.config);

        let optimal = match solution.status {
            MipStatus::Optimal => true,
            MipStatus::Feasible => false,
            MipStatus::Infeasible => {
                return Err(TeamError::Infeasible(
                    "no partition satisfies the size, together and apart constraints".into(),
                ))
            }
            status @ MipStatus::Timeout => return Err(TeamError::NoSolution { status }),
            status => {
                return Err(TeamError::Backend(format!(
                    "backend returned status {status:?}"
                )))
            }
        };

        let partition = encoded.decode(&solution, roster)?;
        if !partition.is_size_balanced() {
            return Err(TeamError::Backend(format!(
                "backend assignment has unbalanced team sizes {:?}",
                partition.team_sizes()
            )));
        }
        if let Some(violation) = constraints.first_violation(&partition) {
            return Err(TeamError::Backend(format!(
                "backend assignment breaks a constraint: {violation}"
            )));
        }

        let imbalance = partition.imbalance();
        if optimal {
            info!(
                imbalance,
                solve_ms = solution.solve_time.as_millis() as u64,
                "exact solve finished"
            );
        } else {
            warn!(
                imbalance,
                solve_ms = solution.solve_time.as_millis() as u64,
                "time limit reached, returning best partition found"
            );
        }

        Ok(ExactOutcome {
            partition,
            imbalance,
            optimal,
            solve_time: solution.solve_time,
        })
    }
}

//! MIP backend interface.

use std::time::Duration;

use super::model::{MipModel, VarId};

/// Status of the backend after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MipStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible (but not necessarily optimal) solution found, typically
    /// because the time limit was reached.
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// The objective is unbounded below.
    Unbounded,
    /// Time limit reached before any feasible solution was found.
    Timeout,
    /// Model is invalid or uses features the backend does not support.
    ModelInvalid,
    /// No solution found for unknown reasons.
    Unknown,
}

/// Answer of a MIP backend.
#[derive(Debug, Clone)]
pub struct MipSolution {
    /// Backend status.
    pub status: MipStatus,
    /// Objective value, when a solution was found.
    pub objective_value: Option<f64>,
    /// One value per model variable, indexed by [`VarId`]. Empty when no
    /// solution was found.
    pub values: Vec<f64>,
    /// Wall-clock solve time.
    pub solve_time: Duration,
}

impl MipSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: MipStatus) -> Self {
        Self {
            status,
            objective_value: None,
            values: Vec::new(),
            solve_time: Duration::ZERO,
        }
    }

    /// Whether a feasible solution was found.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, MipStatus::Optimal | MipStatus::Feasible)
    }

    /// Value of `var`, if present.
    pub fn value(&self, var: VarId) -> Option<f64> {
        self.values.get(var.index()).copied()
    }
}

/// Backend configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendConfig {
    /// Maximum solve time. `None` runs to proven optimality.
    pub time_limit: Option<Duration>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            time_limit: Some(Duration::from_secs(300)),
        }
    }
}

impl BackendConfig {
    /// No time limit.
    pub fn unlimited() -> Self {
        Self { time_limit: None }
    }

    /// Stops the search after `limit`.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

/// Trait for MIP backend implementations.
///
/// A backend receives a fully-built [`MipModel`] and reports variable
/// values or an infeasible/time-out status. Any closure of the same shape
/// is a backend, which keeps tests independent of a real solver:
///
/// ```
/// use u_teams::exact::{BackendConfig, MipBackend, MipModel, MipSolution, MipStatus};
///
/// let always_infeasible =
///     |_: &MipModel, _: &BackendConfig| MipSolution::empty(MipStatus::Infeasible);
/// let answer = always_infeasible.solve(&MipModel::new("m"), &BackendConfig::default());
/// assert_eq!(answer.status, MipStatus::Infeasible);
/// ```
pub trait MipBackend {
    /// Solves the model and returns a solution.
    fn solve(&self, model: &MipModel, config: &BackendConfig) -> MipSolution;
}

impl<F> MipBackend for F
where
    F: Fn(&MipModel, &BackendConfig) -> MipSolution,
{
    fn solve(&self, model: &MipModel, config: &BackendConfig) -> MipSolution {
        self(model, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_solution() {
        let solution = MipSolution::empty(MipStatus::Timeout);
        assert!(!solution.is_solution_found());
        assert_eq!(solution.value(VarId(0)), None);
    }

    #[test]
    fn test_backend_config_default() {
        let config = BackendConfig::default();
        assert_eq!(config.time_limit, Some(Duration::from_secs(300)));
        assert_eq!(BackendConfig::unlimited().time_limit, None);
    }
}

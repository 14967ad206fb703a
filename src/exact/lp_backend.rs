//! [`MipBackend`] over the `good_lp` modeling layer.

use std::time::Instant;

use good_lp::{
    default_solver, variable, variables, Expression, ResolutionError, Solution, SolverModel,
    Variable,
};
use tracing::{debug, warn};

use super::backend::{BackendConfig, MipBackend, MipSolution, MipStatus};
use super::model::{MipModel, Sense, VarId, VarKind};

/// Solves models with `good_lp`'s default solver (`microlp` as built by
/// this crate's `good-lp` feature).
///
/// `microlp` has no time-limit setting, so [`BackendConfig::time_limit`] is
/// not enforced and every successful answer is reported as
/// [`MipStatus::Optimal`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpBackend;

impl GoodLpBackend {
    /// Creates the backend.
    pub fn new() -> Self {
        Self
    }
}

impl MipBackend for GoodLpBackend {
    fn solve(&self, model: &MipModel, config: &BackendConfig) -> MipSolution {
        if let Err(reason) = model.validate() {
            warn!(%reason, "rejecting invalid model");
            return MipSolution::empty(MipStatus::ModelInvalid);
        }
        if config.time_limit.is_some() {
            debug!("time limit ignored by the good_lp backend");
        }
        let started = Instant::now();

        let mut vars = variables!();
        let handles: Vec<Variable> = model
            .variables()
            .iter()
            .map(|var| match var.kind {
                VarKind::Binary => vars.add(variable().binary().name(var.name.clone())),
                VarKind::Continuous { lower, upper } => {
                    let mut def = variable().name(var.name.clone());
                    if let Some(l) = lower {
                        def = def.min(l);
                    }
                    if let Some(u) = upper {
                        def = def.max(u);
                    }
                    vars.add(def)
                }
            })
            .collect();

        let linear = |terms: &[(VarId, f64)]| {
            let mut expr = Expression::with_capacity(terms.len());
            for &(v, coef) in terms {
                expr += coef * handles[v.index()];
            }
            expr
        };

        let mut problem = vars.minimise(linear(model.objective())).using(default_solver);
        for c in model.constraints() {
            let lhs = linear(&c.terms);
            problem = problem.with(match c.sense {
                Sense::Le => lhs.leq(c.rhs),
                Sense::Ge => lhs.geq(c.rhs),
                Sense::Eq => lhs.eq(c.rhs),
            });
        }

        let mut answer = match problem.solve() {
            Ok(solution) => {
                let values: Vec<f64> = handles.iter().map(|&h| solution.value(h)).collect();
                let mut answer = MipSolution::empty(MipStatus::Optimal);
                answer.objective_value = Some(model.objective_value(&values));
                answer.values = values;
                answer
            }
            Err(ResolutionError::Infeasible) => MipSolution::empty(MipStatus::Infeasible),
            Err(ResolutionError::Unbounded) => MipSolution::empty(MipStatus::Unbounded),
            Err(e) => {
                warn!(error = %e, "good_lp solve failed");
                MipSolution::empty(MipStatus::Unknown)
            }
        };
        answer.solve_time = started.elapsed();
        answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintSet;
    use crate::exact::ExactSolver;
    use crate::model::{EntityId, Roster};

    #[test]
    fn test_small_partition() {
        let roster =
            Roster::from_pairs([("a", 10), ("b", 10), ("c", 1), ("d", 1), ("e", 4), ("f", 6)])
                .unwrap();
        let mut cs = ConstraintSet::new();
        cs.add_apart(EntityId(2), EntityId(3));

        let outcome = ExactSolver::new(GoodLpBackend::new())
            .solve(&roster, &cs, 2)
            .unwrap();
        // {10, 1, 6} vs {10, 1, 4}
        assert_eq!(outcome.imbalance, 2);
        assert!(cs.is_satisfied_by(&outcome.partition));
    }

    #[test]
    fn test_infeasible_model() {
        let mut model = MipModel::new("infeasible");
        let x = model.add_binary("x");
        model.add_constraint(vec![(x, 1.0)], Sense::Ge, 2.0);

        let solution = GoodLpBackend::new().solve(&model, &BackendConfig::unlimited());
        assert_eq!(solution.status, MipStatus::Infeasible);
    }
}

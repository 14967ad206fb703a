//! Depth-first branch-and-bound backend for small models.

use std::time::Instant;

use tracing::debug;

use super::backend::{BackendConfig, MipBackend, MipSolution, MipStatus};
use super::model::{MipModel, Sense, VarKind};

const TOL: f64 = 1e-9;

/// A self-contained backend that enumerates binary assignments depth-first.
///
/// Pruning uses the activity range of every constraint over the still-free
/// binaries, and a lower bound on the objective derived from continuous
/// variable bounds. A continuous variable is bounded by each constraint in
/// which it is the only continuous term; once all binaries are fixed those
/// bounds are exact, so the optimum sets each continuous variable to the
/// bound its objective coefficient favors.
///
/// # Limitations
///
/// - Exponential in the number of binaries: intended for small rosters and
///   for tests, not production-sized instances
/// - A constraint with two or more distinct continuous variables makes the
///   model [`MipStatus::ModelInvalid`]
///
/// # Examples
///
/// ```
/// use u_teams::exact::{BackendConfig, EnumerationBackend, MipBackend, MipModel, MipStatus, Sense};
///
/// let mut model = MipModel::new("knapsack");
/// let a = model.add_binary("a");
/// let b = model.add_binary("b");
/// let c = model.add_binary("c");
/// model.add_constraint(vec![(a, 3.0), (b, 4.0), (c, 2.0)], Sense::Le, 6.0);
/// model.set_objective(vec![(a, -5.0), (b, -6.0), (c, -3.0)]);
///
/// let solution = EnumerationBackend::new().solve(&model, &BackendConfig::unlimited());
/// assert_eq!(solution.status, MipStatus::Optimal);
/// assert_eq!(solution.objective_value, Some(-9.0));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumerationBackend;

impl EnumerationBackend {
    /// Creates the backend.
    pub fn new() -> Self {
        Self
    }
}

impl MipBackend for EnumerationBackend {
    fn solve(&self, model: &MipModel, config: &BackendConfig) -> MipSolution {
        let started = Instant::now();
        if model.validate().is_err() {
            return MipSolution::empty(MipStatus::ModelInvalid);
        }
        let Some(mut search) = Search::prepare(model, config) else {
            return MipSolution::empty(MipStatus::ModelInvalid);
        };

        if search.root_feasible() {
            search.dfs(0);
        }

        let status = if search.unbounded {
            MipStatus::Unbounded
        } else {
            match (&search.best, search.timed_out) {
                (Some(_), false) => MipStatus::Optimal,
                (Some(_), true) => MipStatus::Feasible,
                (None, false) => MipStatus::Infeasible,
                (None, true) => MipStatus::Timeout,
            }
        };
        debug!(nodes = search.nodes, ?status, "enumeration finished");

        let mut solution = MipSolution::empty(status);
        solution.solve_time = started.elapsed();
        if status != MipStatus::Unbounded {
            if let Some((objective, values)) = search.best {
                solution.objective_value = Some(objective);
                solution.values = values;
            }
        }
        solution
    }
}

struct Search<'m> {
    model: &'m MipModel,
    /// Binary variable indices in branching order.
    binaries: Vec<usize>,
    /// Continuous variable indices.
    continuous: Vec<usize>,
    /// Per variable: `(constraint, coefficient)` of its binary occurrences.
    occurrences: Vec<Vec<(usize, f64)>>,
    /// Per constraint: its single continuous term, if any.
    continuous_term: Vec<Option<(usize, f64)>>,
    /// Aggregated objective coefficient per variable.
    objective: Vec<f64>,
    /// Per constraint: activity of fixed binaries.
    fixed: Vec<f64>,
    /// Per constraint: sum of positive coefficients over free binaries.
    free_pos: Vec<f64>,
    /// Per constraint: sum of negative coefficients over free binaries.
    free_neg: Vec<f64>,
    is_fixed: Vec<bool>,
    values: Vec<f64>,
    best: Option<(f64, Vec<f64>)>,
    deadline: Option<Instant>,
    nodes: u64,
    timed_out: bool,
    unbounded: bool,
}

impl<'m> Search<'m> {
    fn prepare(model: &'m MipModel, config: &BackendConfig) -> Option<Self> {
        let n = model.variable_count();
        let m = model.constraint_count();

        let mut search = Self {
            model,
            binaries: Vec::new(),
            continuous: Vec::new(),
            occurrences: vec![Vec::new(); n],
            continuous_term: vec![None; m],
            objective: vec![0.0; n],
            fixed: vec![0.0; m],
            free_pos: vec![0.0; m],
            free_neg: vec![0.0; m],
            is_fixed: vec![false; n],
            values: vec![0.0; n],
            best: None,
            deadline: config.time_limit.map(|limit| Instant::now() + limit),
            nodes: 0,
            timed_out: false,
            unbounded: false,
        };

        for (v, var) in model.variables().iter().enumerate() {
            match var.kind {
                VarKind::Binary => search.binaries.push(v),
                VarKind::Continuous { .. } => search.continuous.push(v),
            }
        }

        for (c, constraint) in model.constraints().iter().enumerate() {
            for &(var, coef) in &constraint.terms {
                let v = var.index();
                if coef == 0.0 {
                    continue;
                }
                if model.is_binary(var) {
                    search.occurrences[v].push((c, coef));
                    if coef > 0.0 {
                        search.free_pos[c] += coef;
                    } else {
                        search.free_neg[c] += coef;
                    }
                } else {
                    let current = search.continuous_term[c];
                    match current {
                        None => search.continuous_term[c] = Some((v, coef)),
                        Some((existing, a)) if existing == v => {
                            search.continuous_term[c] = Some((v, a + coef));
                        }
                        Some(_) => return None,
                    }
                }
            }
        }

        for &(var, coef) in model.objective() {
            search.objective[var.index()] += coef;
        }
        Some(search)
    }

    /// Checks constraints made only of binaries (or of nothing) before
    /// branching.
    fn root_feasible(&self) -> bool {
        (0..self.model.constraint_count())
            .filter(|&c| self.continuous_term[c].is_none())
            .all(|c| self.activity_ok(c))
    }

    fn activity_ok(&self, c: usize) -> bool {
        let constraint = &self.model.constraints()[c];
        let lo = self.fixed[c] + self.free_neg[c];
        let hi = self.fixed[c] + self.free_pos[c];
        match constraint.sense {
            Sense::Le => lo <= constraint.rhs + TOL,
            Sense::Ge => hi >= constraint.rhs - TOL,
            Sense::Eq => lo <= constraint.rhs + TOL && hi >= constraint.rhs - TOL,
        }
    }

    fn fix(&mut self, v: usize, value: f64) {
        for &(c, coef) in &self.occurrences[v] {
            if coef > 0.0 {
                self.free_pos[c] -= coef;
            } else {
                self.free_neg[c] -= coef;
            }
            self.fixed[c] += coef * value;
        }
        self.is_fixed[v] = true;
        self.values[v] = value;
    }

    fn unfix(&mut self, v: usize, value: f64) {
        for &(c, coef) in &self.occurrences[v] {
            if coef > 0.0 {
                self.free_pos[c] += coef;
            } else {
                self.free_neg[c] += coef;
            }
            self.fixed[c] -= coef * value;
        }
        self.is_fixed[v] = false;
        self.values[v] = 0.0;
    }

    /// Bounds `(lower, upper)` per variable index for the continuous
    /// variables, valid for every completion of the current partial
    /// assignment. `None` if some domain is empty.
    fn continuous_bounds(&self) -> Option<Vec<(f64, f64)>> {
        let mut bounds = vec![(f64::NEG_INFINITY, f64::INFINITY); self.model.variable_count()];
        for &v in &self.continuous {
            if let VarKind::Continuous { lower, upper } = self.model.variables()[v].kind {
                bounds[v] = (
                    lower.unwrap_or(f64::NEG_INFINITY),
                    upper.unwrap_or(f64::INFINITY),
                );
            }
        }

        for (c, constraint) in self.model.constraints().iter().enumerate() {
            let Some((v, a)) = self.continuous_term[c] else {
                continue;
            };
            let lo = self.fixed[c] + self.free_neg[c];
            let hi = self.fixed[c] + self.free_pos[c];
            // Binary part + a * x <sense> rhs
            if matches!(constraint.sense, Sense::Le | Sense::Eq) {
                tighten_le(&mut bounds[v], a, constraint.rhs - lo);
            }
            if matches!(constraint.sense, Sense::Ge | Sense::Eq) {
                tighten_ge(&mut bounds[v], a, constraint.rhs - hi);
            }
        }

        let consistent = self
            .continuous
            .iter()
            .all(|&v| bounds[v].0 <= bounds[v].1 + TOL);
        consistent.then_some(bounds)
    }

    fn objective_bound(&self, bounds: &[(f64, f64)]) -> f64 {
        let binary: f64 = self
            .binaries
            .iter()
            .map(|&v| {
                let coef = self.objective[v];
                if self.is_fixed[v] {
                    coef * self.values[v]
                } else {
                    coef.min(0.0)
                }
            })
            .sum();
        let continuous: f64 = self
            .continuous
            .iter()
            .map(|&v| {
                let coef = self.objective[v];
                if coef > 0.0 {
                    coef * bounds[v].0
                } else if coef < 0.0 {
                    coef * bounds[v].1
                } else {
                    0.0
                }
            })
            .sum();
        binary + continuous
    }

    fn dfs(&mut self, depth: usize) {
        if self.timed_out || self.unbounded {
            return;
        }
        self.nodes += 1;
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            self.timed_out = true;
            return;
        }

        let Some(bounds) = self.continuous_bounds() else {
            return;
        };
        let bound = self.objective_bound(&bounds);
        if let Some((best, _)) = &self.best {
            if bound >= best - TOL {
                return;
            }
        }

        if depth == self.binaries.len() {
            self.record_leaf(&bounds);
            return;
        }

        let v = self.binaries[depth];
        for value in [1.0, 0.0] {
            self.fix(v, value);
            let feasible = self.occurrences[v]
                .iter()
                .all(|&(c, _)| self.continuous_term[c].is_some() || self.activity_ok(c));
            if feasible {
                self.dfs(depth + 1);
            }
            self.unfix(v, value);
            if self.timed_out || self.unbounded {
                return;
            }
        }
    }

    fn record_leaf(&mut self, bounds: &[(f64, f64)]) {
        let mut values = self.values.clone();
        for &v in &self.continuous {
            let (lo, hi) = bounds[v];
            let coef = self.objective[v];
            let x = if coef > 0.0 {
                lo
            } else if coef < 0.0 {
                hi
            } else if lo.is_finite() {
                lo
            } else if hi.is_finite() {
                hi
            } else {
                0.0
            };
            if !x.is_finite() {
                self.unbounded = true;
                return;
            }
            values[v] = x;
        }

        let objective = self.model.objective_value(&values);
        self.best = Some((objective, values));
    }
}

/// Applies `a * x <= r` to `(lower, upper)`.
fn tighten_le(bounds: &mut (f64, f64), a: f64, r: f64) {
    if a > 0.0 {
        bounds.1 = bounds.1.min(r / a);
    } else {
        bounds.0 = bounds.0.max(r / a);
    }
}

/// Applies `a * x >= r` to `(lower, upper)`.
fn tighten_ge(bounds: &mut (f64, f64), a: f64, r: f64) {
    if a > 0.0 {
        bounds.0 = bounds.0.max(r / a);
    } else {
        bounds.1 = bounds.1.min(r / a);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exact::VarId;
    use std::time::Duration;

    #[test]
    fn test_pure_binary_optimum() {
        // Choose exactly two of four items minimizing cost.
        let mut model = MipModel::new("choose-two");
        let vars: Vec<VarId> = (0..4).map(|i| model.add_binary(format!("x{i}"))).collect();
        model.add_constraint(vars.iter().map(|&v| (v, 1.0)).collect(), Sense::Eq, 2.0);
        model.set_objective(vec![(vars[0], 4.0), (vars[1], 1.0), (vars[2], 3.0), (vars[3], 2.0)]);

        let solution = EnumerationBackend::new().solve(&model, &BackendConfig::unlimited());
        assert_eq!(solution.status, MipStatus::Optimal);
        assert_eq!(solution.objective_value, Some(3.0));
        assert_eq!(solution.values, vec![0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_min_max_spread() {
        // Split {5, 3, 2} into "in" and "out"; minimize max(in, out) - min(in, out).
        let mut model = MipModel::new("spread");
        let x: Vec<VarId> = (0..3).map(|i| model.add_binary(format!("x{i}"))).collect();
        let hi = model.add_continuous("hi", None, None);
        let lo = model.add_continuous("lo", None, None);
        let w = [5.0, 3.0, 2.0];
        let inside: Vec<(VarId, f64)> = x.iter().zip(w).map(|(&v, c)| (v, c)).collect();
        let outside: Vec<(VarId, f64)> = x.iter().zip(w).map(|(&v, c)| (v, -c)).collect();
        // in <= hi, in >= lo
        let mut t = inside.clone();
        t.push((hi, -1.0));
        model.add_constraint(t, Sense::Le, 0.0);
        let mut t = inside;
        t.push((lo, -1.0));
        model.add_constraint(t, Sense::Ge, 0.0);
        // out = 10 - in
        let mut t = outside.clone();
        t.push((hi, -1.0));
        model.add_constraint(t, Sense::Le, -10.0);
        let mut t = outside;
        t.push((lo, -1.0));
        model.add_constraint(t, Sense::Ge, -10.0);
        model.set_objective(vec![(hi, 1.0), (lo, -1.0)]);

        let solution = EnumerationBackend::new().solve(&model, &BackendConfig::unlimited());
        assert_eq!(solution.status, MipStatus::Optimal);
        assert_eq!(solution.objective_value, Some(0.0));
        assert!(model.is_satisfied_by(&solution.values, 1e-9));
    }

    #[test]
    fn test_infeasible() {
        let mut model = MipModel::new("infeasible");
        let x = model.add_binary("x");
        let y = model.add_binary("y");
        model.add_constraint(vec![(x, 1.0), (y, 1.0)], Sense::Ge, 3.0);

        let solution = EnumerationBackend::new().solve(&model, &BackendConfig::unlimited());
        assert_eq!(solution.status, MipStatus::Infeasible);
        assert!(solution.values.is_empty());
    }

    #[test]
    fn test_unbounded() {
        let mut model = MipModel::new("unbounded");
        let x = model.add_binary("x");
        let z = model.add_continuous("z", None, None);
        model.add_constraint(vec![(x, 1.0), (z, 1.0)], Sense::Le, 4.0);
        model.set_objective(vec![(z, 1.0)]);

        let solution = EnumerationBackend::new().solve(&model, &BackendConfig::unlimited());
        assert_eq!(solution.status, MipStatus::Unbounded);
    }

    #[test]
    fn test_coupled_continuous_is_invalid() {
        let mut model = MipModel::new("coupled");
        let y = model.add_continuous("y", Some(0.0), None);
        let z = model.add_continuous("z", Some(0.0), None);
        model.add_constraint(vec![(y, 1.0), (z, 1.0)], Sense::Ge, 1.0);

        let solution = EnumerationBackend::new().solve(&model, &BackendConfig::unlimited());
        assert_eq!(solution.status, MipStatus::ModelInvalid);
    }

    #[test]
    fn test_zero_time_limit_times_out() {
        let mut model = MipModel::new("tiny");
        let x = model.add_binary("x");
        model.set_objective(vec![(x, 1.0)]);

        let config = BackendConfig::unlimited().with_time_limit(Duration::ZERO);
        let solution = EnumerationBackend::new().solve(&model, &config);
        assert_eq!(solution.status, MipStatus::Timeout);
    }
}

//! Backend-neutral linear model with binary and continuous variables.

/// Handle to a variable in a [`MipModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

impl VarId {
    /// Position of the variable in the model.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Domain of a model variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VarKind {
    /// Takes the value 0 or 1.
    Binary,
    /// Real-valued within optional bounds.
    Continuous {
        lower: Option<f64>,
        upper: Option<f64>,
    },
}

/// A named model variable.
#[derive(Debug, Clone, PartialEq)]
pub struct MipVar {
    /// Variable name, for diagnostics and backends that want one.
    pub name: String,
    /// Domain.
    pub kind: VarKind,
}

/// Comparison of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// `lhs <= rhs`
    Le,
    /// `lhs >= rhs`
    Ge,
    /// `lhs == rhs`
    Eq,
}

/// `sum(coef * var) <sense> rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    /// `(variable, coefficient)` pairs.
    pub terms: Vec<(VarId, f64)>,
    /// Comparison.
    pub sense: Sense,
    /// Right-hand side constant.
    pub rhs: f64,
}

/// A minimization problem over binary and continuous variables with linear
/// constraints and a linear objective.
///
/// # Examples
///
/// ```
/// use u_teams::exact::{MipModel, Sense};
///
/// let mut model = MipModel::new("pick-one");
/// let x = model.add_binary("x");
/// let y = model.add_binary("y");
/// model.add_constraint(vec![(x, 1.0), (y, 1.0)], Sense::Eq, 1.0);
/// model.set_objective(vec![(x, 3.0), (y, 2.0)]);
///
/// assert_eq!(model.variable_count(), 2);
/// assert!(model.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MipModel {
    /// Model name.
    pub name: String,
    variables: Vec<MipVar>,
    constraints: Vec<LinearConstraint>,
    objective: Vec<(VarId, f64)>,
}

impl MipModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: Vec::new(),
        }
    }

    /// Adds a 0/1 variable.
    pub fn add_binary(&mut self, name: impl Into<String>) -> VarId {
        self.add_var(name, VarKind::Binary)
    }

    /// Adds a continuous variable with optional bounds.
    pub fn add_continuous(
        &mut self,
        name: impl Into<String>,
        lower: Option<f64>,
        upper: Option<f64>,
    ) -> VarId {
        self.add_var(name, VarKind::Continuous { lower, upper })
    }

    fn add_var(&mut self, name: impl Into<String>, kind: VarKind) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(MipVar {
            name: name.into(),
            kind,
        });
        id
    }

    /// Adds `sum(terms) <sense> rhs`.
    pub fn add_constraint(&mut self, terms: Vec<(VarId, f64)>, sense: Sense, rhs: f64) {
        self.constraints.push(LinearConstraint { terms, sense, rhs });
    }

    /// Sets the linear objective to minimize.
    pub fn set_objective(&mut self, terms: Vec<(VarId, f64)>) {
        self.objective = terms;
    }

    /// All variables, indexed by [`VarId`].
    pub fn variables(&self) -> &[MipVar] {
        &self.variables
    }

    /// All constraints.
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Objective terms.
    pub fn objective(&self) -> &[(VarId, f64)] {
        &self.objective
    }

    /// Returns the number of variables.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Whether `id` is a binary variable.
    pub fn is_binary(&self, id: VarId) -> bool {
        matches!(self.variables[id.0].kind, VarKind::Binary)
    }

    /// Evaluates the objective at `values`.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.iter().map(|&(v, c)| c * values[v.0]).sum()
    }

    /// Checks every constraint and variable domain at `values` within `tol`.
    pub fn is_satisfied_by(&self, values: &[f64], tol: f64) -> bool {
        if values.len() != self.variables.len() {
            return false;
        }
        let domains_ok = self.variables.iter().zip(values).all(|(var, &x)| match var.kind {
            VarKind::Binary => x.abs() <= tol || (x - 1.0).abs() <= tol,
            VarKind::Continuous { lower, upper } => {
                lower.is_none_or(|l| x >= l - tol) && upper.is_none_or(|u| x <= u + tol)
            }
        });
        domains_ok
            && self.constraints.iter().all(|c| {
                let lhs: f64 = c.terms.iter().map(|&(v, coef)| coef * values[v.0]).sum();
                match c.sense {
                    Sense::Le => lhs <= c.rhs + tol,
                    Sense::Ge => lhs >= c.rhs - tol,
                    Sense::Eq => (lhs - c.rhs).abs() <= tol,
                }
            })
    }

    /// Validates the model for consistency.
    ///
    /// Checks that every referenced variable exists, coefficients and bounds
    /// are finite, and bounds are ordered.
    pub fn validate(&self) -> Result<(), String> {
        for var in &self.variables {
            if let VarKind::Continuous { lower, upper } = var.kind {
                if lower.is_some_and(|l| !l.is_finite()) || upper.is_some_and(|u| !u.is_finite()) {
                    return Err(format!("non-finite bound on {}", var.name));
                }
                if let (Some(l), Some(u)) = (lower, upper) {
                    if l > u {
                        return Err(format!("empty domain for {}", var.name));
                    }
                }
            }
        }

        let all_terms = self
            .constraints
            .iter()
            .flat_map(|c| c.terms.iter())
            .chain(self.objective.iter());
        for &(v, coef) in all_terms {
            if v.0 >= self.variables.len() {
                return Err(format!("undefined variable: {}", v.0));
            }
            if !coef.is_finite() {
                return Err(format!("non-finite coefficient on {}", self.variables[v.0].name));
            }
        }
        for c in &self.constraints {
            if !c.rhs.is_finite() {
                return Err("non-finite right-hand side".into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_creation() {
        let mut model = MipModel::new("test");
        let x = model.add_binary("x");
        let z = model.add_continuous("z", Some(0.0), None);
        model.add_constraint(vec![(x, 5.0), (z, -1.0)], Sense::Le, 0.0);
        model.set_objective(vec![(z, 1.0)]);

        assert_eq!(model.variable_count(), 2);
        assert_eq!(model.constraint_count(), 1);
        assert!(model.is_binary(x));
        assert!(!model.is_binary(z));
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_undefined_variable() {
        let mut model = MipModel::new("test");
        model.add_constraint(vec![(VarId(3), 1.0)], Sense::Eq, 1.0);
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_empty_domain() {
        let mut model = MipModel::new("test");
        model.add_continuous("z", Some(2.0), Some(1.0));
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_is_satisfied_by() {
        let mut model = MipModel::new("test");
        let x = model.add_binary("x");
        let y = model.add_binary("y");
        model.add_constraint(vec![(x, 1.0), (y, 1.0)], Sense::Le, 1.0);

        assert!(model.is_satisfied_by(&[1.0, 0.0], 1e-9));
        assert!(!model.is_satisfied_by(&[1.0, 1.0], 1e-9));
        assert!(!model.is_satisfied_by(&[0.5, 0.0], 1e-9));
        assert!(!model.is_satisfied_by(&[1.0], 1e-9));
    }

    #[test]
    fn test_objective_value() {
        let mut model = MipModel::new("test");
        let x = model.add_binary("x");
        let z = model.add_continuous("z", None, None);
        model.set_objective(vec![(x, 2.0), (z, -1.0)]);
        assert_eq!(model.objective_value(&[1.0, 0.5]), 1.5);
    }
}

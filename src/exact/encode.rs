//! Assignment model of a balanced partition.

use super::backend::MipSolution;
use super::model::{MipModel, Sense, VarId};
use crate::constraints::ConstraintSet;
use crate::error::{Result, TeamError};
use crate::model::{EntityId, Partition, Roster};

/// The partition problem as a mixed-integer model.
///
/// Variables:
/// - `x[e][t]` binary: entity `e` is on team `t`
/// - `max_score`, `min_score` continuous and unbounded
///
/// Minimizes `max_score - min_score` subject to:
/// - every entity on exactly one team
/// - every team score between `min_score` and `max_score`
/// - every team size in `[floor(N/k), ceil(N/k)]`
/// - every together-group member on its group representative's team
/// - at most one entity of each apart-pair per team
#[derive(Debug, Clone)]
pub struct AllocationModel {
    model: MipModel,
    assign: Vec<Vec<VarId>>,
    max_score: VarId,
    min_score: VarId,
    num_teams: usize,
}

impl AllocationModel {
    /// Encodes the instance.
    ///
    /// # Errors
    ///
    /// [`TeamError::InvalidConfig`] if `num_teams == 0`, and constraint
    /// validation errors for out-of-range ids.
    pub fn build(roster: &Roster, constraints: &ConstraintSet, num_teams: usize) -> Result<Self> {
        if num_teams == 0 {
            return Err(TeamError::InvalidConfig(
                "num_teams must be at least 1".into(),
            ));
        }
        constraints.validate(roster)?;

        let n = roster.len();
        let k = num_teams;
        let mut model = MipModel::new(format!("balance-{n}x{k}"));

        let assign: Vec<Vec<VarId>> = roster
            .iter()
            .map(|(id, _)| {
                (0..k)
                    .map(|t| model.add_binary(format!("x_{}_{t}", id.index())))
                    .collect()
            })
            .collect();
        let max_score = model.add_continuous("max_score", None, None);
        let min_score = model.add_continuous("min_score", None, None);
        model.set_objective(vec![(max_score, 1.0), (min_score, -1.0)]);

        for row in &assign {
            model.add_constraint(row.iter().map(|&x| (x, 1.0)).collect(), Sense::Eq, 1.0);
        }

        let floor = (n / k) as f64;
        let ceil = n.div_ceil(k) as f64;
        for t in 0..k {
            let score: Vec<(VarId, f64)> = roster
                .iter()
                .map(|(id, e)| (assign[id.index()][t], e.rating() as f64))
                .collect();

            let mut upper = score.clone();
            upper.push((max_score, -1.0));
            model.add_constraint(upper, Sense::Le, 0.0);

            let mut lower = score;
            lower.push((min_score, -1.0));
            model.add_constraint(lower, Sense::Ge, 0.0);

            let size: Vec<(VarId, f64)> = assign.iter().map(|row| (row[t], 1.0)).collect();
            model.add_constraint(size.clone(), Sense::Ge, floor);
            model.add_constraint(size, Sense::Le, ceil);
        }

        for group in constraints.groups() {
            let Some((&rep, rest)) = group.split_first() else {
                continue;
            };
            for &member in rest {
                for t in 0..k {
                    model.add_constraint(
                        vec![(assign[member.index()][t], 1.0), (assign[rep.index()][t], -1.0)],
                        Sense::Eq,
                        0.0,
                    );
                }
            }
        }

        for (a, b) in constraints.apart_pairs() {
            for t in 0..k {
                model.add_constraint(
                    vec![(assign[a.index()][t], 1.0), (assign[b.index()][t], 1.0)],
                    Sense::Le,
                    1.0,
                );
            }
        }

        Ok(Self {
            model,
            assign,
            max_score,
            min_score,
            num_teams: k,
        })
    }

    /// The encoded model.
    pub fn model(&self) -> &MipModel {
        &self.model
    }

    /// Number of teams the model was built for.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_teams::constraints::ConstraintSet;
    /// use u_teams::exact::AllocationModel;
    /// use u_teams::model::{EntityId, Roster};
    ///
    /// let roster = Roster::from_pairs([("a", 1), ("b", 2), ("c", 3)]).unwrap();
    /// let encoded = AllocationModel::build(&roster, &ConstraintSet::new(), 2).unwrap();
    /// assert_eq!(encoded.num_teams(), 2);
    ///
    /// let model = encoded.model();
    /// assert!(model.is_binary(encoded.assignment_var(EntityId(2), 1)));
    /// assert!(!model.is_binary(encoded.max_score_var()));
    /// assert!(!model.is_binary(encoded.min_score_var()));
    /// assert_eq!(model.variable_count(), 3 * 2 + 2);
    /// ```
    pub fn num_teams(&self) -> usize {
        self.num_teams
    }

    /// The binary `x[id][team]`.
    pub fn assignment_var(&self, id: EntityId, team: usize) -> VarId {
        self.assign[id.index()][team]
    }

    /// The continuous variable bounding every team score from above.
    pub fn max_score_var(&self) -> VarId {
        self.max_score
    }

    /// The continuous variable bounding every team score from below.
    pub fn min_score_var(&self) -> VarId {
        self.min_score
    }

    /// Reads the partition out of a backend solution.
    ///
    /// Each entity goes to the single team whose binary is above 0.5.
    ///
    /// # Errors
    ///
    /// [`TeamError::Backend`] if the solution has the wrong number of
    /// values or places an entity on zero or several teams.
    pub fn decode(&self, solution: &MipSolution, roster: &Roster) -> Result<Partition> {
        if solution.values.len() != self.model.variable_count() {
            return Err(TeamError::Backend(format!(
                "expected {} variable values, got {}",
                self.model.variable_count(),
                solution.values.len()
            )));
        }

        let mut teams = vec![Vec::new(); self.num_teams()];
        for (id, entity) in roster.iter() {
            let mut chosen = self.assign[id.index()]
                .iter()
                .enumerate()
                .filter(|&(_, &x)| solution.values[x.index()] > 0.5)
                .map(|(t, _)| t);
            match (chosen.next(), chosen.next()) {
                (Some(t), None) => teams[t].push(id),
                (None, _) => {
                    return Err(TeamError::Backend(format!(
                        "{} is assigned to no team",
                        entity.name()
                    )))
                }
                (Some(_), Some(_)) => {
                    return Err(TeamError::Backend(format!(
                        "{} is assigned to several teams",
                        entity.name()
                    )))
                }
            }
        }

        Partition::from_teams(teams, roster).map_err(|e| TeamError::Backend(e.to_string()))
    }
}

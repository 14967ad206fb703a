//! Constraint-respecting construction of a first partition.
//!
//! # Algorithm
//!
//! Team capacities are fixed up front: every team holds `floor(N/k)`
//! members and `N mod k` of them may hold one more.
//!
//! 1. Place each together-group whole on a team with room for it, avoiding
//!    teams that hold an apart partner of a member. Odd attempts pack the
//!    groups largest first into the tightest fitting team; even attempts
//!    take the groups in shuffled order and pick a fitting team at random.
//! 2. Place the free entities, those with the most apart partners first,
//!    on a team with room and no apart partner
//! 3. Repair remaining apart violations by swapping a free entity of the
//!    violating pair with a free entity of another team
//!
//! A failed attempt is retried with a fresh shuffle up to
//! [`InitConfig::max_attempts`] times.

use std::cmp::Reverse;
use std::fmt;

use rand::Rng;
use tracing::{debug, trace};
use u_numflow::random::shuffle;

use super::config::InitConfig;
use crate::constraints::{ConstraintSet, MoveValidator, Violation};
use crate::error::{Result, TeamError};
use crate::model::{EntityId, Partition, Roster};

enum AttemptFailure {
    Unplaced { len: usize, sizes: Vec<usize> },
    Violated(Violation),
    Structural(TeamError),
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Unplaced { len, sizes } => {
                write!(f, "no team has room for {len} more members (team sizes {sizes:?})")
            }
            AttemptFailure::Violated(v) => write!(f, "{v}"),
            AttemptFailure::Structural(e) => write!(f, "{e}"),
        }
    }
}

/// Teams under construction with their size limits.
struct Layout {
    teams: Vec<Vec<EntityId>>,
    team_of: Vec<Option<usize>>,
    base: usize,
    // Teams that may still grow to `base + 1`.
    wide_left: usize,
}

impl Layout {
    fn new(n: usize, k: usize) -> Self {
        Self {
            teams: vec![Vec::new(); k],
            team_of: vec![None; n],
            base: n / k,
            wide_left: n % k,
        }
    }

    fn room(&self, t: usize) -> usize {
        let len = self.teams[t].len();
        if len > self.base {
            0
        } else {
            self.base - len + usize::from(self.wide_left > 0)
        }
    }

    fn conflicts(&self, t: usize, members: &[EntityId], constraints: &ConstraintSet) -> bool {
        members.iter().any(|&m| {
            constraints
                .apart_from(m)
                .any(|x| self.team_of[x.index()] == Some(t))
        })
    }

    fn place(&mut self, t: usize, members: &[EntityId]) {
        let was_wide = self.teams[t].len() > self.base;
        for &m in members {
            self.teams[t].push(m);
            self.team_of[m.index()] = Some(t);
        }
        if !was_wide && self.teams[t].len() > self.base {
            self.wide_left -= 1;
        }
    }

    fn sizes(&self) -> Vec<usize> {
        self.teams.iter().map(Vec::len).collect()
    }
}

/// Builds the first feasible partition handed to the annealer.
///
/// # Examples
///
/// ```
/// use u_teams::constraints::ConstraintSet;
/// use u_teams::init::PartitionInitializer;
/// use u_teams::model::Roster;
///
/// let roster = Roster::from_pairs([("a", 3), ("b", 1), ("c", 2), ("d", 2)]).unwrap();
/// let mut cs = ConstraintSet::new();
/// cs.together_by_name(&roster, &["a", "b"]).unwrap();
///
/// let mut rng = u_numflow::random::create_rng(7);
/// let p = PartitionInitializer::new(&roster, &cs, 2).build(&mut rng).unwrap();
/// assert_eq!(p.team_sizes(), vec![2, 2]);
/// assert!(cs.is_satisfied_by(&p));
/// ```
pub struct PartitionInitializer<'a> {
    roster: &'a Roster,
    constraints: &'a ConstraintSet,
    num_teams: usize,
    config: InitConfig,
}

impl<'a> PartitionInitializer<'a> {
    /// Creates an initializer for `num_teams` teams.
    pub fn new(roster: &'a Roster, constraints: &'a ConstraintSet, num_teams: usize) -> Self {
        Self {
            roster,
            constraints,
            num_teams,
            config: InitConfig::default(),
        }
    }

    /// Replaces the default [`InitConfig`].
    pub fn with_config(mut self, config: InitConfig) -> Self {
        self.config = config;
        self
    }

    /// Rejects instances that are infeasible regardless of the shuffle.
    pub fn check_feasibility(&self) -> Result<()> {
        self.config.validate()?;
        self.constraints.validate(self.roster)?;

        let n = self.roster.len();
        let k = self.num_teams;
        if k == 0 {
            return Err(TeamError::InvalidConfig(
                "num_teams must be at least 1".into(),
            ));
        }
        if n < k {
            return Err(TeamError::Infeasible(format!(
                "{n} entities cannot fill {k} non-empty teams"
            )));
        }

        let max_size = n.div_ceil(k);
        for group in self.constraints.groups() {
            if group.len() > max_size {
                return Err(TeamError::Infeasible(format!(
                    "together-group of {} exceeds the team size limit of {max_size}",
                    group.len()
                )));
            }
        }

        let pairs = self.constraints.apart_pairs();
        if let Some(&(a, b)) = pairs.first() {
            if k == 1 {
                return Err(TeamError::Infeasible(format!(
                    "{} and {} must be apart but only one team exists",
                    self.roster.entity(a).name(),
                    self.roster.entity(b).name()
                )));
            }
        }
        for (a, b) in pairs {
            let ga = self.constraints.group_of(a);
            if ga.is_some() && ga == self.constraints.group_of(b) {
                return Err(TeamError::Infeasible(format!(
                    "{} and {} are both together and apart",
                    self.roster.entity(a).name(),
                    self.roster.entity(b).name()
                )));
            }
        }
        Ok(())
    }

    /// Builds a proper, size-balanced partition that honors every
    /// together-group and apart-pair.
    pub fn build<R: Rng>(&self, rng: &mut R) -> Result<Partition> {
        self.check_feasibility()?;

        let mut last_failure = None;
        for attempt in 1..=self.config.max_attempts {
            match self.attempt(rng, attempt) {
                Ok(partition) => {
                    debug!(attempt, imbalance = partition.imbalance(), "initial partition built");
                    return Ok(partition);
                }
                Err(AttemptFailure::Structural(e)) => return Err(e),
                Err(failure) => {
                    debug!(attempt, reason = %failure, "initial partition attempt discarded");
                    last_failure = Some(failure);
                }
            }
        }

        let reason = last_failure.map_or_else(String::new, |f| f.to_string());
        Err(TeamError::Infeasible(format!(
            "no constraint-respecting initial partition after {} attempts: {reason}",
            self.config.max_attempts
        )))
    }

    fn attempt<R: Rng>(
        &self,
        rng: &mut R,
        attempt: usize,
    ) -> std::result::Result<Partition, AttemptFailure> {
        let n = self.roster.len();
        let k = self.num_teams;
        let packed = attempt % 2 == 1;
        let mut layout = Layout::new(n, k);

        let groups = self.constraints.groups();
        let mut order: Vec<usize> = (0..groups.len()).collect();
        shuffle(&mut order, rng);
        if packed {
            order.sort_by_key(|&g| Reverse(groups[g].len()));
        }
        for g in order {
            let group = &groups[g];
            let fitting: Vec<usize> = (0..k).filter(|&t| layout.room(t) >= group.len()).collect();
            let clear: Vec<usize> = fitting
                .iter()
                .copied()
                .filter(|&t| !layout.conflicts(t, group, self.constraints))
                .collect();
            let candidates = if clear.is_empty() { fitting } else { clear };
            let chosen = if packed {
                candidates
                    .iter()
                    .copied()
                    .min_by_key(|&t| (layout.room(t), t))
            } else if candidates.is_empty() {
                None
            } else {
                Some(candidates[rng.random_range(0..candidates.len())])
            };
            match chosen {
                Some(t) => layout.place(t, group),
                None => {
                    return Err(AttemptFailure::Unplaced {
                        len: group.len(),
                        sizes: layout.sizes(),
                    })
                }
            }
        }

        let mut free: Vec<EntityId> = self
            .roster
            .ids()
            .filter(|&id| self.constraints.group_of(id).is_none())
            .collect();
        shuffle(&mut free, rng);
        free.sort_by_key(|&id| Reverse(self.constraints.apart_from(id).count()));
        for id in free {
            let open: Vec<(bool, usize)> = (0..k)
                .filter(|&t| layout.room(t) > 0)
                .map(|t| (layout.conflicts(t, &[id], self.constraints), t))
                .collect();
            let chosen = if packed {
                open.iter()
                    .min_by_key(|&&(conflict, t)| (conflict, Reverse(layout.room(t)), t))
                    .map(|&(_, t)| t)
            } else {
                let clear: Vec<usize> = open.iter().filter(|o| !o.0).map(|o| o.1).collect();
                if clear.is_empty() {
                    open.first().map(|o| o.1)
                } else {
                    Some(clear[rng.random_range(0..clear.len())])
                }
            };
            match chosen {
                Some(t) => layout.place(t, &[id]),
                None => {
                    return Err(AttemptFailure::Unplaced {
                        len: 1,
                        sizes: layout.sizes(),
                    })
                }
            }
        }

        let mut partition =
            Partition::from_teams(layout.teams, self.roster).map_err(AttemptFailure::Structural)?;
        self.repair(&mut partition)?;
        debug_assert!(partition.is_size_balanced());
        Ok(partition)
    }

    /// Resolves apart violations with swaps between free entities. Every
    /// swap removes the violation at hand and creates none, so the loop ends.
    fn repair(&self, partition: &mut Partition) -> std::result::Result<(), AttemptFailure> {
        let validator = MoveValidator::new(self.constraints);
        while let Some(violation) = self.constraints.first_violation(partition) {
            let (a, b, team) = match &violation {
                Violation::SharedTeam { a, b, team } => (*a, *b, *team),
                Violation::SplitGroup { .. } => {
                    return Err(AttemptFailure::Violated(violation.clone()))
                }
            };
            let view: &Partition = partition;
            let swap = [b, a]
                .into_iter()
                .filter(|&m| self.constraints.group_of(m).is_none())
                .find_map(|m| {
                    let pos = view.team(team).iter().position(|&x| x == m)?;
                    self.swap_target(view, &validator, m, team)
                        .map(|(t2, pos2)| (pos, t2, pos2))
                });
            match swap {
                Some((pos, t2, pos2)) => {
                    trace!(%a, %b, from = team, to = t2, "apart violation repaired");
                    partition.swap_members(self.roster, team, pos, t2, pos2);
                }
                None => return Err(AttemptFailure::Violated(violation)),
            }
        }
        Ok(())
    }

    /// A free entity on another team that can trade places with `m`.
    fn swap_target(
        &self,
        partition: &Partition,
        validator: &MoveValidator<'_>,
        m: EntityId,
        team: usize,
    ) -> Option<(usize, usize)> {
        (0..partition.num_teams())
            .filter(|&t| t != team)
            .find_map(|t2| {
                partition
                    .team(t2)
                    .iter()
                    .position(|&c| {
                        self.constraints.group_of(c).is_none()
                            && !validator.breaks_apart(partition, m, c, team, t2)
                    })
                    .map(|pos| (t2, pos))
            })
    }
}

//! Top-level parameters for a balancing run.

use std::time::Duration;

use crate::constraints::TogetherRule;
use crate::error::{Result, TeamError};
use crate::exact::BackendConfig;
use crate::init::InitConfig;
use crate::sa::AnnealConfig;

/// Every caller-supplied parameter of a [`TeamBalancer`](crate::balancer::TeamBalancer).
///
/// Fields missing from a TOML document take their default values.
///
/// # Examples
///
/// ```
/// use u_teams::config::BalanceConfig;
///
/// let config = BalanceConfig::default().with_num_teams(4).with_seed(7);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.anneal_config().seed, Some(7));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct BalanceConfig {
    /// Number of teams, at least 1.
    pub num_teams: usize,

    /// Annealing start temperature.
    pub initial_temp: f64,

    /// Multiplicative cooling factor in (0, 1).
    pub cooling_rate: f64,

    /// Annealing stops at or below this temperature.
    pub min_temp: f64,

    /// Exact solver time limit in seconds. 0 = no limit.
    pub solver_time_limit: f64,

    /// Seed for the initializer and the annealer. `None` draws one.
    pub seed: Option<u64>,

    /// Hard cap on annealing iterations. 0 = no cap.
    pub max_iterations: usize,

    /// Initializer shuffles before giving up.
    pub init_attempts: usize,

    /// How together-groups restrict annealing swaps.
    pub together_rule: TogetherRule,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        let anneal = AnnealConfig::default();
        Self {
            num_teams: 10,
            initial_temp: anneal.initial_temperature,
            cooling_rate: anneal.cooling_rate,
            min_temp: anneal.min_temperature,
            solver_time_limit: 300.0,
            seed: None,
            max_iterations: anneal.max_iterations,
            init_attempts: InitConfig::default().max_attempts,
            together_rule: TogetherRule::default(),
        }
    }
}

impl BalanceConfig {
    /// Sets the number of teams.
    pub fn with_num_teams(mut self, k: usize) -> Self {
        self.num_teams = k;
        self
    }

    pub fn with_initial_temp(mut self, t: f64) -> Self {
        self.initial_temp = t;
        self
    }

    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    pub fn with_min_temp(mut self, t: f64) -> Self {
        self.min_temp = t;
        self
    }

    /// Sets the exact solver time limit in seconds; 0 means no limit.
    pub fn with_solver_time_limit(mut self, secs: f64) -> Self {
        self.solver_time_limit = secs;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_init_attempts(mut self, n: usize) -> Self {
        self.init_attempts = n;
        self
    }

    pub fn with_together_rule(mut self, rule: TogetherRule) -> Self {
        self.together_rule = rule;
        self
    }

    /// Validates every parameter.
    pub fn validate(&self) -> Result<()> {
        if self.num_teams == 0 {
            return Err(TeamError::InvalidConfig(
                "num_teams must be at least 1".into(),
            ));
        }
        if !self.solver_time_limit.is_finite() || self.solver_time_limit < 0.0 {
            return Err(TeamError::InvalidConfig(format!(
                "solver_time_limit must be a finite number of seconds >= 0, got {}",
                self.solver_time_limit
            )));
        }
        self.anneal_config().validate()?;
        self.init_config().validate()
    }

    /// The annealing slice of this configuration.
    pub fn anneal_config(&self) -> AnnealConfig {
        let config = AnnealConfig::default()
            .with_initial_temperature(self.initial_temp)
            .with_cooling_rate(self.cooling_rate)
            .with_min_temperature(self.min_temp)
            .with_max_iterations(self.max_iterations)
            .with_together_rule(self.together_rule);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }

    /// The initializer slice of this configuration.
    pub fn init_config(&self) -> InitConfig {
        InitConfig::default().with_max_attempts(self.init_attempts)
    }

    /// The exact-solver slice of this configuration.
    pub fn backend_config(&self) -> BackendConfig {
        match Duration::try_from_secs_f64(self.solver_time_limit) {
            Ok(limit) if !limit.is_zero() => BackendConfig::unlimited().with_time_limit(limit),
            _ => BackendConfig::unlimited(),
        }
    }

    /// Parses a TOML document.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Reads and parses a TOML file.
    #[cfg(feature = "serde")]
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

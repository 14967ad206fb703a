//! Annealing configuration.

use crate::constraints::TogetherRule;
use crate::error::{Result, TeamError};

/// Configuration for the annealing optimizer.
///
/// Temperature follows geometric cooling, `T_{k+1} = cooling_rate * T_k`,
/// one move per temperature step, until `T <= min_temperature`. The number
/// of iterations is therefore about
/// `ln(min_temperature / initial_temperature) / ln(cooling_rate)`; a cooling
/// rate very close to 1 runs correspondingly long unless
/// `max_iterations` caps it.
///
/// # Examples
///
/// ```
/// use u_teams::sa::AnnealConfig;
///
/// let config = AnnealConfig::default()
///     .with_initial_temperature(500.0)
///     .with_min_temperature(0.01)
///     .with_cooling_rate(0.999)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealConfig {
    /// Initial temperature. Higher values accept more worsening moves early.
    pub initial_temperature: f64,

    /// Multiplicative cooling factor in (0, 1). Higher = slower cooling.
    pub cooling_rate: f64,

    /// The loop stops once the temperature is at or below this floor.
    pub min_temperature: f64,

    /// Hard iteration budget. 0 = no limit.
    pub max_iterations: usize,

    /// Best cost is sampled into the history every this many iterations.
    /// 0 disables sampling.
    pub history_interval: usize,

    /// How together-groups restrict swaps.
    pub together_rule: TogetherRule,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1000.0,
            cooling_rate: 0.9995,
            min_temperature: 1e-3,
            max_iterations: 0,
            history_interval: 100,
            together_rule: TogetherRule::default(),
            seed: None,
        }
    }
}

impl AnnealConfig {
    /// Sets the starting temperature.
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    /// Sets the geometric cooling factor applied after each iteration.
    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    /// Sets the temperature at which the run stops.
    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = t;
        self
    }

    /// Caps the number of iterations; 0 means no cap.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Records the best cost every `n` iterations; 0 disables sampling.
    pub fn with_history_interval(mut self, n: usize) -> Self {
        self.history_interval = n;
        self
    }

    /// Selects the together rule for swap legality.
    pub fn with_together_rule(mut self, rule: TogetherRule) -> Self {
        self.together_rule = rule;
        self
    }

    /// Fixes the RNG seed used by `AnnealRunner::run`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.initial_temperature.is_nan() || self.initial_temperature <= 0.0 {
            return Err(TeamError::InvalidConfig(
                "initial_temperature must be positive".into(),
            ));
        }
        if self.min_temperature.is_nan() || self.min_temperature <= 0.0 {
            return Err(TeamError::InvalidConfig(
                "min_temperature must be positive".into(),
            ));
        }
        if self.min_temperature >= self.initial_temperature {
            return Err(TeamError::InvalidConfig(
                "min_temperature must be less than initial_temperature".into(),
            ));
        }
        if self.cooling_rate.is_nan() || self.cooling_rate <= 0.0 || self.cooling_rate >= 1.0 {
            return Err(TeamError::InvalidConfig(format!(
                "cooling_rate must be in (0, 1), got {}",
                self.cooling_rate
            )));
        }
        Ok(())
    }

    /// Number of cooling steps before the temperature floor is reached.
    pub fn scheduled_iterations(&self) -> usize {
        let steps = (self.min_temperature / self.initial_temperature).ln() / self.cooling_rate.ln();
        let steps = steps.ceil().max(0.0) as usize;
        if self.max_iterations > 0 {
            steps.min(self.max_iterations)
        } else {
            steps
        }
    }
}

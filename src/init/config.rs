//! Initializer configuration.

use crate::error::{Result, TeamError};

/// Configuration for [`PartitionInitializer`](super::PartitionInitializer).
///
/// # Examples
///
/// ```
/// use u_teams::init::InitConfig;
///
/// let config = InitConfig::default().with_max_attempts(10);
/// assert_eq!(config.max_attempts, 10);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitConfig {
    /// Number of shuffles tried before giving up on a constraint-respecting
    /// initial partition.
    pub max_attempts: usize,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self { max_attempts: 64 }
    }
}

impl InitConfig {
    /// Sets how many construction attempts run before giving up.
    pub fn with_max_attempts(mut self, n: usize) -> Self {
        self.max_attempts = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(TeamError::InvalidConfig(
                "max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

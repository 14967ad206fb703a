//! Error types for team partitioning.

use thiserror::Error;

use crate::exact::MipStatus;

/// Main error type for roster loading, constraint building and solving.
#[derive(Debug, Error)]
pub enum TeamError {
    /// A parameter is outside its allowed domain.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two roster entries share a name (case-insensitive).
    #[error("duplicate entity name: {0}")]
    DuplicateEntity(String),

    /// A name used to build a constraint is not in the roster.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// A constraint references an entity id outside the roster.
    #[error("entity id {0} is out of range")]
    EntityOutOfRange(usize),

    /// A team layout is not a proper partition of the roster.
    #[error("invalid partition: {0}")]
    InvalidPartition(String),

    /// No partition satisfies the size, together and apart constraints.
    #[error("infeasible instance: {0}")]
    Infeasible(String),

    /// The exact backend stopped without any feasible assignment.
    #[error("exact backend produced no solution (status {status:?})")]
    NoSolution { status: MipStatus },

    /// The exact backend failed or returned an unusable assignment.
    #[error("backend error: {0}")]
    Backend(String),

    /// Roster or configuration file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Roster file is not valid CSV or a row does not match the header.
    #[cfg(feature = "roster")]
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// A roster row is missing a field or carries a bad value.
    #[cfg(feature = "roster")]
    #[error("malformed roster row {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    /// Configuration file is not valid TOML for [`BalanceConfig`](crate::config::BalanceConfig).
    #[cfg(feature = "serde")]
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, TeamError>;

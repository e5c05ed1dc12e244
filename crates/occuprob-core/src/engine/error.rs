use thiserror::Error;

use super::config::ConfigError;
use crate::core::error::DomainError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ThermoError {
    #[error("No partition-function contributions are registered")]
    NoContributions,

    #[error("Invalid input: {source}")]
    Domain {
        #[from]
        source: DomainError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error(
        "Contribution {contribution} is bound to {found} minima, expected {expected}"
    )]
    MinimaMismatch {
        contribution: usize,
        expected: usize,
        found: usize,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

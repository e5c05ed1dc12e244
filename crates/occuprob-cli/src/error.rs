use occuprob::core::io::dat::SinkError;
use occuprob::core::io::isomers::IsomerFileError;
use occuprob::engine::error::ThermoError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Thermo(#[from] ThermoError),

    #[error("Failed to load isomers: {0}")]
    Input(#[from] IsomerFileError),

    #[error("Failed to write results: {0}")]
    Output(#[from] SinkError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

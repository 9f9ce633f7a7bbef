use thiserror::Error;

use tickrank_core::{EngineError, ValidationError};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Engine(_) => 3,
            Self::Command(_) => 2,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}

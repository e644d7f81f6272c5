use sfa_core::{CoreError, IngestError, RatingError, ValidationError};
use thiserror::Error;

pub const EXIT_USAGE: u8 = 2;
pub const EXIT_RATING: u8 = 3;
pub const EXIT_SERIALIZATION: u8 = 4;
pub const EXIT_STRICT: u8 = 5;
pub const EXIT_INPUT: u8 = 10;

/// Failures surfaced by the `sfa` binary, each mapped to a process exit code.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid argument: {0}")]
    Validation(#[from] ValidationError),

    #[error("config error: {0}")]
    Config(#[from] CoreError),

    #[error("rating failed: {0}")]
    Rating(#[from] RatingError),

    #[error("input error: {0}")]
    Ingest(#[from] IngestError),

    #[error("usage error: {0}")]
    Usage(String),

    #[error("strict mode failed: warnings={warning_count}, errors={error_count}")]
    StrictModeViolation {
        warning_count: usize,
        error_count: usize,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Config(_) | Self::Usage(_) => EXIT_USAGE,
            Self::Rating(_) => EXIT_RATING,
            Self::Serialization(_) => EXIT_SERIALIZATION,
            Self::StrictModeViolation { .. } => EXIT_STRICT,
            Self::Ingest(_) | Self::Io(_) => EXIT_INPUT,
        }
    }
}

use serde::Serialize;
use thiserror::Error;

use crate::domain::Metric;

/// Validation and contract errors exposed by `sfa-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker contains control character {ch:?} at index {index}")]
    TickerControlChar { ch: char, index: usize },

    #[error("exchange code cannot be empty")]
    EmptyExchange,
    #[error("sector cannot be empty")]
    EmptySector,

    #[error("invalid tier '{value}', expected one of small, mid, large")]
    InvalidTier { value: String },
    #[error("invalid grade '{value}', expected one of A+, A, A-, ... D-, F")]
    InvalidGrade { value: String },
    #[error("invalid metric '{value}'")]
    InvalidMetric { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("config field '{field}' is invalid: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("trace_id must be 32 hex characters")]
    InvalidTraceId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },

    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Failures raised while grading or rating a stock.
///
/// None of these are recovered inside the core; upstream cleaning is expected
/// to make them unreachable.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RatingError {
    #[error("stock '{code}' has no value for metric {metric}")]
    MissingData { code: String, metric: Metric },

    #[error("stock '{code}' is not present in the dataset")]
    UnknownTicker { code: String },

    #[error("no sector statistics for sector '{sector}'")]
    UnknownSector { sector: String },

    #[error("sector '{sector}' has no peer values for metric {metric}")]
    NoPeerData { sector: String, metric: Metric },
}

impl RatingError {
    /// Stable machine-readable code used in envelopes.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingData { .. } => "missing_data",
            Self::UnknownTicker { .. } => "unknown_ticker",
            Self::UnknownSector { .. } => "unknown_sector",
            Self::NoPeerData { .. } => "no_peer_data",
        }
    }
}

/// Errors raised while loading and cleaning tabular input.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("row {row}: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: ValidationError,
    },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Rating(#[from] RatingError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("config file '{path}' could not be read: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

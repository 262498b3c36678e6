use thiserror::Error;

use crate::data_source::SourceError;

/// Validation and contract errors exposed by `spikewire-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker length {len} exceeds max {max}")]
    TickerTooLong { len: usize, max: usize },
    #[error("ticker must start with an ASCII letter: '{ch}'")]
    TickerInvalidStart { ch: char },
    #[error("ticker contains invalid character '{ch}' at index {index}")]
    TickerInvalidChar { ch: char, index: usize },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("unrecognized feed timestamp: '{value}'")]
    InvalidFeedTimestamp { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("history bars must be in strictly ascending date order (bar {index} is {date})")]
    UnorderedHistory { index: usize, date: String },
}

/// Fatal configuration problems. Any of these aborts the run before a ticker is evaluated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration value '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("invalid ticker in {origin}: {source}")]
    Ticker {
        origin: String,
        #[source]
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Spike test preconditions that make a window not evaluable.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SpikeError {
    #[error("insufficient history: need {required} prior sessions, have {available}")]
    InsufficientHistory { required: usize, available: usize },
}

/// Per-ticker failure recorded by the pipeline. Never aborts a run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    #[error(transparent)]
    Spike(#[from] SpikeError),

    #[error("history unavailable: {0}")]
    HistoryUnavailable(SourceError),

    #[error("evaluation task aborted: {0}")]
    Aborted(String),
}

impl EvaluationError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Spike(SpikeError::InsufficientHistory { .. }) => "insufficient_history",
            Self::HistoryUnavailable(_) => "history_unavailable",
            Self::Aborted(_) => "aborted",
        }
    }
}

/// Alert delivery failures. Logged by the caller, never fatal to a run.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to encode alert payload: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("alert transport error: {0}")]
    Transport(String),
    #[error("alert endpoint returned status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Report artifact failures.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

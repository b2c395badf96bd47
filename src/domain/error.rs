//! Domain error types.

use crate::domain::decimal::Decimal;
use chrono::NaiveDateTime;

/// Malformed numeric text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid number {text:?}: {message}")]
pub struct FormatError {
    pub text: String,
    pub message: String,
}

impl FormatError {
    pub fn new(text: &str, message: impl Into<String>) -> Self {
        Self {
            text: text.to_string(),
            message: message.into(),
        }
    }
}

/// Top-level error type for tacore.
#[derive(Debug, thiserror::Error)]
pub enum TaError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("bar {index} ends at {end_time}, not after previous bar end {previous}")]
    OutOfOrder {
        index: usize,
        previous: NaiveDateTime,
        end_time: NaiveDateTime,
    },

    #[error("index {index} outside valid range {}", range_text(.begin, .end))]
    IndexOutOfRange {
        index: usize,
        begin: usize,
        end: Option<usize>,
    },

    #[error("index {requested} read before it was computed (computing {computing})")]
    LookAhead { requested: usize, computing: usize },

    #[error("invalid parameters for {indicator}: {reason}")]
    InvalidParameter { indicator: String, reason: String },

    #[error("fixture format error: {reason}")]
    FixtureFormat { reason: String },

    #[error(
        "mismatch at index {index}: expected {expected}, actual {actual} (epsilon {epsilon})"
    )]
    ToleranceMismatch {
        index: usize,
        expected: Decimal,
        actual: Decimal,
        epsilon: Decimal,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TaError {
    pub fn fixture(reason: impl Into<String>) -> Self {
        TaError::FixtureFormat {
            reason: reason.into(),
        }
    }

    pub fn invalid_parameter(indicator: impl ToString, reason: impl Into<String>) -> Self {
        TaError::InvalidParameter {
            indicator: indicator.to_string(),
            reason: reason.into(),
        }
    }
}

fn range_text(begin: &usize, end: &Option<usize>) -> String {
    match end {
        Some(end) => format!("[{begin}, {end}]"),
        None => "(empty series)".to_string(),
    }
}

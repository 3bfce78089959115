use std::fmt;

use catalog_core::UnknownTitleType;
use serde::Serialize;
use thiserror::Error;

/// Why a raw record never made it into the catalog store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordRejected {
    #[error("duration is missing")]
    MissingDuration,
    #[error("duration `{0}` has neither a minute nor a season unit")]
    UnrecognizedDuration(String),
    #[error("duration `{0}` does not start with a whole number")]
    InvalidDurationMagnitude(String),
    #[error(transparent)]
    UnknownTitleType(#[from] UnknownTitleType),
}

impl RecordRejected {
    /// Stable key used when tallying rejections.
    pub fn kind(&self) -> &'static str {
        match self {
            RecordRejected::MissingDuration => "missing_duration",
            RecordRejected::UnrecognizedDuration(_) => "unrecognized_duration",
            RecordRejected::InvalidDurationMagnitude(_) => "invalid_duration_magnitude",
            RecordRejected::UnknownTitleType(_) => "unknown_title_type",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CriteriaIssue {
    EmptyTypeSet,
    InvertedYearRange { min_year: i32, max_year: i32 },
}

impl fmt::Display for CriteriaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriteriaIssue::EmptyTypeSet => f.write_str("at least one title type must be selected"),
            CriteriaIssue::InvertedYearRange { min_year, max_year } => write!(
                f,
                "year range starts at {min_year} but ends at {max_year}"
            ),
        }
    }
}

/// Caller-facing query failures. All of them are correctable by changing the selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("invalid criteria: {0}")]
    InvalidCriteria(CriteriaIssue),
}

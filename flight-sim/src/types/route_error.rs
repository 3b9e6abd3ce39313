use thiserror::Error;

use super::store::StoreError;

/// Represents errors that can occur while computing routes for stored flights.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("flight {0} not found")]
    NotFound(String),
    #[error("trajectory has {0} waypoint(s), at least 2 are required")]
    InvalidTrajectory(usize),
    #[error("leg {leg} is out of range, expected {min}..={max}")]
    OutOfRange { leg: usize, min: usize, max: usize },
    #[error("invalid timestamp '{0}', expected YYYY-MM-DD HH:MM")]
    InvalidTimestamp(String),
    #[error("invalid speed '{0}', expected a positive number of km/h")]
    InvalidSpeed(String),
    #[error("invalid flight record: {0}")]
    Validation(String),
    #[error("stored record cannot be decoded: {0}")]
    MalformedRecord(String),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl RouteError {
    /// Short name of the error kind, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            RouteError::NotFound(_) => "not found",
            RouteError::InvalidTrajectory(_) => "invalid trajectory",
            RouteError::OutOfRange { .. } => "out of range",
            RouteError::InvalidTimestamp(_) => "invalid timestamp",
            RouteError::InvalidSpeed(_) => "invalid speed",
            RouteError::Validation(_) => "validation",
            RouteError::MalformedRecord(_) => "malformed record",
            RouteError::Storage(_) => "storage",
        }
    }
}

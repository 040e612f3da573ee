use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failure classes an operator must be able to tell apart: horizon
/// exhaustion, misconfiguration, and network trouble are handled differently.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("no free publish slot within {days} days of {searched_from}")]
    HorizonExhausted {
        searched_from: DateTime<Utc>,
        days: u64,
    },

    #[error("reservation listing unavailable: {0}")]
    FetchUnavailable(String),

    #[error("malformed reservation in listing: {0}")]
    MalformedReservation(String),

    #[error("invalid timezone identifier: {0}")]
    InvalidTimezone(String),

    #[error("invalid time of day (expected HH:MM): {0}")]
    InvalidTime(String),

    #[error("invalid day of week: {0}")]
    InvalidDay(String),

    #[error("{0} must be at least 1")]
    InvalidParameter(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse schedule config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize schedule config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

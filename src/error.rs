use std::time::Duration;
use thiserror::Error;

/// A single metric could not be read this tick.
#[derive(Debug, Error)]
pub enum MetricError {
    #[error("{0} statistics are unavailable")]
    Unavailable(&'static str),

    #[error("failed to read {metric}: {reason}")]
    Read { metric: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("endpoint answered with HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("endpoint returned no data")]
    EmptyBody,

    #[error("no answer within {0:?}")]
    Timeout(Duration),

    #[error("probe task ended unexpectedly")]
    Aborted,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("a speed test is already running")]
    AlreadyRunning,

    #[error("the current speed test has not finished")]
    TestInFlight,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("probe url must start with http:// or https://, got {0:?}")]
    InvalidUrl(String),
}

//! Shared error types for the services crate.

use thiserror::Error;

use quake_core::model::Phase;
use quake_core::quiz::QuizError;

/// Errors produced while fetching or decoding the live event feed.
///
/// These never escape `LiveFeed::fetch_latest`; they are recorded in the
/// published snapshot instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FeedError {
    #[error("feed request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("feed response is not a feature collection: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors emitted while validating configuration.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid feed endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("minimum magnitude must be finite and non-negative, got {0}")]
    InvalidMinMagnitude(f64),
    #[error("max events must be at least 1")]
    ZeroMaxEvents,
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
}

/// Errors emitted by the module orchestrator.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModuleError {
    #[error("operation requires the {expected} phase, session is in {actual}")]
    WrongPhase { expected: Phase, actual: Phase },
    #[error(transparent)]
    Quiz(#[from] QuizError),
}

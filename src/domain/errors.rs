// src/domain/errors.rs
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::Unknown(s)
    }
}

/// Failure of a single price-history request.
///
/// An empty result is not a failure: repositories return `Ok` with an empty
/// series when the provider has no rows for the window.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Provider error (status {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn kind(&self) -> FetchFailureKind {
        match self {
            FetchError::Transport(_) => FetchFailureKind::Transport,
            FetchError::Provider { .. } => FetchFailureKind::Provider,
            FetchError::Malformed(_) => FetchFailureKind::Malformed,
        }
    }
}

impl From<hyper::Error> for FetchError {
    fn from(err: hyper::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Malformed(err.to_string())
    }
}

/// Category of the most recent failed refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailureKind {
    Transport,
    Provider,
    Malformed,
}

impl fmt::Display for FetchFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FetchFailureKind::Transport => write!(f, "provider unreachable"),
            FetchFailureKind::Provider => write!(f, "provider error"),
            FetchFailureKind::Malformed => write!(f, "malformed response"),
        }
    }
}

// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
pub type FetchResult<T> = Result<T, FetchError>;

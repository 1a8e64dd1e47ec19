// src/error.rs
use std::time::Duration;

use thiserror::Error;

/// Everything the library can fail with.
#[derive(Debug, Error)]
pub enum Error {
    /// A described page element could not be located or driven.
    #[error("Automation error: {0}")]
    Automation(String),

    /// The normalizer found no score-like column.
    #[error("No score column among {0:?}")]
    MissingScoreColumn(Vec<String>),

    /// User-facing validation messages; nothing was dispatched.
    #[error("{}", .0.join("\n"))]
    Validation(Vec<String>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown software: {0}")]
    UnknownSoftware(String),

    #[error("Timed out after {after:?} waiting for {what}")]
    Timeout { what: String, after: Duration },

    #[error("Cancelled")]
    Cancelled,

    /// External tool failed to start or exited unsuccessfully.
    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Worker panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn automation(msg: impl Into<String>) -> Self {
        Error::Automation(msg.into())
    }
}

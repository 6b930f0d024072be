use thiserror::Error;

use super::types::LayoutIssue;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShardError {
    #[error("Invalid shard layout: {0}")]
    InvalidLayout(LayoutIssue),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Placement invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

pub type Result<T> = std::result::Result<T, ShardError>;

impl<T> From<std::sync::PoisonError<T>> for ShardError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<std::io::Error> for ShardError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ShardError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

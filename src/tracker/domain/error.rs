//! Error types for tracker domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing tracker domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackerDomainError {
    /// The issue key is empty or contains whitespace.
    #[error("invalid issue key '{0}'")]
    EmptyIssueKey(String),

    /// A remote timestamp could not be parsed.
    #[error("invalid tracker timestamp '{0}'")]
    InvalidTimestamp(String),
}

/// Error returned while parsing local task statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown local task status: {0}")]
pub struct ParseLocalStatusError(pub String);

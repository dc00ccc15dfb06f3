//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent rejected input.
/// They are raised before the credential store is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("domain cannot be empty")]
    EmptyDomain,

    #[error("domain cannot contain whitespace: '{0}'")]
    DomainWhitespace(String),

    #[error("username cannot be empty")]
    EmptyUsername,

    #[error("password cannot be empty")]
    EmptyPassword,

    #[error("invalid input format. Expected: domain username [password], got: {0}")]
    InvalidImportLine(String),

    #[error("unknown output format '{0}' (expected text, json or csv)")]
    UnknownOutputFormat(String),

    #[error("unknown sort field '{0}' (expected domain or username)")]
    UnknownSortKey(String),
}

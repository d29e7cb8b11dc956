use thiserror::Error;

/// Failures raised by the credential encoding core.
///
/// None of the messages carry plaintext or digest material.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Secure random source unavailable: {0}")]
    Entropy(String),

    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),

    #[error("Unknown scheme: {0}")]
    UnknownScheme(String),
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Empty username")]
    EmptyUsername,

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

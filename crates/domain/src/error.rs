use thiserror::Error;

/// Domain failure taxonomy, mapped to HTTP statuses by the server crate.
///
/// `Conflict` covers every invariant-guard rejection (duplicate attendance,
/// duplicate email, insufficient tickets, pending request already open).
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(err: validator::ValidationErrors) -> Self {
        DomainError::Validation(err.to_string())
    }
}

impl From<argon2::password_hash::Error> for DomainError {
    fn from(err: argon2::password_hash::Error) -> Self {
        DomainError::Internal(format!("password hash error: {err}"))
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Internal(format!("serialization error: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;

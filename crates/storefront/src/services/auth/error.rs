//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during credential verification.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Telephone or password missing from the request.
    #[error("telephone and password are required")]
    MissingCredentials,

    /// Telephone format invalid.
    #[error("invalid telephone: {0}")]
    InvalidTelephone(#[from] easytech_core::TelephoneError),

    /// No account with that telephone.
    #[error("user not found")]
    UserNotFound,

    /// Wrong password, or the account has no password at all.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

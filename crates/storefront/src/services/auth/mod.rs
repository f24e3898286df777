//! Credential verification service.
//!
//! Verifies telephone + password sign-ins against the stored Argon2id hash
//! and hands back a minimal identity claim. Accounts provisioned through the
//! hosted identity provider have no stored hash and cannot sign in here.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use easytech_core::{Email, Role, Telephone, UserId};

use crate::db::users::UserRepository;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// The minimal identity established by a successful credential check.
///
/// Never carries the password hash.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    /// User's database ID.
    pub id: UserId,
    /// Display name, when the record has one.
    pub name: Option<String>,
    /// The telephone that signed in.
    pub telephone: Telephone,
    /// Account role.
    pub role: Role,
    /// Email address, for the session claim.
    pub email: Option<Email>,
}

/// Credential verification service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Verify a telephone + password pair.
    ///
    /// On success the user's `last_login` is stamped and the minimal claim is
    /// returned. A single failed attempt simply fails; there is no lockout or
    /// throttling.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials` if either input is empty,
    /// `AuthError::UserNotFound` if no account matches the telephone, and
    /// `AuthError::InvalidCredentials` if the account has no stored hash or
    /// the password does not match it.
    pub async fn verify_credentials(
        &self,
        telephone: &str,
        password: &str,
    ) -> Result<VerifiedIdentity, AuthError> {
        if telephone.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let telephone = Telephone::parse(telephone)?;

        let (user, password_hash) = self
            .users
            .get_auth_by_telephone(&telephone)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        // Provider-only accounts have no hash; that is not a match, and the
        // error is indistinguishable from a wrong password on purpose.
        let password_hash = password_hash.ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, &password_hash)?;

        self.users.touch_last_login(user.id).await?;

        Ok(VerifiedIdentity {
            id: user.id,
            name: user.full_name(),
            telephone,
            role: user.role,
            email: Some(user.email),
        })
    }
}

/// Validate password meets requirements.
pub(crate) fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }

    Ok(())
}

/// Hash a password using Argon2id.
pub(crate) fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
pub(crate) fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

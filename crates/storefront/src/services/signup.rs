//! Sign-up and verification-code service.
//!
//! A pending registration holds the sign-up attributes plus a single
//! verification-code slot. Issuing a new code overwrites the slot in one
//! atomic update, so at most one code is valid at any time. Verification is
//! one-shot: the only transition that materializes the `users` row,
//! provisions the hosted identity record, and may establish a session.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use easytech_core::{Email, EmailError, Telephone, TelephoneError};

use crate::db::RepositoryError;
use crate::db::signups::{NewSignup, SignupRepository};
use crate::db::users::{NewUser, UserRepository};
use crate::identity::{IdentityClient, IdentityError, NewIdentityUser};
use crate::models::{Signup, SignupStatus, User};
use crate::services::auth;
use crate::services::email::{EmailError as MailError, EmailService};

/// How long a verification code stays valid.
pub const CODE_TTL: Duration = Duration::minutes(10);

/// Verification codes are this many digits.
pub const CODE_LENGTH: usize = 6;

/// Errors that can occur during sign-up and verification.
#[derive(Debug, Error)]
pub enum SignupError {
    /// A required field is missing or blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Email format invalid.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Telephone format invalid.
    #[error("invalid telephone: {0}")]
    InvalidTelephone(#[from] TelephoneError),

    /// Password too weak.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// An account with this email already exists.
    #[error("an account with this email already exists")]
    EmailTaken,

    /// No pending registration with that handle.
    #[error("unknown sign-up")]
    UnknownSignup,

    /// The registration has already been verified.
    #[error("sign-up already verified")]
    AlreadyVerified,

    /// The code is past its expiry.
    #[error("verification code expired")]
    CodeExpired,

    /// The supplied code does not match the current one.
    #[error("verification code mismatch")]
    CodeMismatch,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// The identity provider could not be reached or refused the request.
    #[error("identity provider error: {0}")]
    Identity(#[from] IdentityError),

    /// The verification email could not be sent.
    #[error("email delivery error: {0}")]
    Mail(#[from] MailError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Attributes collected by the sign-up form.
#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub telephone: Option<String>,
    pub password: String,
}

/// Sign-up and verification service.
pub struct SignupService<'a> {
    signups: SignupRepository<'a>,
    users: UserRepository<'a>,
    identity: &'a IdentityClient,
    mailer: &'a EmailService,
}

impl<'a> SignupService<'a> {
    /// Create a new sign-up service.
    #[must_use]
    pub const fn new(
        pool: &'a PgPool,
        identity: &'a IdentityClient,
        mailer: &'a EmailService,
    ) -> Self {
        Self {
            signups: SignupRepository::new(pool),
            users: UserRepository::new(pool),
            identity,
            mailer,
        }
    }

    /// Start a pending registration and send the first code.
    ///
    /// # Errors
    ///
    /// Returns validation errors for bad input, `SignupError::EmailTaken`
    /// when an account already exists, and `SignupError::Mail` when the code
    /// email cannot be delivered.
    pub async fn start(&self, request: &SignupRequest) -> Result<Signup, SignupError> {
        let (email, telephone) = validate_request(request)?;

        if self.users.get_by_email(&email).await?.is_some() {
            return Err(SignupError::EmailTaken);
        }

        let password_hash =
            auth::hash_password(&request.password).map_err(|_| SignupError::PasswordHash)?;

        let code = generate_code();
        let signup = self
            .signups
            .create(NewSignup {
                id: Uuid::new_v4(),
                first_name: request.first_name.trim(),
                last_name: request.last_name.trim(),
                email: &email,
                telephone: telephone.as_ref(),
                password_hash: &password_hash,
                code: &code,
                code_expires_at: Utc::now() + CODE_TTL,
            })
            .await?;

        self.mailer
            .send_verification_code(email.as_str(), &code)
            .await?;
        tracing::info!(signup_id = %signup.id, "verification code sent");

        Ok(signup)
    }

    /// Issue a fresh code for an existing pending registration.
    ///
    /// The previous code stops being valid the moment the slot is
    /// overwritten. Resends are unlimited.
    ///
    /// # Errors
    ///
    /// Returns `SignupError::UnknownSignup` for unknown handles and
    /// `SignupError::AlreadyVerified` for completed registrations.
    pub async fn resend(&self, id: Uuid) -> Result<Signup, SignupError> {
        let existing = self.signups.get(id).await?.ok_or(SignupError::UnknownSignup)?;
        if existing.status == SignupStatus::Verified {
            return Err(SignupError::AlreadyVerified);
        }

        let code = generate_code();
        let signup = self
            .signups
            .replace_code(id, &code, Utc::now() + CODE_TTL)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => SignupError::AlreadyVerified,
                other => SignupError::Repository(other),
            })?;

        self.mailer
            .send_verification_code(signup.email.as_str(), &code)
            .await?;
        tracing::info!(signup_id = %signup.id, "verification code re-sent");

        Ok(signup)
    }

    /// Verify a code and activate the account.
    ///
    /// On match: the hosted identity record is provisioned, the `users` row
    /// is materialized from the pending attributes, and the registration
    /// transitions to `Verified`. Each step is idempotent-on-retry - a
    /// failure partway leaves the registration in `code_sent` and unique
    /// constraints absorb a re-run.
    ///
    /// # Errors
    ///
    /// Returns `SignupError::CodeExpired` past expiry (the registration
    /// transitions to `Expired`; a resend restarts it),
    /// `SignupError::CodeMismatch` when the codes differ, and
    /// `SignupError::Identity` when provisioning fails.
    pub async fn verify(&self, id: Uuid, supplied_code: &str) -> Result<User, SignupError> {
        let signup = self.signups.get(id).await?.ok_or(SignupError::UnknownSignup)?;

        if let Err(e) = check_code(&signup, supplied_code, Utc::now()) {
            if matches!(e, SignupError::CodeExpired) && signup.status == SignupStatus::CodeSent {
                // Record the terminal state; recoverable via resend.
                self.signups.mark_expired(id).await?;
            }
            return Err(e);
        }

        let hosted = self
            .identity
            .create_user(&NewIdentityUser {
                first_name: &signup.first_name,
                last_name: &signup.last_name,
                email_address: signup.email.as_str(),
            })
            .await?;

        let user = self
            .users
            .create(NewUser {
                identity_user_id: Some(&hosted.id),
                email: &signup.email,
                first_name: &signup.first_name,
                last_name: &signup.last_name,
                telephone: signup.telephone.as_ref(),
                password_hash: Some(&signup.password_hash),
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => SignupError::EmailTaken,
                other => SignupError::Repository(other),
            })?;

        if !self.signups.mark_verified(id).await? {
            return Err(SignupError::AlreadyVerified);
        }
        tracing::info!(signup_id = %id, user_id = %user.id, "sign-up verified, account activated");

        Ok(user)
    }
}

/// Check a supplied code against the registration's current slot.
///
/// Pure; the caller records the `Expired` transition.
fn check_code(signup: &Signup, supplied: &str, now: DateTime<Utc>) -> Result<(), SignupError> {
    match signup.status {
        SignupStatus::Verified => return Err(SignupError::AlreadyVerified),
        SignupStatus::Expired => return Err(SignupError::CodeExpired),
        SignupStatus::CodeSent => {}
    }

    if now > signup.code_expires_at {
        return Err(SignupError::CodeExpired);
    }
    if supplied.trim() != signup.code {
        return Err(SignupError::CodeMismatch);
    }

    Ok(())
}

/// Generate a 6-digit verification code.
fn generate_code() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{n:06}")
}

/// Validate the sign-up form fields.
fn validate_request(request: &SignupRequest) -> Result<(Email, Option<Telephone>), SignupError> {
    if request.first_name.trim().is_empty() {
        return Err(SignupError::MissingField("first_name"));
    }
    if request.last_name.trim().is_empty() {
        return Err(SignupError::MissingField("last_name"));
    }
    if request.password.is_empty() {
        return Err(SignupError::MissingField("password"));
    }
    auth::validate_password(&request.password).map_err(SignupError::WeakPassword)?;

    let email = Email::parse(request.email.trim())?;
    let telephone = request
        .telephone
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .map(Telephone::parse)
        .transpose()?;

    Ok((email, telephone))
}

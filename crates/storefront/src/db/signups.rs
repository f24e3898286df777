//! Pending-registration repository.
//!
//! The verification code is a single column on the `signups` row, so a
//! reissue is one atomic `UPDATE` that overwrites the slot: the previous
//! code stops existing the moment a new one is issued.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use easytech_core::{Email, Telephone};

use super::RepositoryError;
use crate::models::{Signup, SignupStatus};

/// Columns selected for every `Signup` mapping.
const SIGNUP_COLUMNS: &str = "id, first_name, last_name, email, telephone, password_hash, \
     code, code_expires_at, status, created_at";

/// Attributes for a new pending registration.
#[derive(Debug)]
pub struct NewSignup<'a> {
    pub id: Uuid,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a Email,
    pub telephone: Option<&'a Telephone>,
    pub password_hash: &'a str,
    pub code: &'a str,
    pub code_expires_at: DateTime<Utc>,
}

/// Repository for pending-registration database operations.
pub struct SignupRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SignupRepository<'a> {
    /// Create a new signup repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a pending registration with its first code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: NewSignup<'_>) -> Result<Signup, RepositoryError> {
        let row = sqlx::query(&format!(
            "INSERT INTO signups (id, first_name, last_name, email, telephone, password_hash, code, code_expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {SIGNUP_COLUMNS}"
        ))
        .bind(new.id)
        .bind(new.first_name)
        .bind(new.last_name)
        .bind(new.email)
        .bind(new.telephone)
        .bind(new.password_hash)
        .bind(new.code)
        .bind(new.code_expires_at)
        .fetch_one(self.pool)
        .await?;

        map_signup(&row)
    }

    /// Get a pending registration by its handle.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: Uuid) -> Result<Option<Signup>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {SIGNUP_COLUMNS} FROM signups WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(map_signup).transpose()
    }

    /// Overwrite the code slot with a fresh code and expiry.
    ///
    /// One atomic statement; the registration returns to `code_sent`.
    /// Already-verified registrations are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the handle is unknown or the
    /// registration has already been verified.
    pub async fn replace_code(
        &self,
        id: Uuid,
        code: &str,
        code_expires_at: DateTime<Utc>,
    ) -> Result<Signup, RepositoryError> {
        let row = sqlx::query(&format!(
            "UPDATE signups
             SET code = $2, code_expires_at = $3, status = 'code_sent'
             WHERE id = $1 AND status <> 'verified'
             RETURNING {SIGNUP_COLUMNS}"
        ))
        .bind(id)
        .bind(code)
        .bind(code_expires_at)
        .fetch_optional(self.pool)
        .await?;

        row.as_ref()
            .map(map_signup)
            .transpose()?
            .ok_or(RepositoryError::NotFound)
    }

    /// Transition a registration to `verified`.
    ///
    /// # Returns
    ///
    /// Returns `true` if this call made the transition; `false` if the
    /// registration was not in `code_sent` (already verified, or expired by
    /// a concurrent attempt).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_verified(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("UPDATE signups SET status = 'verified' WHERE id = $1 AND status = 'code_sent'")
                .bind(id)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Transition a registration to `expired`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_expired(&self, id: Uuid) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE signups SET status = 'expired' WHERE id = $1 AND status = 'code_sent'")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}

/// Map a database row to a [`Signup`].
fn map_signup(row: &PgRow) -> Result<Signup, RepositoryError> {
    let status: String = row.try_get("status")?;

    Ok(Signup {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get::<Email, _>("email")?,
        telephone: row.try_get::<Option<Telephone>, _>("telephone")?,
        password_hash: row.try_get("password_hash")?,
        code: row.try_get("code")?,
        code_expires_at: row.try_get("code_expires_at")?,
        status: SignupStatus::from_str_lossy(&status),
        created_at: row.try_get("created_at")?,
    })
}

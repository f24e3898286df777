//! User repository for database operations.
//!
//! Queries are runtime-checked (`sqlx::query` + `Row::try_get`) so the crate
//! builds without a live database; the schema lives in
//! `migrations/20260715000001_create_users.sql`.

use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use easytech_core::{Email, Role, Telephone, UserId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::User;

/// Columns selected for every `User` mapping.
const USER_COLUMNS: &str = "id, identity_user_id, email, first_name, last_name, telephone, \
     date_of_birth, role, loyalty_points, reward_points, total_spent, \
     is_active, last_login, created_at, updated_at";

/// Attributes for materializing a new user row.
#[derive(Debug)]
pub struct NewUser<'a> {
    /// Hosted identity record id, when the account was provisioned upstream.
    pub identity_user_id: Option<&'a str>,
    pub email: &'a Email,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub telephone: Option<&'a Telephone>,
    /// Argon2 hash; `None` for accounts that only sign in via the provider.
    pub password_hash: Option<&'a str>,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(map_user).transpose()
    }

    /// Get a user by their email address (lowercased join key).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(map_user).transpose()
    }

    /// Get a user by their hosted identity record id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_identity_id(
        &self,
        identity_user_id: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE identity_user_id = $1"
        ))
        .bind(identity_user_id)
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(map_user).transpose()
    }

    /// Get a user and their stored password hash by telephone.
    ///
    /// The hash is `None` for accounts provisioned via the identity provider
    /// only. The hash never travels further than the credential verifier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_auth_by_telephone(
        &self,
        telephone: &Telephone,
    ) -> Result<Option<(User, Option<String>)>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE telephone = $1"
        ))
        .bind(telephone)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let user = map_user(&row)?;
        let password_hash: Option<String> = row.try_get("password_hash")?;
        Ok(Some((user, password_hash)))
    }

    /// Create a new user row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email, telephone, or
    /// identity id is already taken; `RepositoryError::Database` otherwise.
    pub async fn create(&self, new: NewUser<'_>) -> Result<User, RepositoryError> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (identity_user_id, email, first_name, last_name, telephone, password_hash)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(new.identity_user_id)
        .bind(new.email)
        .bind(new.first_name)
        .bind(new.last_name)
        .bind(new.telephone)
        .bind(new.password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "user"))?;

        map_user(&row)
    }

    /// Update the internally-owned contact fields (telephone, date of birth).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the telephone is already taken.
    pub async fn update_contact(
        &self,
        id: UserId,
        telephone: Option<&Telephone>,
        date_of_birth: Option<NaiveDate>,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query(&format!(
            "UPDATE users
             SET telephone = $2, date_of_birth = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(telephone)
        .bind(date_of_birth)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "telephone"))?;

        row.as_ref().map(map_user).transpose()?.ok_or(RepositoryError::NotFound)
    }

    /// Stamp a successful sign-in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn touch_last_login(&self, id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}

/// Map a database row to a [`User`].
fn map_user(row: &PgRow) -> Result<User, RepositoryError> {
    let email_raw: String = row.try_get("email")?;
    let email = Email::parse(&email_raw).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
    })?;

    Ok(User {
        id: row.try_get::<UserId, _>("id")?,
        identity_user_id: row.try_get("identity_user_id")?,
        email,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        telephone: row.try_get::<Option<Telephone>, _>("telephone")?,
        date_of_birth: row.try_get("date_of_birth")?,
        role: row.try_get::<Role, _>("role")?,
        loyalty_points: row.try_get("loyalty_points")?,
        reward_points: row.try_get("reward_points")?,
        total_spent: row.try_get("total_spent")?,
        is_active: row.try_get("is_active")?,
        last_login: row.try_get("last_login")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

//! Address repository for database operations.
//!
//! The at-most-one-default invariant is enforced here: any write that sets
//! `is_default` clears the previous default inside the same transaction, and
//! a partial unique index in the schema backs it up.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use easytech_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::{Address, AddressKind};

/// Columns selected for every `Address` mapping.
const ADDRESS_COLUMNS: &str =
    "id, user_id, label, street, city, state, zip, country, telephone, kind, is_default, created_at";

/// Validated column values for an address write.
///
/// Both insert and update take the full set; the service layer merges
/// patches against the existing row before calling in.
#[derive(Debug)]
pub struct AddressRecord<'a> {
    pub label: &'a str,
    pub street: &'a str,
    pub city: &'a str,
    pub state: &'a str,
    pub zip: &'a str,
    pub country: &'a str,
    pub telephone: Option<&'a str>,
    pub kind: AddressKind,
    pub is_default: bool,
}

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get all addresses for a user, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE user_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(map_address).collect()
    }

    /// Insert a new address.
    ///
    /// When the new address is marked default, the user's previous default is
    /// cleared in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails.
    pub async fn insert(
        &self,
        user_id: UserId,
        record: &AddressRecord<'_>,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if record.is_default {
            sqlx::query("UPDATE addresses SET is_default = FALSE WHERE user_id = $1 AND is_default")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        let row = sqlx::query(&format!(
            "INSERT INTO addresses (user_id, label, street, city, state, zip, country, telephone, kind, is_default)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(user_id)
        .bind(record.label)
        .bind(record.street)
        .bind(record.city)
        .bind(record.state)
        .bind(record.zip)
        .bind(record.country)
        .bind(record.telephone)
        .bind(record.kind.as_str())
        .bind(record.is_default)
        .fetch_one(&mut *tx)
        .await?;

        let address = map_address(&row)?;

        tx.commit().await?;

        Ok(address)
    }

    /// Replace an existing address's fields.
    ///
    /// Same default-clearing transaction as [`Self::insert`], excluding the
    /// row being updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not belong to
    /// the user; `RepositoryError::Database` otherwise.
    pub async fn update(
        &self,
        user_id: UserId,
        address_id: AddressId,
        record: &AddressRecord<'_>,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if record.is_default {
            sqlx::query(
                "UPDATE addresses SET is_default = FALSE WHERE user_id = $1 AND is_default AND id <> $2",
            )
            .bind(user_id)
            .bind(address_id)
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query(&format!(
            "UPDATE addresses
             SET label = $3, street = $4, city = $5, state = $6, zip = $7,
                 country = $8, telephone = $9, kind = $10, is_default = $11
             WHERE id = $2 AND user_id = $1
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(user_id)
        .bind(address_id)
        .bind(record.label)
        .bind(record.street)
        .bind(record.city)
        .bind(record.state)
        .bind(record.zip)
        .bind(record.country)
        .bind(record.telephone)
        .bind(record.kind.as_str())
        .bind(record.is_default)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(RepositoryError::NotFound);
        };
        let address = map_address(&row)?;

        tx.commit().await?;

        Ok(address)
    }

    /// Delete an address.
    ///
    /// Removing the default promotes no replacement; the caller chooses a new
    /// default explicitly.
    ///
    /// # Returns
    ///
    /// Returns `true` if the address was deleted, `false` if it didn't exist
    /// or belongs to another user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1 AND user_id = $2")
            .bind(address_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Map a database row to an [`Address`].
fn map_address(row: &PgRow) -> Result<Address, RepositoryError> {
    let kind: String = row.try_get("kind")?;

    Ok(Address {
        id: row.try_get::<AddressId, _>("id")?,
        user_id: row.try_get::<UserId, _>("user_id")?,
        label: row.try_get("label")?,
        street: row.try_get("street")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        zip: row.try_get("zip")?,
        country: row.try_get("country")?,
        telephone: row.try_get("telephone")?,
        kind: AddressKind::from_str_lossy(&kind),
        is_default: row.try_get("is_default")?,
        created_at: row.try_get("created_at")?,
    })
}

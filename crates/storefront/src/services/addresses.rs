//! Address book service.
//!
//! CRUD over a user's shipping addresses. The at-most-one-default invariant
//! is enforced by the repository transaction; this layer owns validation and
//! patch merging.

use sqlx::PgPool;
use thiserror::Error;

use easytech_core::{AddressId, UserId};

use crate::db::RepositoryError;
use crate::db::addresses::{AddressRecord, AddressRepository};
use crate::models::{Address, AddressInput, AddressPatch};

/// Errors that can occur in address book operations.
#[derive(Debug, Error)]
pub enum AddressError {
    /// A required field is missing or blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The address does not exist or belongs to another user.
    #[error("address not found")]
    NotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for AddressError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

/// Address book service.
pub struct AddressBook<'a> {
    addresses: AddressRepository<'a>,
}

impl<'a> AddressBook<'a> {
    /// Create a new address book service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            addresses: AddressRepository::new(pool),
        }
    }

    /// List a user's addresses in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::Repository` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Address>, AddressError> {
        Ok(self.addresses.list(user_id).await?)
    }

    /// Add a new address.
    ///
    /// When the input is marked default, the previous default is cleared in
    /// the same transaction as the insert.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::MissingField` when a required field is blank.
    pub async fn add(
        &self,
        user_id: UserId,
        input: &AddressInput,
    ) -> Result<Address, AddressError> {
        validate_required(&input.label, &input.street, &input.city, &input.country)?;

        let record = AddressRecord {
            label: input.label.trim(),
            street: input.street.trim(),
            city: input.city.trim(),
            state: input.state.trim(),
            zip: input.zip.trim(),
            country: input.country.trim(),
            telephone: input.telephone.as_deref(),
            kind: input.kind,
            is_default: input.is_default,
        };

        Ok(self.addresses.insert(user_id, &record).await?)
    }

    /// Apply a partial update to an existing address.
    ///
    /// Absent patch fields keep their current value. Setting `default` to
    /// true clears the previous default in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::NotFound` when the address does not belong to
    /// the user, and `AddressError::MissingField` when the patch blanks a
    /// required field.
    pub async fn update(
        &self,
        user_id: UserId,
        address_id: AddressId,
        patch: &AddressPatch,
    ) -> Result<Address, AddressError> {
        let current = self
            .addresses
            .list(user_id)
            .await?
            .into_iter()
            .find(|a| a.id == address_id)
            .ok_or(AddressError::NotFound)?;

        let merged = merge_patch(&current, patch);
        validate_required(&merged.label, &merged.street, &merged.city, &merged.country)?;

        let record = AddressRecord {
            label: merged.label.trim(),
            street: merged.street.trim(),
            city: merged.city.trim(),
            state: merged.state.trim(),
            zip: merged.zip.trim(),
            country: merged.country.trim(),
            telephone: merged.telephone.as_deref(),
            kind: merged.kind,
            is_default: merged.is_default,
        };

        Ok(self.addresses.update(user_id, address_id, &record).await?)
    }

    /// Remove an address.
    ///
    /// Removing the default promotes no replacement.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::NotFound` for ids that do not belong to the
    /// user; the list is left unchanged in that case.
    pub async fn remove(&self, user_id: UserId, address_id: AddressId) -> Result<(), AddressError> {
        if self.addresses.delete(user_id, address_id).await? {
            Ok(())
        } else {
            Err(AddressError::NotFound)
        }
    }
}

/// Merge a patch onto the current address values.
fn merge_patch(current: &Address, patch: &AddressPatch) -> Address {
    Address {
        id: current.id,
        user_id: current.user_id,
        label: patch.label.clone().unwrap_or_else(|| current.label.clone()),
        street: patch.street.clone().unwrap_or_else(|| current.street.clone()),
        city: patch.city.clone().unwrap_or_else(|| current.city.clone()),
        state: patch.state.clone().unwrap_or_else(|| current.state.clone()),
        zip: patch.zip.clone().unwrap_or_else(|| current.zip.clone()),
        country: patch
            .country
            .clone()
            .unwrap_or_else(|| current.country.clone()),
        telephone: patch.telephone.clone().or_else(|| current.telephone.clone()),
        kind: patch.kind.unwrap_or(current.kind),
        is_default: patch.is_default.unwrap_or(current.is_default),
        created_at: current.created_at,
    }
}

/// Check the fields the profile API requires on every address.
fn validate_required(
    label: &str,
    street: &str,
    city: &str,
    country: &str,
) -> Result<(), AddressError> {
    if label.trim().is_empty() {
        return Err(AddressError::MissingField("name"));
    }
    if street.trim().is_empty() {
        return Err(AddressError::MissingField("address"));
    }
    if city.trim().is_empty() {
        return Err(AddressError::MissingField("city"));
    }
    if country.trim().is_empty() {
        return Err(AddressError::MissingField("country"));
    }
    Ok(())
}

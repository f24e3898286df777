//! Account route handlers.
//!
//! These routes require an authenticated session. The profile endpoint
//! returns the merged view of the hosted identity record and the internal
//! record; the address endpoints mutate the internal record's address book.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;

use easytech_core::{AddressId, Telephone};

use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Address, AddressInput, AddressPatch, MergedProfile};
use crate::services::addresses::AddressBook;
use crate::services::profile::ProfileService;
use crate::state::AppState;

/// Profile update form data. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct ProfileUpdateForm {
    pub telephone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

// =============================================================================
// Profile
// =============================================================================

/// Display the merged profile for the signed-in user.
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(claim): RequireAuth,
) -> Result<Json<MergedProfile>> {
    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(claim.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("account no longer exists".to_string()))?;

    let service = ProfileService::new(state.pool(), state.identity());
    let view = service.resolve_for_user(&user).await?;

    Ok(Json(view))
}

/// Update the internally-owned contact fields.
///
/// Name, email, and avatar belong to the hosted identity record and are not
/// editable here.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(claim): RequireAuth,
    Json(form): Json<ProfileUpdateForm>,
) -> Result<Json<MergedProfile>> {
    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(claim.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("account no longer exists".to_string()))?;

    let telephone = match form.telephone.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Some(
            Telephone::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))?,
        ),
        Some(_) => None, // explicit blank clears the number
        None => user.telephone.clone(),
    };
    let date_of_birth = form.date_of_birth.or(user.date_of_birth);

    let updated = users
        .update_contact(user.id, telephone.as_ref(), date_of_birth)
        .await?;

    let service = ProfileService::new(state.pool(), state.identity());
    let view = service.resolve_for_user(&updated).await?;

    Ok(Json(view))
}

// =============================================================================
// Addresses
// =============================================================================

/// List the signed-in user's addresses.
pub async fn addresses(
    State(state): State<AppState>,
    RequireAuth(claim): RequireAuth,
) -> Result<Json<Vec<Address>>> {
    let book = AddressBook::new(state.pool());
    let addresses = book.list(claim.sub).await?;

    Ok(Json(addresses))
}

/// Add a new address.
pub async fn create_address(
    State(state): State<AppState>,
    RequireAuth(claim): RequireAuth,
    Json(input): Json<AddressInput>,
) -> Result<(StatusCode, Json<Address>)> {
    let book = AddressBook::new(state.pool());
    let address = book.add(claim.sub, &input).await?;

    tracing::info!(user_id = %claim.sub, address_id = %address.id, "address added");

    Ok((StatusCode::CREATED, Json(address)))
}

/// Apply a partial update to an address.
pub async fn update_address(
    State(state): State<AppState>,
    RequireAuth(claim): RequireAuth,
    Path(id): Path<i32>,
    Json(patch): Json<AddressPatch>,
) -> Result<Json<Address>> {
    let book = AddressBook::new(state.pool());
    let address = book.update(claim.sub, AddressId::new(id), &patch).await?;

    Ok(Json(address))
}

/// Remove an address.
///
/// If the removed address was the default, no other address is promoted;
/// the caller sets a new default explicitly.
pub async fn delete_address(
    State(state): State<AppState>,
    RequireAuth(claim): RequireAuth,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let book = AddressBook::new(state.pool());
    book.remove(claim.sub, AddressId::new(id)).await?;

    Ok(StatusCode::NO_CONTENT)
}

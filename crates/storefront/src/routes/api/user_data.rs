//! Profile-data endpoint consumed by the account UI.
//!
//! `GET /api/user-data?email=...` returns the internal record's address book
//! and loyalty metrics for the given email. An unknown email yields an empty
//! address list rather than an error - the UI treats "no internal record"
//! the same as "nothing saved yet".

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::json;

use easytech_core::Email;

use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::services::addresses::AddressBook;
use crate::state::AppState;

/// Query parameters for the user-data endpoint.
#[derive(Debug, Deserialize)]
pub struct UserDataQuery {
    pub email: String,
}

/// Return `{addresses, loyalty metrics}` for an email.
pub async fn user_data(
    State(state): State<AppState>,
    Query(query): Query<UserDataQuery>,
) -> Result<Json<serde_json::Value>> {
    let email = Email::parse(&query.email).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let users = UserRepository::new(state.pool());
    let Some(user) = users.get_by_email(&email).await? else {
        return Ok(Json(json!({ "addresses": [] })));
    };

    let addresses = AddressBook::new(state.pool()).list(user.id).await?;

    Ok(Json(json!({
        "addresses": addresses,
        "loyalty_points": user.loyalty_points,
        "reward_points": user.reward_points,
        "total_spent": user.total_spent,
        "is_active": user.is_active,
    })))
}

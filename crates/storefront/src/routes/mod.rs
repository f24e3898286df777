//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (verifies database)
//!
//! # Auth
//! POST /auth/sign-up           - Start a pending registration, send code
//! POST /auth/verify-email      - Verify code, activate account, set session
//! POST /auth/resend-code       - Re-issue the verification code
//! POST /auth/sign-in           - Credential sign-in, set session
//! POST /auth/sign-out          - Clear session
//!
//! # Account (requires session)
//! GET   /account/profile       - Merged profile view
//! PATCH /account/profile       - Update telephone / date of birth
//! GET   /account/addresses     - Address list
//! POST  /account/addresses     - Add address
//! POST  /account/addresses/{id} - Update address
//! DELETE /account/addresses/{id} - Remove address
//!
//! # Internal API
//! GET  /api/user-data?email=.. - Profile data (addresses, loyalty) by email
//! ```

pub mod account;
pub mod api;
pub mod auth;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-up", post(auth::sign_up))
        .route("/verify-email", post(auth::verify_email))
        .route("/resend-code", post(auth::resend_code))
        .route("/sign-in", post(auth::sign_in))
        .route("/sign-out", post(auth::sign_out))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(account::profile).patch(account::update_profile))
        .route(
            "/addresses",
            get(account::addresses).post(account::create_address),
        )
        .route(
            "/addresses/{id}",
            post(account::update_address).delete(account::delete_address),
        )
}

/// Create the internal API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/user-data", get(api::user_data::user_data))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
        .nest("/api", api_routes())
        .fallback(not_found)
}

/// Fallback for unmatched routes.
async fn not_found() -> crate::error::AppError {
    crate::error::AppError::NotFound("no such route".to_string())
}

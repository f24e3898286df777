//! Authentication route handlers.
//!
//! Sign-up with email verification, credential sign-in, and sign-out. All
//! request and response bodies are JSON; the session rides in the cookie.

use axum::{
    Json,
    extract::State,
    http::header::SET_COOKIE,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_session_cookie_header, session_cookie_header};
use crate::models::SessionClaim;
use crate::services::auth::AuthService;
use crate::services::session::{SESSION_TTL, SessionIssuer};
use crate::services::signup::{SignupRequest, SignupService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Sign-up form data.
#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub telephone: Option<String>,
    pub password: String,
}

/// Email verification form data.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailForm {
    pub signup_id: Uuid,
    pub code: String,
}

/// Code resend form data.
#[derive(Debug, Deserialize)]
pub struct ResendCodeForm {
    pub signup_id: Uuid,
}

/// Sign-in form data.
#[derive(Debug, Deserialize)]
pub struct SignInForm {
    pub telephone: String,
    pub password: String,
}

// =============================================================================
// Sign-up & Verification
// =============================================================================

/// Start a pending registration and send the first verification code.
pub async fn sign_up(
    State(state): State<AppState>,
    Json(form): Json<SignUpForm>,
) -> Result<Json<serde_json::Value>> {
    let service = SignupService::new(state.pool(), state.identity(), state.mailer());

    let request = SignupRequest {
        first_name: form.first_name,
        last_name: form.last_name,
        email: form.email,
        telephone: form.telephone,
        password: form.password,
    };
    let signup = service.start(&request).await?;

    Ok(Json(json!({
        "signup_id": signup.id,
        "code_expires_at": signup.code_expires_at,
    })))
}

/// Verify the emailed code, activate the account, and establish a session.
///
/// This is the only path from a pending registration to a live account.
pub async fn verify_email(
    State(state): State<AppState>,
    Json(form): Json<VerifyEmailForm>,
) -> Result<Response> {
    let service = SignupService::new(state.pool(), state.identity(), state.mailer());
    let user = service.verify(form.signup_id, &form.code).await?;

    let claim = SessionIssuer::claim_for(&user, Utc::now());
    let token = state
        .sessions()
        .issue(&claim)
        .map_err(|_| AppError::Internal("failed to issue session".to_string()))?;

    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "account activated");

    let cookie = session_cookie_header(&token, state.config().is_secure());
    let body = Json(json!({
        "id": user.id,
        "email": user.email,
        "first_name": user.first_name,
        "last_name": user.last_name,
    }));

    Ok(([(SET_COOKIE, cookie)], body).into_response())
}

/// Re-issue the verification code for a pending registration.
///
/// The previous code is invalidated by the reissue itself.
pub async fn resend_code(
    State(state): State<AppState>,
    Json(form): Json<ResendCodeForm>,
) -> Result<Json<serde_json::Value>> {
    let service = SignupService::new(state.pool(), state.identity(), state.mailer());
    let signup = service.resend(form.signup_id).await?;

    Ok(Json(json!({
        "signup_id": signup.id,
        "code_expires_at": signup.code_expires_at,
    })))
}

// =============================================================================
// Sign-in & Sign-out
// =============================================================================

/// Credential sign-in: telephone + password.
///
/// A failed attempt returns the failure and issues no session; there is no
/// lockout or retry logic here.
pub async fn sign_in(
    State(state): State<AppState>,
    Json(form): Json<SignInForm>,
) -> Result<Response> {
    let service = AuthService::new(state.pool());
    let verified = service
        .verify_credentials(&form.telephone, &form.password)
        .await?;

    let now = Utc::now();
    let claim = SessionClaim {
        sub: verified.id,
        email: verified.email.clone(),
        role: verified.role,
        telephone: Some(verified.telephone.clone()),
        iat: now.timestamp(),
        exp: (now + SESSION_TTL).timestamp(),
    };
    let token = state
        .sessions()
        .issue(&claim)
        .map_err(|_| AppError::Internal("failed to issue session".to_string()))?;

    set_sentry_user(&verified.id, verified.email.as_ref().map(|e| e.as_str()));
    tracing::info!(user_id = %verified.id, "signed in");

    let cookie = session_cookie_header(&token, state.config().is_secure());
    let body = Json(json!({
        "id": verified.id,
        "name": verified.name,
        "telephone": verified.telephone,
        "role": verified.role,
    }));

    Ok(([(SET_COOKIE, cookie)], body).into_response())
}

/// Destroy the session cookie.
pub async fn sign_out(State(state): State<AppState>) -> Response {
    clear_sentry_user();

    let cookie = clear_session_cookie_header(state.config().is_secure());
    let body = Json(json!({ "signed_out": true }));

    ([(SET_COOKIE, cookie)], body).into_response()
}

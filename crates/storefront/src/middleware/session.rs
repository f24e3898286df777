//! Sliding session refresh middleware.
//!
//! Tokens are valid for 24 hours; once one is older than the 6 hour refresh
//! threshold, the next request gets a re-issued token on the response. The
//! token itself stays stateless - this is the only place refresh happens, so
//! handlers never deal with it.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header::SET_COOKIE},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use super::auth::{session_cookie_header, session_token};
use crate::state::AppState;

/// Middleware that re-issues session tokens past the refresh threshold.
///
/// Handlers that set their own session cookie (sign-in, sign-out) win: the
/// refreshed token is only attached when the response carries no `Set-Cookie`
/// of its own.
pub async fn sliding_refresh(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let token = session_token(request.headers());

    let mut response = next.run(request).await;

    let Some(token) = token else {
        return response;
    };

    // Expired or tampered tokens are left alone here; the auth extractor
    // already turned them into a 401 where it mattered.
    let Ok(Some(renewed)) = state.sessions().refresh(&token, Utc::now()) else {
        return response;
    };

    if response.headers().contains_key(SET_COOKIE) {
        return response;
    }

    let cookie = session_cookie_header(&renewed, state.config().is_secure());
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(SET_COOKIE, value);
        tracing::debug!("session token re-issued");
    }

    response
}

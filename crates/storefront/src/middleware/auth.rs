//! Authentication extractors and session cookie helpers.
//!
//! The session is a signed token (see [`crate::services::session`]) carried
//! in an `HttpOnly` cookie. Extractors decode it into the request-scoped
//! [`SessionClaim`]; nothing ambient - handlers receive the claim explicitly.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, header::COOKIE, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::models::SessionClaim;
use crate::services::session::SESSION_TTL;
use crate::state::AppState;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "et_session";

/// Build the `Set-Cookie` value carrying a session token.
#[must_use]
pub fn session_cookie_header(token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_TTL.num_seconds()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the `Set-Cookie` value that destroys the session (sign-out).
#[must_use]
pub fn clear_session_cookie_header(secure: bool) -> String {
    let mut cookie =
        format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Extract the session token from the request's `Cookie` headers.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            pair.trim()
                .strip_prefix(SESSION_COOKIE_NAME)
                .and_then(|rest| rest.strip_prefix('='))
                .map(str::to_string)
        })
}

/// Extractor that requires an authenticated session.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(claim): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, user {}!", claim.sub)
/// }
/// ```
pub struct RequireAuth(pub SessionClaim);

/// Rejection for requests without a decodable session.
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "authentication required" })),
        )
            .into_response()
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(AuthRejection)?;
        let claim = state.sessions().decode(&token).map_err(|_| AuthRejection)?;

        Ok(Self(claim))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_cookie_header_flags() {
        let cookie = session_cookie_header("tok123", false);
        assert!(cookie.starts_with("et_session=tok123;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(!cookie.contains("Secure"));

        assert!(session_cookie_header("tok123", true).contains("Secure"));
    }

    #[test]
    fn test_clear_session_cookie_header() {
        let cookie = clear_session_cookie_header(false);
        assert!(cookie.starts_with("et_session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_session_token_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; et_session=abc.def.ghi; locale=en"),
        );

        assert_eq!(session_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_session_token_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark"));
        assert!(session_token(&headers).is_none());

        assert!(session_token(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_session_token_does_not_match_prefixed_names() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("et_session_old=stale; et_session=fresh"),
        );

        assert_eq!(session_token(&headers).as_deref(), Some("fresh"));
    }
}

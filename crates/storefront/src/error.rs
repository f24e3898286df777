//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Propagation policy: user-correctable failures (validation, not-found,
//! wrong credentials, bad codes) surface their own message; upstream and
//! internal failures are reduced to a generic line so no provider payload or
//! database detail leaks. Nothing here retries.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::identity::IdentityError;
use crate::services::addresses::AddressError;
use crate::services::auth::AuthError;
use crate::services::profile::ProfileError;
use crate::services::session::SessionError;
use crate::services::signup::SignupError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Identity provider operation failed.
    #[error("Identity provider error: {0}")]
    Identity(#[from] IdentityError),

    /// Credential verification failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Sign-up / verification-code flow failed.
    #[error("Sign-up error: {0}")]
    Signup(#[from] SignupError),

    /// Session token invalid or expired.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Address book operation failed.
    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ProfileError> for AppError {
    fn from(e: ProfileError) -> Self {
        match e {
            ProfileError::Identity(err) => Self::Identity(err),
            ProfileError::Repository(err) => Self::Database(err),
        }
    }
}

impl AppError {
    /// Whether this error should be captured to Sentry.
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Internal(_)
                | Self::Identity(IdentityError::Http(_) | IdentityError::Api { .. })
        )
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Identity(err) => match err {
                IdentityError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Auth(err) => match err {
                AuthError::MissingCredentials | AuthError::InvalidTelephone(_) => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::PasswordHash | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Signup(err) => match err {
                SignupError::MissingField(_)
                | SignupError::InvalidEmail(_)
                | SignupError::InvalidTelephone(_)
                | SignupError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                SignupError::EmailTaken | SignupError::AlreadyVerified => StatusCode::CONFLICT,
                SignupError::UnknownSignup => StatusCode::NOT_FOUND,
                SignupError::CodeExpired | SignupError::CodeMismatch => StatusCode::UNAUTHORIZED,
                SignupError::Identity(_) | SignupError::Mail(_) => StatusCode::BAD_GATEWAY,
                SignupError::PasswordHash | SignupError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Session(_) | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Address(err) => match err {
                AddressError::MissingField(_) => StatusCode::BAD_REQUEST,
                AddressError::NotFound => StatusCode::NOT_FOUND,
                AddressError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message. User-correctable errors keep their own wording;
    /// upstream and internal errors get one generic line.
    fn message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Identity(err) => match err {
                IdentityError::NotFound(_) => "Account not found".to_string(),
                _ => "External service error, please try again".to_string(),
            },
            Self::Auth(err) => match err {
                AuthError::MissingCredentials | AuthError::InvalidTelephone(_) => err.to_string(),
                AuthError::UserNotFound => "User not found".to_string(),
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                _ => "Authentication error".to_string(),
            },
            Self::Signup(err) => match err {
                SignupError::MissingField(_)
                | SignupError::InvalidEmail(_)
                | SignupError::InvalidTelephone(_)
                | SignupError::WeakPassword(_)
                | SignupError::EmailTaken
                | SignupError::AlreadyVerified
                | SignupError::CodeExpired
                | SignupError::CodeMismatch => err.to_string(),
                SignupError::UnknownSignup => "Sign-up not found, please register again".to_string(),
                SignupError::Identity(_) | SignupError::Mail(_) => {
                    "External service error, please try again".to_string()
                }
                _ => "Sign-up failed".to_string(),
            },
            Self::Session(_) => "Session expired, please sign in again".to_string(),
            Self::Address(err) => match err {
                AddressError::Repository(_) => "Internal server error".to_string(),
                other => other.to_string(),
            },
            Self::NotFound(_) | Self::Unauthorized(_) | Self::BadRequest(_) => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let message = self.message();

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("address-123".to_string());
        assert_eq!(err.to_string(), "Not found: address-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_user_correctable_status_codes() {
        assert_eq!(
            status_of(AppError::Auth(AuthError::MissingCredentials)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::UserNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Signup(SignupError::CodeMismatch)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Signup(SignupError::CodeExpired)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Signup(SignupError::EmailTaken)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Address(AddressError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Address(AddressError::MissingField("city"))),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_session_errors_force_reauth() {
        assert_eq!(
            status_of(AppError::Session(SessionError::Expired)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Session(SessionError::Invalid)),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_upstream_errors_do_not_leak_detail() {
        let err = AppError::Identity(IdentityError::Api {
            status: 500,
            message: "internal provider stack trace".to_string(),
        });
        assert_eq!(err.message(), "External service error, please try again");
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_internal_errors_are_generic() {
        let err = AppError::Internal("connection pool exhausted".to_string());
        assert_eq!(err.message(), "Internal server error");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

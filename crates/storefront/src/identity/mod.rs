//! Hosted identity provider API client.
//!
//! The provider owns sign-up identities (name, email, avatar); this client
//! reads records for profile reconciliation and provisions a record when a
//! pending registration verifies. REST/JSON with a server-side secret key.
//!
//! Calls sit on the interactive request path, so the client carries a fixed
//! 10 second timeout and failures propagate without retry - the caller shows
//! a transient error instead of hanging.

mod types;

pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::IdentityConfig;

/// Request timeout for all provider calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when talking to the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("identity provider unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("identity provider error ({status}): {message}")]
    Api { status: u16, message: String },

    /// No record with the requested id.
    #[error("identity record not found: {0}")]
    NotFound(String),

    /// Client construction failed.
    #[error("identity client setup: {0}")]
    Setup(String),
}

/// Client for the hosted identity provider API.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    api_url: String,
}

impl IdentityClient {
    /// Create a new identity provider client.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Setup` if the secret key is not a valid header
    /// value or the HTTP client fails to build.
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| IdentityError::Setup(format!("invalid secret key: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(IdentityError::Http)?;

        Ok(Self {
            inner: Arc::new(IdentityClientInner {
                client,
                api_url: config.api_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Fetch a hosted identity record by id.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::NotFound` for unknown ids, `IdentityError::Http`
    /// on transport failure, and `IdentityError::Api` for other non-success
    /// responses.
    pub async fn get_user(&self, id: &str) -> Result<IdentityUser, IdentityError> {
        let url = format!("{}/v1/users/{id}", self.inner.api_url);

        let response = self.inner.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(IdentityError::NotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// Provision a hosted identity record for a verified sign-up.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Http` on transport failure and
    /// `IdentityError::Api` for non-success responses.
    pub async fn create_user(
        &self,
        new_user: &NewIdentityUser<'_>,
    ) -> Result<IdentityUser, IdentityError> {
        let url = format!("{}/v1/users", self.inner.api_url);

        let response = self.inner.client.post(&url).json(new_user).send().await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        Ok(response.json().await?)
    }
}

/// Reduce a non-success response to a single-line `Api` error.
///
/// Provider error payloads are collapsed to their first line so nothing
/// internal leaks into messages surfaced further up.
async fn api_error(response: reqwest::Response) -> IdentityError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = body.lines().next().unwrap_or("").chars().take(200).collect();

    IdentityError::Api { status, message }
}

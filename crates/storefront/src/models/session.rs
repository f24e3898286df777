//! Session-related types.
//!
//! The session claim is the signed set of identity fields carried by every
//! authenticated request, embedded in a JWT stored in the session cookie.

use serde::{Deserialize, Serialize};

use easytech_core::{Email, Role, Telephone, UserId};

/// Claims embedded in the session token.
///
/// Stateless: everything a handler needs to identify the caller without a
/// session store lookup. `iat`/`exp` are Unix timestamps in seconds;
/// validity is 24 hours with a 6 hour sliding-refresh threshold (see
/// [`crate::services::session`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaim {
    /// User's database ID.
    pub sub: UserId,
    /// User's email address, when known.
    pub email: Option<Email>,
    /// Account role.
    pub role: Role,
    /// Telephone the user signed in with, when known.
    pub telephone: Option<Telephone>,
    /// Issued-at (Unix seconds).
    pub iat: i64,
    /// Expiry (Unix seconds).
    pub exp: i64,
}

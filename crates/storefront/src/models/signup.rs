//! Pending registration domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use easytech_core::{Email, Telephone};

/// Lifecycle of a pending registration.
///
/// `CodeSent → Verified` is the terminal success path. `Expired` is reached
/// when a verify attempt arrives past the code's expiry; reissuing a code
/// returns the registration to `CodeSent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignupStatus {
    CodeSent,
    Verified,
    Expired,
}

impl SignupStatus {
    /// Parse a status from its canonical string form (the database
    /// representation; writes happen as SQL literals in the repository).
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "verified" => Self::Verified,
            "expired" => Self::Expired,
            _ => Self::CodeSent,
        }
    }
}

/// A pending registration (domain type).
///
/// Holds the attributes the `users` row is materialized from once the email
/// is verified. The verification code occupies a single slot: reissue
/// overwrites `code` and `code_expires_at` in place, so at most one code is
/// valid at any time.
#[derive(Debug, Clone)]
pub struct Signup {
    /// Opaque handle for the in-progress sign-up.
    pub id: Uuid,
    /// First name supplied at sign-up.
    pub first_name: String,
    /// Last name supplied at sign-up.
    pub last_name: String,
    /// Email address to verify.
    pub email: Email,
    /// Optional telephone supplied at sign-up.
    pub telephone: Option<Telephone>,
    /// Argon2 hash of the supplied password.
    pub password_hash: String,
    /// Current 6-digit verification code.
    pub code: String,
    /// When the current code stops being accepted.
    pub code_expires_at: DateTime<Utc>,
    /// Lifecycle status.
    pub status: SignupStatus,
    /// When the sign-up was started.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_str() {
        assert_eq!(SignupStatus::from_str_lossy("code_sent"), SignupStatus::CodeSent);
        assert_eq!(SignupStatus::from_str_lossy("verified"), SignupStatus::Verified);
        assert_eq!(SignupStatus::from_str_lossy("expired"), SignupStatus::Expired);
        // Unknown values read as the initial state
        assert_eq!(SignupStatus::from_str_lossy("??"), SignupStatus::CodeSent);
    }
}

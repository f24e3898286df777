//! User domain types.
//!
//! The internal profile record. The hosted identity provider owns
//! name/email/avatar for provisioned accounts; this record owns telephone,
//! date of birth, the address book, and loyalty metrics.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use easytech_core::{Email, Role, Telephone, UserId};

/// An internal profile record (domain type).
///
/// `password_hash` lives only in the repository layer and is never part of
/// this type.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Back-reference to the hosted identity record, if provisioned.
    pub identity_user_id: Option<String>,
    /// Email address (lowercased; the reconciliation join key).
    pub email: Email,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Telephone number (sign-in key for credential accounts).
    pub telephone: Option<Telephone>,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Account role.
    pub role: Role,
    /// Loyalty points balance (server-authoritative).
    pub loyalty_points: i32,
    /// Reward points balance (server-authoritative).
    pub reward_points: i32,
    /// Lifetime spend (server-authoritative).
    pub total_spent: Decimal,
    /// Lifecycle flag; false once an account is deactivated.
    pub is_active: bool,
    /// Last successful sign-in.
    pub last_login: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The user's full name, if any name parts are present.
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(first), None) => Some(first.clone()),
            (None, Some(last)) => Some(last.clone()),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(first: Option<&str>, last: Option<&str>) -> User {
        User {
            id: UserId::new(1),
            identity_user_id: None,
            email: Email::parse("user@example.com").unwrap(),
            first_name: first.map(String::from),
            last_name: last.map(String::from),
            telephone: None,
            date_of_birth: None,
            role: Role::User,
            loyalty_points: 0,
            reward_points: 0,
            total_spent: Decimal::ZERO,
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(
            user(Some("John"), Some("Doe")).full_name().as_deref(),
            Some("John Doe")
        );
        assert_eq!(user(Some("John"), None).full_name().as_deref(), Some("John"));
        assert_eq!(user(None, Some("Doe")).full_name().as_deref(), Some("Doe"));
        assert_eq!(user(None, None).full_name(), None);
    }
}

//! Identity reconciliation service.
//!
//! On every authenticated profile load, the hosted identity record and the
//! internal profile record for the same person (joined by email) are merged
//! into one view. The merge itself is a pure, total function over both
//! records possibly being absent; only the fetches do I/O.

use sqlx::PgPool;
use thiserror::Error;

use easytech_core::Email;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::identity::{IdentityClient, IdentityError, IdentityUser};
use crate::models::{MergedProfile, User};

/// Errors that can occur while resolving a merged profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The identity provider could not be reached or answered with an error.
    #[error("identity provider error: {0}")]
    Identity(#[from] IdentityError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Identity reconciliation service.
pub struct ProfileService<'a> {
    users: UserRepository<'a>,
    identity: &'a IdentityClient,
}

impl<'a> ProfileService<'a> {
    /// Create a new profile service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, identity: &'a IdentityClient) -> Self {
        Self {
            users: UserRepository::new(pool),
            identity,
        }
    }

    /// Resolve the merged profile for a hosted identity record id.
    ///
    /// The internal record is looked up by the back-reference first, then by
    /// the hosted record's primary email; its absence is not an error - the
    /// merged view simply reports internally-owned fields as not provided.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Identity` when the provider is unreachable
    /// (propagated without retry - the caller shows a transient failure).
    pub async fn resolve(&self, identity_user_id: &str) -> Result<MergedProfile, ProfileError> {
        let hosted = self.identity.get_user(identity_user_id).await?;
        let internal = self.find_internal(&hosted).await?;

        Ok(merge_profile(Some(&hosted), internal.as_ref()))
    }

    /// Resolve the merged profile for an already-loaded internal user.
    ///
    /// Credential-only accounts have no hosted record; their view is built
    /// from the internal record alone.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Identity` when the user has a hosted record and
    /// the provider cannot be reached.
    pub async fn resolve_for_user(&self, user: &User) -> Result<MergedProfile, ProfileError> {
        match user.identity_user_id.as_deref() {
            Some(id) => {
                let hosted = self.identity.get_user(id).await?;
                Ok(merge_profile(Some(&hosted), Some(user)))
            }
            None => Ok(merge_profile(None, Some(user))),
        }
    }

    async fn find_internal(&self, hosted: &IdentityUser) -> Result<Option<User>, ProfileError> {
        if let Some(user) = self.users.get_by_identity_id(&hosted.id).await? {
            return Ok(Some(user));
        }

        let Some(primary) = hosted.primary_email() else {
            return Ok(None);
        };
        let Ok(email) = Email::parse(primary) else {
            return Ok(None);
        };

        Ok(self.users.get_by_email(&email).await?)
    }
}

/// Merge the two records into a display-ready profile.
///
/// Pure and idempotent: the same inputs always produce a field-for-field
/// identical view. Name and email prefer the hosted record; telephone, date
/// of birth, and loyalty metrics come from the internal record.
#[must_use]
pub fn merge_profile(hosted: Option<&IdentityUser>, internal: Option<&User>) -> MergedProfile {
    let hosted_first = hosted
        .and_then(|h| h.first_name.as_deref())
        .filter(|s| !s.is_empty());
    let hosted_last = hosted
        .and_then(|h| h.last_name.as_deref())
        .filter(|s| !s.is_empty());
    let internal_first = internal
        .and_then(|u| u.first_name.as_deref())
        .filter(|s| !s.is_empty());
    let internal_last = internal
        .and_then(|u| u.last_name.as_deref())
        .filter(|s| !s.is_empty());

    let display_name = match (hosted_first, hosted_last, internal_first, internal_last) {
        (Some(first), Some(last), _, _) | (_, _, Some(first), Some(last)) => {
            format!("{first} {last}")
        }
        _ => hosted_first
            .or(internal_first)
            .map_or_else(|| "User".to_string(), str::to_string),
    };

    let display_email = hosted
        .and_then(IdentityUser::primary_email)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| internal.map(|u| u.email.as_str().to_string()))
        .unwrap_or_default();

    MergedProfile {
        display_name,
        display_email,
        avatar_url: hosted.and_then(|h| h.image_url.clone()),
        member_since: hosted
            .and_then(|h| h.created_at)
            .or_else(|| internal.map(|u| u.created_at)),
        telephone: internal
            .and_then(|u| u.telephone.as_ref())
            .map(|t| t.as_str().to_string()),
        date_of_birth: internal.and_then(|u| u.date_of_birth),
        loyalty_points: internal.map_or(0, |u| u.loyalty_points),
        reward_points: internal.map_or(0, |u| u.reward_points),
        total_spent: internal.map_or_else(Default::default, |u| u.total_spent),
        last_login: internal.and_then(|u| u.last_login),
        is_active: internal.is_none_or(|u| u.is_active),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::identity::IdentityEmail;
    use chrono::Utc;
    use easytech_core::{Role, Telephone, UserId};
    use rust_decimal::Decimal;

    fn hosted(first: Option<&str>, last: Option<&str>, email: Option<&str>) -> IdentityUser {
        IdentityUser {
            id: "idn_42".to_string(),
            first_name: first.map(String::from),
            last_name: last.map(String::from),
            email_addresses: email
                .map(|e| {
                    vec![IdentityEmail {
                        id: "eml_1".to_string(),
                        address: e.to_string(),
                    }]
                })
                .unwrap_or_default(),
            image_url: Some("https://img.identity.test/42.png".to_string()),
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }

    fn internal(first: Option<&str>, last: Option<&str>) -> User {
        User {
            id: UserId::new(1),
            identity_user_id: Some("idn_42".to_string()),
            email: Email::parse("internal@example.com").unwrap(),
            first_name: first.map(String::from),
            last_name: last.map(String::from),
            telephone: Some(Telephone::parse("01500000000").unwrap()),
            date_of_birth: None,
            role: Role::User,
            loyalty_points: 120,
            reward_points: 40,
            total_spent: Decimal::new(129_99, 2),
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_hosted_name_wins_when_complete() {
        let view = merge_profile(
            Some(&hosted(Some("John"), Some("Doe"), Some("john@example.com"))),
            Some(&internal(Some("Jon"), Some("D"))),
        );
        assert_eq!(view.display_name, "John Doe");
        assert_eq!(view.display_email, "john@example.com");
    }

    #[test]
    fn test_internal_name_fills_incomplete_hosted() {
        let view = merge_profile(
            Some(&hosted(Some("John"), None, Some("john@example.com"))),
            Some(&internal(Some("Jon"), Some("Doe"))),
        );
        assert_eq!(view.display_name, "Jon Doe");
    }

    #[test]
    fn test_hosted_first_name_alone() {
        let view = merge_profile(
            Some(&hosted(Some("John"), None, None)),
            Some(&internal(None, None)),
        );
        assert_eq!(view.display_name, "John");
        // No hosted email: falls back to the internal record's
        assert_eq!(view.display_email, "internal@example.com");
    }

    #[test]
    fn test_internal_first_name_alone() {
        let view = merge_profile(
            Some(&hosted(None, None, None)),
            Some(&internal(Some("Jon"), None)),
        );
        assert_eq!(view.display_name, "Jon");
    }

    #[test]
    fn test_literal_fallback_when_nothing_known() {
        let view = merge_profile(Some(&hosted(None, None, None)), None);
        assert_eq!(view.display_name, "User");
        assert_eq!(view.display_email, "");
        assert_eq!(view.loyalty_points, 0);
        assert_eq!(view.total_spent, Decimal::ZERO);
        assert!(view.is_active);
    }

    #[test]
    fn test_internal_only_account() {
        let view = merge_profile(None, Some(&internal(Some("Jon"), Some("Doe"))));
        assert_eq!(view.display_name, "Jon Doe");
        assert_eq!(view.display_email, "internal@example.com");
        assert!(view.avatar_url.is_none());
        assert_eq!(view.loyalty_points, 120);
    }

    #[test]
    fn test_internal_fields_come_from_internal_record() {
        let view = merge_profile(
            Some(&hosted(Some("John"), Some("Doe"), Some("john@example.com"))),
            Some(&internal(None, None)),
        );
        assert_eq!(view.telephone.as_deref(), Some("01500000000"));
        assert_eq!(view.reward_points, 40);
        assert_eq!(view.total_spent, Decimal::new(129_99, 2));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let h = hosted(Some("John"), Some("Doe"), Some("john@example.com"));
        let u = internal(Some("Jon"), Some("D"));

        let first = merge_profile(Some(&h), Some(&u));
        let second = merge_profile(Some(&h), Some(&u));
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_strings_treated_as_absent() {
        let view = merge_profile(
            Some(&hosted(Some(""), Some(""), None)),
            Some(&internal(Some("Jon"), Some("Doe"))),
        );
        assert_eq!(view.display_name, "Jon Doe");
    }
}

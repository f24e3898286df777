//! Types for the hosted identity provider API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An email address attached to a hosted identity record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityEmail {
    /// The provider's id for this email entry.
    pub id: String,
    /// The email address itself.
    #[serde(rename = "email_address")]
    pub address: String,
}

/// A hosted identity record.
///
/// Owned and mutated by the external identity provider; this system reads it
/// and only writes through the provider's own sign-up API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityUser {
    /// The provider's unique id for this record.
    pub id: String,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Email addresses; the first entry is primary.
    #[serde(default)]
    pub email_addresses: Vec<IdentityEmail>,
    /// Avatar URL.
    pub image_url: Option<String>,
    /// When the record was created.
    pub created_at: Option<DateTime<Utc>>,
    /// When the record was last updated.
    pub updated_at: Option<DateTime<Utc>>,
}

impl IdentityUser {
    /// The record's primary email address (first in the list).
    #[must_use]
    pub fn primary_email(&self) -> Option<&str> {
        self.email_addresses.first().map(|e| e.address.as_str())
    }
}

/// Input for provisioning a hosted identity record.
#[derive(Debug, Serialize)]
pub struct NewIdentityUser<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    /// The verified email address to attach as primary.
    pub email_address: &'a str,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_email_is_first() {
        let user = IdentityUser {
            id: "idn_1".to_string(),
            first_name: Some("John".to_string()),
            last_name: Some("Doe".to_string()),
            email_addresses: vec![
                IdentityEmail {
                    id: "eml_1".to_string(),
                    address: "john@example.com".to_string(),
                },
                IdentityEmail {
                    id: "eml_2".to_string(),
                    address: "john.doe@example.com".to_string(),
                },
            ],
            image_url: None,
            created_at: None,
            updated_at: None,
        };

        assert_eq!(user.primary_email(), Some("john@example.com"));
    }

    #[test]
    fn test_primary_email_empty_list() {
        let user: IdentityUser = serde_json::from_str(r#"{"id": "idn_2"}"#).unwrap();
        assert_eq!(user.primary_email(), None);
    }
}

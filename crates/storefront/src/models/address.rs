//! Shipping address domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use easytech_core::{AddressId, UserId};

/// Address category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AddressKind {
    #[default]
    Home,
    Office,
    Other,
}

impl AddressKind {
    /// The kind's canonical string form (matches the database representation).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Office => "office",
            Self::Other => "other",
        }
    }

    /// Parse a kind from its canonical string form; unknown values map to
    /// `Other`.
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "home" => Self::Home,
            "office" => Self::Office,
            _ => Self::Other,
        }
    }
}

/// A shipping address (domain type).
///
/// Wire names follow the public profile API contract (`name`, `address`,
/// `type`, `default`).
#[derive(Debug, Clone, Serialize)]
pub struct Address {
    /// Unique address ID, assigned on creation.
    pub id: AddressId,
    /// Owning user.
    #[serde(skip)]
    pub user_id: UserId,
    /// Display label, e.g. "Home".
    #[serde(rename = "name")]
    pub label: String,
    /// Street line.
    #[serde(rename = "address")]
    pub street: String,
    /// City.
    pub city: String,
    /// State / province.
    pub state: String,
    /// Postal code.
    pub zip: String,
    /// Country.
    pub country: String,
    /// Contact telephone for deliveries.
    #[serde(rename = "phone", skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    /// Address category.
    #[serde(rename = "type")]
    pub kind: AddressKind,
    /// Whether this is the user's default shipping address.
    ///
    /// Invariant: at most one address per user has this set.
    #[serde(rename = "default")]
    pub is_default: bool,
    /// When the address was created.
    pub created_at: DateTime<Utc>,
}

/// Input for creating an address.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressInput {
    /// Display label, e.g. "Home". Required.
    #[serde(rename = "name")]
    pub label: String,
    /// Street line. Required.
    #[serde(rename = "address")]
    pub street: String,
    /// City. Required.
    pub city: String,
    /// State / province.
    #[serde(default)]
    pub state: String,
    /// Postal code.
    #[serde(default)]
    pub zip: String,
    /// Country. Required.
    pub country: String,
    /// Contact telephone for deliveries.
    #[serde(rename = "phone", default)]
    pub telephone: Option<String>,
    /// Address category.
    #[serde(rename = "type", default)]
    pub kind: AddressKind,
    /// Whether to make this the default shipping address.
    #[serde(rename = "default", default)]
    pub is_default: bool,
}

/// Partial update for an existing address. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressPatch {
    #[serde(rename = "name")]
    pub label: Option<String>,
    #[serde(rename = "address")]
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "phone")]
    pub telephone: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<AddressKind>,
    #[serde(rename = "default")]
    pub is_default: Option<bool>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [AddressKind::Home, AddressKind::Office, AddressKind::Other] {
            assert_eq!(AddressKind::from_str_lossy(kind.as_str()), kind);
        }
    }

    #[test]
    fn test_kind_unknown_maps_to_other() {
        assert_eq!(AddressKind::from_str_lossy("warehouse"), AddressKind::Other);
    }

    #[test]
    fn test_address_wire_names() {
        let address = Address {
            id: AddressId::new(1),
            user_id: UserId::new(9),
            label: "Home".to_string(),
            street: "1 Main St".to_string(),
            city: "Dhaka".to_string(),
            state: "".to_string(),
            zip: "1207".to_string(),
            country: "Bangladesh".to_string(),
            telephone: None,
            kind: AddressKind::Home,
            is_default: true,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&address).unwrap();
        assert_eq!(json["name"], "Home");
        assert_eq!(json["address"], "1 Main St");
        assert_eq!(json["type"], "home");
        assert_eq!(json["default"], true);
        // Owning user is internal, not part of the wire format
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn test_input_defaults() {
        let input: AddressInput = serde_json::from_str(
            r#"{"name": "Home", "address": "1 Main St", "city": "Dhaka", "country": "Bangladesh"}"#,
        )
        .unwrap();
        assert_eq!(input.kind, AddressKind::Home);
        assert!(!input.is_default);
        assert!(input.telephone.is_none());
    }
}

//! Merged profile view.
//!
//! A read-only combination of the hosted identity record and the internal
//! profile record, computed per request and never persisted.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// The merged, display-ready profile.
///
/// Field precedence: name/email/avatar prefer the hosted identity record;
/// telephone, date of birth, and loyalty metrics come from the internal
/// record. Built by [`crate::services::profile::merge_profile`], which is
/// pure and total over both records being absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedProfile {
    /// Display name, falling back to `"User"` when neither record has one.
    pub display_name: String,
    /// Display email; empty when neither record has one.
    pub display_email: String,
    /// Avatar URL from the hosted identity record.
    pub avatar_url: Option<String>,
    /// Member-since timestamp (hosted record creation, else internal).
    pub member_since: Option<DateTime<Utc>>,
    /// Telephone from the internal record.
    pub telephone: Option<String>,
    /// Date of birth from the internal record.
    pub date_of_birth: Option<NaiveDate>,
    /// Loyalty points; zero when no internal record exists.
    pub loyalty_points: i32,
    /// Reward points; zero when no internal record exists.
    pub reward_points: i32,
    /// Lifetime spend; zero when no internal record exists.
    pub total_spent: Decimal,
    /// Last sign-in from the internal record.
    pub last_login: Option<DateTime<Utc>>,
    /// Account lifecycle flag; true when no internal record exists.
    pub is_active: bool,
}

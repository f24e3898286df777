//! Telephone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Telephone`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum TelephoneError {
    /// The input string is empty.
    #[error("telephone cannot be empty")]
    Empty,
    /// The input string is too short or too long.
    #[error("telephone must be {min}-{max} digits")]
    BadLength {
        /// Minimum allowed digits.
        min: usize,
        /// Maximum allowed digits.
        max: usize,
    },
    /// The input contains a character that is not a digit or leading +.
    #[error("telephone may only contain digits and an optional leading +")]
    InvalidCharacter,
}

/// A telephone number.
///
/// Telephone is the sign-in key for credential accounts, so it gets the same
/// validated-newtype treatment as [`super::Email`]. Separators (spaces and
/// dashes) are stripped on parse; an optional leading `+` is preserved.
///
/// ## Examples
///
/// ```
/// use easytech_core::Telephone;
///
/// let phone = Telephone::parse("015-0000-0000").unwrap();
/// assert_eq!(phone.as_str(), "01500000000");
///
/// assert!(Telephone::parse("").is_err());
/// assert!(Telephone::parse("call me").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Telephone(String);

impl Telephone {
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 6;
    /// Maximum number of digits (ITU-T E.164).
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `Telephone` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains characters other than
    /// digits, separators, and an optional leading `+`, or has a digit count
    /// outside 6-15.
    pub fn parse(s: &str) -> Result<Self, TelephoneError> {
        if s.is_empty() {
            return Err(TelephoneError::Empty);
        }

        let mut normalized = String::with_capacity(s.len());
        for (i, c) in s.chars().enumerate() {
            match c {
                '0'..='9' => normalized.push(c),
                '+' if i == 0 => normalized.push(c),
                ' ' | '-' => {}
                _ => return Err(TelephoneError::InvalidCharacter),
            }
        }

        let digits = normalized.chars().filter(char::is_ascii_digit).count();
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits) {
            return Err(TelephoneError::BadLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(normalized))
    }

    /// Returns the telephone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Telephone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Telephone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Telephone {
    type Err = TelephoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Telephone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Telephone {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Telephone {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Telephone {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Telephone::parse("01500000000").is_ok());
        assert!(Telephone::parse("+8801500000000").is_ok());
        assert!(Telephone::parse("015 0000 0000").is_ok());
    }

    #[test]
    fn test_parse_strips_separators() {
        let phone = Telephone::parse("015-0000-0000").unwrap();
        assert_eq!(phone.as_str(), "01500000000");
    }

    #[test]
    fn test_parse_keeps_leading_plus() {
        let phone = Telephone::parse("+880 1500 000000").unwrap();
        assert_eq!(phone.as_str(), "+8801500000000");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Telephone::parse(""), Err(TelephoneError::Empty)));
    }

    #[test]
    fn test_parse_invalid_character() {
        assert!(matches!(
            Telephone::parse("call me"),
            Err(TelephoneError::InvalidCharacter)
        ));
        // + only allowed in first position
        assert!(matches!(
            Telephone::parse("015+000000"),
            Err(TelephoneError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_parse_bad_length() {
        assert!(matches!(
            Telephone::parse("12345"),
            Err(TelephoneError::BadLength { .. })
        ));
        assert!(matches!(
            Telephone::parse("1234567890123456"),
            Err(TelephoneError::BadLength { .. })
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let phone = Telephone::parse("01500000000").unwrap();
        let json = serde_json::to_string(&phone).unwrap();
        assert_eq!(json, "\"01500000000\"");
        let back: Telephone = serde_json::from_str(&json).unwrap();
        assert_eq!(back, phone);
    }
}

//! Session token issuing, refresh, and decoding.
//!
//! Sessions are stateless signed tokens (HS256 JWT) carried in the session
//! cookie. Validity is fixed at 24 hours; tokens older than the 6 hour
//! refresh threshold are transparently re-issued by the session middleware,
//! giving a sliding window without any server-side session storage.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::models::{SessionClaim, User};

/// Token validity.
pub const SESSION_TTL: Duration = Duration::hours(24);

/// Age beyond which a token is re-issued on use.
pub const REFRESH_AFTER: Duration = Duration::hours(6);

/// Errors that can occur when decoding a session token.
///
/// Both variants force re-authentication; the split only feeds logging.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The token is past its expiry.
    #[error("session expired")]
    Expired,

    /// The token is malformed or its signature does not verify.
    #[error("invalid session token")]
    Invalid,
}

/// Issues and decodes session tokens.
#[derive(Clone)]
pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionIssuer {
    /// Create an issuer from the configured session secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }

    /// Build the claim for a user as of `now`.
    #[must_use]
    pub fn claim_for(user: &User, now: DateTime<Utc>) -> SessionClaim {
        SessionClaim {
            sub: user.id,
            email: Some(user.email.clone()),
            role: user.role,
            telephone: user.telephone.clone(),
            iat: now.timestamp(),
            exp: (now + SESSION_TTL).timestamp(),
        }
    }

    /// Sign a claim into a token.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Invalid` if signing fails.
    pub fn issue(&self, claim: &SessionClaim) -> Result<String, SessionError> {
        encode(&Header::new(Algorithm::HS256), claim, &self.encoding)
            .map_err(|_| SessionError::Invalid)
    }

    /// Decode and validate a token back into its claim.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Expired` for tokens past expiry and
    /// `SessionError::Invalid` for anything tampered or malformed.
    pub fn decode(&self, token: &str) -> Result<SessionClaim, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<SessionClaim>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::Invalid,
            })
    }

    /// Re-issue a token past the refresh threshold.
    ///
    /// Returns `Ok(None)` when the token is still young enough to keep;
    /// `Ok(Some(token))` with fresh issued-at/expiry otherwise.
    ///
    /// # Errors
    ///
    /// Returns the decode error for expired or invalid tokens.
    pub fn refresh(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, SessionError> {
        let claim = self.decode(token)?;

        if now.timestamp() - claim.iat <= REFRESH_AFTER.num_seconds() {
            return Ok(None);
        }

        let renewed = SessionClaim {
            iat: now.timestamp(),
            exp: (now + SESSION_TTL).timestamp(),
            ..claim
        };
        self.issue(&renewed).map(Some)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use easytech_core::{Email, Role, Telephone, UserId};
    use rust_decimal::Decimal;

    fn issuer() -> SessionIssuer {
        SessionIssuer::new(&SecretString::from("k9#mQ2$vX7!pL4@wN8^rT3&bF6*zH1%j"))
    }

    fn test_user() -> User {
        User {
            id: UserId::new(7),
            identity_user_id: None,
            email: Email::parse("user@example.com").unwrap(),
            first_name: Some("John".to_string()),
            last_name: Some("Doe".to_string()),
            telephone: Some(Telephone::parse("01500000000").unwrap()),
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
    fn test_issue_decode_round_trip() {
        let issuer = issuer();
        let claim = SessionIssuer::claim_for(&test_user(), Utc::now());

        let token = issuer.issue(&claim).unwrap();
        let decoded = issuer.decode(&token).unwrap();

        assert_eq!(decoded, claim);
        assert_eq!(decoded.sub, UserId::new(7));
        assert_eq!(decoded.exp - decoded.iat, SESSION_TTL.num_seconds());
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let issuer = issuer();
        let claim = SessionIssuer::claim_for(&test_user(), Utc::now());
        let token = issuer.issue(&claim).unwrap();

        // Corrupt the signature segment
        let mut tampered = token;
        tampered.pop();
        tampered.push('A');

        assert!(matches!(
            issuer.decode(&tampered),
            Err(SessionError::Invalid)
        ));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let issuer = issuer();
        let other = SessionIssuer::new(&SecretString::from("w3$tY8!qZ5@nM1#vK6^sD9&cG2*xJ4%p"));
        let token = issuer
            .issue(&SessionIssuer::claim_for(&test_user(), Utc::now()))
            .unwrap();

        assert!(matches!(other.decode(&token), Err(SessionError::Invalid)));
    }

    #[test]
    fn test_expired_token() {
        let issuer = issuer();
        // Issued 25 hours ago: past the 24 hour validity
        let issued_at = Utc::now() - Duration::hours(25);
        let claim = SessionIssuer::claim_for(&test_user(), issued_at);
        let token = issuer.issue(&claim).unwrap();

        assert!(matches!(issuer.decode(&token), Err(SessionError::Expired)));
    }

    #[test]
    fn test_refresh_young_token_unchanged() {
        let issuer = issuer();
        let now = Utc::now();
        let token = issuer
            .issue(&SessionIssuer::claim_for(&test_user(), now))
            .unwrap();

        // Under the 6 hour threshold: no re-issue
        let refreshed = issuer.refresh(&token, now + Duration::hours(5)).unwrap();
        assert!(refreshed.is_none());
    }

    #[test]
    fn test_refresh_stale_token_reissued() {
        let issuer = issuer();
        let issued_at = Utc::now() - Duration::hours(7);
        let claim = SessionIssuer::claim_for(&test_user(), issued_at);
        let token = issuer.issue(&claim).unwrap();

        let now = Utc::now();
        let renewed = issuer.refresh(&token, now).unwrap().expect("re-issued");
        let decoded = issuer.decode(&renewed).unwrap();

        // Identity carries over; the clock fields move forward
        assert_eq!(decoded.sub, claim.sub);
        assert_eq!(decoded.email, claim.email);
        assert_eq!(decoded.telephone, claim.telephone);
        assert_eq!(decoded.iat, now.timestamp());
        assert_eq!(decoded.exp - decoded.iat, SESSION_TTL.num_seconds());
    }

    #[test]
    fn test_refresh_expired_token_fails() {
        let issuer = issuer();
        let issued_at = Utc::now() - Duration::hours(25);
        let token = issuer
            .issue(&SessionIssuer::claim_for(&test_user(), issued_at))
            .unwrap();

        assert!(matches!(
            issuer.refresh(&token, Utc::now()),
            Err(SessionError::Expired)
        ));
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stateless session tokens (HS256 JWT).
//!
//! A token binds the verified address to an expiry 24 hours after issuance.
//! Verification needs only the signing secret; nothing is stored server-side,
//! so tokens survive a restart while pending challenges do not.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::{AuthError, AuthenticatedUser};
use crate::clock::Clock;
use crate::identity::Identity;

/// Session lifetime.
pub const SESSION_TTL: Duration = Duration::hours(24);

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Normalized wallet address
    pub address: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
    /// Token ID
    pub jti: String,
}

/// Mints and verifies session tokens.
pub struct SessionTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    clock: Arc<dyn Clock>,
}

impl SessionTokenIssuer {
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            clock,
        }
    }

    /// Mint a token for a verified identity.
    ///
    /// `iat` is the issuing instant rounded up to the whole second, so a
    /// session never ends before a full `SESSION_TTL` has elapsed.
    pub fn issue(&self, identity: &Identity) -> Result<String, AuthError> {
        let now = self.clock.now();
        let issued_at = now.timestamp() + i64::from(now.timestamp_subsec_nanos() > 0);
        let claims = SessionClaims {
            address: identity.as_str().to_string(),
            iat: issued_at,
            exp: issued_at + SESSION_TTL.num_seconds(),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(format!("token encoding failed: {e}")))
    }

    /// Verify a token and return the identity it was issued to.
    ///
    /// The token is valid while `now < exp`; there is no clock-skew leeway.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against the injected clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        let claims = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|_| AuthError::TokenInvalid)?
            .claims;

        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::TokenInvalid)?;
        if self.clock.now() >= expires_at {
            return Err(AuthError::TokenExpired);
        }

        let address = Identity::parse(&claims.address).map_err(|_| AuthError::TokenInvalid)?;

        Ok(AuthenticatedUser {
            address,
            expires_at: claims.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use chrono::{TimeZone, Utc};

    const ADDRESS: &str = "0x00000000000000000000000000000000000000aa";

    fn issuer_with_clock() -> (SessionTokenIssuer, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        ));
        (SessionTokenIssuer::new(b"test-secret", clock.clone()), clock)
    }

    #[test]
    fn issued_token_verifies() {
        let (issuer, clock) = issuer_with_clock();
        let identity = Identity::parse(ADDRESS).unwrap();

        let token = issuer.issue(&identity).unwrap();
        let user = issuer.verify(&token).unwrap();

        assert_eq!(user.address, identity);
        assert_eq!(user.expires_at, (clock.now() + SESSION_TTL).timestamp());
    }

    #[test]
    fn token_is_accepted_until_just_before_expiry() {
        let (issuer, clock) = issuer_with_clock();
        let token = issuer.issue(&Identity::parse(ADDRESS).unwrap()).unwrap();

        clock.advance(SESSION_TTL - Duration::seconds(1));
        assert!(issuer.verify(&token).is_ok());

        clock.advance(Duration::seconds(1));
        assert!(matches!(issuer.verify(&token), Err(AuthError::TokenExpired)));

        clock.advance(Duration::days(30));
        assert!(matches!(issuer.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn sub_second_issue_time_never_shortens_the_session() {
        let (issuer, clock) = issuer_with_clock();
        let issued = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::milliseconds(900);
        clock.set(issued);
        let token = issuer.issue(&Identity::parse(ADDRESS).unwrap()).unwrap();

        clock.set(issued + SESSION_TTL - Duration::milliseconds(500));
        let user = issuer.verify(&token).unwrap();
        let expires_at = DateTime::from_timestamp(user.expires_at, 0).unwrap();
        assert!(expires_at >= issued + SESSION_TTL);

        clock.set(expires_at - Duration::milliseconds(1));
        assert!(issuer.verify(&token).is_ok());

        clock.set(expires_at);
        assert!(matches!(issuer.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let (issuer, clock) = issuer_with_clock();
        let other = SessionTokenIssuer::new(b"another-secret", clock);
        let token = other.issue(&Identity::parse(ADDRESS).unwrap()).unwrap();

        assert!(matches!(issuer.verify(&token), Err(AuthError::TokenInvalid)));
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let (issuer, _clock) = issuer_with_clock();
        let token = issuer.issue(&Identity::parse(ADDRESS).unwrap()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let forged_claims = r#"{"address":"0x00000000000000000000000000000000000000bb","iat":0,"exp":9999999999,"jti":"x"}"#;
        let forged = format!(
            "{}.{}.{}",
            parts[0],
            URL_SAFE_NO_PAD.encode(forged_claims.as_bytes()),
            parts[2]
        );

        assert!(matches!(issuer.verify(&forged), Err(AuthError::TokenInvalid)));
    }

    #[test]
    fn garbage_is_invalid() {
        let (issuer, _clock) = issuer_with_clock();
        assert!(matches!(issuer.verify(""), Err(AuthError::TokenInvalid)));
        assert!(matches!(issuer.verify("a.b.c"), Err(AuthError::TokenInvalid)));
    }

    #[test]
    fn tokens_carry_unique_ids() {
        let (issuer, _clock) = issuer_with_clock();
        let identity = Identity::parse(ADDRESS).unwrap();
        assert_ne!(issuer.issue(&identity).unwrap(), issuer.issue(&identity).unwrap());
    }
}

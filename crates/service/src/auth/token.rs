//! HS256 bearer tokens carrying the user id.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::errors::AuthError;

/// Tokens expire 24h after issuance.
pub const TOKEN_TTL_SECS: i64 = 86_400;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub id: i32,
    pub iat: usize,
    pub exp: usize,
}

pub fn issue(secret: &str, id: i32) -> Result<String, AuthError> {
    issue_at(secret, id, Utc::now())
}

/// Sign a token as if issued at `now`.
pub fn issue_at(secret: &str, id: i32, now: DateTime<Utc>) -> Result<String, AuthError> {
    let exp = now + Duration::seconds(TOKEN_TTL_SECS);
    let claims = Claims { id, iat: now.timestamp() as usize, exp: exp.timestamp() as usize };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::Configuration(format!("unable to sign token: {e}")))
}

/// Verify signature and expiry, returning the claims. Expiry is exact: no
/// clock leeway past `exp`.
pub fn verify(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::TokenInvalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-12345";

    #[test]
    fn issue_then_verify_returns_same_id() {
        let token = issue(SECRET, 42).unwrap();
        let claims = verify(SECRET, &token).unwrap();
        assert_eq!(claims.id, 42);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS as usize);
    }

    #[test]
    fn different_secret_is_rejected() {
        let token = issue("secret1", 1).unwrap();
        assert!(matches!(verify("secret2", &token), Err(AuthError::TokenInvalid(_))));
    }

    #[test]
    fn token_just_past_ttl_is_rejected() {
        let issued = Utc::now() - Duration::seconds(TOKEN_TTL_SECS + 1);
        let token = issue_at(SECRET, 7, issued).unwrap();
        assert!(matches!(verify(SECRET, &token), Err(AuthError::TokenInvalid(_))));
    }

    #[test]
    fn token_within_leeway_window_is_rejected() {
        let issued = Utc::now() - Duration::seconds(TOKEN_TTL_SECS + 30);
        let token = issue_at(SECRET, 7, issued).unwrap();
        assert!(verify(SECRET, &token).is_err());
    }

    #[test]
    fn token_just_before_ttl_is_valid() {
        let issued = Utc::now() - Duration::seconds(TOKEN_TTL_SECS - 5);
        let token = issue_at(SECRET, 9, issued).unwrap();
        assert_eq!(verify(SECRET, &token).unwrap().id, 9);
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert!(matches!(verify(SECRET, "invalid.token.here"), Err(AuthError::TokenInvalid(_))));
        assert!(matches!(verify(SECRET, ""), Err(AuthError::TokenInvalid(_))));
    }
}

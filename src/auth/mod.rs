use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::types::Role;

pub mod password;

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i64, username: impl Into<String>, role: Role, lifetime: Duration) -> Self {
        let now = Utc::now();

        Self {
            user_id,
            username: username.into(),
            role,
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT secret is not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    Generation(String),

    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Signs and verifies HS256 session tokens
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, lifetime: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime,
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, TokenError> {
        Self::new(&security.jwt_secret, Duration::hours(security.jwt_expiry_hours as i64))
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token for the given principal using the configured lifetime
    pub fn issue(&self, user_id: i64, username: &str, role: Role) -> Result<String, TokenError> {
        self.encode(&Claims::new(user_id, username, role, self.lifetime))
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Verify signature and expiry, returning the claims
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new("test-secret", Duration::hours(1)).unwrap()
    }

    #[test]
    fn issued_token_decodes_to_same_principal() {
        let codec = codec();
        let token = codec.issue(3, "chef", Role::User).unwrap();
        let claims = codec.decode(&token).unwrap();
        assert_eq!(claims.user_id, 3);
        assert_eq!(claims.username, "chef");
        assert_eq!(claims.role, Role::User);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(
            TokenCodec::new("", Duration::hours(1)),
            Err(TokenError::InvalidSecret)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec();
        let claims = Claims::new(1, "admin", Role::Admin, Duration::hours(-2));
        let token = codec.encode(&claims).unwrap();
        assert!(matches!(codec.decode(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = TokenCodec::new("another-secret", Duration::hours(1)).unwrap();
        let token = other.issue(1, "admin", Role::Admin).unwrap();
        assert!(matches!(codec().decode(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let codec = codec();
        let token = codec.issue(1, "staff", Role::User).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = codec.issue(1, "staff", Role::Admin).unwrap();
        let forged_payload = forged.split('.').nth(1).unwrap().to_string();
        parts[1] = &forged_payload;
        let tampered = parts.join(".");
        assert!(codec.decode(&tampered).is_err());
    }
}

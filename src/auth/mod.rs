use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;

/// Claims of the login token. Issuer and audience are both the configured issuer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(email: &str, issuer: &str, issued_at: DateTime<Utc>, expiry_hours: u64) -> Self {
        let exp = issued_at + Duration::hours(expiry_hours as i64);

        Self {
            sub: email.to_string(),
            iss: issuer.to_string(),
            aud: issuer.to_string(),
            exp: exp.timestamp(),
            iat: issued_at.timestamp(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid JWT secret")]
    InvalidSecret,
}

/// Sign `claims` with HS256.
pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    Ok(encode(&Header::default(), claims, &encoding_key)?)
}

/// Issue a login token for `email` with the configured issuer, secret and lifetime.
pub fn generate_jwt(email: &str) -> Result<(String, DateTime<Utc>), JwtError> {
    let security = &config::config().security;
    let claims = Claims::new(email, &security.jwt_issuer, Utc::now(), security.jwt_expiry_hours);
    let token = encode_token(&claims, &security.jwt_secret)?;
    Ok((token, claims.expires_at()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    #[test]
    fn token_round_trips_with_issuer_as_audience() {
        let claims = Claims::new("asha@example.com", "projects-api", Utc::now(), 24);
        let token = encode_token(&claims, "test-secret").unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&["projects-api"]);
        validation.set_audience(&["projects-api"]);
        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &validation,
        )
        .unwrap();

        assert_eq!(decoded.claims, claims);
        assert_eq!(decoded.claims.sub, "asha@example.com");
    }

    #[test]
    fn expiry_follows_configured_hours() {
        let now = Utc::now();
        let claims = Claims::new("a@b.c", "projects-api", now, 24);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(claims.expires_at().timestamp(), claims.exp);
    }

    #[test]
    fn empty_secret_is_rejected() {
        let claims = Claims::new("a@b.c", "projects-api", Utc::now(), 1);
        assert!(matches!(encode_token(&claims, ""), Err(JwtError::InvalidSecret)));
    }
}

use chrono::{DateTime, Utc};
use color_eyre::eyre::{Context, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    pub username: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates HS256 access tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: chrono::Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: std::time::Duration) -> Result<Self> {
        let ttl = chrono::Duration::from_std(ttl).wrap_err("Token lifetime is out of range")?;
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }

    pub fn issue(&self, user: &user::Model) -> AppResult<IssuedToken> {
        self.issue_at(user, Utc::now())
    }

    pub fn issue_at(&self, user: &user::Model, now: DateTime<Utc>) -> AppResult<IssuedToken> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .wrap_err("Failed to sign access token")?;
        Ok(IssuedToken { token, expires_at })
    }

    pub fn validate(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Rejected access token: {e}");
                AppError::unauthorized("Invalid or expired token")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const SECRET: &str = "an-access-token-secret-of-32-bytes!!";

    fn user() -> user::Model {
        let now = Utc::now();
        user::Model {
            id: 7,
            username: "mara".to_string(),
            email: "mara@example.com".to_string(),
            password_hash: String::new(),
            role: UserRole::Admin,
            email_verified: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_issue_and_validate() {
        let service = TokenService::new(SECRET, Duration::from_secs(3600)).unwrap();
        let issued = service.issue(&user()).unwrap();

        let claims = service.validate(&issued.token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "mara");
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        let service = TokenService::new(SECRET, Duration::from_secs(3600)).unwrap();
        let issued = service
            .issue_at(&user(), Utc::now() - chrono::Duration::days(1))
            .unwrap();

        assert!(matches!(
            service.validate(&issued.token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_token_from_other_secret_is_unauthorized() {
        let issuer =
            TokenService::new("another-secret-that-is-32-bytes-long", Duration::from_secs(60))
                .unwrap();
        let service = TokenService::new(SECRET, Duration::from_secs(60)).unwrap();
        let issued = issuer.issue(&user()).unwrap();

        assert!(matches!(
            service.validate(&issued.token),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            service.validate("garbage"),
            Err(AppError::Unauthorized(_))
        ));
    }
}

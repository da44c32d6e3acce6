use crate::domain::DomainError;
use chrono::{DateTime, Duration, Utc};
use forno::ConfigService;
use forno::di::{ImplementationDescriptor, Injectable, Lifetime};
use forno::guard::{GuardError, TokenValidator};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const SECRET_KEY: &str = "JWT_SECRET";
pub const TTL_KEY: &str = "JWT_TTL_MINUTES";

const DEFAULT_TTL_MINUTES: i64 = 60;
const DEVELOPMENT_SECRET: &str = "pizzeria-development-secret";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

/// HS256 token issuer and validator.
pub struct JwtTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtTokens {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Read `JWT_SECRET` and `JWT_TTL_MINUTES`.
    pub fn from_config(config: &ConfigService) -> Self {
        let secret = config.get(SECRET_KEY).unwrap_or_else(|| {
            tracing::warn!("{} is not set, using the development secret", SECRET_KEY);
            DEVELOPMENT_SECRET.to_string()
        });
        let minutes = config
            .get(TTL_KEY)
            .and_then(|value| value.parse::<i64>().ok())
            .filter(|minutes| *minutes > 0)
            .unwrap_or(DEFAULT_TTL_MINUTES);
        Self::new(&secret, Duration::minutes(minutes))
    }

    pub fn issue(&self, username: &str) -> Result<IssuedToken, DomainError> {
        let now = Utc::now();
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp() as usize,
            exp: expires_at.timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| DomainError::Token(e.to_string()))?;

        Ok(IssuedToken {
            token,
            username: username.to_string(),
            expires_at,
        })
    }
}

impl TokenValidator for JwtTokens {
    type Principal = Claims;

    fn validate(&self, token: &str) -> Result<Claims, GuardError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected bearer token");
                GuardError::Unauthorized("Invalid or expired token".to_string())
            })
    }
}

impl Injectable for JwtTokens {
    fn descriptor() -> ImplementationDescriptor {
        ImplementationDescriptor::builder(|injector| {
            let config = injector.resolve::<ConfigService>()?;
            Ok(JwtTokens::from_config(&config))
        })
        .lifetime(Lifetime::Singleton)
        .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_token_validates() {
        let tokens = JwtTokens::new("secret", Duration::minutes(5));
        let issued = tokens.issue("admin").unwrap();

        let claims = tokens.validate(&issued.token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.exp as i64, issued.expires_at.timestamp());
    }

    #[test]
    fn test_foreign_or_expired_tokens_are_unauthorized() {
        let ours = JwtTokens::new("secret", Duration::minutes(5));
        let theirs = JwtTokens::new("other", Duration::minutes(5));
        let foreign = theirs.issue("admin").unwrap().token;
        assert!(matches!(
            ours.validate(&foreign),
            Err(GuardError::Unauthorized(_))
        ));

        let stale = JwtTokens::new("secret", Duration::minutes(-10));
        let expired = stale.issue("admin").unwrap().token;
        assert!(ours.validate(&expired).is_err());
    }

    #[test]
    fn test_ttl_falls_back_on_bad_config() {
        let config = ConfigService::default();
        config.set(TTL_KEY, "soon");
        assert_eq!(JwtTokens::from_config(&config).ttl, Duration::minutes(60));
    }
}

//! JWT issuance and verification with a bounded session cache.
//!
//! Verified claims are cached per token so hot clients skip signature checks;
//! expiry is still enforced on every cache hit.

use crate::error::IdentityError;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ladle_domain::config::{IdentityConfig, JwtConfig};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User record key.
    pub sub: String,
    pub iss: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies the bearer tokens handed out by the token endpoint.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: Option<String>,
    ttl_seconds: u64,
    sessions: Cache<String, Claims>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Builds the service from the identity section of the configuration.
    ///
    /// # Errors
    /// [`IdentityError::Config`] if the signing secret is blank.
    pub fn new(cfg: &IdentityConfig) -> Result<Self, IdentityError> {
        let JwtConfig { secret, issuer, audience, ttl_seconds, clock_skew_seconds } = &cfg.jwt;

        if secret.trim().is_empty() {
            return Err(IdentityError::Config {
                message: "JWT secret must not be empty".into(),
                context: None,
            });
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = *clock_skew_seconds;
        validation.set_issuer(std::slice::from_ref(issuer));
        if let Some(aud) = audience {
            validation.set_audience(std::slice::from_ref(aud));
        } else {
            validation.validate_aud = false;
        }

        let sessions = Cache::builder()
            .max_capacity(cfg.session_cache_capacity)
            .time_to_live(Duration::from_secs((*ttl_seconds).min(3600)))
            .build();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer: issuer.clone(),
            audience: audience.clone(),
            ttl_seconds: *ttl_seconds,
            sessions,
        })
    }

    /// Signs a fresh token for the given user id.
    ///
    /// # Errors
    /// [`IdentityError::Internal`] if encoding fails.
    pub fn issue(&self, user_id: &str) -> Result<String, IdentityError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_owned(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now,
            exp: now + i64::try_from(self.ttl_seconds).unwrap_or(i64::MAX),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            IdentityError::Internal {
                message: e.to_string().into(),
                context: Some("Encoding token".into()),
            }
        })
    }

    /// Verifies a token and returns its claims.
    ///
    /// # Errors
    /// [`IdentityError::Auth`] for any malformed, mis-signed, or expired token.
    pub async fn verify(&self, token: &str) -> Result<Claims, IdentityError> {
        if let Some(claims) = self.sessions.get(token).await {
            // The cache may outlive the token; expiry is checked again here.
            if claims.exp > chrono::Utc::now().timestamp() {
                return Ok(claims);
            }
            self.sessions.invalidate(token).await;
            return Err(IdentityError::Auth { message: "Token expired".into(), context: None });
        }

        let data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                IdentityError::Auth { message: e.to_string().into(), context: None }
            })?;

        self.sessions.insert(token.to_owned(), data.claims.clone()).await;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ladle_domain::config::IdentityConfig;

    fn service() -> TokenService {
        let mut cfg = IdentityConfig::default();
        cfg.jwt.secret = "unit-test-secret".to_owned();
        TokenService::new(&cfg).expect("token service")
    }

    #[tokio::test]
    async fn issued_token_verifies() {
        let tokens = service();
        let token = tokens.issue("h2K9mQ4X7pLw").expect("issue");

        let claims = tokens.verify(&token).await.expect("verify");
        assert_eq!(claims.sub, "h2K9mQ4X7pLw");
        assert_eq!(claims.iss, "ladle");

        // Second verification is served from the session cache.
        let cached = tokens.verify(&token).await.expect("cached verify");
        assert_eq!(cached.sub, "h2K9mQ4X7pLw");
    }

    #[tokio::test]
    async fn garbage_and_foreign_tokens_fail() {
        let tokens = service();

        let err = tokens.verify("not-a-token").await.unwrap_err();
        assert!(matches!(err, IdentityError::Auth { .. }));

        let mut other_cfg = IdentityConfig::default();
        other_cfg.jwt.secret = "a-different-secret".to_owned();
        let other = TokenService::new(&other_cfg).expect("other service");
        let foreign = other.issue("h2K9mQ4X7pLw").expect("issue");

        let err = tokens.verify(&foreign).await.unwrap_err();
        assert!(matches!(err, IdentityError::Auth { .. }));
    }

    #[test]
    fn empty_secret_is_rejected() {
        let mut cfg = IdentityConfig::default();
        cfg.jwt.secret = "  ".to_owned();
        let err = TokenService::new(&cfg).unwrap_err();
        assert!(matches!(err, IdentityError::Config { .. }));
    }
}

//! HS256 JWT session validator.
//!
//! Tokens carry the caller's id in `sub` and their workspace role in `role`.
//! The legacy role string `prof` is accepted as `supervisor`.

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::foundation::{Actor, AuthError, Role, UserId};
use crate::ports::SessionValidator;

/// Claims this service reads from (and writes to) a token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Validates HS256-signed bearer tokens.
pub struct JwtSessionValidator {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    validation: Validation,
    issuer: Option<String>,
}

impl JwtSessionValidator {
    pub fn new(secret: &SecretString, issuer: Option<String>) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        match &issuer {
            Some(iss) => {
                validation.set_required_spec_claims(&["exp", "sub", "iss"]);
                validation.set_issuer(&[iss.as_str()]);
            }
            None => validation.set_required_spec_claims(&["exp", "sub"]),
        }
        Self {
            decoding_key: DecodingKey::from_secret(bytes),
            encoding_key: EncodingKey::from_secret(bytes),
            validation,
            issuer,
        }
    }

    /// Signs a token for `actor` valid for `ttl`. Used by tooling and tests.
    pub fn issue_token(&self, actor: &Actor, ttl: Duration) -> Result<String, AuthError> {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: actor.id.to_string(),
            role: actor.role.to_string(),
            exp: Utc::now().timestamp().saturating_add(ttl_secs),
            iss: self.issuer.clone(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::service_unavailable(format!("Failed to sign token: {}", e)))
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<Actor, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => {
                    tracing::debug!(error = %e, "rejected bearer token");
                    AuthError::InvalidToken
                }
            }
        })?;

        let id = UserId::new(data.claims.sub).map_err(|_| AuthError::InvalidToken)?;
        let role: Role = data
            .claims
            .role
            .parse()
            .map_err(|_| AuthError::UnknownRole(data.claims.role.clone()))?;
        Ok(Actor::new(id, role))
    }
}

//! Stateless bearer sessions.
//!
//! Tokens are HS256 JWTs carrying a verbatim copy of the identity at issuance
//! time. Nothing is stored server-side: validity is recomputed from the
//! signature and `exp` on every presentation, so there is no revocation.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::principal::Identity;

/// Issuer stamped into every token and required on verification.
pub const ISSUER: &str = "auth-api";

/// Session lifetime; `exp` is always `iat` plus this.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

pub type SessionToken = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub id: u64,
    pub nik: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    /// Malformed, forged, expired or foreign tokens all collapse into this one
    /// outcome; callers cannot tell which check failed.
    #[error("invalid token")]
    Invalid,
    #[error("token signing failed: {0}")]
    Signing(String),
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").field("issuer", &ISSUER).field("key", &"<redacted>").finish()
    }
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in verify_at against an explicit clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn issue(&self, identity: &Identity) -> Result<SessionToken, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<SessionToken, TokenError> {
        let iat = now.timestamp();
        let claims = Claims {
            id: identity.id,
            nik: identity.nik.clone(),
            role: identity.role.clone(),
            iat,
            exp: iat + TOKEN_TTL_SECS,
            iss: ISSUER.to_string(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature, issuer and expiry as of `now`. A token is valid up to
    /// and including its `exp` second.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(target: "authgate::session", "token rejected: {e}");
            TokenError::Invalid
        })?;
        let claims = data.claims;
        if now.timestamp() > claims.exp {
            tracing::debug!(target: "authgate::session", exp = claims.exp, "token rejected: expired");
            return Err(TokenError::Invalid);
        }
        Ok(claims)
    }
}

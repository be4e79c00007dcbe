// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with a single process-wide key. The payload
//! is whatever claims the caller supplies plus an `exp` field set to issuance
//! time + TTL. There is no server-side session table: a token is valid until
//! it expires.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};

/// Claims carried by a token.
pub type Claims = Map<String, Value>;

/// Name of the expiry claim added by the issuer.
pub const EXP_CLAIM: &str = "exp";

/// Token verification failure.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// `exp` lies in the past.
    #[error("token has expired")]
    Expired,

    /// Signature mismatch or malformed payload.
    #[error("token is invalid")]
    Invalid,

    /// The claims could not be signed.
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Signing configuration, injected at startup.
#[derive(Clone)]
pub struct TokenConfig {
    signing_key: String,
    ttl: Duration,
}

impl TokenConfig {
    pub fn new(signing_key: impl Into<String>, ttl: Duration) -> Self {
        Self {
            signing_key: signing_key.into(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("signing_key", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Creates signed, time-bound tokens.
pub struct TokenIssuer {
    key: EncodingKey,
    ttl: chrono::Duration,
}

impl TokenIssuer {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            key: EncodingKey::from_secret(config.signing_key.as_bytes()),
            ttl: chrono::Duration::from_std(config.ttl)
                .unwrap_or_else(|_| chrono::Duration::hours(12)),
        }
    }

    /// Sign `claims` with an expiry of now + TTL.
    pub fn issue(&self, claims: Claims) -> Result<String, TokenError> {
        self.issue_at(claims, Utc::now())
    }

    /// Sign `claims` as if issued at `issued_at`.
    pub fn issue_at(&self, mut claims: Claims, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let exp = (issued_at + self.ttl).timestamp();
        claims.insert(EXP_CLAIM.to_string(), Value::from(exp));

        encode(&Header::new(Algorithm::HS256), &claims, &self.key).map_err(TokenError::Signing)
    }
}

/// Validates tokens produced by [`TokenIssuer`] with the same key.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Exact-time expiry comparison.
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&[EXP_CLAIM]);

        Self {
            key: DecodingKey::from_secret(config.signing_key.as_bytes()),
            validation,
        }
    }

    /// Verify signature then expiry, returning the claims (including `exp`).
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

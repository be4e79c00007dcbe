// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request-scoped identity of the logged-in employee.

use serde_json::Value;

use super::token::{Claims, TokenError};

pub const ID_CLAIM: &str = "id";
pub const USERNAME_CLAIM: &str = "username";

/// Authenticated employee making a request.
///
/// Built by the auth gate from verified token claims and stored in the
/// request extensions. It lives only as long as the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: u64,
    pub username: String,
}

impl Principal {
    pub fn new(id: u64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }

    /// Claims to embed in a freshly issued token.
    pub fn to_claims(&self) -> Claims {
        let mut claims = Claims::new();
        claims.insert(ID_CLAIM.to_string(), Value::from(self.id));
        claims.insert(USERNAME_CLAIM.to_string(), Value::from(self.username.clone()));
        claims
    }

    /// Read the identity back out of verified claims.
    ///
    /// A token without a numeric `id` is treated as invalid.
    pub fn from_claims(claims: &Claims) -> Result<Self, TokenError> {
        let id = claims
            .get(ID_CLAIM)
            .and_then(Value::as_u64)
            .ok_or(TokenError::Invalid)?;
        let username = claims
            .get(USERNAME_CLAIM)
            .and_then(Value::as_str)
            .unwrap_or_default();

        Ok(Self::new(id, username))
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware applied to every route.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/depts", get(list_depts))
//!     .layer(axum::middleware::from_fn_with_state(gate, auth_gate));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{AuthError, Principal, TokenVerifier};
use crate::error::ApiError;

/// Header carrying the login token.
pub const TOKEN_HEADER: &str = "token";

/// State for [`auth_gate`].
#[derive(Clone)]
pub struct AuthGate {
    pub verifier: Arc<TokenVerifier>,
    /// Path substrings that skip authentication.
    pub allow_list: Arc<Vec<String>>,
}

impl AuthGate {
    pub fn new(verifier: Arc<TokenVerifier>, allow_list: Vec<String>) -> Self {
        Self {
            verifier,
            allow_list: Arc::new(allow_list),
        }
    }

    pub fn is_allowed(&self, path: &str) -> bool {
        self.allow_list
            .iter()
            .any(|pattern| path.contains(pattern.as_str()))
    }

    /// Resolve the principal for a `token` header value.
    pub fn authenticate(&self, token: Option<&str>) -> Result<Principal, AuthError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = self.verifier.verify(token)?;
        Ok(Principal::from_claims(&claims)?)
    }
}

/// Authentication middleware function.
///
/// Allow-listed paths are forwarded untouched. Everything else needs a valid
/// `token` header; the resolved [`Principal`] is added to the request
/// extensions for handlers and later middleware.
pub async fn auth_gate(State(gate): State<AuthGate>, mut request: Request, next: Next) -> Response {
    if gate.is_allowed(request.uri().path()) {
        return next.run(request).await;
    }

    let token = request
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    match gate.authenticate(token) {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

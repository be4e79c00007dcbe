// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::token::TokenError;
use crate::envelope::Envelope;

pub const NOT_LOGGED_IN_MSG: &str = "未登录";
pub const LOGIN_EXPIRED_MSG: &str = "登录已过期";

/// Rejection produced by the auth gate.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No `token` header, or an empty one.
    #[error("token header is missing")]
    MissingToken,

    /// The token failed verification.
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl AuthError {
    /// Message shown to the client.
    pub fn client_message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => NOT_LOGGED_IN_MSG,
            AuthError::Token(_) => LOGIN_EXPIRED_MSG,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(Envelope::<()>::error(self.client_message()));
        (status, body).into_response()
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! API error type and the normalizer that renders it.
//!
//! Every failure leaving a handler is converted into [`ApiError`]. Its
//! [`IntoResponse`] impl is the single place faults are logged and turned
//! into a response, checked in this order:
//!
//! 1. Unique key conflict: `{code:0, msg:"数据已存在：<value>"}`, HTTP 200
//! 2. Business rule: `{code:0, msg:<message>}`, HTTP 200
//! 3. Framework rejection: axum's own status and body
//! 4. Anything else: `{code:0, msg:"程序出错啦，请联系管理员~"}`, HTTP 500
//!
//! Unauthenticated requests get a 401 envelope from the auth gate.

use std::any::Any;

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::auth::AuthError;
use crate::envelope::Envelope;
use crate::service::ServiceError;
use crate::storage::StoreError;

pub const DUPLICATE_MSG: &str = "数据已存在";
pub const GENERIC_FAULT_MSG: &str = "程序出错啦，请联系管理员~";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Unauthenticated(#[from] AuthError),

    /// Store message of a unique key conflict.
    #[error("{0}")]
    DuplicateKey(String),

    #[error("{0}")]
    Business(String),

    /// Extractor rejection, answered with axum's default response.
    #[error("request rejected with {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("{0}")]
    Unclassified(String),
}

impl ApiError {
    pub fn unclassified(detail: impl Into<String>) -> Self {
        ApiError::Unclassified(detail.into())
    }
}

/// Extract the conflicting value from
/// `Duplicate entry '<value>' for key '<key>'`.
pub fn parse_duplicate(message: &str) -> Option<&str> {
    const PREFIX: &str = "Duplicate entry '";
    const INFIX: &str = "' for key '";

    let start = message.find(PREFIX)? + PREFIX.len();
    let rest = &message[start..];
    let end = rest.find(INFIX)?;
    let key = &rest[end + INFIX.len()..];

    let value = &rest[..end];
    match key.find('\'') {
        Some(key_end) if key_end > 0 && !value.is_empty() => Some(value),
        _ => None,
    }
}

/// Client message for a duplicate key fault.
pub fn duplicate_message(message: &str) -> String {
    match parse_duplicate(message) {
        Some(value) => format!("{DUPLICATE_MSG}：{value}"),
        None => DUPLICATE_MSG.to_string(),
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { .. } => ApiError::DuplicateKey(err.to_string()),
            other => ApiError::Unclassified(other.to_string()),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Business(message) => ApiError::Business(message),
            ServiceError::Store(store) => store.into(),
            ServiceError::Token(token) => ApiError::Unclassified(token.to_string()),
        }
    }
}

macro_rules! impl_from_rejection {
    ($($rejection:ty),* $(,)?) => {
        $(
            impl From<$rejection> for ApiError {
                fn from(rejection: $rejection) -> Self {
                    ApiError::Rejected {
                        status: rejection.status(),
                        body: rejection.body_text(),
                    }
                }
            }
        )*
    };
}

impl_from_rejection!(JsonRejection, QueryRejection, PathRejection, MultipartRejection, MultipartError);

/// Response extension set on every response rendered from an [`ApiError`].
///
/// The operation log skips responses carrying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailedOperation;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = self.render();
        response.extensions_mut().insert(FailedOperation);
        response
    }
}

impl ApiError {
    fn render(self) -> Response {
        match self {
            ApiError::Unauthenticated(err) => {
                tracing::info!(reason = %err, "Rejected unauthenticated request");
                err.into_response()
            }
            ApiError::DuplicateKey(message) => {
                tracing::error!(error = %message, "Unique key conflict");
                Envelope::<()>::error(duplicate_message(&message)).into_response()
            }
            ApiError::Business(message) => {
                tracing::error!(message = %message, "Business rule violated");
                Envelope::<()>::error(message).into_response()
            }
            ApiError::Rejected { status, body } => {
                tracing::warn!(%status, body = %body, "Request rejected by extractor");
                (status, body).into_response()
            }
            ApiError::Unclassified(detail) => {
                tracing::error!(error = %detail, "Unhandled fault");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(Envelope::<()>::error(GENERIC_FAULT_MSG)),
                )
                    .into_response()
            }
        }
    }
}

/// Response for a panic caught in a handler.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    ApiError::Unclassified(format!("handler panicked: {detail}")).into_response()
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Uniform `{code, msg, data}` response wrapper.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

pub const SUCCESS_CODE: u8 = 1;
pub const ERROR_CODE: u8 = 0;
pub const SUCCESS_MSG: &str = "success";

/// Body of every API response.
///
/// `code` is `1` on success and `0` on failure. `data` is always present and
/// serializes as `null` when empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: u8,
    pub msg: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            msg: SUCCESS_MSG.to_string(),
            data: Some(data),
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            code: ERROR_CODE,
            msg: msg.into(),
            data: None,
        }
    }
}

impl Envelope<()> {
    /// Success without a payload.
    pub fn ok() -> Self {
        Self {
            code: SUCCESS_CODE,
            msg: SUCCESS_MSG.to_string(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

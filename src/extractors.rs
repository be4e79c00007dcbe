// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Extractors whose rejections flow through [`ApiError`].
//!
//! They behave like axum's `Json`, `Query` and `Path` but convert the
//! rejection so it is logged by the normalizer before the default response
//! goes out.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);

/// Parse a comma separated id list such as `1,2,3`. Empty items are skipped.
pub fn parse_ids(raw: &str) -> Result<Vec<u64>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .map_err(|e| ApiError::unclassified(format!("invalid id {s:?}: {e}")))
        })
        .collect()
}

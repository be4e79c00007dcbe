// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Operation log middleware for mutating routes.
//!
//! Attached with `route_layer` so it runs after routing and after the auth
//! gate. For every non-GET call that completes it records who called, the
//! request parameters, the response body and the time the handler took.
//! Calls answered by the error normalizer (marked with [`FailedOperation`])
//! are not recorded. Recording is best-effort: a failure is logged and the
//! response goes out unchanged.
//!
//! ```rust,ignore
//! Router::new()
//!     .route("/depts", post(add_dept))
//!     .route_layer(from_fn_with_state(OperationScope::new(state, "depts"), record_operation))
//! ```

use std::collections::HashMap;
use std::time::Instant;

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{FromRequestParts, Query, RawPathParams, Request, State},
    http::{request::Parts, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};

use crate::auth::Principal;
use crate::error::{ApiError, FailedOperation};
use crate::service::{OperateLogService, OperationRecord};
use crate::state::AppState;

/// State for [`record_operation`]: where to write and what to call the
/// resource in the log.
#[derive(Clone)]
pub struct OperationScope {
    pub state: AppState,
    pub class_name: &'static str,
}

impl OperationScope {
    pub fn new(state: AppState, class_name: &'static str) -> Self {
        Self { state, class_name }
    }
}

pub async fn record_operation(
    State(scope): State<OperationScope>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    if method == Method::GET || method == Method::HEAD {
        return next.run(request).await;
    }

    let operator = request.extensions().get::<Principal>().map(|p| p.id);
    let (mut parts, body) = request.into_parts();

    let body_bytes = match to_bytes(body, scope.state.config.max_upload_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return ApiError::Rejected {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                body: format!("Failed to buffer the request body: {e}"),
            }
            .into_response()
        }
    };
    let params = describe_params(&mut parts, &body_bytes).await;

    let started = Instant::now();
    let response = next.run(Request::from_parts(parts, Body::from(body_bytes))).await;
    let cost_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);

    if response.extensions().get::<FailedOperation>().is_some() {
        return response;
    }

    let (response_parts, response_body) = response.into_parts();
    let response_bytes = match to_bytes(response_body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "Failed to buffer response for operation log");
            Bytes::new()
        }
    };

    let record = OperationRecord::new(scope.class_name, method.as_str())
        .by(operator)
        .with_params(&params)
        .with_return(&String::from_utf8_lossy(&response_bytes))
        .with_cost_ms(cost_ms);

    match OperateLogService::new(&scope.state.store).record(record) {
        Ok(log) => tracing::info!(
            class_name = %log.class_name,
            method = %log.method_name,
            cost_ms = log.cost_time,
            "Recorded operation"
        ),
        Err(e) => tracing::error!(error = %e, "Failed to record operation log"),
    }

    Response::from_parts(response_parts, Body::from(response_bytes))
}

/// The request body if there is one, otherwise path and query parameters
/// as a JSON object.
async fn describe_params(parts: &mut Parts, body: &Bytes) -> String {
    if !body.is_empty() {
        return String::from_utf8_lossy(body).into_owned();
    }

    let mut params = Map::new();
    if let Ok(path) = RawPathParams::from_request_parts(parts, &()).await {
        for (key, value) in &path {
            params.insert(key.to_string(), Value::from(value));
        }
    }
    if let Ok(Query(query)) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri) {
        for (key, value) in query {
            params.insert(key, Value::from(value));
        }
    }
    Value::Object(params).to_string()
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::extract::State;

use crate::{
    envelope::Envelope,
    error::ApiError,
    extractors::AppJson,
    models::{LoginInfo, LoginRequest},
    service::EmpService,
    state::AppState,
};

pub const LOGIN_FAILED_MSG: &str = "用户名或密码错误";

/// Exchange a username and password for a token.
///
/// Bad credentials are not an HTTP error: the envelope carries `code: 0` and
/// the failure message.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses((status = 200, description = "Envelope with the signed-in employee and token", body = LoginInfo))
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Envelope<LoginInfo>, ApiError> {
    let service = EmpService::new(&state.store);
    match service.login(&request.username, &request.password, &state.issuer)? {
        Some(info) => {
            tracing::info!(emp_id = info.id, username = %info.username, "Employee signed in");
            Ok(Envelope::success(info))
        }
        None => {
            tracing::info!(username = %request.username, "Sign-in refused");
            Ok(Envelope::error(LOGIN_FAILED_MSG))
        }
    }
}

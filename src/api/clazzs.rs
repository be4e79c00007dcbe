// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::get,
    Router,
};

use crate::{
    envelope::Envelope,
    error::ApiError,
    extractors::{AppJson, AppPath, AppQuery},
    models::{Clazz, ClazzPayload, ClazzQuery, ClazzRow, PageResult},
    service::ClazzService,
    state::AppState,
};

use super::oplog::{record_operation, OperationScope};

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/clazzs",
            get(page_clazzs).post(save_clazz).put(update_clazz),
        )
        .route("/clazzs/list", get(list_clazzs))
        .route("/clazzs/{id}", get(get_clazz).delete(delete_clazz))
        .route_layer(from_fn_with_state(
            OperationScope::new(state, "clazzs"),
            record_operation,
        ))
}

/// Page of classes with head teacher name and status relative to today.
#[utoipa::path(
    get,
    path = "/clazzs",
    params(ClazzQuery),
    tag = "Clazzs",
    responses((status = 200, body = PageResult<ClazzRow>))
)]
pub async fn page_clazzs(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ClazzQuery>,
) -> Result<Envelope<PageResult<ClazzRow>>, ApiError> {
    Ok(Envelope::success(ClazzService::new(&state.store).page(&query)?))
}

#[utoipa::path(
    get,
    path = "/clazzs/list",
    tag = "Clazzs",
    responses((status = 200, body = [Clazz]))
)]
pub async fn list_clazzs(State(state): State<AppState>) -> Result<Envelope<Vec<Clazz>>, ApiError> {
    Ok(Envelope::success(ClazzService::new(&state.store).list()?))
}

#[utoipa::path(
    get,
    path = "/clazzs/{id}",
    params(("id" = u64, Path, description = "Class id")),
    tag = "Clazzs",
    responses((status = 200, body = Clazz))
)]
pub async fn get_clazz(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
) -> Result<Envelope<Clazz>, ApiError> {
    Ok(Envelope::success(ClazzService::new(&state.store).get(id)?))
}

#[utoipa::path(
    post,
    path = "/clazzs",
    request_body = ClazzPayload,
    tag = "Clazzs",
    responses((status = 200, description = "Empty success envelope"))
)]
pub async fn save_clazz(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ClazzPayload>,
) -> Result<Envelope<()>, ApiError> {
    let clazz = ClazzService::new(&state.store).save(payload)?;
    tracing::info!(clazz_id = clazz.id, name = %clazz.name, "Class created");
    Ok(Envelope::ok())
}

#[utoipa::path(
    put,
    path = "/clazzs",
    request_body = ClazzPayload,
    tag = "Clazzs",
    responses((status = 200, description = "Empty success envelope"))
)]
pub async fn update_clazz(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ClazzPayload>,
) -> Result<Envelope<()>, ApiError> {
    let clazz = ClazzService::new(&state.store).update(payload)?;
    tracing::info!(clazz_id = clazz.id, "Class updated");
    Ok(Envelope::ok())
}

#[utoipa::path(
    delete,
    path = "/clazzs/{id}",
    params(("id" = u64, Path, description = "Class id")),
    tag = "Clazzs",
    responses((status = 200, description = "Empty success envelope"))
)]
pub async fn delete_clazz(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
) -> Result<Envelope<()>, ApiError> {
    ClazzService::new(&state.store).delete(id)?;
    tracing::info!(clazz_id = id, "Class deleted");
    Ok(Envelope::ok())
}

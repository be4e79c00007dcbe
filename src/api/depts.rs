// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    envelope::Envelope,
    error::ApiError,
    extractors::{AppJson, AppPath, AppQuery},
    models::{Dept, DeptPayload},
    service::DeptService,
    state::AppState,
};

use super::oplog::{record_operation, OperationScope};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeptIdQuery {
    pub id: u64,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/depts",
            get(list_depts)
                .post(add_dept)
                .put(update_dept)
                .delete(delete_dept),
        )
        .route("/depts/{id}", get(get_dept))
        .route_layer(from_fn_with_state(
            OperationScope::new(state, "depts"),
            record_operation,
        ))
}

#[utoipa::path(
    get,
    path = "/depts",
    tag = "Depts",
    responses((status = 200, description = "All departments, most recently updated first", body = [Dept]))
)]
pub async fn list_depts(State(state): State<AppState>) -> Result<Envelope<Vec<Dept>>, ApiError> {
    Ok(Envelope::success(DeptService::new(&state.store).list()?))
}

#[utoipa::path(
    get,
    path = "/depts/{id}",
    params(("id" = u64, Path, description = "Department id")),
    tag = "Depts",
    responses((status = 200, body = Dept))
)]
pub async fn get_dept(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
) -> Result<Envelope<Dept>, ApiError> {
    Ok(Envelope::success(DeptService::new(&state.store).get(id)?))
}

#[utoipa::path(
    post,
    path = "/depts",
    request_body = DeptPayload,
    tag = "Depts",
    responses((status = 200, description = "Empty success envelope"))
)]
pub async fn add_dept(
    State(state): State<AppState>,
    AppJson(payload): AppJson<DeptPayload>,
) -> Result<Envelope<()>, ApiError> {
    let dept = DeptService::new(&state.store).add(payload)?;
    tracing::info!(dept_id = dept.id, name = %dept.name, "Department added");
    Ok(Envelope::ok())
}

#[utoipa::path(
    put,
    path = "/depts",
    request_body = DeptPayload,
    tag = "Depts",
    responses((status = 200, description = "Empty success envelope"))
)]
pub async fn update_dept(
    State(state): State<AppState>,
    AppJson(payload): AppJson<DeptPayload>,
) -> Result<Envelope<()>, ApiError> {
    let dept = DeptService::new(&state.store).update(payload)?;
    tracing::info!(dept_id = dept.id, "Department updated");
    Ok(Envelope::ok())
}

/// Delete a department. Refused while employees still belong to it.
#[utoipa::path(
    delete,
    path = "/depts",
    params(DeptIdQuery),
    tag = "Depts",
    responses((status = 200, description = "Empty success envelope, or code 0 when employees remain"))
)]
pub async fn delete_dept(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<DeptIdQuery>,
) -> Result<Envelope<()>, ApiError> {
    DeptService::new(&state.store).delete(query.id)?;
    tracing::info!(dept_id = query.id, "Department deleted");
    Ok(Envelope::ok())
}

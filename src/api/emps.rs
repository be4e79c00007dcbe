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
    extractors::{parse_ids, AppJson, AppPath, AppQuery},
    models::{EmpDetail, EmpPayload, EmpQuery, EmpRow, PageResult},
    service::EmpService,
    state::AppState,
};

use super::oplog::{record_operation, OperationScope};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmpIdsQuery {
    /// Comma separated employee ids, e.g. `1,2,3`.
    pub ids: String,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/emps",
            get(page_emps)
                .post(save_emp)
                .put(update_emp)
                .delete(delete_emps),
        )
        .route("/emps/list", get(list_emps))
        .route("/emps/{id}", get(get_emp))
        .route_layer(from_fn_with_state(
            OperationScope::new(state, "emps"),
            record_operation,
        ))
}

#[utoipa::path(
    get,
    path = "/emps",
    params(EmpQuery),
    tag = "Emps",
    responses((status = 200, description = "Page of employees with department names", body = PageResult<EmpRow>))
)]
pub async fn page_emps(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<EmpQuery>,
) -> Result<Envelope<PageResult<EmpRow>>, ApiError> {
    Ok(Envelope::success(EmpService::new(&state.store).page(&query)?))
}

#[utoipa::path(
    get,
    path = "/emps/list",
    tag = "Emps",
    responses((status = 200, body = [EmpRow]))
)]
pub async fn list_emps(State(state): State<AppState>) -> Result<Envelope<Vec<EmpRow>>, ApiError> {
    Ok(Envelope::success(EmpService::new(&state.store).list()?))
}

#[utoipa::path(
    get,
    path = "/emps/{id}",
    params(("id" = u64, Path, description = "Employee id")),
    tag = "Emps",
    responses((status = 200, description = "Employee with work history", body = EmpDetail))
)]
pub async fn get_emp(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
) -> Result<Envelope<EmpDetail>, ApiError> {
    Ok(Envelope::success(EmpService::new(&state.store).get_info(id)?))
}

/// Create an employee with the default password.
#[utoipa::path(
    post,
    path = "/emps",
    request_body = EmpPayload,
    tag = "Emps",
    responses((status = 200, description = "Empty success envelope, or code 0 on a duplicate username or phone"))
)]
pub async fn save_emp(
    State(state): State<AppState>,
    AppJson(payload): AppJson<EmpPayload>,
) -> Result<Envelope<()>, ApiError> {
    EmpService::new(&state.store).save(payload)?;
    Ok(Envelope::ok())
}

#[utoipa::path(
    put,
    path = "/emps",
    request_body = EmpPayload,
    tag = "Emps",
    responses((status = 200, description = "Empty success envelope"))
)]
pub async fn update_emp(
    State(state): State<AppState>,
    AppJson(payload): AppJson<EmpPayload>,
) -> Result<Envelope<()>, ApiError> {
    let emp = EmpService::new(&state.store).update(payload)?;
    tracing::info!(emp_id = emp.id, "Employee updated");
    Ok(Envelope::ok())
}

#[utoipa::path(
    delete,
    path = "/emps",
    params(EmpIdsQuery),
    tag = "Emps",
    responses((status = 200, description = "Empty success envelope"))
)]
pub async fn delete_emps(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<EmpIdsQuery>,
) -> Result<Envelope<()>, ApiError> {
    let ids = parse_ids(&query.ids)?;
    EmpService::new(&state.store).delete(&ids)?;
    tracing::info!(?ids, "Employees deleted");
    Ok(Envelope::ok())
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Dashboard chart data and the operation log viewer.

use axum::extract::State;

use crate::{
    envelope::Envelope,
    error::ApiError,
    extractors::AppQuery,
    models::{ClazzCountReport, JobReport, NameValue, OperateLogRow, PageQuery, PageResult, Paging},
    service::{OperateLogService, ReportService},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/report/empGenderData",
    tag = "Reports",
    responses((status = 200, description = "Employee headcount per gender", body = [NameValue]))
)]
pub async fn emp_gender_data(State(state): State<AppState>) -> Result<Envelope<Vec<NameValue>>, ApiError> {
    Ok(Envelope::success(ReportService::new(&state.store).emp_gender()?))
}

#[utoipa::path(
    get,
    path = "/report/empJobData",
    tag = "Reports",
    responses((status = 200, description = "Employee headcount per job", body = JobReport))
)]
pub async fn emp_job_data(State(state): State<AppState>) -> Result<Envelope<JobReport>, ApiError> {
    Ok(Envelope::success(ReportService::new(&state.store).emp_job()?))
}

#[utoipa::path(
    get,
    path = "/report/studentDegreeData",
    tag = "Reports",
    responses((status = 200, description = "Students per degree", body = [NameValue]))
)]
pub async fn student_degree_data(
    State(state): State<AppState>,
) -> Result<Envelope<Vec<NameValue>>, ApiError> {
    Ok(Envelope::success(ReportService::new(&state.store).student_degree()?))
}

#[utoipa::path(
    get,
    path = "/report/studentCountData",
    tag = "Reports",
    responses((status = 200, description = "Students per class", body = ClazzCountReport))
)]
pub async fn student_count_data(
    State(state): State<AppState>,
) -> Result<Envelope<ClazzCountReport>, ApiError> {
    Ok(Envelope::success(ReportService::new(&state.store).student_count()?))
}

#[utoipa::path(
    get,
    path = "/log/page",
    params(PageQuery),
    tag = "Reports",
    responses((status = 200, description = "Operation log, newest first", body = PageResult<OperateLogRow>))
)]
pub async fn log_page(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Envelope<PageResult<OperateLogRow>>, ApiError> {
    let paging = Paging::new(query.page, query.page_size);
    Ok(Envelope::success(OperateLogService::new(&state.store).page(paging)?))
}

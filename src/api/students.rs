// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::{get, put},
    Router,
};

use crate::{
    envelope::Envelope,
    error::ApiError,
    extractors::{parse_ids, AppJson, AppPath, AppQuery},
    models::{PageResult, Student, StudentPayload, StudentQuery, StudentRow},
    service::StudentService,
    state::AppState,
};

use super::oplog::{record_operation, OperationScope};

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/students",
            get(page_students).post(save_student).put(update_student),
        )
        // GET takes a single id, DELETE a comma separated list.
        .route("/students/{id}", get(get_student).delete(delete_students))
        .route("/students/violation/{id}/{score}", put(record_violation))
        .route_layer(from_fn_with_state(
            OperationScope::new(state, "students"),
            record_operation,
        ))
}

#[utoipa::path(
    get,
    path = "/students",
    params(StudentQuery),
    tag = "Students",
    responses((status = 200, body = PageResult<StudentRow>))
)]
pub async fn page_students(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<StudentQuery>,
) -> Result<Envelope<PageResult<StudentRow>>, ApiError> {
    Ok(Envelope::success(StudentService::new(&state.store).page(&query)?))
}

#[utoipa::path(
    get,
    path = "/students/{id}",
    params(("id" = u64, Path, description = "Student id")),
    tag = "Students",
    responses((status = 200, body = Student))
)]
pub async fn get_student(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
) -> Result<Envelope<Student>, ApiError> {
    Ok(Envelope::success(StudentService::new(&state.store).get(id)?))
}

#[utoipa::path(
    post,
    path = "/students",
    request_body = StudentPayload,
    tag = "Students",
    responses((status = 200, description = "Empty success envelope, or code 0 on a duplicate student number"))
)]
pub async fn save_student(
    State(state): State<AppState>,
    AppJson(payload): AppJson<StudentPayload>,
) -> Result<Envelope<()>, ApiError> {
    let student = StudentService::new(&state.store).save(payload)?;
    tracing::info!(student_id = student.id, no = %student.no, "Student enrolled");
    Ok(Envelope::ok())
}

#[utoipa::path(
    put,
    path = "/students",
    request_body = StudentPayload,
    tag = "Students",
    responses((status = 200, description = "Empty success envelope"))
)]
pub async fn update_student(
    State(state): State<AppState>,
    AppJson(payload): AppJson<StudentPayload>,
) -> Result<Envelope<()>, ApiError> {
    let student = StudentService::new(&state.store).update(payload)?;
    tracing::info!(student_id = student.id, "Student updated");
    Ok(Envelope::ok())
}

#[utoipa::path(
    delete,
    path = "/students/{id}",
    params(("id" = String, Path, description = "Comma separated student ids, e.g. `1,2,3`")),
    tag = "Students",
    responses((status = 200, description = "Empty success envelope"))
)]
pub async fn delete_students(
    State(state): State<AppState>,
    AppPath(raw): AppPath<String>,
) -> Result<Envelope<()>, ApiError> {
    let ids = parse_ids(&raw)?;
    StudentService::new(&state.store).delete(&ids)?;
    tracing::info!(?ids, "Students deleted");
    Ok(Envelope::ok())
}

/// Record one violation: the count goes up by one and `score` is added.
#[utoipa::path(
    put,
    path = "/students/violation/{id}/{score}",
    params(
        ("id" = u64, Path, description = "Student id"),
        ("score" = i32, Path, description = "Points added to the violation score")
    ),
    tag = "Students",
    responses((status = 200, description = "Empty success envelope"))
)]
pub async fn record_violation(
    State(state): State<AppState>,
    AppPath((id, score)): AppPath<(u64, i32)>,
) -> Result<Envelope<()>, ApiError> {
    let student = StudentService::new(&state.store).violation(id, score)?;
    tracing::info!(
        student_id = id,
        count = student.violation_count,
        score = student.violation_score,
        "Violation recorded"
    );
    Ok(Envelope::ok())
}

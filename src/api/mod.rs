// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::auth_gate,
    error::panic_response,
    models::{
        Clazz, ClazzCountReport, ClazzPayload, ClazzRow, ClazzStatus, Dept, DeptPayload, Emp,
        EmpDetail, EmpExpr, EmpExprPayload, EmpPayload, EmpRow, JobReport, LoginInfo,
        LoginRequest, NameValue, OperateLog, OperateLogRow, Student, StudentPayload, StudentRow,
    },
    state::AppState,
};

pub mod clazzs;
pub mod depts;
pub mod emps;
pub mod login;
pub mod oplog;
pub mod reports;
pub mod students;
pub mod upload;

/// Build the complete application: API routes behind the auth gate, static
/// files, the OpenAPI docs and the outer middleware stack.
pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    let api = Router::new()
        .route("/login", post(login::login))
        .merge(depts::routes(state.clone()))
        .merge(emps::routes(state.clone()))
        .merge(clazzs::routes(state.clone()))
        .merge(students::routes(state.clone()))
        .route("/upload", post(upload::upload))
        .route("/report/empGenderData", get(reports::emp_gender_data))
        .route("/report/empJobData", get(reports::emp_job_data))
        .route("/report/studentDegreeData", get(reports::student_degree_data))
        .route("/report/studentCountData", get(reports::student_count_data))
        .route("/log/page", get(reports::log_page))
        .nest_service("/media", ServeDir::new(config.media_dir()))
        .nest_service("/static", ServeDir::new(config.static_dir()))
        .layer(from_fn_with_state(state.auth_gate(), auth_gate))
        .with_state(state);

    Router::new()
        .merge(api)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(CatchPanicLayer::custom(panic_response))
        // Faults are logged by the normalizer, not again as failed responses.
        .layer(TraceLayer::new_for_http().on_failure(()))
        .layer(cors_layer(&config.cors_origins))
}

/// CORS for the configured origins with credentials allowed. Falls back to
/// permissive when no origin parses.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        login::login,
        depts::list_depts,
        depts::get_dept,
        depts::add_dept,
        depts::update_dept,
        depts::delete_dept,
        emps::page_emps,
        emps::list_emps,
        emps::get_emp,
        emps::save_emp,
        emps::update_emp,
        emps::delete_emps,
        clazzs::page_clazzs,
        clazzs::list_clazzs,
        clazzs::get_clazz,
        clazzs::save_clazz,
        clazzs::update_clazz,
        clazzs::delete_clazz,
        students::page_students,
        students::get_student,
        students::save_student,
        students::update_student,
        students::delete_students,
        students::record_violation,
        upload::upload,
        reports::emp_gender_data,
        reports::emp_job_data,
        reports::student_degree_data,
        reports::student_count_data,
        reports::log_page
    ),
    components(
        schemas(
            LoginRequest,
            LoginInfo,
            Dept,
            DeptPayload,
            Emp,
            EmpExpr,
            EmpExprPayload,
            EmpPayload,
            EmpRow,
            EmpDetail,
            Clazz,
            ClazzPayload,
            ClazzRow,
            ClazzStatus,
            Student,
            StudentPayload,
            StudentRow,
            OperateLog,
            OperateLogRow,
            NameValue,
            JobReport,
            ClazzCountReport,
            upload::UploadForm
        )
    ),
    tags(
        (name = "Auth", description = "Sign-in"),
        (name = "Depts", description = "Department management"),
        (name = "Emps", description = "Employee management and work history"),
        (name = "Clazzs", description = "Class management"),
        (name = "Students", description = "Student management and discipline"),
        (name = "Upload", description = "File upload"),
        (name = "Reports", description = "Dashboard charts and operation log")
    )
)]
pub struct ApiDoc;

// src/api/handlers.rs

//! HTTP request handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde_json::{Value, json};

use crate::api::{ApiError, AppState, Manifest};
use crate::models::{CourseRecord, Semester, department_of, normalize_code};

/// Keyword resolving to the active semester.
const CURRENT_SEMESTER: &str = "current";

/// GET / - redirect to the API root.
pub async fn redirect_root() -> impl IntoResponse {
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, "/v1")])
}

/// GET /v1
pub async fn introspection(State(state): State<AppState>) -> Json<Manifest> {
    log::info!("GET /v1");
    Json(state.build_info.manifest())
}

/// GET /healthz
pub async fn health() -> Json<Value> {
    log::info!("GET /healthz");
    Json(json!({ "status": "ok" }))
}

/// GET /v1/semesters/{code|current}
pub async fn get_semester(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Semester>, ApiError> {
    log::info!("GET /v1/semesters/{code}");

    let semester = if code.eq_ignore_ascii_case(CURRENT_SEMESTER) {
        state.resolver.current().await?
    } else {
        Semester::parse(&code)?
    };
    Ok(Json(semester))
}

/// GET /v1/courses/{code}
///
/// A cache miss crawls the course's department before answering.
pub async fn get_course(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<CourseRecord>, ApiError> {
    log::info!("GET /v1/courses/{code}");

    let code = normalize_code(&code);
    let department = department_of(&code)
        .ok_or_else(|| ApiError::bad_request(format!("course code '{code}' is too short")))?;

    if let Some(course) = state.crawler.store().get(&code) {
        return Ok(Json(course));
    }

    state.crawler.crawl_department(&department).await?;

    state
        .crawler
        .store()
        .get(&code)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("course {code} not found")))
}

/// GET /v1/courses
pub async fn list_courses(State(state): State<AppState>) -> Json<Vec<CourseRecord>> {
    log::info!("GET /v1/courses");
    Json(state.crawler.store().list())
}

/// PATCH /v1/courses - recrawl the active semester.
pub async fn refresh_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseRecord>>, ApiError> {
    log::info!("PATCH /v1/courses");

    let semester = state.resolver.current_code().await?;
    state.crawler.set_semester(&semester);
    state.crawler.crawl_all().await;

    Ok(Json(state.crawler.store().list()))
}

//! Request handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use calltrail_core::BlogProperties;
use serde::Deserialize;
use serde_json::json;

use crate::caller::Caller;
use crate::error::AppError;
use crate::state::AppState;
use crate::student::{Student, StudentUpdate};

/// Student number queried when the request does not name one.
const DEFAULT_SNO: &str = "1";

#[derive(Debug, Deserialize)]
pub struct SnoQuery {
    pub sno: Option<String>,
}

pub async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "service": "calltrail-server" }))
}

/// Blog name and title from configuration.
pub async fn index(State(state): State<AppState>) -> String {
    state.config().blog.greeting()
}

/// All bound blog properties.
pub async fn config(State(state): State<AppState>) -> Json<BlogProperties> {
    Json(state.config().blog.clone())
}

pub async fn query_student(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Query(query): Query<SnoQuery>,
) -> Result<Json<Student>, AppError> {
    let sno = query
        .sno
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SNO.to_string());
    let student = state.students().query_by_sno(&caller, &sno).await?;
    Ok(Json(student))
}

pub async fn list_students(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<Vec<Student>>, AppError> {
    Ok(Json(state.students().list_all(&caller).await?))
}

pub async fn add_student(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(student): Json<Student>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let student = state.students().add(&caller, student).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn update_student(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(sno): Path<String>,
    Json(update): Json<StudentUpdate>,
) -> Result<Json<Student>, AppError> {
    Ok(Json(state.students().update(&caller, &sno, update).await?))
}

pub async fn delete_student(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(sno): Path<String>,
) -> Result<StatusCode, AppError> {
    state.students().delete(&caller, &sno).await?;
    Ok(StatusCode::NO_CONTENT)
}

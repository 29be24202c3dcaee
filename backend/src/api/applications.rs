use crate::auth::AuthUser;
use crate::error::AppResult;
use crate::models::{StudentApplication, TeacherApplication};
use crate::repositories::{NewStudentApplication, NewTeacherApplication};
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

pub async fn submit_teacher(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(application): Json<NewTeacherApplication>,
) -> AppResult<(StatusCode, Json<TeacherApplication>)> {
    let row = state
        .applications
        .submit_teacher_application(auth.id(), application)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn submit_student(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(application): Json<NewStudentApplication>,
) -> AppResult<(StatusCode, Json<StudentApplication>)> {
    let row = state
        .applications
        .submit_student_application(auth.id(), application)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

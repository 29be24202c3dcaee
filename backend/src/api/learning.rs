//! Course catalogue and the lesson player

use crate::auth::AuthUser;
use crate::domain::Score;
use crate::error::AppResult;
use crate::models::{
    Course, CourseDetail, CourseProgress, LessonDetail, ProgressSummary, UnitWithLessons,
    UserProgress,
};
use crate::services::ChallengeResult;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectCourseRequest {
    pub course_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct AddPointsRequest {
    pub points: i32,
}

pub async fn list_courses(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Course>>> {
    Ok(Json(state.learning.list_courses().await?))
}

pub async fn course_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<CourseDetail>> {
    Ok(Json(state.learning.course_detail(id).await?))
}

pub async fn progress(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> AppResult<Json<Option<ProgressSummary>>> {
    Ok(Json(state.learning.summary(auth.id()).await?))
}

pub async fn select_active_course(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<SelectCourseRequest>,
) -> AppResult<Json<UserProgress>> {
    Ok(Json(
        state
            .learning
            .select_active_course(&auth.user, req.course_id)
            .await?,
    ))
}

pub async fn units(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> AppResult<Json<Vec<UnitWithLessons>>> {
    Ok(Json(state.learning.units(auth.id()).await?))
}

pub async fn course_progress(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> AppResult<Json<CourseProgress>> {
    Ok(Json(state.learning.course_progress(auth.id()).await?))
}

pub async fn lesson_detail(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LessonDetail>> {
    Ok(Json(state.learning.lesson_detail(auth.id(), id).await?))
}

pub async fn complete_challenge(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ChallengeResult>> {
    Ok(Json(state.learning.complete_challenge(auth.id(), id).await?))
}

pub async fn wrong_answer(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ChallengeResult>> {
    Ok(Json(state.learning.wrong_answer(auth.id(), id).await?))
}

pub async fn refill_hearts(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> AppResult<Json<Score>> {
    Ok(Json(state.learning.refill_hearts(auth.id()).await?))
}

pub async fn add_points(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<AddPointsRequest>,
) -> AppResult<Json<ProgressSummary>> {
    Ok(Json(state.learning.add_points(auth.id(), req.points).await?))
}

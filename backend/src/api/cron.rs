//! Endpoints for an external scheduler, guarded by the cron secret

use crate::auth::verify_cron_secret;
use crate::error::AppResult;
use crate::models::LessonBooking;
use crate::services::DailyResetSummary;
use crate::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub id: i32,
    pub student_id: String,
    pub teacher_id: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

impl From<LessonBooking> for StatusChange {
    fn from(b: LessonBooking) -> Self {
        Self {
            id: b.id,
            student_id: b.student_id,
            teacher_id: b.teacher_id,
            start_time: b.start_time,
            end_time: b.end_time,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonStatusUpdate {
    pub message: String,
    pub confirmed: Vec<StatusChange>,
    pub completed: Vec<StatusChange>,
    pub total: usize,
}

fn authorize(state: &AppState, headers: &HeaderMap) -> AppResult<()> {
    verify_cron_secret(headers, state.config.auth.cron_secret.as_deref())
}

pub async fn reset_streaks(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<DailyResetSummary>> {
    authorize(&state, &headers)?;
    Ok(Json(state.streak.perform_daily_reset(Utc::now()).await?))
}

pub async fn update_lesson_statuses(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<LessonStatusUpdate>> {
    authorize(&state, &headers)?;

    let result = state.tutoring.sweep_statuses(Utc::now().naive_utc()).await?;
    let total = result.total();
    let message = if total == 0 {
        "No lessons to update".to_string()
    } else {
        format!("Updated {} lesson(s)", total)
    };

    Ok(Json(LessonStatusUpdate {
        message,
        confirmed: result.confirmed.into_iter().map(StatusChange::from).collect(),
        completed: result.completed.into_iter().map(StatusChange::from).collect(),
        total,
    }))
}

pub async fn update_school_points(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    authorize(&state, &headers)?;
    let updated = state.schools.recompute_all().await?;
    Ok(Json(json!({ "success": true, "updated": updated })))
}

use crate::auth::AuthUser;
use crate::domain::requirements::{rules as requirement_rules, RequirementRule};
use crate::error::AppResult;
use crate::models::DailyStreakRecord;
use crate::services::StreakOverview;
use crate::AppState;
use axum::extract::{Query, State};
use axum::Json;
use chrono::Datelike;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

pub async fn overview(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> AppResult<Json<StreakOverview>> {
    Ok(Json(state.streak.overview(auth.id()).await?))
}

/// Defaults to the current platform month
pub async fn calendar(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<Vec<DailyStreakRecord>>> {
    let today = state.streak.today();
    let month = query.month.unwrap_or_else(|| today.month());
    let year = query.year.unwrap_or_else(|| today.year());
    Ok(Json(state.streak.calendar(auth.id(), month, year).await?))
}

pub async fn rules() -> Json<Vec<RequirementRule>> {
    Json(requirement_rules())
}

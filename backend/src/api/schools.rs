//! School picker and leaderboards

use crate::auth::AuthUser;
use crate::error::AppResult;
use crate::models::{School, SchoolStanding, SchoolType, UserStanding};
use crate::repositories::SchoolFilter;
use crate::services::UserRank;
use crate::AppState;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct DistrictQuery {
    pub city: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectSchoolRequest {
    pub school_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(rename = "type")]
    pub school_type: Option<SchoolType>,
}

pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<School>>> {
    Ok(Json(state.schools.list().await?))
}

pub async fn cities(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(state.schools.cities().await?))
}

pub async fn districts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DistrictQuery>,
) -> AppResult<Json<Vec<String>>> {
    Ok(Json(state.schools.districts(&query.city).await?))
}

pub async fn filtered(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<SchoolFilter>,
) -> AppResult<Json<Vec<School>>> {
    Ok(Json(state.schools.filtered(&filter).await?))
}

pub async fn select(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<SelectSchoolRequest>,
) -> AppResult<Json<School>> {
    Ok(Json(state.schools.select_school(auth.id(), req.school_id).await?))
}

pub async fn top_users(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
) -> AppResult<Json<Vec<UserStanding>>> {
    Ok(Json(state.schools.top_users().await?))
}

/// Universities unless another level is asked for
pub async fn top_schools(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Query(query): Query<LeaderboardQuery>,
) -> AppResult<Json<Vec<SchoolStanding>>> {
    let school_type = query.school_type.unwrap_or(SchoolType::University);
    Ok(Json(state.schools.top_schools(school_type).await?))
}

pub async fn rank(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> AppResult<Json<UserRank>> {
    Ok(Json(state.schools.user_rank(auth.id()).await?))
}

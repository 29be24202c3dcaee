//! Admin-only review and maintenance endpoints

use crate::auth::AdminUser;
use crate::error::AppResult;
use crate::models::{
    ApplicationStatus, CreditBalance, CreditTransaction, StudentApplication, TeacherApplication,
};
use crate::repositories::FieldGrant;
use crate::services::DailyResetSummary;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct ReviewApplicationRequest {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub fields: Vec<FieldGrant>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantCreditsRequest {
    pub user_id: String,
    pub credits: i32,
    pub total_price: Decimal,
    pub payment_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GrantCreditsResponse {
    pub balance: CreditBalance,
    pub transaction: CreditTransaction,
}

pub async fn teacher_applications(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<TeacherApplication>>> {
    Ok(Json(state.applications.list_teacher_applications().await?))
}

pub async fn review_teacher_application(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i32>,
    Json(req): Json<ReviewApplicationRequest>,
) -> AppResult<Json<TeacherApplication>> {
    let row = state
        .applications
        .review_teacher_application(id, req.status, req.fields)
        .await?;
    info!("Admin {} reviewed teacher application {}", admin.id(), id);
    Ok(Json(row))
}

pub async fn student_applications(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<StudentApplication>>> {
    Ok(Json(state.applications.list_student_applications().await?))
}

pub async fn review_student_application(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i32>,
    Json(req): Json<ReviewApplicationRequest>,
) -> AppResult<Json<StudentApplication>> {
    let row = state
        .applications
        .review_student_application(id, req.status)
        .await?;
    info!("Admin {} reviewed student application {}", admin.id(), id);
    Ok(Json(row))
}

pub async fn grant_credits(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(req): Json<GrantCreditsRequest>,
) -> AppResult<Json<GrantCreditsResponse>> {
    let (balance, transaction) = state
        .credits
        .grant(&req.user_id, req.credits, req.total_price, req.payment_id)
        .await?;
    info!("Admin {} granted {} credits to {}", admin.id(), req.credits, req.user_id);
    Ok(Json(GrantCreditsResponse {
        balance,
        transaction,
    }))
}

/// Manual trigger of the scheduled streak reset
pub async fn daily_reset(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> AppResult<Json<DailyResetSummary>> {
    Ok(Json(state.streak.perform_daily_reset(Utc::now()).await?))
}

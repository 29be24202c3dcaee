//! Credits, teacher availability, bookings and reviews

use crate::auth::AuthUser;
use crate::error::AppResult;
use crate::models::{
    BookingView, CreditBalance, CreditTransaction, LessonBooking, LessonReview,
    TeacherAvailability, TeacherProfile, TeacherStats,
};
use crate::services::{AvailabilityUpdate, SlotInput, TeacherReviews};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditsResponse {
    #[serde(flatten)]
    pub balance: CreditBalance,
    pub transactions: Vec<CreditTransaction>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub slots: Vec<SlotInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub teacher_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub booking_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
}

pub async fn credits(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> AppResult<Json<CreditsResponse>> {
    let balance = state.credits.balance(auth.id()).await?;
    let transactions = state.credits.history(auth.id()).await?;
    Ok(Json(CreditsResponse {
        balance,
        transactions,
    }))
}

// =============================================================================
// Availability
// =============================================================================

pub async fn my_availability(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> AppResult<Json<Vec<TeacherAvailability>>> {
    auth.require_teacher()?;
    Ok(Json(
        state.tutoring.current_week_availability(auth.id()).await?,
    ))
}

pub async fn set_availability(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<AvailabilityRequest>,
) -> AppResult<Json<AvailabilityUpdate>> {
    auth.require_teacher()?;
    Ok(Json(
        state.tutoring.set_availability(auth.id(), req.slots).await?,
    ))
}

pub async fn teacher_availability(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(teacher_id): Path<String>,
) -> AppResult<Json<Vec<TeacherAvailability>>> {
    Ok(Json(state.tutoring.upcoming_availability(&teacher_id).await?))
}

pub async fn teachers(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
) -> AppResult<Json<Vec<TeacherProfile>>> {
    Ok(Json(state.tutoring.teachers().await?))
}

pub async fn teacher_stats(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> AppResult<Json<TeacherStats>> {
    auth.require_teacher()?;
    Ok(Json(state.tutoring.teacher_stats(auth.id()).await?))
}

// =============================================================================
// Bookings
// =============================================================================

pub async fn book(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<BookingRequest>,
) -> AppResult<(StatusCode, Json<LessonBooking>)> {
    let booking = state
        .tutoring
        .book(&auth.user, &req.teacher_id, req.start_time, req.end_time)
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn cancel(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LessonBooking>> {
    Ok(Json(state.tutoring.cancel(auth.id(), id).await?))
}

pub async fn student_bookings(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> AppResult<Json<Vec<BookingView>>> {
    Ok(Json(state.tutoring.student_bookings(auth.id()).await?))
}

pub async fn teacher_bookings(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> AppResult<Json<Vec<BookingView>>> {
    auth.require_teacher()?;
    Ok(Json(state.tutoring.teacher_bookings(auth.id()).await?))
}

// =============================================================================
// Reviews
// =============================================================================

pub async fn submit_review(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<ReviewRequest>,
) -> AppResult<(StatusCode, Json<LessonReview>)> {
    let review = state
        .tutoring
        .submit_review(auth.id(), req.booking_id, req.rating, req.comment.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn teacher_reviews(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(teacher_id): Path<String>,
) -> AppResult<Json<TeacherReviews>> {
    Ok(Json(state.tutoring.teacher_reviews(&teacher_id).await?))
}

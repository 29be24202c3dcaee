use crate::auth::AuthUser;
use crate::error::AppResult;
use crate::services::{Me, ProfileUpdate};
use crate::AppState;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;

pub async fn me(State(state): State<Arc<AppState>>, auth: AuthUser) -> AppResult<Json<Me>> {
    Ok(Json(state.profile.me(auth.user).await?))
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(update): Json<ProfileUpdate>,
) -> AppResult<Json<Me>> {
    Ok(Json(state.profile.update(&auth.user, update).await?))
}

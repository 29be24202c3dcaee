use crate::auth::AuthUser;
use crate::error::AppResult;
use crate::models::Snippet;
use crate::repositories::SnippetQuery;
use crate::services::NewSnippet;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SnippetQuery>,
) -> AppResult<Json<Vec<Snippet>>> {
    Ok(Json(state.snippets.list(&query).await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(snippet): Json<NewSnippet>,
) -> AppResult<(StatusCode, Json<Snippet>)> {
    let created = state.snippets.create(auth.id(), snippet).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Value>> {
    state.snippets.delete(auth.id(), id).await?;
    Ok(Json(json!({ "success": true })))
}

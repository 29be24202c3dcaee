use crate::AppState;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

const PING_TIMEOUT: Duration = Duration::from_secs(2);

/// Liveness plus a bounded database ping
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let database = match tokio::time::timeout(PING_TIMEOUT, state.database.ping()).await {
        Ok(Ok(())) => "up",
        _ => "down",
    };

    Json(json!({
        "status": if database == "up" { "ok" } else { "degraded" },
        "database": database,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

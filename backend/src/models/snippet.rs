use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Code shared on the snippet board
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub id: i32,
    pub user_id: String,
    pub user_name: String,
    pub code: String,
    pub title: String,
    pub description: String,
    pub language: String,
    pub created_at: NaiveDateTime,
}

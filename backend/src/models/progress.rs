//! Learner progress: hearts, points, streak counters and unlocks

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const MAX_HEARTS: i32 = 5;
pub const DEFAULT_DAILY_TARGET: i32 = 50;

/// One row per learner
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub user_id: String,
    pub user_name: String,
    pub user_image_src: String,
    pub active_course_id: Option<i32>,
    pub hearts: i32,
    pub points: i32,
    pub school_id: Option<i32>,
    pub profile_locked: bool,
    /// Daily-target streak ("istikrar")
    pub istikrar: i32,
    pub daily_target: i32,
    /// Platform day on which the current baseline was taken
    pub last_streak_check: Option<NaiveDate>,
    /// Last platform day whose daily target counted toward the streak
    pub streak_credited_on: Option<NaiveDate>,
    /// Points at the start of the current platform day
    pub previous_total_points: i32,
    pub lesson_streak: i32,
    pub last_lesson_completed_on: Option<NaiveDate>,
    pub profile_editing_unlocked: bool,
    pub study_buddy_unlocked: bool,
    pub code_share_unlocked: bool,
    pub has_infinite_hearts: bool,
    pub subscription_expires_at: Option<NaiveDateTime>,
}

impl UserProgress {
    /// Infinite hearts only count while the subscription is running
    pub fn infinite_hearts_active(&self, now: NaiveDateTime) -> bool {
        self.has_infinite_hearts
            && self
                .subscription_expires_at
                .map(|expires| expires > now)
                .unwrap_or(true)
    }
}

/// Calendar entry: whether the daily target was reached on a given day
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DailyStreakRecord {
    pub id: i32,
    pub user_id: String,
    pub date: NaiveDate,
    pub achieved: bool,
}

/// Subset returned by the progress endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub hearts: i32,
    pub points: i32,
    pub has_infinite_hearts: bool,
    pub active_course_id: Option<i32>,
    pub school_id: Option<i32>,
}

impl From<&UserProgress> for ProgressSummary {
    fn from(progress: &UserProgress) -> Self {
        Self {
            hearts: progress.hearts,
            points: progress.points,
            has_infinite_hearts: progress.has_infinite_hearts,
            active_course_id: progress.active_course_id,
            school_id: progress.school_id,
        }
    }
}

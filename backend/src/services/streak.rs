//! Streak service: applies the streak rules to stored progress

use crate::domain::requirements::{self, RequirementCheck, StreakRequirement, Unlocks};
use crate::domain::{check_streak_continuity, evaluate_daily_streak, local_today, StreakEvaluation};
use crate::error::{AppError, AppResult};
use crate::models::{DailyStreakRecord, UserProgress};
use crate::repositories::ProgressRepository;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Streak data shown on the streak page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakOverview {
    pub istikrar: i32,
    pub lesson_streak: i32,
    pub daily_target: i32,
    pub earned_today: i32,
    pub achieved_today: bool,
    pub unlocks: Unlocks,
    pub requirements: Vec<RequirementCheck>,
}

/// Outcome of one daily reset run
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyResetSummary {
    pub date: Option<NaiveDate>,
    pub processed: usize,
    pub reset: usize,
    pub kept: usize,
    pub failed: usize,
}

pub struct StreakService {
    progress_repo: Arc<ProgressRepository>,
    offset_hours: i32,
}

impl StreakService {
    pub fn new(progress_repo: Arc<ProgressRepository>, offset_hours: i32) -> Self {
        Self {
            progress_repo,
            offset_hours,
        }
    }

    pub fn today(&self) -> NaiveDate {
        local_today(Utc::now(), self.offset_hours)
    }

    pub fn offset_hours(&self) -> i32 {
        self.offset_hours
    }

    /// Re-evaluate the daily target after the user's points changed
    pub async fn record_activity(&self, user_id: &str) -> AppResult<Option<StreakEvaluation>> {
        let evaluation = self
            .progress_repo
            .apply_streak_evaluation(user_id, self.today(), evaluate_daily_streak)
            .await?;

        if let Some(eval) = &evaluation {
            if eval.credited_today {
                info!(
                    "Daily target reached: user={}, istikrar={}",
                    user_id, eval.state.istikrar
                );
            }
        }
        Ok(evaluation)
    }

    /// Lesson streak bookkeeping for a lesson that just became complete
    pub async fn mark_lesson_complete(&self, user_id: &str) -> AppResult<Option<i32>> {
        let streak = self
            .progress_repo
            .mark_lesson_complete(user_id, self.today())
            .await?;

        match streak {
            Some(value) => info!("Lesson streak updated: user={}, streak={}", user_id, value),
            None => debug!("Lesson already completed today: user={}", user_id),
        }
        Ok(streak)
    }

    /// Current streak with rollover applied and milestones unlocked
    pub async fn overview(&self, user_id: &str) -> AppResult<StreakOverview> {
        self.progress_repo
            .apply_streak_evaluation(user_id, self.today(), check_streak_continuity)
            .await?;

        let progress = self.progress_repo.get(user_id).await?;
        let unlocks = self.unlock_milestones(&progress).await?;
        let today = self.today();

        Ok(StreakOverview {
            istikrar: progress.istikrar,
            lesson_streak: progress.lesson_streak,
            daily_target: progress.daily_target,
            earned_today: progress.points - progress.previous_total_points,
            achieved_today: progress.streak_credited_on == Some(today),
            unlocks,
            requirements: StreakRequirement::ALL
                .iter()
                .map(|r| requirements::check_requirement(*r, progress.istikrar, &unlocks))
                .collect(),
        })
    }

    async fn unlock_milestones(&self, progress: &UserProgress) -> AppResult<Unlocks> {
        let current = Unlocks::from(progress);
        let next = requirements::milestone_unlocks(progress.istikrar, current);
        if next != current {
            info!("Permanent unlocks granted: user={}, {:?}", progress.user_id, next);
            self.progress_repo.set_unlocks(&progress.user_id, next).await?;
        }
        Ok(next)
    }

    /// Fail with the Turkish requirement message unless allowed
    pub fn require(&self, progress: &UserProgress, requirement: StreakRequirement) -> AppResult<()> {
        let check =
            requirements::check_requirement(requirement, progress.istikrar, &Unlocks::from(progress));
        if check.allowed {
            Ok(())
        } else {
            Err(AppError::Forbidden(check.message))
        }
    }

    /// Daily streak rows of one calendar month
    pub async fn calendar(
        &self,
        user_id: &str,
        month: u32,
        year: i32,
    ) -> AppResult<Vec<DailyStreakRecord>> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| AppError::Validation("Invalid month or year".to_string()))?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(|| AppError::Validation("Invalid month or year".to_string()))?;

        let records = self
            .progress_repo
            .daily_records(user_id, first, next_month - Duration::days(1))
            .await?;
        Ok(records)
    }

    /// Close out the previous day for every learner
    pub async fn perform_daily_reset(&self, now: DateTime<Utc>) -> AppResult<DailyResetSummary> {
        let today = local_today(now, self.offset_hours);
        let user_ids = self.progress_repo.list_user_ids().await?;

        info!("Daily streak reset started: date={}, users={}", today, user_ids.len());

        let mut summary = DailyResetSummary {
            date: Some(today),
            ..Default::default()
        };

        for user_id in &user_ids {
            match self
                .progress_repo
                .apply_streak_evaluation(user_id, today, check_streak_continuity)
                .await
            {
                Ok(Some(eval)) => {
                    summary.processed += 1;
                    if eval.reset {
                        summary.reset += 1;
                    } else {
                        summary.kept += 1;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    summary.failed += 1;
                    warn!("Daily reset failed for user {}: {}", user_id, e);
                }
            }
        }

        info!(
            "Daily streak reset finished: processed={}, reset={}, kept={}, failed={}",
            summary.processed, summary.reset, summary.kept, summary.failed
        );
        Ok(summary)
    }
}

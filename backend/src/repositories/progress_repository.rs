//! Repository for learner progress, hearts, points and streak state

use crate::domain::scoring::{self, ChallengeOutcome, Score};
use crate::domain::streak::{check_streak_continuity, lesson_completion_streak};
use crate::domain::{StreakEvaluation, StreakState, Unlocks};
use crate::error::RepositoryError;
use crate::models::{DailyStreakRecord, UserProgress, UserStanding};
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{PgPool, Postgres, Transaction};

const PROGRESS_COLUMNS: &str = r#"
    user_id, user_name, user_image_src, active_course_id, hearts, points, school_id,
    profile_locked, istikrar, daily_target, last_streak_check, streak_credited_on,
    previous_total_points, lesson_streak, last_lesson_completed_on,
    profile_editing_unlocked, study_buddy_unlocked, code_share_unlocked,
    has_infinite_hearts, subscription_expires_at
"#;

/// Which half of the streak evaluation to apply
pub type StreakEvaluator = fn(StreakState, NaiveDate) -> StreakEvaluation;

pub struct ProgressRepository {
    pool: PgPool,
}

impl ProgressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lock_progress(
        tx: &mut Transaction<'_, Postgres>,
        user_id: &str,
    ) -> Result<UserProgress, RepositoryError> {
        sqlx::query_as::<_, UserProgress>(&format!(
            "SELECT {} FROM user_progress WHERE user_id = $1 FOR UPDATE",
            PROGRESS_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("User progress not found".to_string()))
    }

    async fn write_score(
        tx: &mut Transaction<'_, Postgres>,
        user_id: &str,
        score: Score,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE user_progress SET hearts = $2, points = $3 WHERE user_id = $1")
            .bind(user_id)
            .bind(score.hearts)
            .bind(score.points)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Progress rows
    // =========================================================================

    pub async fn find(&self, user_id: &str) -> Result<Option<UserProgress>, RepositoryError> {
        let progress = sqlx::query_as::<_, UserProgress>(&format!(
            "SELECT {} FROM user_progress WHERE user_id = $1",
            PROGRESS_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(progress)
    }

    pub async fn get(&self, user_id: &str) -> Result<UserProgress, RepositoryError> {
        self.find(user_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("User progress not found".to_string()))
    }

    /// Create the row on first course selection, otherwise switch course
    pub async fn upsert_active_course(
        &self,
        user_id: &str,
        course_id: i32,
        user_name: &str,
        user_image_src: &str,
    ) -> Result<UserProgress, RepositoryError> {
        let progress = sqlx::query_as::<_, UserProgress>(&format!(
            r#"
            INSERT INTO user_progress (user_id, active_course_id, user_name, user_image_src)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET active_course_id = EXCLUDED.active_course_id
            RETURNING {}
            "#,
            PROGRESS_COLUMNS
        ))
        .bind(user_id)
        .bind(course_id)
        .bind(user_name)
        .bind(user_image_src)
        .fetch_one(&self.pool)
        .await?;

        Ok(progress)
    }

    pub async fn update_display(
        &self,
        user_id: &str,
        user_name: Option<&str>,
        user_image_src: Option<&str>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE user_progress
            SET user_name = COALESCE($2, user_name),
                user_image_src = COALESCE($3, user_image_src)
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(user_name)
        .bind(user_image_src)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_daily_target(
        &self,
        user_id: &str,
        daily_target: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE user_progress SET daily_target = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(daily_target)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("User progress not found".to_string()));
        }
        Ok(())
    }

    /// Returns the previous school so both totals can be refreshed
    pub async fn set_school(
        &self,
        user_id: &str,
        school_id: i32,
    ) -> Result<Option<i32>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let current = Self::lock_progress(&mut tx, user_id).await?;

        sqlx::query("UPDATE user_progress SET school_id = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(school_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(current.school_id)
    }

    pub async fn set_unlocks(&self, user_id: &str, unlocks: Unlocks) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE user_progress
            SET profile_editing_unlocked = $2,
                study_buddy_unlocked = $3,
                code_share_unlocked = $4
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(unlocks.profile_editing)
        .bind(unlocks.study_buddy)
        .bind(unlocks.code_share)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_user_ids(&self) -> Result<Vec<String>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, String>("SELECT user_id FROM user_progress ORDER BY user_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    // =========================================================================
    // Hearts and points
    // =========================================================================

    /// Apply a challenge attempt under a row lock.
    ///
    /// `correct` selects between completion and the wrong answer path.
    /// A pending day rollover is applied first so yesterday is closed
    /// against yesterday's points.
    pub async fn record_challenge_attempt(
        &self,
        user_id: &str,
        challenge_id: i32,
        correct: bool,
        now: NaiveDateTime,
        today: NaiveDate,
    ) -> Result<(ChallengeOutcome, Score), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let progress = Self::lock_progress(&mut tx, user_id).await?;

        let existing = sqlx::query_scalar::<_, i32>(
            "SELECT id FROM challenge_progress WHERE user_id = $1 AND challenge_id = $2",
        )
        .bind(user_id)
        .bind(challenge_id)
        .fetch_optional(&mut *tx)
        .await?;

        let already_completed = existing.is_some();
        let infinite = progress.infinite_hearts_active(now);
        let score = Score {
            hearts: progress.hearts,
            points: progress.points,
        };

        let (outcome, next) = if correct {
            scoring::complete_challenge(score, already_completed, infinite)
        } else {
            scoring::wrong_answer(score, already_completed, infinite)
        };

        if correct && outcome != ChallengeOutcome::Hearts {
            sqlx::query(
                r#"
                INSERT INTO challenge_progress (user_id, challenge_id, completed)
                VALUES ($1, $2, TRUE)
                ON CONFLICT (user_id, challenge_id) DO UPDATE SET completed = TRUE
                "#,
            )
            .bind(user_id)
            .bind(challenge_id)
            .execute(&mut *tx)
            .await?;
        }

        if next != score {
            Self::roll_over_locked(&mut tx, &progress, today).await?;
            Self::write_score(&mut tx, user_id, next).await?;
        }

        tx.commit().await?;
        Ok((outcome, next))
    }

    pub async fn refill_hearts(&self, user_id: &str, today: NaiveDate) -> Result<Score, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let progress = Self::lock_progress(&mut tx, user_id).await?;

        let next = scoring::refill_hearts(Score {
            hearts: progress.hearts,
            points: progress.points,
        })
        .map_err(|msg| RepositoryError::BusinessRule(msg.to_string()))?;

        Self::roll_over_locked(&mut tx, &progress, today).await?;
        Self::write_score(&mut tx, user_id, next).await?;
        tx.commit().await?;
        Ok(next)
    }

    pub async fn add_points(
        &self,
        user_id: &str,
        delta: i32,
        today: NaiveDate,
    ) -> Result<UserProgress, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let progress = Self::lock_progress(&mut tx, user_id).await?;
        Self::roll_over_locked(&mut tx, &progress, today).await?;

        let updated = sqlx::query_as::<_, UserProgress>(&format!(
            "UPDATE user_progress SET points = $2 WHERE user_id = $1 RETURNING {}",
            PROGRESS_COLUMNS
        ))
        .bind(user_id)
        .bind(progress.points.saturating_add(delta))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    // =========================================================================
    // Streaks
    // =========================================================================

    /// Evaluate and persist the daily target streak for one user.
    ///
    /// Writes the calendar rows for the closed-out day and for today.
    /// Returns `None` when the user has no progress row.
    pub async fn apply_streak_evaluation(
        &self,
        user_id: &str,
        today: NaiveDate,
        evaluate: StreakEvaluator,
    ) -> Result<Option<StreakEvaluation>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let progress = match Self::lock_progress(&mut tx, user_id).await {
            Ok(progress) => progress,
            Err(RepositoryError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let state = StreakState::from(&progress);
        let evaluation = evaluate(state, today);
        Self::persist_evaluation(&mut tx, user_id, today, state, &evaluation).await?;

        tx.commit().await?;
        Ok(Some(evaluation))
    }

    /// Close out the last check day on a locked row before its points move
    async fn roll_over_locked(
        tx: &mut Transaction<'_, Postgres>,
        progress: &UserProgress,
        today: NaiveDate,
    ) -> Result<StreakEvaluation, RepositoryError> {
        let state = StreakState::from(progress);
        let evaluation = check_streak_continuity(state, today);
        Self::persist_evaluation(tx, &progress.user_id, today, state, &evaluation).await?;
        Ok(evaluation)
    }

    async fn persist_evaluation(
        tx: &mut Transaction<'_, Postgres>,
        user_id: &str,
        today: NaiveDate,
        before: StreakState,
        evaluation: &StreakEvaluation,
    ) -> Result<(), RepositoryError> {
        if evaluation.state != before {
            sqlx::query(
                r#"
                UPDATE user_progress
                SET istikrar = $2,
                    previous_total_points = $3,
                    last_streak_check = $4,
                    streak_credited_on = $5
                WHERE user_id = $1
                "#,
            )
            .bind(user_id)
            .bind(evaluation.state.istikrar)
            .bind(evaluation.state.previous_total_points)
            .bind(evaluation.state.last_streak_check)
            .bind(evaluation.state.streak_credited_on)
            .execute(&mut **tx)
            .await?;
        }

        if let Some((day, achieved)) = evaluation.closed_day {
            Self::upsert_daily_record(tx, user_id, day, achieved).await?;
        }
        if evaluation.rolled_over || evaluation.credited_today {
            Self::upsert_daily_record(tx, user_id, today, evaluation.achieved_today).await?;
        }
        Ok(())
    }

    async fn upsert_daily_record(
        tx: &mut Transaction<'_, Postgres>,
        user_id: &str,
        date: NaiveDate,
        achieved: bool,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO user_daily_streak (user_id, date, achieved)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, date) DO UPDATE SET achieved = EXCLUDED.achieved
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(achieved)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Lesson streak update for a lesson finished on `today`.
    /// `None` when a lesson was already finished that day.
    pub async fn mark_lesson_complete(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<Option<i32>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let progress = Self::lock_progress(&mut tx, user_id).await?;

        let next = lesson_completion_streak(
            progress.last_lesson_completed_on,
            today,
            progress.lesson_streak,
        );

        if let Some(streak) = next {
            sqlx::query(
                r#"
                UPDATE user_progress
                SET lesson_streak = $2, last_lesson_completed_on = $3
                WHERE user_id = $1
                "#,
            )
            .bind(user_id)
            .bind(streak)
            .bind(today)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(next)
    }

    /// Calendar rows between two dates, inclusive
    pub async fn daily_records(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyStreakRecord>, RepositoryError> {
        let records = sqlx::query_as::<_, DailyStreakRecord>(
            r#"
            SELECT id, user_id, date, achieved
            FROM user_daily_streak
            WHERE user_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    // =========================================================================
    // Leaderboard
    // =========================================================================

    pub async fn top_users(&self, limit: i64) -> Result<Vec<UserStanding>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserStanding>(
            r#"
            SELECT user_id, user_name, user_image_src, points
            FROM user_progress
            ORDER BY points DESC, user_id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// 1-based position among all learners, or among one school's learners
    pub async fn user_rank(
        &self,
        user_id: &str,
        school_id: Option<i32>,
    ) -> Result<Option<i64>, RepositoryError> {
        let rank = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT position FROM (
                SELECT user_id, ROW_NUMBER() OVER (ORDER BY points DESC, user_id) AS position
                FROM user_progress
                WHERE $2::INTEGER IS NULL OR school_id = $2
            ) ranked
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(school_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rank)
    }
}

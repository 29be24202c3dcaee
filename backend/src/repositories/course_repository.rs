//! Read access to the course catalogue and challenge progress

use crate::error::RepositoryError;
use crate::models::{Challenge, ChallengeOption, Course, Lesson, Unit};
use sqlx::PgPool;
use std::collections::HashSet;

pub struct CourseRepository {
    pool: PgPool,
}

impl CourseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>, RepositoryError> {
        let courses = sqlx::query_as::<_, Course>("SELECT id, title, image_src FROM courses ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(courses)
    }

    pub async fn find_course(&self, id: i32) -> Result<Option<Course>, RepositoryError> {
        let course = sqlx::query_as::<_, Course>("SELECT id, title, image_src FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(course)
    }

    /// Units of a course in display order
    pub async fn units_for_course(&self, course_id: i32) -> Result<Vec<Unit>, RepositoryError> {
        let units = sqlx::query_as::<_, Unit>(
            r#"
            SELECT id, title, description, course_id, "order"
            FROM units
            WHERE course_id = $1
            ORDER BY "order", id
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(units)
    }

    /// Lessons of every unit of a course, ordered by unit then lesson
    pub async fn lessons_for_course(&self, course_id: i32) -> Result<Vec<Lesson>, RepositoryError> {
        let lessons = sqlx::query_as::<_, Lesson>(
            r#"
            SELECT l.id, l.title, l.unit_id, l."order"
            FROM lessons l
            JOIN units u ON u.id = l.unit_id
            WHERE u.course_id = $1
            ORDER BY u."order", u.id, l."order", l.id
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lessons)
    }

    pub async fn find_lesson(&self, id: i32) -> Result<Option<Lesson>, RepositoryError> {
        let lesson = sqlx::query_as::<_, Lesson>(r#"SELECT id, title, unit_id, "order" FROM lessons WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lesson)
    }

    pub async fn find_challenge(&self, id: i32) -> Result<Option<Challenge>, RepositoryError> {
        let challenge = sqlx::query_as::<_, Challenge>(
            r#"
            SELECT id, lesson_id, type, question, "order", time_limit, metadata
            FROM challenges
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(challenge)
    }

    /// Challenges of several lessons at once
    pub async fn challenges_for_lessons(
        &self,
        lesson_ids: &[i32],
    ) -> Result<Vec<Challenge>, RepositoryError> {
        let challenges = sqlx::query_as::<_, Challenge>(
            r#"
            SELECT id, lesson_id, type, question, "order", time_limit, metadata
            FROM challenges
            WHERE lesson_id = ANY($1)
            ORDER BY lesson_id, "order", id
            "#,
        )
        .bind(lesson_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(challenges)
    }

    pub async fn options_for_challenges(
        &self,
        challenge_ids: &[i32],
    ) -> Result<Vec<ChallengeOption>, RepositoryError> {
        let options = sqlx::query_as::<_, ChallengeOption>(
            r#"
            SELECT id, challenge_id, text, correct, image_src, audio_src,
                   correct_order, pair_id, is_blank, drag_data
            FROM challenge_options
            WHERE challenge_id = ANY($1)
            ORDER BY challenge_id, id
            "#,
        )
        .bind(challenge_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(options)
    }

    /// Ids of the given challenges the user has completed
    pub async fn completed_challenge_ids(
        &self,
        user_id: &str,
        challenge_ids: &[i32],
    ) -> Result<HashSet<i32>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT challenge_id
            FROM challenge_progress
            WHERE user_id = $1 AND completed AND challenge_id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(challenge_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().collect())
    }

    /// A lesson is complete once it has challenges and all are done
    pub async fn is_lesson_complete(
        &self,
        user_id: &str,
        lesson_id: i32,
    ) -> Result<bool, RepositoryError> {
        let complete = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT COUNT(c.id) > 0 AND COUNT(c.id) = COUNT(cp.id)
            FROM challenges c
            LEFT JOIN challenge_progress cp
                ON cp.challenge_id = c.id AND cp.user_id = $1 AND cp.completed
            WHERE c.lesson_id = $2
            "#,
        )
        .bind(user_id)
        .bind(lesson_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(complete)
    }
}

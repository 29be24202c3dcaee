//! Repository for private lesson bookings, teacher availability and reviews

use crate::domain::tutoring::covered_by_slot;
use crate::error::RepositoryError;
use crate::models::{
    BookingView, LessonBooking, LessonReview, TeacherAvailability, TeacherField, TeacherStats,
};
use chrono::NaiveDateTime;
use sqlx::PgPool;

const BOOKING_COLUMNS: &str =
    "id, student_id, teacher_id, start_time, end_time, status, meet_link, notes, created_at, updated_at";

const AVAILABILITY_COLUMNS: &str =
    "id, teacher_id, start_time, end_time, day_of_week, week_start_date, created_at, updated_at";

/// New availability slot, already validated
#[derive(Debug, Clone)]
pub struct NewSlot {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub day_of_week: i32,
}

/// Bookings moved by one status sweep
#[derive(Debug, Clone, Default)]
pub struct SweepResult {
    pub confirmed: Vec<LessonBooking>,
    pub completed: Vec<LessonBooking>,
}

impl SweepResult {
    pub fn total(&self) -> usize {
        self.confirmed.len() + self.completed.len()
    }
}

pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Bookings
    // =========================================================================

    pub async fn find(&self, id: i32) -> Result<Option<LessonBooking>, RepositoryError> {
        let booking = sqlx::query_as::<_, LessonBooking>(&format!(
            "SELECT {} FROM lesson_bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(booking)
    }

    /// Book a lesson and consume one credit atomically.
    ///
    /// The teacher row is locked so two students cannot take the same slot.
    pub async fn create_booking(
        &self,
        student_id: &str,
        teacher_id: &str,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        meet_link: Option<&str>,
    ) -> Result<LessonBooking, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let available = sqlx::query_scalar::<_, i32>(
            "SELECT available_credits FROM user_credits WHERE user_id = $1 FOR UPDATE",
        )
        .bind(student_id)
        .fetch_optional(&mut *tx)
        .await?
        .unwrap_or(0);

        if available < 1 {
            return Err(RepositoryError::BusinessRule(
                "Insufficient credits. Please purchase credits to book a lesson.".to_string(),
            ));
        }

        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(teacher_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Teacher not found".to_string()))?;

        let slots: Vec<(NaiveDateTime, NaiveDateTime)> = sqlx::query_as(
            r#"
            SELECT start_time, end_time
            FROM teacher_availability
            WHERE teacher_id = $1 AND start_time < $3 AND end_time > $2
            "#,
        )
        .bind(teacher_id)
        .bind(start_time)
        .bind(end_time)
        .fetch_all(&mut *tx)
        .await?;

        if !covered_by_slot(&slots, start_time, end_time) {
            return Err(RepositoryError::BusinessRule(
                "Teacher is not available at this time".to_string(),
            ));
        }

        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM lesson_bookings
                WHERE teacher_id = $1
                  AND status <> 'cancelled'
                  AND start_time < $3 AND end_time > $2
            )
            "#,
        )
        .bind(teacher_id)
        .bind(start_time)
        .bind(end_time)
        .fetch_one(&mut *tx)
        .await?;

        if taken {
            return Err(RepositoryError::BusinessRule(
                "This time slot is already booked".to_string(),
            ));
        }

        let booking = sqlx::query_as::<_, LessonBooking>(&format!(
            r#"
            INSERT INTO lesson_bookings (student_id, teacher_id, start_time, end_time, status, meet_link)
            VALUES ($1, $2, $3, $4, 'pending', $5)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(student_id)
        .bind(teacher_id)
        .bind(start_time)
        .bind(end_time)
        .bind(meet_link)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE user_credits
            SET used_credits = used_credits + 1,
                available_credits = available_credits - 1,
                updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(student_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(booking)
    }

    /// Cancel a still-open booking of `student_id` and refund its credit
    pub async fn cancel_and_refund(
        &self,
        booking_id: i32,
        student_id: &str,
    ) -> Result<LessonBooking, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let booking = sqlx::query_as::<_, LessonBooking>(&format!(
            r#"
            UPDATE lesson_bookings
            SET status = 'cancelled', updated_at = NOW()
            WHERE id = $1 AND student_id = $2 AND status IN ('pending', 'confirmed')
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .bind(student_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            RepositoryError::BusinessRule("Lesson can no longer be cancelled".to_string())
        })?;

        sqlx::query(
            r#"
            UPDATE user_credits
            SET used_credits = GREATEST(used_credits - 1, 0),
                available_credits = available_credits + 1,
                updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(student_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(booking)
    }

    /// Move due bookings forward: pending -> confirmed once started,
    /// then confirmed -> completed once ended.
    pub async fn sweep_statuses(&self, now: NaiveDateTime) -> Result<SweepResult, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let confirmed = sqlx::query_as::<_, LessonBooking>(&format!(
            r#"
            UPDATE lesson_bookings
            SET status = 'confirmed', updated_at = NOW()
            WHERE id IN (
                SELECT id FROM lesson_bookings
                WHERE status = 'pending' AND start_time < $1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(now)
        .fetch_all(&mut *tx)
        .await?;

        let completed = sqlx::query_as::<_, LessonBooking>(&format!(
            r#"
            UPDATE lesson_bookings
            SET status = 'completed', updated_at = NOW()
            WHERE id IN (
                SELECT id FROM lesson_bookings
                WHERE status = 'confirmed' AND end_time < $1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(now)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(SweepResult {
            confirmed,
            completed,
        })
    }

    pub async fn student_bookings(&self, student_id: &str) -> Result<Vec<BookingView>, RepositoryError> {
        let rows = sqlx::query_as::<_, BookingView>(
            r#"
            SELECT b.id, b.student_id, b.teacher_id, b.start_time, b.end_time, b.status,
                   b.meet_link, b.notes,
                   u.name AS counterpart_name, u.avatar AS counterpart_avatar,
                   EXISTS (SELECT 1 FROM lesson_reviews r WHERE r.booking_id = b.id) AS has_review
            FROM lesson_bookings b
            JOIN users u ON u.id = b.teacher_id
            WHERE b.student_id = $1
            ORDER BY b.start_time DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn teacher_bookings(&self, teacher_id: &str) -> Result<Vec<BookingView>, RepositoryError> {
        let rows = sqlx::query_as::<_, BookingView>(
            r#"
            SELECT b.id, b.student_id, b.teacher_id, b.start_time, b.end_time, b.status,
                   b.meet_link, b.notes,
                   u.name AS counterpart_name, u.avatar AS counterpart_avatar,
                   EXISTS (SELECT 1 FROM lesson_reviews r WHERE r.booking_id = b.id) AS has_review
            FROM lesson_bookings b
            JOIN users u ON u.id = b.student_id
            WHERE b.teacher_id = $1
            ORDER BY b.start_time DESC
            "#,
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // =========================================================================
    // Availability
    // =========================================================================

    pub async fn availability_for_week(
        &self,
        teacher_id: &str,
        week_start: NaiveDateTime,
    ) -> Result<Vec<TeacherAvailability>, RepositoryError> {
        let slots = sqlx::query_as::<_, TeacherAvailability>(&format!(
            r#"
            SELECT {}
            FROM teacher_availability
            WHERE teacher_id = $1 AND week_start_date = $2
            ORDER BY start_time
            "#,
            AVAILABILITY_COLUMNS
        ))
        .bind(teacher_id)
        .bind(week_start)
        .fetch_all(&self.pool)
        .await?;
        Ok(slots)
    }

    /// Open slots of a teacher from `from` onwards
    pub async fn upcoming_availability(
        &self,
        teacher_id: &str,
        from: NaiveDateTime,
    ) -> Result<Vec<TeacherAvailability>, RepositoryError> {
        let slots = sqlx::query_as::<_, TeacherAvailability>(&format!(
            r#"
            SELECT {}
            FROM teacher_availability
            WHERE teacher_id = $1 AND start_time >= $2
            ORDER BY start_time
            "#,
            AVAILABILITY_COLUMNS
        ))
        .bind(teacher_id)
        .bind(from)
        .fetch_all(&self.pool)
        .await?;
        Ok(slots)
    }

    /// Replace every slot of the given week
    pub async fn replace_week_availability(
        &self,
        teacher_id: &str,
        week_start: NaiveDateTime,
        slots: &[NewSlot],
    ) -> Result<Vec<TeacherAvailability>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM teacher_availability WHERE teacher_id = $1 AND week_start_date = $2")
            .bind(teacher_id)
            .bind(week_start)
            .execute(&mut *tx)
            .await?;

        let mut saved = Vec::with_capacity(slots.len());
        for slot in slots {
            let row = sqlx::query_as::<_, TeacherAvailability>(&format!(
                r#"
                INSERT INTO teacher_availability (teacher_id, start_time, end_time, day_of_week, week_start_date)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING {}
                "#,
                AVAILABILITY_COLUMNS
            ))
            .bind(teacher_id)
            .bind(slot.start_time)
            .bind(slot.end_time)
            .bind(slot.day_of_week)
            .bind(week_start)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(row);
        }

        tx.commit().await?;
        Ok(saved)
    }

    // =========================================================================
    // Teacher fields
    // =========================================================================

    pub async fn active_fields(&self, teacher_ids: &[String]) -> Result<Vec<TeacherField>, RepositoryError> {
        let fields = sqlx::query_as::<_, TeacherField>(
            r#"
            SELECT id, teacher_id, subject, grade, display_name, is_active, created_at, updated_at
            FROM teacher_fields
            WHERE teacher_id = ANY($1) AND is_active
            ORDER BY teacher_id, subject, grade
            "#,
        )
        .bind(teacher_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(fields)
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// Insert a review; a second review of the same booking is a Duplicate
    pub async fn create_review(
        &self,
        booking: &LessonBooking,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<LessonReview, RepositoryError> {
        let review = sqlx::query_as::<_, LessonReview>(
            r#"
            INSERT INTO lesson_reviews (booking_id, student_id, teacher_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, booking_id, student_id, teacher_id, rating, comment, created_at, updated_at
            "#,
        )
        .bind(booking.id)
        .bind(&booking.student_id)
        .bind(&booking.teacher_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match RepositoryError::from(e) {
            RepositoryError::Duplicate(_) => {
                RepositoryError::Duplicate("This lesson has already been reviewed".to_string())
            }
            other => other,
        })?;
        Ok(review)
    }

    pub async fn teacher_reviews(&self, teacher_id: &str) -> Result<Vec<LessonReview>, RepositoryError> {
        let reviews = sqlx::query_as::<_, LessonReview>(
            r#"
            SELECT id, booking_id, student_id, teacher_id, rating, comment, created_at, updated_at
            FROM lesson_reviews
            WHERE teacher_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    /// (average rating, review count) per teacher
    pub async fn rating_summaries(
        &self,
        teacher_ids: &[String],
    ) -> Result<Vec<(String, Option<f64>, i64)>, RepositoryError> {
        let rows = sqlx::query_as::<_, (String, Option<f64>, i64)>(
            r#"
            SELECT teacher_id, AVG(rating)::FLOAT8, COUNT(*)
            FROM lesson_reviews
            WHERE teacher_id = ANY($1)
            GROUP BY teacher_id
            "#,
        )
        .bind(teacher_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn teacher_stats(
        &self,
        teacher_id: &str,
        now: NaiveDateTime,
    ) -> Result<TeacherStats, RepositoryError> {
        let stats = sqlx::query_as::<_, TeacherStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM lesson_bookings
                    WHERE teacher_id = $1 AND status = 'completed') AS completed_lessons,
                (SELECT COUNT(*) FROM lesson_bookings
                    WHERE teacher_id = $1 AND status IN ('pending', 'confirmed')
                      AND start_time > $2) AS upcoming_lessons,
                (SELECT COUNT(*) FROM lesson_bookings
                    WHERE teacher_id = $1 AND status = 'cancelled') AS cancelled_lessons,
                (SELECT COUNT(*) FROM lesson_reviews WHERE teacher_id = $1) AS review_count,
                (SELECT AVG(rating)::FLOAT8 FROM lesson_reviews WHERE teacher_id = $1) AS average_rating
            "#,
        )
        .bind(teacher_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}

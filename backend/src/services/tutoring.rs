//! Private tutoring: availability, bookings and reviews

use crate::domain::tutoring::{
    check_cancellation, local_day_of_week, partition_past_slots, validate_booking_window,
    validate_slot, week_start,
};
use crate::error::{option_to_result, AppError, AppResult};
use crate::models::{
    BookingStatus, BookingView, LessonBooking, LessonReview, TeacherAvailability, TeacherProfile,
    TeacherStats, User,
};
use crate::repositories::{BookingRepository, NewSlot, SweepResult, UserRepository};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotInput {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityUpdate {
    pub message: String,
    pub availability: Vec<TeacherAvailability>,
    pub filtered: bool,
    pub filtered_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherReviews {
    pub reviews: Vec<LessonReview>,
    pub average_rating: Option<f64>,
    pub review_count: usize,
}

pub fn validate_rating(rating: i32) -> AppResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::Validation(
            "Rating must be between 1 and 5".to_string(),
        ));
    }
    Ok(())
}

pub fn average_rating(reviews: &[LessonReview]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let sum: i32 = reviews.iter().map(|r| r.rating).sum();
    Some(f64::from(sum) / reviews.len() as f64)
}

pub struct TutoringService {
    booking_repo: Arc<BookingRepository>,
    user_repo: Arc<UserRepository>,
    offset_hours: i32,
}

impl TutoringService {
    pub fn new(
        booking_repo: Arc<BookingRepository>,
        user_repo: Arc<UserRepository>,
        offset_hours: i32,
    ) -> Self {
        Self {
            booking_repo,
            user_repo,
            offset_hours,
        }
    }

    fn now() -> NaiveDateTime {
        Utc::now().naive_utc()
    }

    // =========================================================================
    // Availability
    // =========================================================================

    pub async fn current_week_availability(&self, teacher_id: &str) -> AppResult<Vec<TeacherAvailability>> {
        let week = week_start(Utc::now(), self.offset_hours);
        Ok(self.booking_repo.availability_for_week(teacher_id, week).await?)
    }

    /// Replace this week's slots. Past slots are dropped and reported.
    pub async fn set_availability(
        &self,
        teacher_id: &str,
        slots: Vec<SlotInput>,
    ) -> AppResult<AvailabilityUpdate> {
        let now = Utc::now();
        let slots: Vec<(NaiveDateTime, NaiveDateTime)> = slots
            .into_iter()
            .map(|s| (s.start_time.naive_utc(), s.end_time.naive_utc()))
            .collect();
        for (start, end) in &slots {
            validate_slot(*start, *end)?;
        }

        let (future, past) = partition_past_slots(slots, now.naive_utc());
        let new_slots: Vec<NewSlot> = future
            .into_iter()
            .map(|(start_time, end_time)| NewSlot {
                start_time,
                end_time,
                day_of_week: local_day_of_week(start_time, self.offset_hours),
            })
            .collect();

        let week = week_start(now, self.offset_hours);
        let availability = self
            .booking_repo
            .replace_week_availability(teacher_id, week, &new_slots)
            .await?;

        info!(
            "Availability updated: teacher={}, slots={}, filtered={}",
            teacher_id,
            availability.len(),
            past.len()
        );

        let filtered = !past.is_empty();
        Ok(AvailabilityUpdate {
            message: if filtered {
                "Availability updated successfully. Some past time slots were automatically removed."
                    .to_string()
            } else {
                "Availability updated successfully".to_string()
            },
            availability,
            filtered,
            filtered_count: past.len(),
        })
    }

    /// Open slots a student can book
    pub async fn upcoming_availability(&self, teacher_id: &str) -> AppResult<Vec<TeacherAvailability>> {
        Ok(self
            .booking_repo
            .upcoming_availability(teacher_id, Self::now())
            .await?)
    }

    pub async fn teachers(&self) -> AppResult<Vec<TeacherProfile>> {
        let teachers = self.user_repo.list_teachers().await?;
        let ids: Vec<String> = teachers.iter().map(|t| t.id.clone()).collect();

        let mut fields: HashMap<String, Vec<_>> = HashMap::new();
        for field in self.booking_repo.active_fields(&ids).await? {
            fields.entry(field.teacher_id.clone()).or_default().push(field);
        }
        let ratings: HashMap<String, (Option<f64>, i64)> = self
            .booking_repo
            .rating_summaries(&ids)
            .await?
            .into_iter()
            .map(|(id, avg, count)| (id, (avg, count)))
            .collect();

        Ok(teachers
            .into_iter()
            .map(|teacher| {
                let (average_rating, review_count) =
                    ratings.get(&teacher.id).copied().unwrap_or((None, 0));
                TeacherProfile {
                    fields: fields.remove(&teacher.id).unwrap_or_default(),
                    id: teacher.id,
                    name: teacher.name,
                    avatar: teacher.avatar,
                    description: teacher.description,
                    average_rating,
                    review_count,
                }
            })
            .collect())
    }

    // =========================================================================
    // Bookings
    // =========================================================================

    pub async fn book(
        &self,
        student: &User,
        teacher_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> AppResult<LessonBooking> {
        let start = start_time.naive_utc();
        let end = end_time.naive_utc();
        validate_booking_window(start, end, Self::now())?;

        if teacher_id == student.id {
            return Err(AppError::Validation("You cannot book your own lesson".to_string()));
        }

        let teacher = option_to_result(
            self.user_repo.find_by_id(teacher_id).await?,
            "Teacher not found",
        )?;
        if !teacher.is_teacher() {
            return Err(AppError::Validation("Selected user is not a teacher".to_string()));
        }

        let booking = self
            .booking_repo
            .create_booking(&student.id, teacher_id, start, end, teacher.meet_link.as_deref())
            .await?;

        info!(
            "Lesson booked: booking={}, student={}, teacher={}, start={}",
            booking.id, student.id, teacher_id, start
        );
        Ok(booking)
    }

    pub async fn cancel(&self, student_id: &str, booking_id: i32) -> AppResult<LessonBooking> {
        let booking = option_to_result(
            self.booking_repo.find(booking_id).await?,
            "Booking not found",
        )?;
        check_cancellation(&booking, student_id, Self::now())?;

        let cancelled = self
            .booking_repo
            .cancel_and_refund(booking_id, student_id)
            .await?;

        info!("Lesson cancelled and credit refunded: booking={}", booking_id);
        Ok(cancelled)
    }

    /// Advance due bookings
    pub async fn sweep_statuses(&self, now: NaiveDateTime) -> AppResult<SweepResult> {
        let result = self.booking_repo.sweep_statuses(now).await?;
        if result.total() > 0 {
            info!(
                "Booking statuses updated: confirmed={}, completed={}",
                result.confirmed.len(),
                result.completed.len()
            );
        }
        Ok(result)
    }

    pub async fn student_bookings(&self, student_id: &str) -> AppResult<Vec<BookingView>> {
        Ok(self.booking_repo.student_bookings(student_id).await?)
    }

    pub async fn teacher_bookings(&self, teacher_id: &str) -> AppResult<Vec<BookingView>> {
        Ok(self.booking_repo.teacher_bookings(teacher_id).await?)
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    pub async fn submit_review(
        &self,
        student_id: &str,
        booking_id: i32,
        rating: i32,
        comment: Option<&str>,
    ) -> AppResult<LessonReview> {
        validate_rating(rating)?;

        let booking = option_to_result(
            self.booking_repo.find(booking_id).await?,
            "Booking not found",
        )?;
        if booking.student_id != student_id {
            return Err(AppError::Forbidden(
                "You can only review your own lessons".to_string(),
            ));
        }
        if booking.status_enum() != BookingStatus::Completed {
            return Err(AppError::Validation(
                "Only completed lessons can be reviewed".to_string(),
            ));
        }

        let comment = comment.map(str::trim).filter(|c| !c.is_empty());
        let review = self.booking_repo.create_review(&booking, rating, comment).await?;

        info!("Review submitted: booking={}, rating={}", booking_id, rating);
        Ok(review)
    }

    pub async fn teacher_reviews(&self, teacher_id: &str) -> AppResult<TeacherReviews> {
        let reviews = self.booking_repo.teacher_reviews(teacher_id).await?;
        Ok(TeacherReviews {
            average_rating: average_rating(&reviews),
            review_count: reviews.len(),
            reviews,
        })
    }

    pub async fn teacher_stats(&self, teacher_id: &str) -> AppResult<TeacherStats> {
        Ok(self.booking_repo.teacher_stats(teacher_id, Self::now()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: i32) -> LessonReview {
        let now = Utc::now().naive_utc();
        LessonReview {
            id: 1,
            booking_id: 1,
            student_id: "s".into(),
            teacher_id: "t".into(),
            rating,
            comment: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn test_average_rating() {
        assert_eq!(average_rating(&[]), None);
        assert_eq!(average_rating(&[review(4), review(5)]), Some(4.5));
    }
}

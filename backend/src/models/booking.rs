//! Private lesson bookings, availability slots and reviews

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle of a private lesson booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled bookings never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

impl From<String> for BookingStatus {
    fn from(s: String) -> Self {
        Self::from_str(&s).unwrap_or(BookingStatus::Pending)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LessonBooking {
    pub id: i32,
    pub student_id: String,
    pub teacher_id: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: String, // Stored as TEXT, use BookingStatus enum for type safety
    pub meet_link: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl LessonBooking {
    pub fn status_enum(&self) -> BookingStatus {
        BookingStatus::from_str(&self.status).unwrap_or(BookingStatus::Pending)
    }
}

/// Booking listing row joined with the other party's name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub id: i32,
    pub student_id: String,
    pub teacher_id: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: String,
    pub meet_link: Option<String>,
    pub notes: Option<String>,
    pub counterpart_name: String,
    pub counterpart_avatar: String,
    pub has_review: bool,
}

/// 30-minute slot a teacher opened for bookings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeacherAvailability {
    pub id: i32,
    pub teacher_id: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// 0 = Sunday
    pub day_of_week: i32,
    pub week_start_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LessonReview {
    pub id: i32,
    pub booking_id: i32,
    pub student_id: String,
    pub teacher_id: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Subject and grade a teacher was approved for
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeacherField {
    pub id: i32,
    pub teacher_id: String,
    pub subject: String,
    pub grade: String,
    pub display_name: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Public listing of a bookable teacher
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherProfile {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub description: String,
    pub fields: Vec<TeacherField>,
    pub average_rating: Option<f64>,
    pub review_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeacherStats {
    pub completed_lessons: i64,
    pub upcoming_lessons: i64,
    pub cancelled_lessons: i64,
    pub review_count: i64,
    pub average_rating: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_status_conversion() {
        assert_eq!(BookingStatus::Pending.as_str(), "pending");
        assert_eq!(BookingStatus::from_str("Confirmed"), Ok(BookingStatus::Confirmed));
        assert!(BookingStatus::from_str("expired").is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(!BookingStatus::Pending.is_terminal());
        assert!(!BookingStatus::Confirmed.is_terminal());
    }
}

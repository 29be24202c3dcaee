//! Booking and availability rules for private lessons.
//!
//! All instants are naive UTC, matching the `TIMESTAMP` columns.

use super::streak::{local_day_start_utc, local_today};
use crate::error::{AppError, AppResult};
use crate::models::{BookingStatus, LessonBooking};
use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Timelike, Utc};

pub const SLOT_MINUTES: i64 = 30;
pub const CANCELLATION_NOTICE_HOURS: i64 = 24;

/// Monday 00:00 of the platform week containing `now`, as UTC
pub fn week_start(now: DateTime<Utc>, offset_hours: i32) -> NaiveDateTime {
    let today = local_today(now, offset_hours);
    let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    local_day_start_utc(monday, offset_hours)
}

/// Day of week (0 = Sunday) of a slot start on the platform clock
pub fn local_day_of_week(start: NaiveDateTime, offset_hours: i32) -> i32 {
    let local = start + Duration::hours(i64::from(offset_hours));
    local.weekday().num_days_from_sunday() as i32
}

/// Slots are exactly 30 minutes long and start on :00 or :30
pub fn validate_slot(start: NaiveDateTime, end: NaiveDateTime) -> AppResult<()> {
    let aligned = |t: NaiveDateTime| t.minute() % 30 == 0 && t.second() == 0 && t.nanosecond() == 0;
    if !aligned(start) || !aligned(end) || end - start != Duration::minutes(SLOT_MINUTES) {
        return Err(AppError::Validation(
            "Invalid time slot. All slots must be 30-minute intervals.".to_string(),
        ));
    }
    Ok(())
}

/// Split validated slots into (future, past) by start time
pub fn partition_past_slots(
    slots: Vec<(NaiveDateTime, NaiveDateTime)>,
    now: NaiveDateTime,
) -> (Vec<(NaiveDateTime, NaiveDateTime)>, Vec<(NaiveDateTime, NaiveDateTime)>) {
    slots.into_iter().partition(|(start, _)| *start >= now)
}

pub fn validate_booking_window(
    start: NaiveDateTime,
    end: NaiveDateTime,
    now: NaiveDateTime,
) -> AppResult<()> {
    if start >= end {
        return Err(AppError::Validation(
            "Start time must be before end time".to_string(),
        ));
    }
    if start <= now {
        return Err(AppError::Validation(
            "Cannot book lessons in the past".to_string(),
        ));
    }
    Ok(())
}

/// The requested interval must lie inside a single open slot
pub fn covered_by_slot(
    slots: &[(NaiveDateTime, NaiveDateTime)],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> bool {
    slots
        .iter()
        .any(|(slot_start, slot_end)| *slot_start <= start && end <= *slot_end)
}

/// Who may cancel and until when
pub fn check_cancellation(
    booking: &LessonBooking,
    requester_id: &str,
    now: NaiveDateTime,
) -> AppResult<()> {
    if booking.student_id != requester_id {
        return Err(AppError::Forbidden(
            "You can only cancel your own lessons".to_string(),
        ));
    }

    match booking.status_enum() {
        BookingStatus::Cancelled => {
            return Err(AppError::Validation("Lesson is already cancelled".to_string()))
        }
        BookingStatus::Completed => {
            return Err(AppError::Validation(
                "Completed lessons cannot be cancelled".to_string(),
            ))
        }
        BookingStatus::Pending | BookingStatus::Confirmed => {}
    }

    if booking.start_time - now < Duration::hours(CANCELLATION_NOTICE_HOURS) {
        return Err(AppError::Validation(
            "Lessons can only be cancelled at least 24 hours in advance".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn booking(status: &str, start: NaiveDateTime) -> LessonBooking {
        LessonBooking {
            id: 1,
            student_id: "student".into(),
            teacher_id: "teacher".into(),
            start_time: start,
            end_time: start + Duration::minutes(30),
            status: status.into(),
            meet_link: None,
            notes: None,
            created_at: at(1, 0, 0),
            updated_at: at(1, 0, 0),
        }
    }

    #[test]
    fn test_week_start_is_local_monday() {
        // Wednesday 2025-06-11 10:00 UTC
        let now = Utc.with_ymd_and_hms(2025, 6, 11, 10, 0, 0).unwrap();
        // Monday 00:00 UTC+3 == Sunday 21:00 UTC
        assert_eq!(week_start(now, 3), at(8, 21, 0));

        // Sunday 22:00 UTC is already Monday in Turkey
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 22, 0, 0).unwrap();
        assert_eq!(week_start(now, 3), at(15, 21, 0));
    }

    #[test]
    fn test_local_day_of_week() {
        // 2025-06-15 is a Sunday
        assert_eq!(local_day_of_week(at(15, 12, 0), 0), 0);
        assert_eq!(local_day_of_week(at(15, 22, 0), 3), 1);
    }

    #[test]
    fn test_slot_validation() {
        assert!(validate_slot(at(10, 9, 0), at(10, 9, 30)).is_ok());
        assert!(validate_slot(at(10, 9, 30), at(10, 10, 0)).is_ok());
        assert!(validate_slot(at(10, 9, 15), at(10, 9, 45)).is_err());
        assert!(validate_slot(at(10, 9, 0), at(10, 10, 0)).is_err());
    }

    #[test]
    fn test_past_slots_are_partitioned() {
        let now = at(10, 12, 0);
        let slots = vec![(at(10, 11, 0), at(10, 11, 30)), (at(10, 13, 0), at(10, 13, 30))];
        let (future, past) = partition_past_slots(slots, now);
        assert_eq!(future, vec![(at(10, 13, 0), at(10, 13, 30))]);
        assert_eq!(past.len(), 1);
    }

    #[test]
    fn test_booking_window() {
        let now = at(10, 12, 0);
        assert!(validate_booking_window(at(11, 9, 0), at(11, 9, 30), now).is_ok());
        assert!(validate_booking_window(at(11, 9, 30), at(11, 9, 0), now).is_err());
        assert!(validate_booking_window(at(10, 11, 0), at(10, 11, 30), now).is_err());
    }

    #[test]
    fn test_interval_must_fit_one_slot() {
        let slots = [(at(10, 9, 0), at(10, 9, 30))];
        assert!(covered_by_slot(&slots, at(10, 9, 0), at(10, 9, 30)));
        assert!(!covered_by_slot(&slots, at(10, 9, 0), at(10, 10, 0)));
    }

    #[test]
    fn test_cancellation_policy() {
        let now = at(10, 12, 0);

        assert!(check_cancellation(&booking("pending", at(12, 12, 0)), "student", now).is_ok());
        assert!(matches!(
            check_cancellation(&booking("pending", at(12, 12, 0)), "other", now),
            Err(AppError::Forbidden(_))
        ));
        assert!(check_cancellation(&booking("cancelled", at(12, 12, 0)), "student", now).is_err());
        assert!(check_cancellation(&booking("completed", at(12, 12, 0)), "student", now).is_err());
        // 23 hours of notice is not enough
        assert!(check_cancellation(&booking("confirmed", at(11, 11, 0)), "student", now).is_err());
        assert!(check_cancellation(&booking("confirmed", at(11, 12, 0)), "student", now).is_ok());
    }
}

use axum::http::StatusCode;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use sukull_backend::domain::scoring::{complete_challenge, refill_hearts, wrong_answer, REFILL_COST};
use sukull_backend::domain::tutoring::week_start;
use sukull_backend::domain::*;
use sukull_backend::error::{AppError, RepositoryError};
use sukull_backend::models::*;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, d).unwrap()
}

fn fresh_state() -> StreakState {
    StreakState {
        istikrar: 0,
        points: 0,
        daily_target: DEFAULT_DAILY_TARGET,
        previous_total_points: 0,
        last_streak_check: None,
        streak_credited_on: None,
    }
}

/// Unit tests for a learner's week of daily targets
#[test]
fn test_streak_over_several_days() {
    let mut state = fresh_state();

    // Day 1: open the day, then earn the target
    state = check_streak_continuity(state, day(1)).state;
    state.points += 60;
    let eval = evaluate_daily_streak(state, day(1));
    assert!(eval.credited_today);
    state = eval.state;
    assert_eq!(state.istikrar, 1);

    // More points on the same day do not count twice
    state.points += 60;
    let eval = evaluate_daily_streak(state, day(1));
    assert!(!eval.credited_today);
    state = eval.state;
    assert_eq!(state.istikrar, 1);

    // Day 2: baseline moves to the current total
    state = check_streak_continuity(state, day(2)).state;
    assert_eq!(state.previous_total_points, 120);
    state.points += 50;
    state = evaluate_daily_streak(state, day(2)).state;
    assert_eq!(state.istikrar, 2);

    // Day 3 skipped, day 4 resets
    let eval = check_streak_continuity(state, day(4));
    assert!(eval.reset);
    assert_eq!(eval.state.istikrar, 0);
}

#[test]
fn test_unevaluated_day_is_credited_at_rollover() {
    let state = StreakState {
        points: 80,
        previous_total_points: 20,
        last_streak_check: Some(day(1)),
        ..fresh_state()
    };

    let eval = check_streak_continuity(state, day(2));
    assert_eq!(eval.closed_day, Some((day(1), true)));
    assert_eq!(eval.state.istikrar, 1);
    assert!(!eval.reset);
}

#[test]
fn test_platform_day_boundary() {
    // 21:30 UTC is already the next day at UTC+3
    let late = Utc.with_ymd_and_hms(2025, 9, 1, 21, 30, 0).unwrap();
    assert_eq!(local_today(late, 3), day(2));
    assert_eq!(local_today(late, 0), day(1));

    let start = local_day_start_utc(day(2), 3);
    assert_eq!(start, day(1).and_hms_opt(21, 0, 0).unwrap());
}

#[test]
fn test_week_starts_on_local_monday() {
    // Wednesday 2025-09-03 10:00 UTC
    let now = Utc.with_ymd_and_hms(2025, 9, 3, 10, 0, 0).unwrap();
    let monday = week_start(now, 3);
    assert_eq!(monday, day(1).and_hms_opt(0, 0, 0).unwrap() - Duration::hours(3));
}

#[test]
fn test_lesson_streak_sequence() {
    assert_eq!(lesson_completion_streak(None, day(1), 0), Some(1));
    assert_eq!(lesson_completion_streak(Some(day(1)), day(2), 1), Some(2));
    assert_eq!(lesson_completion_streak(Some(day(2)), day(2), 2), None);
    assert_eq!(lesson_completion_streak(Some(day(2)), day(5), 2), Some(1));
}

/// Unit tests for hearts and points
#[test]
fn test_losing_all_hearts_then_refilling() {
    let mut score = Score {
        hearts: MAX_HEARTS,
        points: REFILL_COST + 100,
    };

    for _ in 0..MAX_HEARTS {
        score = wrong_answer(score, false, false).1;
    }
    assert_eq!(score.hearts, 0);
    assert_eq!(score.points, REFILL_COST + 100 - 50);

    let (outcome, blocked) = complete_challenge(score, false, false);
    assert_eq!(outcome, ChallengeOutcome::Hearts);
    assert_eq!(blocked, score);

    let refilled = refill_hearts(score).unwrap();
    assert_eq!(refilled.hearts, MAX_HEARTS);
    assert_eq!(refilled.points, 50);
}

#[test]
fn test_infinite_hearts_keep_playing() {
    let score = Score { hearts: 0, points: 30 };
    let (outcome, next) = complete_challenge(score, false, true);
    assert_eq!(outcome, ChallengeOutcome::Completed);
    assert_eq!(next.points, 40);
}

/// Unit tests for streak-gated features
#[test]
fn test_requirements_unlock_in_order() {
    let none = Unlocks::default();
    let at = |days: i32| {
        StreakRequirement::ALL
            .iter()
            .filter(|r| check_requirement(**r, days, &none).allowed)
            .count()
    };

    assert_eq!(at(0), 0);
    assert_eq!(at(10), 1);
    assert!(at(30) > at(20));
    assert_eq!(at(50), StreakRequirement::ALL.len());
}

#[test]
fn test_unlocks_survive_streak_loss() {
    let earned = milestone_unlocks(30, Unlocks::default());
    assert!(earned.profile_editing);
    assert!(earned.code_share);

    let after_reset = milestone_unlocks(0, earned);
    assert_eq!(after_reset, earned);

    let check = check_requirement(StreakRequirement::SchoolSelection, 0, &after_reset);
    assert!(check.allowed);
    assert!(check.permanently_unlocked);
}

/// Unit tests for Models
#[test]
fn test_role_conversion() {
    assert_eq!(UserRole::from_str("teacher").unwrap(), UserRole::Teacher);
    assert_eq!(UserRole::Admin.as_str(), "admin");
    assert!(UserRole::from_str("owner").is_err());
}

#[test]
fn test_booking_status_conversion() {
    for status in [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ] {
        assert_eq!(BookingStatus::from_str(status.as_str()).unwrap(), status);
    }
}

#[test]
fn test_school_type_conversion() {
    assert_eq!(SchoolType::from_str("high_school").unwrap(), SchoolType::HighSchool);
    assert_eq!(SchoolType::University.as_str(), "university");
}

/// Unit tests for Error Handling
#[test]
fn test_error_status_codes() {
    let cases = [
        (AppError::Unauthorized("Unauthorized".into()), StatusCode::UNAUTHORIZED),
        (AppError::Forbidden("no".into()), StatusCode::FORBIDDEN),
        (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
        (AppError::Conflict("dup".into()), StatusCode::CONFLICT),
        (AppError::NotFound("gone".into()), StatusCode::NOT_FOUND),
    ];
    for (error, status) in cases {
        assert_eq!(error.status_code(), status);
    }

    let business: AppError =
        RepositoryError::BusinessRule("This time slot is already booked".into()).into();
    assert_eq!(business.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(business.to_string(), "This time slot is already booked");
}

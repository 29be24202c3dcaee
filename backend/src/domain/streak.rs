//! Streak arithmetic over platform days.
//!
//! The platform day is the calendar day at a fixed UTC offset (UTC+3 in
//! production). Everything here is a pure function of dates and counters;
//! persistence lives in `services::streak`.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use crate::models::UserProgress;
use serde::Serialize;

fn offset(offset_hours: i32) -> FixedOffset {
    FixedOffset::east_opt(offset_hours * 3600).unwrap_or_else(|| Utc.fix())
}

/// Calendar date of `now` on the platform clock
pub fn local_today(now: DateTime<Utc>, offset_hours: i32) -> NaiveDate {
    now.with_timezone(&offset(offset_hours)).date_naive()
}

/// UTC instant at which the given platform day begins
pub fn local_day_start_utc(date: NaiveDate, offset_hours: i32) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) - Duration::hours(i64::from(offset_hours))
}

/// New lesson streak after completing a lesson on `today`.
///
/// `None` means a lesson was already completed today and nothing changes.
/// A gap of exactly one day extends the streak, anything else restarts it
/// at 1.
pub fn lesson_completion_streak(
    last_completed: Option<NaiveDate>,
    today: NaiveDate,
    current: i32,
) -> Option<i32> {
    match last_completed {
        Some(last) if last == today => None,
        Some(last) if today.signed_duration_since(last).num_days() == 1 => Some(current + 1),
        _ => Some(1),
    }
}

/// Columns of `user_progress` the daily target streak reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub istikrar: i32,
    pub points: i32,
    pub daily_target: i32,
    pub previous_total_points: i32,
    pub last_streak_check: Option<NaiveDate>,
    pub streak_credited_on: Option<NaiveDate>,
}

impl From<&UserProgress> for StreakState {
    fn from(progress: &UserProgress) -> Self {
        Self {
            istikrar: progress.istikrar,
            points: progress.points,
            daily_target: progress.daily_target,
            previous_total_points: progress.previous_total_points,
            last_streak_check: progress.last_streak_check,
            streak_credited_on: progress.streak_credited_on,
        }
    }
}

impl StreakState {
    pub fn earned_since_baseline(&self) -> i32 {
        self.points.saturating_sub(self.previous_total_points)
    }

    fn credited(&self, day: NaiveDate) -> bool {
        self.streak_credited_on == Some(day)
    }
}

/// Outcome of evaluating a streak state on a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakEvaluation {
    pub state: StreakState,
    /// The stored check date was older than today
    pub rolled_over: bool,
    /// A positive streak was dropped to zero
    pub reset: bool,
    /// Today's target was credited during this evaluation
    pub credited_today: bool,
    pub achieved_today: bool,
    /// Day closed out by the rollover and whether its target was met
    pub closed_day: Option<(NaiveDate, bool)>,
}

/// Rollover half of the evaluation: close out the previous check day and
/// keep the streak only if yesterday's target was credited.
pub fn check_streak_continuity(state: StreakState, today: NaiveDate) -> StreakEvaluation {
    let mut next = state;
    let mut evaluation = StreakEvaluation {
        state,
        rolled_over: false,
        reset: false,
        credited_today: false,
        achieved_today: state.credited(today),
        closed_day: None,
    };

    if matches!(state.last_streak_check, Some(last) if last >= today) {
        return evaluation;
    }

    if let Some(last) = state.last_streak_check {
        // Points earned on the last check day that were never evaluated
        if !next.credited(last) && next.earned_since_baseline() >= next.daily_target {
            next.istikrar += 1;
            next.streak_credited_on = Some(last);
        }
        evaluation.closed_day = Some((last, next.credited(last)));
    }

    let yesterday = today - Duration::days(1);
    if !next.credited(yesterday) && next.istikrar > 0 {
        next.istikrar = 0;
        evaluation.reset = true;
    }

    next.previous_total_points = next.points;
    next.last_streak_check = Some(today);

    evaluation.state = next;
    evaluation.rolled_over = true;
    evaluation
}

/// Full daily target evaluation for `today`.
///
/// After the rollover, today's target is credited once the points earned
/// since the day's baseline reach the user's daily target. A day is
/// credited at most once.
pub fn evaluate_daily_streak(state: StreakState, today: NaiveDate) -> StreakEvaluation {
    let mut evaluation = check_streak_continuity(state, today);
    let mut next = evaluation.state;

    if !next.credited(today) && next.earned_since_baseline() >= next.daily_target {
        next.istikrar += 1;
        next.streak_credited_on = Some(today);
        evaluation.credited_today = true;
    }

    evaluation.achieved_today = next.credited(today);
    evaluation.state = next;
    evaluation
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state(points: i32, baseline: i32, istikrar: i32) -> StreakState {
        StreakState {
            istikrar,
            points,
            daily_target: 50,
            previous_total_points: baseline,
            last_streak_check: None,
            streak_credited_on: None,
        }
    }

    #[test]
    fn test_local_today_uses_offset() {
        // 22:30 UTC on the 1st is already the 2nd in Turkey
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 22, 30, 0).unwrap();
        assert_eq!(local_today(now, 3), day(2025, 3, 2));
        assert_eq!(local_today(now, 0), day(2025, 3, 1));
    }

    #[test]
    fn test_local_day_start_utc() {
        let start = local_day_start_utc(day(2025, 3, 2), 3);
        assert_eq!(start.to_string(), "2025-03-01 21:00:00");
    }

    #[test]
    fn test_lesson_streak_first_completion() {
        assert_eq!(lesson_completion_streak(None, day(2025, 1, 10), 0), Some(1));
    }

    #[test]
    fn test_lesson_streak_same_day_is_noop() {
        let today = day(2025, 1, 10);
        assert_eq!(lesson_completion_streak(Some(today), today, 4), None);
    }

    #[test]
    fn test_lesson_streak_consecutive_day_increments() {
        assert_eq!(
            lesson_completion_streak(Some(day(2025, 1, 9)), day(2025, 1, 10), 4),
            Some(5)
        );
        // Month boundary
        assert_eq!(
            lesson_completion_streak(Some(day(2025, 1, 31)), day(2025, 2, 1), 2),
            Some(3)
        );
    }

    #[test]
    fn test_lesson_streak_gap_restarts() {
        assert_eq!(
            lesson_completion_streak(Some(day(2025, 1, 7)), day(2025, 1, 10), 9),
            Some(1)
        );
    }

    #[test]
    fn test_first_evaluation_sets_baseline() {
        let today = day(2025, 5, 1);
        let eval = evaluate_daily_streak(state(120, 0, 0), today);

        assert!(eval.rolled_over);
        assert_eq!(eval.state.previous_total_points, 120);
        assert_eq!(eval.state.last_streak_check, Some(today));
        assert_eq!(eval.state.istikrar, 0);
        assert!(!eval.achieved_today);
        assert_eq!(eval.closed_day, None);
    }

    #[test]
    fn test_target_met_credits_once() {
        let today = day(2025, 5, 1);
        let mut s = state(160, 100, 3);
        s.last_streak_check = Some(today);
        s.streak_credited_on = Some(day(2025, 4, 30));

        let eval = evaluate_daily_streak(s, today);
        assert!(eval.credited_today);
        assert_eq!(eval.state.istikrar, 4);

        // More points later the same day do not count twice
        let mut again = eval.state;
        again.points += 200;
        let eval = evaluate_daily_streak(again, today);
        assert!(!eval.credited_today);
        assert!(eval.achieved_today);
        assert_eq!(eval.state.istikrar, 4);
    }

    #[test]
    fn test_below_target_does_not_credit() {
        let today = day(2025, 5, 1);
        let mut s = state(140, 100, 2);
        s.last_streak_check = Some(today);
        s.streak_credited_on = Some(day(2025, 4, 30));

        let eval = evaluate_daily_streak(s, today);
        assert!(!eval.credited_today);
        assert_eq!(eval.state.istikrar, 2);
    }

    #[test]
    fn test_rollover_keeps_streak_when_yesterday_credited() {
        let yesterday = day(2025, 5, 1);
        let today = day(2025, 5, 2);
        let mut s = state(300, 240, 5);
        s.last_streak_check = Some(yesterday);
        s.streak_credited_on = Some(yesterday);

        let eval = check_streak_continuity(s, today);
        assert!(eval.rolled_over);
        assert!(!eval.reset);
        assert_eq!(eval.state.istikrar, 5);
        assert_eq!(eval.state.previous_total_points, 300);
        assert_eq!(eval.closed_day, Some((yesterday, true)));
    }

    #[test]
    fn test_rollover_resets_when_yesterday_missed() {
        let yesterday = day(2025, 5, 1);
        let today = day(2025, 5, 2);
        let mut s = state(260, 240, 5);
        s.last_streak_check = Some(yesterday);
        s.streak_credited_on = Some(day(2025, 4, 30));

        let eval = check_streak_continuity(s, today);
        assert!(eval.reset);
        assert_eq!(eval.state.istikrar, 0);
        assert_eq!(eval.closed_day, Some((yesterday, false)));
    }

    #[test]
    fn test_rollover_credits_unevaluated_points_of_last_day() {
        let yesterday = day(2025, 5, 1);
        let today = day(2025, 5, 2);
        let mut s = state(300, 240, 5);
        s.last_streak_check = Some(yesterday);
        s.streak_credited_on = Some(day(2025, 4, 30));

        let eval = check_streak_continuity(s, today);
        assert!(!eval.reset);
        assert_eq!(eval.state.istikrar, 6);
        assert_eq!(eval.state.streak_credited_on, Some(yesterday));
        assert_eq!(eval.closed_day, Some((yesterday, true)));
    }

    #[test]
    fn test_rollover_after_several_idle_days_resets() {
        let mut s = state(500, 400, 12);
        s.last_streak_check = Some(day(2025, 5, 1));
        s.streak_credited_on = Some(day(2025, 5, 1));

        let eval = check_streak_continuity(s, day(2025, 5, 4));
        assert!(eval.reset);
        assert_eq!(eval.state.istikrar, 0);
        assert_eq!(eval.state.last_streak_check, Some(day(2025, 5, 4)));
    }

    #[test]
    fn test_continuity_is_idempotent_within_a_day() {
        let today = day(2025, 5, 2);
        let mut s = state(300, 240, 5);
        s.last_streak_check = Some(today);
        s.streak_credited_on = Some(day(2025, 5, 1));

        let eval = check_streak_continuity(s, today);
        assert!(!eval.rolled_over);
        assert_eq!(eval.state, s);
    }

    #[test]
    fn test_custom_daily_target() {
        let today = day(2025, 5, 2);
        let mut s = state(120, 100, 0);
        s.daily_target = 20;
        s.last_streak_check = Some(today);

        let eval = evaluate_daily_streak(s, today);
        assert!(eval.credited_today);
        assert_eq!(eval.state.istikrar, 1);
    }

    #[test]
    fn test_extreme_totals_do_not_overflow() {
        let today = day(2025, 5, 2);
        let mut s = state(i32::MIN + 10, 1000, 2);
        s.last_streak_check = Some(today);
        assert_eq!(s.earned_since_baseline(), i32::MIN);

        let eval = evaluate_daily_streak(s, today);
        assert!(!eval.credited_today);

        let rolled = check_streak_continuity(s, day(2025, 5, 3));
        assert_eq!(rolled.closed_day, Some((today, false)));
    }
}

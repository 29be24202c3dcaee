//! Database-free business rules

pub mod requirements;
pub mod scoring;
pub mod streak;
pub mod tutoring;

pub use requirements::{
    check_requirement, has_achieved_milestone, milestone_unlocks, remaining_days,
    RequirementCheck, StreakRequirement, Unlocks,
};
pub use scoring::{ChallengeOutcome, Score};
pub use streak::{
    check_streak_continuity, evaluate_daily_streak, lesson_completion_streak, local_day_start_utc,
    local_today, StreakEvaluation, StreakState,
};

//! Hearts and points bookkeeping for the lesson player

use crate::models::MAX_HEARTS;
use serde::Serialize;

pub const CHALLENGE_POINTS: i32 = 10;
pub const PRACTICE_POINTS: i32 = 2;
pub const WRONG_ANSWER_PENALTY: i32 = 10;
pub const REFILL_COST: i32 = 200;
/// Largest gain or loss a single mini game may report
pub const MAX_GAME_POINTS: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    pub hearts: i32,
    pub points: i32,
}

/// What a challenge attempt did to the learner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeOutcome {
    /// First correct answer
    Completed,
    /// Attempt on an already completed challenge
    Practice,
    /// Out of hearts, nothing was recorded
    Hearts,
    /// Wrong answer cost a heart and points
    Penalized,
}

pub fn complete_challenge(
    score: Score,
    already_completed: bool,
    infinite_hearts: bool,
) -> (ChallengeOutcome, Score) {
    if already_completed {
        return (
            ChallengeOutcome::Practice,
            Score {
                hearts: (score.hearts + 1).min(MAX_HEARTS),
                points: score.points + PRACTICE_POINTS,
            },
        );
    }

    if score.hearts <= 0 && !infinite_hearts {
        return (ChallengeOutcome::Hearts, score);
    }

    (
        ChallengeOutcome::Completed,
        Score {
            hearts: score.hearts,
            points: score.points + CHALLENGE_POINTS,
        },
    )
}

pub fn wrong_answer(
    score: Score,
    already_completed: bool,
    infinite_hearts: bool,
) -> (ChallengeOutcome, Score) {
    if already_completed {
        return (ChallengeOutcome::Practice, score);
    }

    if infinite_hearts {
        return (
            ChallengeOutcome::Penalized,
            Score {
                hearts: score.hearts,
                points: score.points - WRONG_ANSWER_PENALTY,
            },
        );
    }

    if score.hearts <= 0 {
        return (ChallengeOutcome::Hearts, score);
    }

    (
        ChallengeOutcome::Penalized,
        Score {
            hearts: (score.hearts - 1).max(0),
            points: score.points - WRONG_ANSWER_PENALTY,
        },
    )
}

pub fn refill_hearts(score: Score) -> Result<Score, &'static str> {
    if score.hearts >= MAX_HEARTS {
        return Err("Hearts are already full");
    }
    if score.points < REFILL_COST {
        return Err("Not enough points");
    }
    Ok(Score {
        hearts: MAX_HEARTS,
        points: score.points - REFILL_COST,
    })
}

/// Mini game deltas are non-zero and bounded
pub fn validate_game_points(delta: i32) -> Result<(), String> {
    if delta == 0 {
        return Err("Points must not be zero".to_string());
    }
    if delta.unsigned_abs() > MAX_GAME_POINTS as u32 {
        return Err(format!("Points must be between -{0} and {0}", MAX_GAME_POINTS));
    }
    Ok(())
}

/// Rounded share of completed challenges, 0 for an empty lesson
pub fn lesson_percentage(completed: usize, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(hearts: i32, points: i32) -> Score {
        Score { hearts, points }
    }

    #[test]
    fn test_first_completion_awards_points() {
        let (outcome, next) = complete_challenge(score(3, 40), false, false);
        assert_eq!(outcome, ChallengeOutcome::Completed);
        assert_eq!(next, score(3, 50));
    }

    #[test]
    fn test_first_completion_blocked_without_hearts() {
        let (outcome, next) = complete_challenge(score(0, 40), false, false);
        assert_eq!(outcome, ChallengeOutcome::Hearts);
        assert_eq!(next, score(0, 40));

        // Infinite hearts ignore the empty heart bar
        let (outcome, _) = complete_challenge(score(0, 40), false, true);
        assert_eq!(outcome, ChallengeOutcome::Completed);
    }

    #[test]
    fn test_practice_restores_a_heart() {
        let (outcome, next) = complete_challenge(score(2, 40), true, false);
        assert_eq!(outcome, ChallengeOutcome::Practice);
        assert_eq!(next, score(3, 42));

        let (_, next) = complete_challenge(score(MAX_HEARTS, 40), true, false);
        assert_eq!(next.hearts, MAX_HEARTS);
    }

    #[test]
    fn test_wrong_answer_costs_heart_and_points() {
        let (outcome, next) = wrong_answer(score(3, 40), false, false);
        assert_eq!(outcome, ChallengeOutcome::Penalized);
        assert_eq!(next, score(2, 30));
    }

    #[test]
    fn test_wrong_answer_edge_cases() {
        assert_eq!(wrong_answer(score(3, 40), true, false).0, ChallengeOutcome::Practice);
        assert_eq!(wrong_answer(score(0, 40), false, false).0, ChallengeOutcome::Hearts);

        let (_, next) = wrong_answer(score(0, 40), false, true);
        assert_eq!(next, score(0, 30));
    }

    #[test]
    fn test_refill() {
        assert_eq!(refill_hearts(score(1, 250)), Ok(score(MAX_HEARTS, 50)));
        assert_eq!(refill_hearts(score(MAX_HEARTS, 250)), Err("Hearts are already full"));
        assert_eq!(refill_hearts(score(1, 199)), Err("Not enough points"));
    }

    #[test]
    fn test_lesson_percentage_rounds() {
        assert_eq!(lesson_percentage(0, 0), 0);
        assert_eq!(lesson_percentage(1, 3), 33);
        assert_eq!(lesson_percentage(2, 3), 67);
        assert_eq!(lesson_percentage(3, 3), 100);
    }

    #[test]
    fn test_game_points_bounds() {
        assert!(validate_game_points(MAX_GAME_POINTS).is_ok());
        assert!(validate_game_points(-MAX_GAME_POINTS).is_ok());
        assert!(validate_game_points(0).is_err());
        assert!(validate_game_points(MAX_GAME_POINTS + 1).is_err());
        assert!(validate_game_points(i32::MIN).is_err());
    }
}

//! Courses, lessons, hearts and points

use crate::domain::scoring::{lesson_percentage, validate_game_points, ChallengeOutcome, Score};
use crate::error::{option_to_result, AppError, AppResult};
use crate::models::{
    Challenge, ChallengeWithOptions, Course, CourseDetail, CourseProgress, Lesson, LessonDetail,
    LessonWithStatus, ProgressSummary, UnitWithLessonList, UnitWithLessons, User, UserProgress,
};
use crate::repositories::{CourseRepository, ProgressRepository, SchoolRepository};
use crate::services::StreakService;
use chrono::Utc;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_USER_IMAGE: &str = "/mascot_purple.svg";

/// Response of a challenge attempt
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResult {
    pub outcome: ChallengeOutcome,
    pub hearts: i32,
    pub points: i32,
    pub lesson_completed: bool,
    pub lesson_streak: Option<i32>,
}

/// Challenges of a set of lessons with the user's completion state
struct LessonCompletion {
    by_lesson: HashMap<i32, Vec<Challenge>>,
    completed: HashSet<i32>,
}

impl LessonCompletion {
    fn challenges(&self, lesson_id: i32) -> &[Challenge] {
        self.by_lesson
            .get(&lesson_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn is_complete(&self, lesson_id: i32) -> bool {
        let challenges = self.challenges(lesson_id);
        !challenges.is_empty() && challenges.iter().all(|c| self.completed.contains(&c.id))
    }

    fn completed_count(&self, lesson_id: i32) -> usize {
        self.challenges(lesson_id)
            .iter()
            .filter(|c| self.completed.contains(&c.id))
            .count()
    }
}

pub struct LearningService {
    course_repo: Arc<CourseRepository>,
    progress_repo: Arc<ProgressRepository>,
    school_repo: Arc<SchoolRepository>,
    streak: Arc<StreakService>,
}

impl LearningService {
    pub fn new(
        course_repo: Arc<CourseRepository>,
        progress_repo: Arc<ProgressRepository>,
        school_repo: Arc<SchoolRepository>,
        streak: Arc<StreakService>,
    ) -> Self {
        Self {
            course_repo,
            progress_repo,
            school_repo,
            streak,
        }
    }

    async fn load_completion(&self, user_id: &str, lessons: &[Lesson]) -> AppResult<LessonCompletion> {
        let lesson_ids: Vec<i32> = lessons.iter().map(|l| l.id).collect();
        let challenges = self.course_repo.challenges_for_lessons(&lesson_ids).await?;
        let challenge_ids: Vec<i32> = challenges.iter().map(|c| c.id).collect();
        let completed = self
            .course_repo
            .completed_challenge_ids(user_id, &challenge_ids)
            .await?;

        let mut by_lesson: HashMap<i32, Vec<Challenge>> = HashMap::new();
        for challenge in challenges {
            by_lesson.entry(challenge.lesson_id).or_default().push(challenge);
        }

        Ok(LessonCompletion {
            by_lesson,
            completed,
        })
    }

    // =========================================================================
    // Catalogue
    // =========================================================================

    pub async fn list_courses(&self) -> AppResult<Vec<Course>> {
        Ok(self.course_repo.list_courses().await?)
    }

    pub async fn course_detail(&self, course_id: i32) -> AppResult<CourseDetail> {
        let course = option_to_result(
            self.course_repo.find_course(course_id).await?,
            "Course not found",
        )?;
        let units = self.course_repo.units_for_course(course_id).await?;
        let lessons = self.course_repo.lessons_for_course(course_id).await?;

        let units = units
            .into_iter()
            .map(|unit| {
                let lessons = lessons
                    .iter()
                    .filter(|l| l.unit_id == unit.id)
                    .cloned()
                    .collect();
                UnitWithLessonList { unit, lessons }
            })
            .collect();

        Ok(CourseDetail { course, units })
    }

    // =========================================================================
    // Progress
    // =========================================================================

    pub async fn select_active_course(&self, user: &User, course_id: i32) -> AppResult<UserProgress> {
        let detail = self.course_detail(course_id).await?;

        let first_unit_has_lesson = detail
            .units
            .first()
            .map(|u| !u.lessons.is_empty())
            .unwrap_or(false);
        if !first_unit_has_lesson {
            return Err(AppError::BusinessLogic("Course is empty".to_string()));
        }

        let image = if user.avatar.is_empty() {
            DEFAULT_USER_IMAGE
        } else {
            user.avatar.as_str()
        };
        let progress = self
            .progress_repo
            .upsert_active_course(&user.id, course_id, &user.name, image)
            .await?;

        info!("Active course selected: user={}, course={}", user.id, course_id);
        Ok(progress)
    }

    pub async fn summary(&self, user_id: &str) -> AppResult<Option<ProgressSummary>> {
        let progress = self.progress_repo.find(user_id).await?;
        Ok(progress.as_ref().map(ProgressSummary::from))
    }

    /// Units of the active course with per-lesson completion
    pub async fn units(&self, user_id: &str) -> AppResult<Vec<UnitWithLessons>> {
        let Some(course_id) = self.active_course_id(user_id).await? else {
            return Ok(Vec::new());
        };

        let units = self.course_repo.units_for_course(course_id).await?;
        let lessons = self.course_repo.lessons_for_course(course_id).await?;
        let completion = self.load_completion(user_id, &lessons).await?;

        Ok(units
            .into_iter()
            .map(|unit| {
                let lessons = lessons
                    .iter()
                    .filter(|l| l.unit_id == unit.id)
                    .map(|l| LessonWithStatus {
                        lesson: l.clone(),
                        completed: completion.is_complete(l.id),
                    })
                    .collect();
                UnitWithLessons { unit, lessons }
            })
            .collect())
    }

    /// First unfinished lesson of the active course and its percentage
    pub async fn course_progress(&self, user_id: &str) -> AppResult<CourseProgress> {
        let empty = CourseProgress {
            active_lesson: None,
            active_lesson_id: None,
            lesson_percentage: 0,
        };
        let Some(course_id) = self.active_course_id(user_id).await? else {
            return Ok(empty);
        };

        let lessons = self.course_repo.lessons_for_course(course_id).await?;
        let completion = self.load_completion(user_id, &lessons).await?;

        let active = lessons.into_iter().find(|lesson| {
            completion
                .challenges(lesson.id)
                .iter()
                .any(|c| !completion.completed.contains(&c.id))
        });

        Ok(match active {
            Some(lesson) => CourseProgress {
                active_lesson_id: Some(lesson.id),
                lesson_percentage: lesson_percentage(
                    completion.completed_count(lesson.id),
                    completion.challenges(lesson.id).len(),
                ),
                active_lesson: Some(lesson),
            },
            None => empty,
        })
    }

    async fn active_course_id(&self, user_id: &str) -> AppResult<Option<i32>> {
        Ok(self
            .progress_repo
            .find(user_id)
            .await?
            .and_then(|p| p.active_course_id))
    }

    pub async fn lesson_detail(&self, user_id: &str, lesson_id: i32) -> AppResult<LessonDetail> {
        let lesson = option_to_result(
            self.course_repo.find_lesson(lesson_id).await?,
            "Lesson not found",
        )?;
        let challenges = self.course_repo.challenges_for_lessons(&[lesson_id]).await?;
        let challenge_ids: Vec<i32> = challenges.iter().map(|c| c.id).collect();
        let options = self.course_repo.options_for_challenges(&challenge_ids).await?;
        let completed = self
            .course_repo
            .completed_challenge_ids(user_id, &challenge_ids)
            .await?;

        let challenges = challenges
            .into_iter()
            .map(|challenge| ChallengeWithOptions {
                options: options
                    .iter()
                    .filter(|o| o.challenge_id == challenge.id)
                    .cloned()
                    .collect(),
                completed: completed.contains(&challenge.id),
                challenge,
            })
            .collect();

        Ok(LessonDetail { lesson, challenges })
    }

    // =========================================================================
    // Hearts and points
    // =========================================================================

    pub async fn complete_challenge(&self, user_id: &str, challenge_id: i32) -> AppResult<ChallengeResult> {
        self.attempt(user_id, challenge_id, true).await
    }

    pub async fn wrong_answer(&self, user_id: &str, challenge_id: i32) -> AppResult<ChallengeResult> {
        self.attempt(user_id, challenge_id, false).await
    }

    async fn attempt(&self, user_id: &str, challenge_id: i32, correct: bool) -> AppResult<ChallengeResult> {
        let challenge = option_to_result(
            self.course_repo.find_challenge(challenge_id).await?,
            "Challenge not found",
        )?;

        let (outcome, score) = self
            .progress_repo
            .record_challenge_attempt(
                user_id,
                challenge_id,
                correct,
                Utc::now().naive_utc(),
                self.streak.today(),
            )
            .await?;

        let mut result = ChallengeResult {
            outcome,
            hearts: score.hearts,
            points: score.points,
            lesson_completed: false,
            lesson_streak: None,
        };

        if matches!(outcome, ChallengeOutcome::Hearts) {
            return Ok(result);
        }

        self.after_points_changed(user_id).await?;

        if outcome == ChallengeOutcome::Completed
            && self
                .course_repo
                .is_lesson_complete(user_id, challenge.lesson_id)
                .await?
        {
            result.lesson_completed = true;
            result.lesson_streak = self.streak.mark_lesson_complete(user_id).await?;
        }

        Ok(result)
    }

    pub async fn refill_hearts(&self, user_id: &str) -> AppResult<Score> {
        let score = self.progress_repo.refill_hearts(user_id, self.streak.today()).await?;
        info!("Hearts refilled: user={}, points={}", user_id, score.points);
        self.after_points_changed(user_id).await?;
        Ok(score)
    }

    /// Points from mini games
    pub async fn add_points(&self, user_id: &str, delta: i32) -> AppResult<ProgressSummary> {
        validate_game_points(delta).map_err(AppError::Validation)?;
        let progress = self
            .progress_repo
            .add_points(user_id, delta, self.streak.today())
            .await?;
        self.after_points_changed(user_id).await?;
        Ok(ProgressSummary::from(&progress))
    }

    /// Keep the school total and the daily streak in step with the points
    async fn after_points_changed(&self, user_id: &str) -> AppResult<()> {
        if let Some(progress) = self.progress_repo.find(user_id).await? {
            if let Some(school_id) = progress.school_id {
                if let Err(e) = self.school_repo.recompute_total(school_id).await {
                    warn!("School total refresh failed: school={}, {}", school_id, e);
                }
            }
        }
        self.streak.record_activity(user_id).await?;
        Ok(())
    }
}

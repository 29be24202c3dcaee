use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Challenge kinds supported by the lesson player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengeType {
    Select,
    Assist,
    DragDrop,
    FillBlank,
    MatchPairs,
    Sequence,
    TimerChallenge,
}

impl ChallengeType {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_uppercase().as_str() {
            "SELECT" => Ok(ChallengeType::Select),
            "ASSIST" => Ok(ChallengeType::Assist),
            "DRAG_DROP" => Ok(ChallengeType::DragDrop),
            "FILL_BLANK" => Ok(ChallengeType::FillBlank),
            "MATCH_PAIRS" => Ok(ChallengeType::MatchPairs),
            "SEQUENCE" => Ok(ChallengeType::Sequence),
            "TIMER_CHALLENGE" => Ok(ChallengeType::TimerChallenge),
            _ => Err(format!("Invalid challenge type: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeType::Select => "SELECT",
            ChallengeType::Assist => "ASSIST",
            ChallengeType::DragDrop => "DRAG_DROP",
            ChallengeType::FillBlank => "FILL_BLANK",
            ChallengeType::MatchPairs => "MATCH_PAIRS",
            ChallengeType::Sequence => "SEQUENCE",
            ChallengeType::TimerChallenge => "TIMER_CHALLENGE",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i32,
    pub title: String,
    pub image_src: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub course_id: i32,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: i32,
    pub title: String,
    pub unit_id: i32,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: i32,
    pub lesson_id: i32,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub challenge_type: String,
    pub question: String,
    pub order: i32,
    /// Seconds, only for timer challenges
    pub time_limit: Option<i32>,
    pub metadata: Option<String>,
}

impl Challenge {
    pub fn type_enum(&self) -> Option<ChallengeType> {
        ChallengeType::from_str(&self.challenge_type).ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeOption {
    pub id: i32,
    pub challenge_id: i32,
    pub text: String,
    pub correct: bool,
    pub image_src: Option<String>,
    pub audio_src: Option<String>,
    pub correct_order: Option<i32>,
    pub pair_id: Option<i32>,
    pub is_blank: bool,
    pub drag_data: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeProgress {
    pub id: i32,
    pub user_id: String,
    pub challenge_id: i32,
    pub completed: bool,
}

/// Lesson row with the caller's completion state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonWithStatus {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitWithLessons {
    #[serde(flatten)]
    pub unit: Unit,
    pub lessons: Vec<LessonWithStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub units: Vec<UnitWithLessonList>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitWithLessonList {
    #[serde(flatten)]
    pub unit: Unit,
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeWithOptions {
    #[serde(flatten)]
    pub challenge: Challenge,
    pub options: Vec<ChallengeOption>,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDetail {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub challenges: Vec<ChallengeWithOptions>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub active_lesson: Option<Lesson>,
    pub active_lesson_id: Option<i32>,
    pub lesson_percentage: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_type_conversion() {
        for kind in [
            ChallengeType::Select,
            ChallengeType::Assist,
            ChallengeType::DragDrop,
            ChallengeType::FillBlank,
            ChallengeType::MatchPairs,
            ChallengeType::Sequence,
            ChallengeType::TimerChallenge,
        ] {
            assert_eq!(ChallengeType::from_str(kind.as_str()), Ok(kind));
        }
        assert!(ChallengeType::from_str("ESSAY").is_err());
    }

    #[test]
    fn test_challenge_serializes_type_field() {
        let challenge = Challenge {
            id: 1,
            lesson_id: 2,
            challenge_type: "SELECT".into(),
            question: "Hangisi bir meyvedir?".into(),
            order: 1,
            time_limit: None,
            metadata: None,
        };
        let json = serde_json::to_value(&challenge).unwrap();
        assert_eq!(json["type"], "SELECT");
        assert_eq!(json["lessonId"], 2);
    }
}

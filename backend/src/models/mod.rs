//! Domain models for the Sukull backend.
//!
//! Database-backed rows for accounts, the course catalogue, learner
//! progress, schools, the tutoring marketplace and the snippet board.

pub mod application;
pub mod booking;
pub mod course;
pub mod credits;
pub mod progress;
pub mod school;
pub mod snippet;
pub mod user;

// Re-export all models for convenient access
pub use application::{ApplicationStatus, StudentApplication, TeacherApplication};
pub use booking::{
    BookingStatus, BookingView, LessonBooking, LessonReview, TeacherAvailability, TeacherField,
    TeacherProfile, TeacherStats,
};
pub use course::{
    Challenge, ChallengeOption, ChallengeProgress, ChallengeType, ChallengeWithOptions, Course,
    CourseDetail, CourseProgress, Lesson, LessonDetail, LessonWithStatus, Unit,
    UnitWithLessonList, UnitWithLessons,
};
pub use credits::{CreditBalance, CreditTransaction, TransactionStatus, UserCredits};
pub use progress::{
    DailyStreakRecord, ProgressSummary, UserProgress, DEFAULT_DAILY_TARGET, MAX_HEARTS,
};
pub use school::{School, SchoolStanding, SchoolType, UserStanding};
pub use snippet::Snippet;
pub use user::{User, UserLink, UserRole};

pub mod application_repository;
pub mod booking_repository;
pub mod course_repository;
pub mod credit_repository;
pub mod progress_repository;
pub mod school_repository;
pub mod snippet_repository;
pub mod user_repository;

// Re-export all repositories for convenient access
pub use application_repository::{
    ApplicationRepository, FieldGrant, NewStudentApplication, NewTeacherApplication,
};
pub use booking_repository::{BookingRepository, NewSlot, SweepResult};
pub use course_repository::CourseRepository;
pub use credit_repository::CreditRepository;
pub use progress_repository::ProgressRepository;
pub use school_repository::{SchoolFilter, SchoolRepository};
pub use snippet_repository::{SnippetQuery, SnippetRepository};
pub use user_repository::{UserProfileChanges, UserRepository};

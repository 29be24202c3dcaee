pub mod applications;
pub mod credits;
pub mod learning;
pub mod profile;
pub mod schools;
pub mod snippets;
pub mod streak;
pub mod tutoring;

pub use applications::ApplicationService;
pub use credits::CreditService;
pub use learning::{ChallengeResult, LearningService};
pub use profile::{Me, ProfileService, ProfileUpdate};
pub use schools::{SchoolService, UserRank};
pub use snippets::{NewSnippet, SnippetService};
pub use streak::{DailyResetSummary, StreakOverview, StreakService};
pub use tutoring::{AvailabilityUpdate, SlotInput, TeacherReviews, TutoringService};

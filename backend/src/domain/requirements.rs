//! Features gated behind a minimum daily streak

use crate::models::UserProgress;
use serde::Serialize;

/// Unlock flags persisted on `user_progress`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Unlocks {
    pub profile_editing: bool,
    pub study_buddy: bool,
    pub code_share: bool,
}

impl From<&UserProgress> for Unlocks {
    fn from(progress: &UserProgress) -> Self {
        Self {
            profile_editing: progress.profile_editing_unlocked,
            study_buddy: progress.study_buddy_unlocked,
            code_share: progress.code_share_unlocked,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreakRequirement {
    UsernameChange,
    DailyGoalChange,
    AvatarChange,
    SchoolSelection,
    StudyBuddyFeatures,
    ProfileEditing,
    CodeSnippetSharing,
}

impl StreakRequirement {
    pub const ALL: [StreakRequirement; 7] = [
        StreakRequirement::UsernameChange,
        StreakRequirement::DailyGoalChange,
        StreakRequirement::AvatarChange,
        StreakRequirement::SchoolSelection,
        StreakRequirement::StudyBuddyFeatures,
        StreakRequirement::ProfileEditing,
        StreakRequirement::CodeSnippetSharing,
    ];

    pub fn required_days(&self) -> i32 {
        match self {
            StreakRequirement::UsernameChange => 10,
            StreakRequirement::DailyGoalChange => 20,
            StreakRequirement::AvatarChange => 30,
            StreakRequirement::SchoolSelection => 50,
            StreakRequirement::StudyBuddyFeatures => 15,
            StreakRequirement::ProfileEditing => 30,
            StreakRequirement::CodeSnippetSharing => 30,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreakRequirement::UsernameChange => "USERNAME_CHANGE",
            StreakRequirement::DailyGoalChange => "DAILY_GOAL_CHANGE",
            StreakRequirement::AvatarChange => "AVATAR_CHANGE",
            StreakRequirement::SchoolSelection => "SCHOOL_SELECTION",
            StreakRequirement::StudyBuddyFeatures => "STUDY_BUDDY_FEATURES",
            StreakRequirement::ProfileEditing => "PROFILE_EDITING",
            StreakRequirement::CodeSnippetSharing => "CODE_SNIPPET_SHARING",
        }
    }

    /// Message shown when the requirement blocks an action
    pub fn message(&self) -> String {
        let days = self.required_days();
        match self {
            StreakRequirement::UsernameChange => {
                format!("Kullanıcı adınızı değiştirmek için {} gün istikrarın olması gerekiyor.", days)
            }
            StreakRequirement::DailyGoalChange => {
                format!("Günlük hedefinizi değiştirmek için {} gün istikrarın olması gerekiyor.", days)
            }
            StreakRequirement::AvatarChange => {
                format!("Avatar resminizi değiştirmek için {} gün istikrarın olması gerekiyor.", days)
            }
            StreakRequirement::SchoolSelection => {
                format!("Okulunuzu seçmek için {} gün istikrarın olması gerekiyor.", days)
            }
            StreakRequirement::StudyBuddyFeatures => format!(
                "Çalışma arkadaşı özelliklerini kullanmak için {} gün istikrarın olması gerekiyor.",
                days
            ),
            StreakRequirement::ProfileEditing => {
                format!("Profil bilgilerini değiştirmek için {} gün istikrarın olması gerekiyor.", days)
            }
            StreakRequirement::CodeSnippetSharing => {
                format!("Kod parçacığı paylaşmak için {} gün istikrarın olması gerekiyor.", days)
            }
        }
    }

    /// Whether a permanent unlock already satisfies this requirement
    fn unlocked_by(&self, unlocks: &Unlocks) -> bool {
        match self {
            StreakRequirement::UsernameChange
            | StreakRequirement::DailyGoalChange
            | StreakRequirement::AvatarChange
            | StreakRequirement::SchoolSelection
            | StreakRequirement::ProfileEditing => unlocks.profile_editing,
            StreakRequirement::StudyBuddyFeatures => unlocks.study_buddy,
            StreakRequirement::CodeSnippetSharing => unlocks.code_share,
        }
    }
}

/// Result of checking one requirement against a user's streak
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementCheck {
    pub requirement: StreakRequirement,
    pub allowed: bool,
    pub current: i32,
    pub required: i32,
    pub remaining: i32,
    pub permanently_unlocked: bool,
    pub message: String,
    pub progress_message: String,
}

pub fn remaining_days(istikrar: i32, requirement: StreakRequirement) -> i32 {
    (requirement.required_days() - istikrar).max(0)
}

pub fn has_achieved_milestone(istikrar: i32, requirement: StreakRequirement) -> bool {
    istikrar >= requirement.required_days()
}

pub fn check_requirement(
    requirement: StreakRequirement,
    istikrar: i32,
    unlocks: &Unlocks,
) -> RequirementCheck {
    let required = requirement.required_days();
    let permanently_unlocked = requirement.unlocked_by(unlocks);
    let allowed = permanently_unlocked || has_achieved_milestone(istikrar, requirement);
    let remaining = remaining_days(istikrar, requirement);

    let progress_message = if permanently_unlocked {
        "🎉 Bu özellik kalıcı olarak açıldı!".to_string()
    } else if remaining == 0 {
        format!("🎉 Tebrikler! {} gün istikrarına ulaştın!", required)
    } else {
        format!(
            "📈 {} gün daha istikrar gerekiyor ({}/{})",
            remaining, istikrar, required
        )
    };

    RequirementCheck {
        requirement,
        allowed,
        current: istikrar,
        required,
        remaining,
        permanently_unlocked,
        message: requirement.message(),
        progress_message,
    }
}

/// Unlocks earned by reaching `istikrar`. Existing unlocks are never revoked.
pub fn milestone_unlocks(istikrar: i32, current: Unlocks) -> Unlocks {
    Unlocks {
        profile_editing: current.profile_editing
            || has_achieved_milestone(istikrar, StreakRequirement::ProfileEditing),
        study_buddy: current.study_buddy
            || has_achieved_milestone(istikrar, StreakRequirement::StudyBuddyFeatures),
        code_share: current.code_share
            || has_achieved_milestone(istikrar, StreakRequirement::CodeSnippetSharing),
    }
}

/// Rule table for clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementRule {
    pub requirement: StreakRequirement,
    pub required_days: i32,
    pub message: String,
}

pub fn rules() -> Vec<RequirementRule> {
    StreakRequirement::ALL
        .iter()
        .map(|r| RequirementRule {
            requirement: *r,
            required_days: r.required_days(),
            message: r.message(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        assert_eq!(StreakRequirement::UsernameChange.required_days(), 10);
        assert_eq!(StreakRequirement::DailyGoalChange.required_days(), 20);
        assert_eq!(StreakRequirement::AvatarChange.required_days(), 30);
        assert_eq!(StreakRequirement::SchoolSelection.required_days(), 50);
        assert_eq!(StreakRequirement::StudyBuddyFeatures.required_days(), 15);
        assert_eq!(StreakRequirement::ProfileEditing.required_days(), 30);
        assert_eq!(StreakRequirement::CodeSnippetSharing.required_days(), 30);
    }

    #[test]
    fn test_blocked_below_threshold() {
        let check = check_requirement(StreakRequirement::UsernameChange, 7, &Unlocks::default());
        assert!(!check.allowed);
        assert_eq!(check.remaining, 3);
        assert_eq!(check.progress_message, "📈 3 gün daha istikrar gerekiyor (7/10)");
        assert_eq!(
            check.message,
            "Kullanıcı adınızı değiştirmek için 10 gün istikrarın olması gerekiyor."
        );
    }

    #[test]
    fn test_blocking_messages() {
        let message = |r: StreakRequirement| check_requirement(r, 0, &Unlocks::default()).message;
        assert_eq!(
            message(StreakRequirement::AvatarChange),
            "Avatar resminizi değiştirmek için 30 gün istikrarın olması gerekiyor."
        );
        assert_eq!(
            message(StreakRequirement::SchoolSelection),
            "Okulunuzu seçmek için 50 gün istikrarın olması gerekiyor."
        );
        assert_eq!(
            message(StreakRequirement::ProfileEditing),
            "Profil bilgilerini değiştirmek için 30 gün istikrarın olması gerekiyor."
        );
        assert_eq!(
            message(StreakRequirement::CodeSnippetSharing),
            "Kod parçacığı paylaşmak için 30 gün istikrarın olması gerekiyor."
        );
    }

    #[test]
    fn test_allowed_at_threshold() {
        let check = check_requirement(StreakRequirement::UsernameChange, 10, &Unlocks::default());
        assert!(check.allowed);
        assert_eq!(check.remaining, 0);
        assert_eq!(check.progress_message, "🎉 Tebrikler! 10 gün istikrarına ulaştın!");
    }

    #[test]
    fn test_profile_unlock_covers_profile_requirements() {
        let unlocks = Unlocks {
            profile_editing: true,
            ..Unlocks::default()
        };
        let check = check_requirement(StreakRequirement::SchoolSelection, 0, &unlocks);
        assert!(check.allowed);
        assert!(check.permanently_unlocked);
        assert_eq!(check.progress_message, "🎉 Bu özellik kalıcı olarak açıldı!");

        // Does not leak into unrelated features
        let check = check_requirement(StreakRequirement::CodeSnippetSharing, 0, &unlocks);
        assert!(!check.allowed);
    }

    #[test]
    fn test_milestones_unlock_and_never_revoke() {
        let unlocks = milestone_unlocks(15, Unlocks::default());
        assert!(unlocks.study_buddy);
        assert!(!unlocks.profile_editing);

        let unlocks = milestone_unlocks(30, unlocks);
        assert!(unlocks.profile_editing && unlocks.code_share);

        // Streak lost, unlocks stay
        assert_eq!(milestone_unlocks(0, unlocks), unlocks);
    }

    #[test]
    fn test_rules_cover_every_requirement() {
        let table = rules();
        assert_eq!(table.len(), StreakRequirement::ALL.len());
        assert!(table.iter().any(|r| r.requirement == StreakRequirement::SchoolSelection
            && r.required_days == 50));
    }
}

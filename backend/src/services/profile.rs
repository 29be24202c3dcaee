use crate::domain::StreakRequirement;
use crate::error::{AppError, AppResult};
use crate::models::{ProgressSummary, User, UserLink};
use crate::repositories::{ProgressRepository, UserProfileChanges, UserRepository};
use crate::services::StreakService;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

pub const MAX_DAILY_TARGET: i32 = 1000;
pub const MAX_USERNAME_LENGTH: usize = 50;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Me {
    pub user: User,
    pub progress: Option<ProgressSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub user_name: Option<String>,
    pub daily_target: Option<i32>,
    pub avatar: Option<String>,
    pub description: Option<String>,
    pub links: Option<Vec<UserLink>>,
    pub meet_link: Option<String>,
}

pub fn validate_daily_target(value: i32) -> AppResult<()> {
    if !(1..=MAX_DAILY_TARGET).contains(&value) {
        return Err(AppError::Validation(format!(
            "Daily target must be between 1 and {}",
            MAX_DAILY_TARGET
        )));
    }
    Ok(())
}

pub fn validate_username(name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_USERNAME_LENGTH {
        return Err(AppError::Validation(format!(
            "Username must be 1 to {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}

pub struct ProfileService {
    user_repo: Arc<UserRepository>,
    progress_repo: Arc<ProgressRepository>,
    streak: Arc<StreakService>,
}

impl ProfileService {
    pub fn new(
        user_repo: Arc<UserRepository>,
        progress_repo: Arc<ProgressRepository>,
        streak: Arc<StreakService>,
    ) -> Self {
        Self {
            user_repo,
            progress_repo,
            streak,
        }
    }

    pub async fn me(&self, user: User) -> AppResult<Me> {
        let progress = self.progress_repo.find(&user.id).await?;
        Ok(Me {
            progress: progress.as_ref().map(ProgressSummary::from),
            user,
        })
    }

    /// Apply a profile update, enforcing the streak gate of each field
    pub async fn update(&self, user: &User, update: ProfileUpdate) -> AppResult<Me> {
        let user_name = update.user_name.as_deref().map(validate_username).transpose()?;
        if let Some(target) = update.daily_target {
            validate_daily_target(target)?;
        }

        let gated = [
            (user_name.is_some(), StreakRequirement::UsernameChange),
            (update.daily_target.is_some(), StreakRequirement::DailyGoalChange),
            (update.avatar.is_some(), StreakRequirement::AvatarChange),
        ];
        if gated.iter().any(|(requested, _)| *requested) {
            let progress = self.progress_repo.get(&user.id).await?;
            for (_, requirement) in gated.iter().filter(|(requested, _)| *requested) {
                self.streak.require(&progress, *requirement)?;
            }
        }

        let changes = UserProfileChanges {
            name: user_name.clone(),
            avatar: update.avatar.clone(),
            description: update.description,
            links: update.links.map(serde_json::to_value).transpose()?,
            meet_link: update.meet_link,
        };
        let updated = self.user_repo.update_profile(&user.id, &changes).await?;

        if user_name.is_some() || update.avatar.is_some() {
            self.progress_repo
                .update_display(&user.id, user_name.as_deref(), update.avatar.as_deref())
                .await?;
        }
        if let Some(target) = update.daily_target {
            self.progress_repo.update_daily_target(&user.id, target).await?;
        }

        info!("Profile updated: user={}", user.id);
        self.me(updated).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_target_bounds() {
        assert!(validate_daily_target(1).is_ok());
        assert!(validate_daily_target(1000).is_ok());
        assert!(validate_daily_target(0).is_err());
        assert!(validate_daily_target(1001).is_err());
    }

    #[test]
    fn test_username_is_trimmed() {
        assert_eq!(validate_username("  Zeynep ").unwrap(), "Zeynep");
        assert!(validate_username("   ").is_err());
        assert!(validate_username(&"ş".repeat(51)).is_err());
    }
}

use crate::domain::StreakRequirement;
use crate::error::{option_to_result, AppResult};
use crate::models::{School, SchoolStanding, SchoolType, UserStanding};
use crate::repositories::{ProgressRepository, SchoolFilter, SchoolRepository};
use crate::services::StreakService;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

pub const LEADERBOARD_SIZE: i64 = 10;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRank {
    pub global_rank: Option<i64>,
    pub school_rank: Option<i64>,
    pub school_standing: Option<i64>,
    pub school_points: Option<i32>,
    pub school_id: Option<i32>,
}

pub struct SchoolService {
    school_repo: Arc<SchoolRepository>,
    progress_repo: Arc<ProgressRepository>,
    streak: Arc<StreakService>,
}

impl SchoolService {
    pub fn new(
        school_repo: Arc<SchoolRepository>,
        progress_repo: Arc<ProgressRepository>,
        streak: Arc<StreakService>,
    ) -> Self {
        Self {
            school_repo,
            progress_repo,
            streak,
        }
    }

    pub async fn list(&self) -> AppResult<Vec<School>> {
        Ok(self.school_repo.list().await?)
    }

    pub async fn cities(&self) -> AppResult<Vec<String>> {
        Ok(self.school_repo.cities().await?)
    }

    pub async fn districts(&self, city: &str) -> AppResult<Vec<String>> {
        Ok(self.school_repo.districts(city).await?)
    }

    pub async fn filtered(&self, filter: &SchoolFilter) -> AppResult<Vec<School>> {
        Ok(self.school_repo.filtered(filter).await?)
    }

    /// Join a school; gated behind the school selection streak
    pub async fn select_school(&self, user_id: &str, school_id: i32) -> AppResult<School> {
        let progress = self.progress_repo.get(user_id).await?;
        self.streak.require(&progress, StreakRequirement::SchoolSelection)?;

        option_to_result(self.school_repo.find(school_id).await?, "School not found")?;

        let previous = self.progress_repo.set_school(user_id, school_id).await?;
        if let Some(old) = previous.filter(|old| *old != school_id) {
            self.school_repo.recompute_total(old).await?;
        }
        self.school_repo.recompute_total(school_id).await?;

        info!("School selected: user={}, school={}", user_id, school_id);
        option_to_result(self.school_repo.find(school_id).await?, "School not found")
    }

    pub async fn recompute_all(&self) -> AppResult<u64> {
        let updated = self.school_repo.recompute_all_totals().await?;
        info!("School totals recomputed: schools={}", updated);
        Ok(updated)
    }

    pub async fn top_users(&self) -> AppResult<Vec<UserStanding>> {
        Ok(self.progress_repo.top_users(LEADERBOARD_SIZE).await?)
    }

    pub async fn top_schools(&self, school_type: SchoolType) -> AppResult<Vec<SchoolStanding>> {
        Ok(self
            .school_repo
            .top_schools(school_type, LEADERBOARD_SIZE)
            .await?)
    }

    pub async fn user_rank(&self, user_id: &str) -> AppResult<UserRank> {
        let progress = self.progress_repo.find(user_id).await?;
        let school_id = progress.and_then(|p| p.school_id);

        let global_rank = self.progress_repo.user_rank(user_id, None).await?;
        let (school_rank, school_standing, school_points) = match school_id {
            Some(id) => {
                let (rank, standing, school) = futures::try_join!(
                    self.progress_repo.user_rank(user_id, Some(id)),
                    self.school_repo.school_rank(id),
                    self.school_repo.find(id),
                )?;
                (rank, standing, school.map(|s| s.total_points))
            }
            None => (None, None, None),
        };

        Ok(UserRank {
            global_rank,
            school_rank,
            school_standing,
            school_points,
            school_id,
        })
    }
}

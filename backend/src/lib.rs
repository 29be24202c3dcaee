//! Sukull Backend Library
//!
//! This module exposes the backend components for use by tests and other consumers.

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod domain;
pub mod error;
pub mod models;
pub mod repositories;
pub mod scheduler;
pub mod services;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use database::Database;
use repositories::*;
use services::*;
use std::sync::Arc;

/// Application state containing all repositories and services
pub struct AppState {
    pub database: Database,
    pub config: AppConfig,
    pub user_repo: Arc<UserRepository>,
    pub streak: Arc<StreakService>,
    pub learning: Arc<LearningService>,
    pub schools: Arc<SchoolService>,
    pub profile: Arc<ProfileService>,
    pub credits: Arc<CreditService>,
    pub tutoring: Arc<TutoringService>,
    pub applications: Arc<ApplicationService>,
    pub snippets: Arc<SnippetService>,
}

impl AppState {
    /// Create a new AppState with initialized repositories and services
    pub fn new(pool: sqlx::PgPool, config: AppConfig) -> Self {
        let database = Database::new(pool.clone());
        let offset_hours = config.scheduler.streak_utc_offset_hours;

        let user_repo = Arc::new(UserRepository::new(pool.clone()));
        let progress_repo = Arc::new(ProgressRepository::new(pool.clone()));
        let course_repo = Arc::new(CourseRepository::new(pool.clone()));
        let school_repo = Arc::new(SchoolRepository::new(pool.clone()));
        let booking_repo = Arc::new(BookingRepository::new(pool.clone()));
        let credit_repo = Arc::new(CreditRepository::new(pool.clone()));
        let application_repo = Arc::new(ApplicationRepository::new(pool.clone()));
        let snippet_repo = Arc::new(SnippetRepository::new(pool));

        let streak = Arc::new(StreakService::new(progress_repo.clone(), offset_hours));

        Self {
            database,
            learning: Arc::new(LearningService::new(
                course_repo,
                progress_repo.clone(),
                school_repo.clone(),
                streak.clone(),
            )),
            schools: Arc::new(SchoolService::new(
                school_repo,
                progress_repo.clone(),
                streak.clone(),
            )),
            profile: Arc::new(ProfileService::new(
                user_repo.clone(),
                progress_repo.clone(),
                streak.clone(),
            )),
            credits: Arc::new(CreditService::new(credit_repo, user_repo.clone())),
            tutoring: Arc::new(TutoringService::new(
                booking_repo,
                user_repo.clone(),
                offset_hours,
            )),
            applications: Arc::new(ApplicationService::new(application_repo)),
            snippets: Arc::new(SnippetService::new(
                snippet_repo,
                progress_repo,
                streak.clone(),
            )),
            streak,
            user_repo,
            config,
        }
    }
}

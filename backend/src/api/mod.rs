//! HTTP API served under `/api`

pub mod admin;
pub mod applications;
pub mod cron;
pub mod health;
pub mod learning;
pub mod profile;
pub mod schools;
pub mod snippets;
pub mod streak;
pub mod tutoring;

use crate::AppState;
use axum::routing::{get, patch, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the full application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health))
        .merge(learning_routes())
        .merge(community_routes())
        .merge(tutoring_routes())
        .merge(admin_routes())
        .merge(cron_routes())
}

/// Profile, catalogue, lesson player and streaks
fn learning_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/me", get(profile::me))
        .route("/me/profile", patch(profile::update_profile))
        .route("/courses", get(learning::list_courses))
        .route("/courses/{id}", get(learning::course_detail))
        .route("/progress", get(learning::progress))
        .route("/progress/active-course", post(learning::select_active_course))
        .route("/progress/units", get(learning::units))
        .route("/progress/course", get(learning::course_progress))
        .route("/lessons/{id}", get(learning::lesson_detail))
        .route("/challenges/{id}/complete", post(learning::complete_challenge))
        .route("/challenges/{id}/wrong", post(learning::wrong_answer))
        .route("/hearts/refill", post(learning::refill_hearts))
        .route("/points", post(learning::add_points))
        .route("/streak", get(streak::overview))
        .route("/streak/calendar", get(streak::calendar))
        .route("/streak/rules", get(streak::rules))
}

/// Schools, leaderboards and the snippet board
fn community_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/schools", get(schools::list))
        .route("/schools/cities", get(schools::cities))
        .route("/schools/districts", get(schools::districts))
        .route("/schools/filtered", get(schools::filtered))
        .route("/schools/select", post(schools::select))
        .route("/leaderboard/users", get(schools::top_users))
        .route("/leaderboard/schools", get(schools::top_schools))
        .route("/leaderboard/rank", get(schools::rank))
        .route("/snippets", get(snippets::list).post(snippets::create))
        .route("/snippets/{id}", axum::routing::delete(snippets::delete))
}

fn tutoring_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/credits", get(tutoring::credits))
        .route(
            "/teacher/availability",
            get(tutoring::my_availability).put(tutoring::set_availability),
        )
        .route("/teacher/stats", get(tutoring::teacher_stats))
        .route("/teachers", get(tutoring::teachers))
        .route("/teachers/{id}/availability", get(tutoring::teacher_availability))
        .route("/teachers/{id}/reviews", get(tutoring::teacher_reviews))
        .route("/bookings", post(tutoring::book))
        .route("/bookings/{id}/cancel", post(tutoring::cancel))
        .route("/bookings/student", get(tutoring::student_bookings))
        .route("/bookings/teacher", get(tutoring::teacher_bookings))
        .route("/reviews", post(tutoring::submit_review))
        .route("/applications/teacher", post(applications::submit_teacher))
        .route("/applications/student", post(applications::submit_student))
}

fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/teacher-applications", get(admin::teacher_applications))
        .route(
            "/admin/teacher-applications/{id}",
            patch(admin::review_teacher_application),
        )
        .route("/admin/student-applications", get(admin::student_applications))
        .route(
            "/admin/student-applications/{id}",
            patch(admin::review_student_application),
        )
        .route("/admin/credits/grant", post(admin::grant_credits))
        .route("/admin/daily-reset", post(admin::daily_reset))
}

fn cron_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cron/reset-streaks", post(cron::reset_streaks))
        .route("/cron/update-lesson-statuses", post(cron::update_lesson_statuses))
        .route("/cron/update-school-points", post(cron::update_school_points))
}

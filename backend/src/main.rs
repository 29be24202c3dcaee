//! Sukull Backend Service
//!
//! Main entry point for the Sukull learning platform backend.
//! This service provides:
//! - JSON HTTP API under `/api`
//! - Background scheduler for booking status sweeps and the daily streak reset

use std::net::SocketAddr;
use std::sync::Arc;
use sukull_backend::database::{create_pool, run_migrations};
use sukull_backend::scheduler::Scheduler;
use sukull_backend::{api, AppConfig, AppError, AppResult, AppState};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    // Initialize tracing/logging with config
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "sukull_backend={},tower_http=info,sqlx=warn",
            config.log_level
        )
        .into()
    });
    if config.is_production() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           Sukull Backend Service Starting                ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);
    info!("HTTP port: {}", config.http_port);
    info!(
        "Platform day offset: UTC{:+}",
        config.scheduler.streak_utc_offset_hours
    );

    // =========================================================================
    // DATABASE SETUP
    // =========================================================================
    info!("Connecting to database...");

    let pool = create_pool(&config.database).await.map_err(|e| {
        error!("Failed to create database pool: {}", e);
        AppError::Database(e)
    })?;

    info!("Database connection pool created successfully");
    info!("Max connections: {}", config.database.max_connections);

    info!("Running database migrations...");
    run_migrations(&pool, None).await.map_err(|e| {
        error!("Database migration failed: {}", e);
        AppError::Database(e)
    })?;

    info!("Database migrations completed successfully");

    // =========================================================================
    // CORE SERVICES INITIALIZATION
    // =========================================================================
    let http_port = config.http_port;
    let scheduler_config = config.scheduler.clone();
    let environment = config.environment.clone();

    let app_state = Arc::new(AppState::new(pool, config));
    info!("✓ Application state initialized with repositories and services");

    // =========================================================================
    // BACKGROUND TASKS
    // =========================================================================
    let scheduler_handle = if scheduler_config.enabled {
        let scheduler = Scheduler::new(app_state.tutoring.clone(), app_state.streak.clone())
            .with_sweep_interval(scheduler_config.booking_sweep_interval());

        let handle = tokio::spawn(async move {
            scheduler.start().await;
        });
        info!(
            "✓ Scheduler background task started ({}s sweep interval)",
            scheduler_config.booking_sweep_interval_secs
        );
        Some(handle)
    } else {
        warn!("SCHEDULER_ENABLED=false - relying on /api/cron endpoints");
        None
    };

    // =========================================================================
    // START HTTP SERVER
    // =========================================================================
    let addr = SocketAddr::from(([0, 0, 0, 0], http_port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Message(format!("Failed to bind HTTP server: {}", e)))?;

    let router = api::router(app_state.clone());
    let http_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("HTTP server error: {}", e);
        }
    });

    // =========================================================================
    // READY
    // =========================================================================
    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           Sukull Backend Service Ready!                  ║");
    info!("╠══════════════════════════════════════════════════════════╣");
    info!("║  HTTP API:     0.0.0.0:{}/api                        ║", http_port);
    info!("║  Environment:  {}                                    ║", environment);
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Press Ctrl+C to shutdown gracefully");

    // =========================================================================
    // SHUTDOWN HANDLING
    // =========================================================================
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down gracefully...");
        }
        _ = http_handle => {
            error!("HTTP server exited unexpectedly");
        }
        _ = async {
            if let Some(handle) = scheduler_handle {
                handle.await.ok();
            } else {
                // Never completes if the scheduler is disabled
                futures::future::pending::<()>().await;
            }
        } => {
            error!("Scheduler task exited unexpectedly");
        }
    }

    info!("Sukull backend service shutdown complete");
    Ok(())
}

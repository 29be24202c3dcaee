use std::env;
use std::time::Duration;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
}

/// Token verification and cron authorization settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 secret used by the identity provider to sign access tokens
    pub jwt_secret: String,
    pub jwt_audience: Option<String>,
    /// Shared secret for the cron endpoints. Cron endpoints are disabled when unset.
    pub cron_secret: Option<String>,
}

/// Background task settings
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub enabled: bool,
    pub booking_sweep_interval_secs: u64,
    /// Offset of the platform day from UTC (Turkey is UTC+3)
    pub streak_utc_offset_hours: i32,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub scheduler: SchedulerConfig,
    pub log_level: String,
    pub http_port: u16,
    pub environment: String,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse::<T>().ok())
}

impl DatabaseConfig {
    /// Create database config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable is required")?;

        let config = Self {
            url,
            max_connections: env_parse("DATABASE_MAX_CONNECTIONS").unwrap_or(10),
            acquire_timeout_secs: env_parse("DATABASE_ACQUIRE_TIMEOUT_SECS").unwrap_or(30),
            idle_timeout_secs: env_parse("DATABASE_IDLE_TIMEOUT_SECS").unwrap_or(600), // 10 minutes
            max_lifetime_secs: env_parse("DATABASE_MAX_LIFETIME_SECS").unwrap_or(1800), // 30 minutes
            test_before_acquire: env_parse("DATABASE_TEST_BEFORE_ACQUIRE").unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if self.acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get max lifetime as Duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/sukull".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
        }
    }
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, String> {
        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| "JWT_SECRET environment variable is required")?;

        if jwt_secret.trim().is_empty() {
            return Err("JWT_SECRET must not be empty".to_string());
        }

        Ok(Self {
            jwt_secret,
            jwt_audience: env::var("JWT_AUDIENCE").ok().filter(|s| !s.is_empty()),
            cron_secret: env::var("CRON_SECRET").ok().filter(|s| !s.is_empty()),
        })
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "development-secret".to_string(),
            jwt_audience: None,
            cron_secret: None,
        }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Result<Self, String> {
        let config = Self {
            enabled: env_parse("SCHEDULER_ENABLED").unwrap_or(true),
            booking_sweep_interval_secs: env_parse("BOOKING_SWEEP_INTERVAL_SECS").unwrap_or(60),
            streak_utc_offset_hours: env_parse("STREAK_UTC_OFFSET_HOURS").unwrap_or(3),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.booking_sweep_interval_secs == 0 {
            return Err("BOOKING_SWEEP_INTERVAL_SECS must be greater than 0".to_string());
        }

        if !(-12..=14).contains(&self.streak_utc_offset_hours) {
            return Err(format!(
                "Invalid STREAK_UTC_OFFSET_HOURS: {}. Must be between -12 and 14",
                self.streak_utc_offset_hours
            ));
        }

        Ok(())
    }

    pub fn booking_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.booking_sweep_interval_secs)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            booking_sweep_interval_secs: 60,
            streak_utc_offset_hours: 3,
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let database = DatabaseConfig::from_env()?;
        let auth = AuthConfig::from_env()?;
        let scheduler = SchedulerConfig::from_env()?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let http_port = env_parse("HTTP_PORT").unwrap_or(3001);
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        // Validate environment
        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&environment.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }

        Ok(Self {
            database,
            auth,
            scheduler,
            log_level: log_level.to_lowercase(),
            http_port,
            environment: environment.to_lowercase(),
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Get database URL (convenience method)
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            scheduler: SchedulerConfig::default(),
            log_level: "info".to_string(),
            http_port: 3001,
            environment: "development".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_config_rejects_zero_connections() {
        let config = DatabaseConfig {
            max_connections: 0,
            ..DatabaseConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scheduler_offset_bounds() {
        let mut config = SchedulerConfig::default();
        assert_eq!(config.streak_utc_offset_hours, 3);
        assert!(config.validate().is_ok());

        config.streak_utc_offset_hours = 15;
        assert!(config.validate().is_err());

        config.streak_utc_offset_hours = -12;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.http_port, 3001);
        assert!(config.is_development());
        assert!(!config.is_production());
        assert!(config.auth.cron_secret.is_none());
    }
}

use crate::domain::local_today;
use crate::services::{StreakService, TutoringService};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{error, info};

/// Whether the daily streak reset still has to run for `today`
pub fn reset_due(last_run: Option<NaiveDate>, today: NaiveDate) -> bool {
    last_run.map(|day| day < today).unwrap_or(true)
}

/// Background task that sweeps booking statuses on an interval and runs
/// the daily streak reset once per platform day
pub struct Scheduler {
    tutoring: Arc<TutoringService>,
    streak: Arc<StreakService>,
    sweep_interval: Duration,
    last_reset: Option<NaiveDate>,
}

impl Scheduler {
    pub fn new(tutoring: Arc<TutoringService>, streak: Arc<StreakService>) -> Self {
        Self {
            tutoring,
            streak,
            sweep_interval: Duration::from_secs(60),
            last_reset: None,
        }
    }

    /// Set sweep interval
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Start the scheduler loop
    pub async fn start(mut self) {
        let mut interval = time::interval(self.sweep_interval);
        info!("Scheduler started, sweeping bookings every {:?}", self.sweep_interval);

        loop {
            interval.tick().await;
            self.tick().await;
        }
    }

    async fn tick(&mut self) {
        let now = Utc::now();

        if let Err(e) = self.tutoring.sweep_statuses(now.naive_utc()).await {
            error!("Booking status sweep failed: {}", e);
        }

        let today = local_today(now, self.streak.offset_hours());
        if reset_due(self.last_reset, today) {
            match self.streak.perform_daily_reset(now).await {
                Ok(summary) => {
                    self.last_reset = Some(today);
                    info!(
                        "Scheduled daily reset done: date={}, processed={}",
                        today, summary.processed
                    );
                }
                // Retried on the next tick
                Err(e) => error!("Daily streak reset failed: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_due_once_per_day() {
        let today = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        assert!(reset_due(None, today));
        assert!(reset_due(today.pred_opt(), today));
        assert!(!reset_due(Some(today), today));
    }
}

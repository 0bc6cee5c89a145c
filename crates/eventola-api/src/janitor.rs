// Orphaned upload cleanup
//
// Event creation references previously uploaded file ids without any
// cross-step coordination, so an upload whose event never materialized just
// sits in the files table. This task periodically deletes files older than a
// grace period that no event references.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use eventola_storage::Database;

/// Janitor configuration
#[derive(Debug, Clone)]
pub struct JanitorConfig {
    /// How often the sweep runs
    pub interval: Duration,
    /// Minimum age before an unreferenced file is eligible for deletion.
    /// Generous enough that an in-flight event creation never loses its
    /// artwork.
    pub grace_period: Duration,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(15 * 60),
            grace_period: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl JanitorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let interval = std::env::var("JANITOR_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.interval);
        let grace_period = std::env::var("JANITOR_GRACE_PERIOD_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.grace_period);
        Self {
            interval,
            grace_period,
        }
    }
}

/// Run the cleanup loop forever. Spawned once at server startup.
pub async fn run(db: Arc<Database>, config: JanitorConfig) {
    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    tracing::info!(
        interval_secs = config.interval.as_secs(),
        grace_period_secs = config.grace_period.as_secs(),
        "Starting orphaned upload janitor"
    );

    loop {
        ticker.tick().await;
        let cutoff = Utc::now()
            - chrono::Duration::seconds(config.grace_period.as_secs() as i64);
        match db.delete_orphaned_files(cutoff).await {
            Ok(0) => {}
            Ok(deleted) => {
                tracing::info!(deleted, "Deleted orphaned uploads");
            }
            Err(e) => {
                // Sweep failures are not fatal; try again next tick
                tracing::error!("Orphan cleanup sweep failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = JanitorConfig::default();
        assert_eq!(config.interval, Duration::from_secs(15 * 60));
        assert_eq!(config.grace_period, Duration::from_secs(24 * 60 * 60));
    }
}

//! Periodic housekeeping: orphan placeholder cleanup and limiter pruning.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::application::services::UrlService;
use crate::domain::rate_limiter::RateLimiter;

/// Schedule for the maintenance worker.
#[derive(Debug, Clone, Copy)]
pub struct MaintenanceSettings {
    /// Time between passes.
    pub interval: Duration,
    /// Minimum age of a placeholder before it counts as an orphan.
    pub orphan_grace: Duration,
}

impl Default for MaintenanceSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            orphan_grace: Duration::from_secs(600),
        }
    }
}

/// Summary of one maintenance pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceReport {
    pub orphans_deleted: u64,
    pub windows_purged: usize,
}

/// Runs one maintenance pass.
///
/// A store failure during the sweep is logged and does not stop the limiter
/// purge.
pub async fn run_once(
    service: &UrlService,
    limiter: &RateLimiter,
    settings: MaintenanceSettings,
) -> MaintenanceReport {
    let orphans_deleted = match service.sweep_orphans(settings.orphan_grace).await {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!(error = %e, "Orphan sweep failed");
            0
        }
    };

    let windows_purged = limiter.purge_expired();

    tracing::debug!(
        orphans_deleted,
        windows_purged,
        tracked_clients = limiter.tracked_clients(),
        "Maintenance pass finished"
    );

    MaintenanceReport {
        orphans_deleted,
        windows_purged,
    }
}

/// Runs maintenance passes forever at `settings.interval`.
///
/// The first pass happens one interval after start. Spawn this on the runtime;
/// it never returns.
pub async fn run_maintenance_worker(
    service: Arc<UrlService>,
    limiter: Arc<RateLimiter>,
    settings: MaintenanceSettings,
) {
    tracing::info!(
        interval_secs = settings.interval.as_secs(),
        orphan_grace_secs = settings.orphan_grace.as_secs(),
        "Maintenance worker started"
    );

    let mut ticker = tokio::time::interval_at(
        tokio::time::Instant::now() + settings.interval,
        settings.interval,
    );
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        run_once(&service, &limiter, settings).await;
    }
}

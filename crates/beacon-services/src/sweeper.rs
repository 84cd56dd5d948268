//! Eviction sweep.
//!
//! Each tick purges instances older than the lifetime from every device set
//! and unlinks the sets left empty. Runs beside the request handlers, racing
//! them on the same registry.

use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;

use crate::registry::Registry;

/// What one sweep tick removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired: usize,
    pub networks_removed: usize,
}

/// Run a single sweep tick as of `now`.
pub fn sweep(registry: &Registry, now: Instant, lifetime: Duration) -> SweepReport {
    let mut report = SweepReport::default();
    registry.for_each(|key, set| {
        let purged = set.purge_expired(now, lifetime);
        report.expired += purged.removed;
        if purged.is_empty() && registry.remove(key, set) {
            report.networks_removed += 1;
            tracing::trace!(%key, "removed empty network");
        }
    });
    report
}

/// Sweep `registry` every `interval`, evicting instances older than `lifetime`.
///
/// Runs forever. Cancel by dropping the task handle.
pub async fn sweep_loop(registry: Registry, lifetime: Duration, interval: Duration) {
    // tokio::time::interval panics on a zero period.
    let period = interval.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        lifetime_secs = lifetime.as_secs(),
        interval_secs = period.as_secs(),
        "sweeper starting"
    );

    loop {
        ticker.tick().await;

        let report = sweep(&registry, Instant::now(), lifetime);
        if report != SweepReport::default() {
            tracing::debug!(
                expired = report.expired,
                networks_removed = report.networks_removed,
                networks = registry.len(),
                "swept stale announcements"
            );
        }
    }
}

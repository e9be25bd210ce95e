use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};

use crate::metrics::{MetricsCollector, requests_per_sec};
use crate::shutdown::ShutdownSender;

/// Shortest interval between progress lines.
const MIN_PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

pub(crate) struct ProgressConfig {
    pub(crate) users: u64,
    pub(crate) target: Duration,
    pub(crate) interval: Duration,
    pub(crate) run_start: Instant,
}

/// Logs a status line every interval until the stop signal is raised.
pub(crate) fn spawn_progress_logger(
    config: ProgressConfig,
    collector: Arc<MetricsCollector>,
    active_users: Arc<AtomicU64>,
    shutdown_tx: &ShutdownSender,
) -> tokio::task::JoinHandle<()> {
    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::spawn(async move {
        let period = config.interval.max(MIN_PROGRESS_INTERVAL);
        let first_tick = config.run_start.checked_add(period).unwrap_or_else(Instant::now);
        let mut ticker = tokio::time::interval_at(first_tick, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                _ = ticker.tick() => {
                    let elapsed = config.run_start.elapsed();
                    let total = collector.total_requests();
                    tracing::info!(
                        "{:>5.1}s / {}s | Users: {}/{} | Reqs: {} | Req/s: {:.1} | Errors: {}",
                        elapsed.as_secs_f64(),
                        config.target.as_secs(),
                        active_users.load(Ordering::Relaxed),
                        config.users,
                        total,
                        requests_per_sec(total, elapsed.as_secs_f64()),
                        collector.failed_requests(),
                    );
                }
            }
        }
    })
}

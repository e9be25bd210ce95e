use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, ConfigError, StepError};
use crate::http::{ScenarioPlan, Transport, run_scenario_iteration};
use crate::metrics::MetricsCollector;
use crate::shutdown::{ShutdownReceiver, ShutdownSender, stop_requested};

use super::RunSettings;
use super::mode::RunMode;
use super::progress::{ProgressConfig, spawn_progress_logger};

/// Counts running virtual users for as long as it is held.
struct ActiveUserGuard {
    counter: Arc<AtomicU64>,
}

impl ActiveUserGuard {
    fn acquire(counter: &Arc<AtomicU64>) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self {
            counter: Arc::clone(counter),
        }
    }
}

impl Drop for ActiveUserGuard {
    fn drop(&mut self) {
        loop {
            let current = self.counter.load(Ordering::Relaxed);
            let Some(next) = current.checked_sub(1) else {
                break;
            };
            if self
                .counter
                .compare_exchange(current, next, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                break;
            }
        }
    }
}

/// Everything a virtual user shares with the rest of the run.
#[derive(Clone)]
pub struct LoadInputs {
    pub transport: Arc<dyn Transport>,
    pub plans: Arc<[ScenarioPlan]>,
    pub collector: Arc<MetricsCollector>,
}

#[derive(Clone)]
struct VirtualUser {
    id: u64,
    inputs: LoadInputs,
    active: Arc<AtomicU64>,
}

impl VirtualUser {
    async fn run_once(self) -> Result<(), StepError> {
        let _guard = ActiveUserGuard::acquire(&self.active);
        debug!("Virtual user {} started (single pass)", self.id);
        for plan in self.inputs.plans.iter() {
            run_scenario_iteration(self.inputs.transport.as_ref(), plan, &self.inputs.collector)
                .await?;
        }
        debug!("Virtual user {} finished", self.id);
        Ok(())
    }

    async fn run_until_stopped(self, mut shutdown_rx: ShutdownReceiver) -> Result<(), StepError> {
        let _guard = ActiveUserGuard::acquire(&self.active);
        debug!("Virtual user {} started", self.id);
        let mut iterations: u64 = 0;

        'run: loop {
            for plan in self.inputs.plans.iter() {
                if stop_requested(&mut shutdown_rx) {
                    break 'run;
                }
                run_scenario_iteration(
                    self.inputs.transport.as_ref(),
                    plan,
                    &self.inputs.collector,
                )
                .await?;
                iterations = iterations.saturating_add(1);
                tokio::task::yield_now().await;
            }
            if stop_requested(&mut shutdown_rx) {
                break;
            }
            tokio::task::yield_now().await;
        }

        debug!(
            "Virtual user {} stopped after {} scenario iterations",
            self.id, iterations
        );
        Ok(())
    }
}

/// Schedules virtual users for `mode` and returns how many were started.
///
/// Per-iteration failures land in the collector. Only authoring errors that
/// escape the scenario interpreter abort the run.
///
/// # Errors
///
/// Returns `InvalidLoadProfile` for a zero-user mode, or the first hard error
/// raised by a virtual user.
pub async fn run_load(
    mode: &RunMode,
    inputs: LoadInputs,
    settings: &RunSettings,
    shutdown_tx: &ShutdownSender,
) -> AppResult<u64> {
    if mode.users() == 0 {
        return Err(AppError::config(ConfigError::InvalidLoadProfile { users: 0 }));
    }
    info!("Starting run: {}", mode);

    match *mode {
        RunMode::SinglePass => {
            let user = VirtualUser {
                id: 0,
                inputs,
                active: Arc::new(AtomicU64::new(0)),
            };
            user.run_once().await?;
            Ok(1)
        }
        RunMode::SinglePassPerUser { users, .. } => {
            let active = Arc::new(AtomicU64::new(0));
            let mut tasks = JoinSet::new();
            for id in 0..users {
                let user = VirtualUser {
                    id,
                    inputs: inputs.clone(),
                    active: Arc::clone(&active),
                };
                tasks.spawn(user.run_once());
            }
            drain(&mut tasks).await?;
            Ok(users)
        }
        RunMode::Continuous {
            users, duration, ..
        } => run_continuous(mode, users, duration, inputs, settings, shutdown_tx).await,
    }
}

async fn run_continuous(
    mode: &RunMode,
    users: u64,
    duration: std::time::Duration,
    inputs: LoadInputs,
    settings: &RunSettings,
    shutdown_tx: &ShutdownSender,
) -> AppResult<u64> {
    let run_start = Instant::now();
    let delay = mode.spawn_delay();
    let active = Arc::new(AtomicU64::new(0));
    let mut stop_rx = shutdown_tx.subscribe();
    let mut tasks = JoinSet::new();
    let mut spawned: u64 = 0;
    let mut stopped_early = false;
    let mut progress = None;

    for id in 0..users {
        let user = VirtualUser {
            id,
            inputs: inputs.clone(),
            active: Arc::clone(&active),
        };
        tasks.spawn(user.run_until_stopped(shutdown_tx.subscribe()));
        spawned = spawned.saturating_add(1);

        if progress.is_none() {
            progress = Some(spawn_progress_logger(
                ProgressConfig {
                    users,
                    target: duration,
                    interval: settings.progress_interval,
                    run_start,
                },
                Arc::clone(&inputs.collector),
                Arc::clone(&active),
                shutdown_tx,
            ));
        }

        if !delay.is_zero() && spawned < users {
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                _ = stop_rx.recv() => {
                    stopped_early = true;
                    break;
                }
            }
        }
    }
    if stopped_early {
        info!("Stop requested during ramp-up after {} of {} users", spawned, users);
    }

    let remaining = duration.saturating_sub(run_start.elapsed());
    if !stopped_early && !remaining.is_zero() {
        tokio::select! {
            () = tokio::time::sleep(remaining) => {}
            _ = stop_rx.recv() => {
                info!("Stop requested before the run duration elapsed");
            }
        }
    }

    drop(shutdown_tx.send(()));
    debug!("Stop signal raised, waiting up to {:?}", settings.grace_period);

    let outcome = match tokio::time::timeout(settings.grace_period, drain(&mut tasks)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                "{} virtual users still running after the grace period, cancelling",
                tasks.len()
            );
            tasks.abort_all();
            while tasks.join_next().await.is_some() {}
            Ok(())
        }
    };

    if let Some(progress) = progress
        && let Err(err) = progress.await
    {
        warn!("Progress logger ended abnormally: {}", err);
    }

    outcome.map(|()| spawned)
}

async fn drain(tasks: &mut JoinSet<Result<(), StepError>>) -> AppResult<()> {
    while let Some(joined) = tasks.join_next().await {
        joined??;
    }
    Ok(())
}

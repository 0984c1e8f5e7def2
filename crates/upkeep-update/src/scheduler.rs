//! Update check scheduling
//!
//! One deferred check after a warm-up delay, then checks on a fixed interval
//! independent of how the warm-up check went. Cancellation stops future
//! firings only; a cycle already running is allowed to finish.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use upkeep_core::types::ScheduleConfig;

use crate::orchestrator::CycleRunner;

/// Warm-up plus fixed-interval schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduler {
    warmup: Duration,
    interval: Duration,
}

impl Scheduler {
    /// `interval` must be non-zero
    pub fn new(warmup: Duration, interval: Duration) -> Self {
        Self { warmup, interval }
    }

    pub fn from_config(config: &ScheduleConfig) -> Self {
        Self::new(config.warmup(), config.interval())
    }

    /// Spawn the warm-up and recurring tasks on the current runtime
    pub fn start<R>(&self, runner: Arc<R>) -> SchedulerHandle
    where
        R: CycleRunner + 'static,
    {
        let token = CancellationToken::new();

        info!(
            "Scheduling update checks: first in {}s, then every {}s",
            self.warmup.as_secs(),
            self.interval.as_secs()
        );

        let warmup = tokio::spawn(warmup_check(
            Arc::clone(&runner),
            self.warmup,
            token.clone(),
        ));
        let recurring = tokio::spawn(recurring_checks(runner, self.interval, token.clone()));

        SchedulerHandle {
            token,
            tasks: vec![warmup, recurring],
        }
    }
}

async fn warmup_check<R: CycleRunner>(runner: Arc<R>, delay: Duration, token: CancellationToken) {
    tokio::select! {
        biased;
        _ = token.cancelled() => {
            debug!("Initial update check cancelled before it started");
            return;
        }
        _ = time::sleep(delay) => {}
    }

    info!("Initial update check starting");
    let outcome = runner.run_cycle().await;
    debug!("Initial update check finished: {}", outcome);
}

async fn recurring_checks<R: CycleRunner>(
    runner: Arc<R>,
    period: Duration,
    token: CancellationToken,
) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    // Ticks missed while a slow cycle runs are dropped, not replayed
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        info!(
            "Scheduled update check fired at {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        let outcome = runner.run_cycle().await;
        debug!("Scheduled update check finished: {}", outcome);
    }

    debug!("Recurring update checks stopped");
}

/// Handle to a started schedule. Consumed by `cancel`, so it can only be
/// cancelled once.
pub struct SchedulerHandle {
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Stop all future firings and wait for any in-flight cycle to finish
    pub async fn cancel(self) {
        self.token.cancel();
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!("Update check task ended abnormally: {}", e);
            }
        }
        info!("Update checks cancelled");
    }
}

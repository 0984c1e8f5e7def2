//! Run command: schedule update checks until interrupted

use anyhow::{anyhow, Result};
use camino::Utf8Path;
use std::sync::Arc;
use tracing::info;
use upkeep_update::Scheduler;

use crate::cli::RunArgs;

pub async fn run(args: RunArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let mut config = super::load_config(config_path)?;

    if let Some(warmup) = args.warmup {
        config.schedule.warmup_secs = warmup;
    }
    if let Some(interval) = args.interval {
        if interval == 0 {
            return Err(anyhow!("--interval must be greater than zero"));
        }
        config.schedule.interval_secs = interval;
    }

    let orchestrator = Arc::new(super::build_orchestrator(&config)?);
    info!(
        "[upkeep {}] Loaded. Scheduling update checks.",
        orchestrator.running()
    );

    let handle = Scheduler::from_config(&config.schedule).start(Arc::clone(&orchestrator));

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    handle.cancel().await;
    orchestrator.gateway().host().drain().await;
    Ok(())
}

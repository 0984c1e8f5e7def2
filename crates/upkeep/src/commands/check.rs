//! Check command: run a single update cycle now

use anyhow::Result;
use camino::Utf8Path;
use serde::Serialize;
use upkeep_update::CycleOutcome;

use crate::cli::CheckArgs;
use crate::output;

#[derive(Serialize)]
struct CheckReport<'a> {
    package: &'a str,
    running: String,
    outcome: CycleOutcome,
}

pub async fn run(args: CheckArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let orchestrator = super::build_orchestrator(&config)?;

    let outcome = orchestrator.run_cycle().await;
    // Install and restart are fire-and-forget; make sure they left before exit
    orchestrator.gateway().host().drain().await;

    if args.json {
        let report = CheckReport {
            package: orchestrator.package_id(),
            running: orchestrator.running().version().to_string(),
            outcome,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let message = format!(
        "{} ({}): {}",
        orchestrator.package_id(),
        orchestrator.running(),
        outcome
    );
    match outcome {
        CycleOutcome::UpToDate => output::success(&message),
        CycleOutcome::InstallTriggered | CycleOutcome::RestartTriggered => output::info(&message),
        CycleOutcome::NotReady | CycleOutcome::Skipped => output::warning(&message),
        CycleOutcome::RemoteUnavailable | CycleOutcome::HostCallFailed => output::error(&message),
    }

    Ok(())
}

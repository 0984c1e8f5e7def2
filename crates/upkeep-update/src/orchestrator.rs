//! Update cycle state machine
//!
//! One cycle: ask the registry for the latest release, compare it with the
//! running release, and when they differ drive the gateway through
//! refresh -> read state -> restart / install / wait. Nothing is carried from
//! one cycle to the next; an install triggered now converges into a restart
//! on a later cycle once the package manager reports it installed.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::gateway::PackageManagerGateway;
use crate::releases::VersionSource;
use crate::version::RunningRelease;

/// Terminal classification of one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOutcome {
    /// The running release is the latest one
    UpToDate,
    /// The registry could not be queried
    RemoteUnavailable,
    /// A host service call failed
    HostCallFailed,
    /// The new release is installed; a host restart was issued
    RestartTriggered,
    /// An install of the new release was issued
    InstallTriggered,
    /// The managed resource is not actionable yet
    NotReady,
    /// Another cycle was still running
    Skipped,
}

impl CycleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UpToDate => "up to date",
            Self::RemoteUnavailable => "registry unavailable",
            Self::HostCallFailed => "host call failed",
            Self::RestartTriggered => "restart triggered",
            Self::InstallTriggered => "install triggered",
            Self::NotReady => "not ready",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything the scheduler can fire
#[async_trait]
pub trait CycleRunner: Send + Sync {
    async fn run_cycle(&self) -> CycleOutcome;
}

/// Held for the duration of a cycle; releases the flag on every exit path
struct CycleGuard<'a>(&'a AtomicBool);

impl<'a> CycleGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives one extension towards its latest published release
pub struct UpdateOrchestrator<S, G> {
    running: RunningRelease,
    package_id: String,
    resource_id: String,
    source: S,
    gateway: G,
    in_flight: AtomicBool,
}

impl<S, G> UpdateOrchestrator<S, G>
where
    S: VersionSource,
    G: PackageManagerGateway,
{
    pub fn new(
        running: RunningRelease,
        package_id: impl Into<String>,
        resource_id: impl Into<String>,
        source: S,
        gateway: G,
    ) -> Self {
        Self {
            running,
            package_id: package_id.into(),
            resource_id: resource_id.into(),
            source,
            gateway,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn running(&self) -> &RunningRelease {
        &self.running
    }

    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Run one cycle, or return `Skipped` if another one is in flight.
    /// Overlapping firings are dropped, never queued.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let Some(_guard) = CycleGuard::acquire(&self.in_flight) else {
            debug!("Update check already in progress; skipping");
            return CycleOutcome::Skipped;
        };

        let span = info_span!("update_cycle", running = %self.running);
        self.cycle().instrument(span).await
    }

    async fn cycle(&self) -> CycleOutcome {
        let running = self.running.version();

        debug!("Querying registry for {}", self.package_id);
        let Some(latest) = self.source.latest(&self.package_id).await else {
            return CycleOutcome::RemoteUnavailable;
        };

        info!("Registry: latest=v{} running=v{}", latest, running);

        if &latest == running {
            debug!("Up to date");
            return CycleOutcome::UpToDate;
        }

        if let (Some(remote), Some(local)) = (latest.semver(), running.semver()) {
            if remote < local {
                debug!(
                    "Published v{} is older than running v{}; following the registry",
                    latest, running
                );
            }
        }

        warn!(
            "Update available: v{} -> v{}. Forcing package manager metadata refresh",
            running, latest
        );

        // Not fatal: the host may already hold state from an earlier refresh
        if !self.gateway.force_refresh(&self.package_id).await {
            debug!("Metadata refresh failed; reading current host state anyway");
        }

        let state = match self.gateway.read_state(&self.resource_id).await {
            Ok(state) => state,
            Err(e) => {
                warn!("{}", e);
                return CycleOutcome::HostCallFailed;
            }
        };

        info!(
            "Managed resource after refresh: state={} installed={} latest={}",
            state.state.as_deref().unwrap_or("NOT_FOUND"),
            display_opt(&state.installed_version),
            display_opt(&state.latest_version),
        );

        // Installed takes priority over ready so an installed release is never
        // installed twice
        if state.installed_version.as_ref() == Some(&latest) {
            warn!("v{} is on disk. Restarting host to load new code", latest);
            return match self.gateway.trigger_restart() {
                Ok(()) => CycleOutcome::RestartTriggered,
                Err(e) => {
                    warn!("{}", e);
                    CycleOutcome::HostCallFailed
                }
            };
        }

        if state.readiness {
            warn!(
                "Triggering install of v{}",
                state.latest_version.as_ref().unwrap_or(&latest)
            );
            return match self.gateway.trigger_install(&self.resource_id) {
                Ok(()) => CycleOutcome::InstallTriggered,
                Err(e) => {
                    warn!("{}", e);
                    CycleOutcome::HostCallFailed
                }
            };
        }

        warn!(
            "Managed resource not ready (state={}); will retry next interval",
            state.state.as_deref().unwrap_or("NOT_FOUND")
        );
        CycleOutcome::NotReady
    }
}

fn display_opt<T: fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "none".to_string())
}

#[async_trait]
impl<S, G> CycleRunner for UpdateOrchestrator<S, G>
where
    S: VersionSource,
    G: PackageManagerGateway,
{
    async fn run_cycle(&self) -> CycleOutcome {
        UpdateOrchestrator::run_cycle(self).await
    }
}

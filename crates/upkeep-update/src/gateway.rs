//! Gateway over the package manager and the host runtime
//!
//! The orchestrator only sees four operations. Each may fail on its own;
//! `force_refresh` swallows its errors and reports a plain success flag.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::Result;
use crate::host::{HostRuntime, ResourceSnapshot, Restart};
use crate::package_manager::{PackageManager, PackageRecord};
use crate::version::Version;

/// Snapshot of the managed resource, read fresh on every cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagedResourceState {
    /// The resource is actionable (an install can be triggered)
    pub readiness: bool,
    pub installed_version: Option<Version>,
    pub latest_version: Option<Version>,
    /// Raw host state, `None` when the resource is unknown
    pub state: Option<String>,
}

impl ManagedResourceState {
    /// Sentinel for a resource the host does not know
    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn is_found(&self) -> bool {
        self.state.is_some()
    }
}

impl From<ResourceSnapshot> for ManagedResourceState {
    fn from(snapshot: ResourceSnapshot) -> Self {
        Self {
            readiness: snapshot.ready,
            installed_version: snapshot
                .installed_version
                .map(Version::new)
                .filter(|v| !v.is_empty()),
            latest_version: snapshot
                .latest_version
                .map(Version::new)
                .filter(|v| !v.is_empty()),
            state: Some(snapshot.state),
        }
    }
}

/// Operations the orchestrator drives during a cycle
#[async_trait]
pub trait PackageManagerGateway: Send + Sync {
    /// Force the package manager to re-fetch metadata for `package_id`.
    /// Returns `false` when there is no record or anything fails.
    async fn force_refresh(&self, package_id: &str) -> bool;

    /// Refresh the host's view of the resource, then read it back.
    /// Errors only when the host call itself fails.
    async fn read_state(&self, resource_id: &str) -> Result<ManagedResourceState>;

    /// Issue the install action; does not wait for completion
    fn trigger_install(&self, resource_id: &str) -> Result<()>;

    /// Issue a host restart; does not wait for completion
    fn trigger_restart(&self) -> Result<()>;
}

/// Gateway backed by a package manager and a host runtime
pub struct ManagerGateway<P, H> {
    package_manager: P,
    host: H,
}

impl<P, H> ManagerGateway<P, H>
where
    P: PackageManager,
    H: HostRuntime + Restart,
{
    pub fn new(package_manager: P, host: H) -> Self {
        Self {
            package_manager,
            host,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    async fn refresh_record(&self, record: &PackageRecord) -> Result<()> {
        debug!("Forcing package manager refresh for {}", record.full_name);
        self.package_manager.refresh_metadata(record, true).await?;
        self.package_manager.persist().await?;
        self.package_manager
            .notify_listeners(&record.category)
            .await?;
        debug!("Package manager refresh complete for {}", record.full_name);
        Ok(())
    }
}

#[async_trait]
impl<P, H> PackageManagerGateway for ManagerGateway<P, H>
where
    P: PackageManager,
    H: HostRuntime + Restart,
{
    async fn force_refresh(&self, package_id: &str) -> bool {
        let record = match self.package_manager.find_record(package_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                warn!("Package manager has no record of {}", package_id);
                return false;
            }
            Err(e) => {
                warn!("{}", e);
                return false;
            }
        };

        match self.refresh_record(&record).await {
            Ok(()) => true,
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }

    async fn read_state(&self, resource_id: &str) -> Result<ManagedResourceState> {
        self.host.refresh_resource(resource_id).await?;

        let state: ManagedResourceState = match self.host.resource_state(resource_id).await? {
            Some(snapshot) => snapshot.into(),
            None => ManagedResourceState::not_found(),
        };
        Ok(state)
    }

    fn trigger_install(&self, resource_id: &str) -> Result<()> {
        self.host.dispatch_install(resource_id)
    }

    fn trigger_restart(&self) -> Result<()> {
        self.host.restart()
    }
}

//! Update orchestration for upkeep
//!
//! Provides:
//! - Latest-release lookups against the GitHub releases API
//! - A gateway over the host's package manager (refresh, state, install, restart)
//! - The per-cycle update state machine with a single-flight guard
//! - Warm-up plus fixed-interval scheduling with cooperative cancellation

pub mod error;
pub mod gateway;
pub mod host;
pub mod manifest;
pub mod orchestrator;
pub mod package_manager;
pub mod releases;
pub mod scheduler;
pub mod version;

pub use error::{Result, UpdateError};
pub use gateway::{ManagedResourceState, ManagerGateway, PackageManagerGateway};
pub use host::{HostRuntime, HttpHost, ResourceSnapshot, Restart};
pub use manifest::read_running_release;
pub use orchestrator::{CycleOutcome, CycleRunner, UpdateOrchestrator};
pub use package_manager::{HttpPackageManager, PackageManager, PackageRecord};
pub use releases::{GitHubReleases, Release, VersionSource};
pub use scheduler::{Scheduler, SchedulerHandle};
pub use version::{RunningRelease, Version};

/// Current upkeep version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

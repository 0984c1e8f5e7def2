//! CLI command implementations

pub mod check;
pub mod config;
pub mod run;
pub mod version;

use anyhow::{Context, Result};
use camino::Utf8Path;
use tracing::info;
use upkeep_core::{HierarchicalConfigLoader, RuntimeConfig};
use upkeep_update::{
    read_running_release, GitHubReleases, HttpHost, HttpPackageManager, ManagerGateway,
    UpdateOrchestrator,
};

/// Orchestrator wired to the real registry, package manager, and host
pub type Orchestrator =
    UpdateOrchestrator<GitHubReleases, ManagerGateway<HttpPackageManager, HttpHost>>;

/// Load the effective configuration, honouring `--config`
pub fn load_config(config_path: Option<&Utf8Path>) -> Result<RuntimeConfig> {
    let loader = match config_path {
        Some(path) => HierarchicalConfigLoader::new()?.with_file(path.to_path_buf()),
        None => HierarchicalConfigLoader::new()?,
    };
    loader
        .load_runtime_config()
        .context("Failed to load configuration")
}

/// Read the running release and wire the orchestrator's collaborators
pub fn build_orchestrator(config: &RuntimeConfig) -> Result<Orchestrator> {
    let running = read_running_release(&config.manifest_path)?;

    let source = GitHubReleases::from_config(&config.registry, &config.network)?;
    let package_manager = HttpPackageManager::from_config(
        &config.package_manager,
        config.host.token.clone(),
        &config.network,
    )?;
    let host = HttpHost::from_config(&config.host, &config.network)?;

    info!(
        "Watching {} (running v{}) via {}",
        config.registry.package_id(),
        running.version(),
        config.host.resource_id
    );

    Ok(UpdateOrchestrator::new(
        running,
        config.registry.package_id(),
        config.host.resource_id.clone(),
        source,
        ManagerGateway::new(package_manager, host),
    ))
}

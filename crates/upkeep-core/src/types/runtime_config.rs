//! Runtime configuration types
//!
//! These types define where upkeep looks for releases, how it reaches the
//! host runtime and its package manager, and how often it checks.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// Release registry settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Host runtime settings
    #[serde(default)]
    pub host: HostConfig,

    /// Package manager integration settings
    #[serde(default)]
    pub package_manager: PackageManagerConfig,

    /// Update check schedule
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Network and HTTP configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// Local manifest carrying the running release
    #[serde(default = "default_manifest_path")]
    pub manifest_path: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            registry: RegistryConfig::default(),
            host: HostConfig::default(),
            package_manager: PackageManagerConfig::default(),
            schedule: ScheduleConfig::default(),
            network: NetworkConfig::default(),
            manifest_path: default_manifest_path(),
        }
    }
}

/// Release registry (GitHub) settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegistryConfig {
    /// Base URL for the registry API
    #[serde(default = "default_registry_api_url")]
    pub api_url: String,

    /// Repository owner
    #[serde(default)]
    pub repo_owner: String,

    /// Repository name
    #[serde(default)]
    pub repo_name: String,
}

impl RegistryConfig {
    /// Package identifier in `owner/name` form
    pub fn package_id(&self) -> String {
        format!("{}/{}", self.repo_owner, self.repo_name)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            api_url: default_registry_api_url(),
            repo_owner: String::new(),
            repo_name: String::new(),
        }
    }
}

/// Host runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HostConfig {
    /// Base URL for the host REST API
    #[serde(default = "default_host_api_url")]
    pub api_url: String,

    /// Bearer token for the host API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Managed resource that tracks the extension's update state
    #[serde(default)]
    pub resource_id: String,

    /// Resource state value that means "an update can be installed"
    #[serde(default = "default_ready_state")]
    pub ready_state: String,

    /// Service asking the host to refresh a resource's state
    #[serde(default = "default_refresh_domain")]
    pub refresh_domain: String,
    #[serde(default = "default_refresh_service")]
    pub refresh_service: String,

    /// Service installing the pending update of a resource
    #[serde(default = "default_install_domain")]
    pub install_domain: String,
    #[serde(default = "default_install_service")]
    pub install_service: String,

    /// Service restarting the host process
    #[serde(default = "default_restart_domain")]
    pub restart_domain: String,
    #[serde(default = "default_restart_service")]
    pub restart_service: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            api_url: default_host_api_url(),
            token: None,
            resource_id: String::new(),
            ready_state: default_ready_state(),
            refresh_domain: default_refresh_domain(),
            refresh_service: default_refresh_service(),
            install_domain: default_install_domain(),
            install_service: default_install_service(),
            restart_domain: default_restart_domain(),
            restart_service: default_restart_service(),
        }
    }
}

/// Package manager integration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackageManagerConfig {
    /// Base URL of the package manager's API
    #[serde(default = "default_package_manager_api_url")]
    pub api_url: String,
}

impl Default for PackageManagerConfig {
    fn default() -> Self {
        Self {
            api_url: default_package_manager_api_url(),
        }
    }
}

/// Update check schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScheduleConfig {
    /// Delay before the first check, letting the host finish starting up
    #[serde(default = "default_warmup_secs")]
    pub warmup_secs: u64,

    /// Interval between recurring checks
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl ScheduleConfig {
    pub fn warmup(&self) -> Duration {
        Duration::from_secs(self.warmup_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            warmup_secs: default_warmup_secs(),
            interval_secs: default_interval_secs(),
        }
    }
}

/// Network and HTTP configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// HTTP timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl NetworkConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_http_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_registry_api_url() -> String {
    "https://api.github.com".to_string()
}
fn default_host_api_url() -> String {
    "http://localhost:8123".to_string()
}
fn default_package_manager_api_url() -> String {
    "http://localhost:8123/api/hacs".to_string()
}
fn default_ready_state() -> String {
    "on".to_string()
}
fn default_refresh_domain() -> String {
    "homeassistant".to_string()
}
fn default_refresh_service() -> String {
    "update_entity".to_string()
}
fn default_install_domain() -> String {
    "update".to_string()
}
fn default_install_service() -> String {
    "install".to_string()
}
fn default_restart_domain() -> String {
    "homeassistant".to_string()
}
fn default_restart_service() -> String {
    "restart".to_string()
}
fn default_warmup_secs() -> u64 {
    30
}
fn default_interval_secs() -> u64 {
    60
}
fn default_http_timeout() -> u64 {
    30
}
fn default_user_agent() -> String {
    format!(
        "upkeep/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
fn default_manifest_path() -> String {
    "manifest.json".to_string()
}

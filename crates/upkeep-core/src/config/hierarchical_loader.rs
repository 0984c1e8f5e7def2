//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. Config file (~/.upkeep/upkeep.yaml, or an explicit path)
//! 3. Environment variables (UPKEEP_* prefix)
//!
//! File values are deep-merged over the embedded defaults, so a file only
//! needs to name the keys it changes.

use crate::error::{Error, Result};
use crate::types::RuntimeConfig;
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde_yaml_ng::Value;
use std::env;
use std::fs;
use std::str::FromStr;
use tracing::debug;

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

/// Name of the config file inside the config directory
const CONFIG_FILE_NAME: &str = "upkeep.yaml";

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Base directory for configuration files
    config_dir: Utf8PathBuf,

    /// Explicit config file, replacing `<config_dir>/upkeep.yaml`
    config_file: Option<Utf8PathBuf>,
}

impl HierarchicalConfigLoader {
    /// Create a loader rooted at the standard config directory (~/.upkeep)
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Ok(Self {
            config_dir,
            config_file: None,
        })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self {
            config_dir,
            config_file: None,
        }
    }

    /// Read configuration from an explicit file instead of the config directory
    pub fn with_file(mut self, config_file: Utf8PathBuf) -> Self {
        self.config_file = Some(config_file);
        self
    }

    fn get_config_dir() -> Result<Utf8PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::invalid_config("Could not determine home directory"))?;
        let home = Utf8PathBuf::from_path_buf(home)
            .map_err(|p| Error::invalid_config(format!("Home directory is not UTF-8: {:?}", p)))?;
        Ok(home.join(".upkeep"))
    }

    /// Path of the config file this loader reads
    pub fn config_file(&self) -> Utf8PathBuf {
        self.config_file
            .clone()
            .unwrap_or_else(|| self.config_dir.join(CONFIG_FILE_NAME))
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Load runtime configuration with hierarchical precedence
    pub fn load_runtime_config(&self) -> Result<RuntimeConfig> {
        let mut merged = Self::load_embedded_value("runtime-defaults.yaml")?;

        let config_path = self.config_file();
        if config_path.exists() {
            debug!("Loading config file: {}", config_path);
            let overlay = self.load_yaml_value(&config_path)?;
            merge_values(&mut merged, overlay);
        } else if self.config_file.is_some() {
            // An explicitly requested file must exist
            return Err(Error::config_not_found(config_path.as_str()));
        }

        let config: RuntimeConfig = serde_yaml_ng::from_value(merged)
            .map_err(|e| Error::invalid_config(format!("Failed to parse configuration: {}", e)))?;

        let config = self.apply_env_overrides(config)?;
        Self::validate(&config)?;

        Ok(config)
    }

    fn load_embedded_value(filename: &str) -> Result<Value> {
        let embedded_file = EmbeddedConfigs::get(filename).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", filename))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", filename))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                filename, e
            ))
        })
    }

    fn load_yaml_value(&self, path: &Utf8Path) -> Result<Value> {
        let content = fs::read_to_string(path)?;
        let value: Value = serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))?;
        // An empty file parses as null
        Ok(match value {
            Value::Null => Value::Mapping(Default::default()),
            other => other,
        })
    }

    /// Apply environment variable overrides to runtime config
    fn apply_env_overrides(&self, mut config: RuntimeConfig) -> Result<RuntimeConfig> {
        // Registry
        if let Ok(val) = env::var("UPKEEP_REGISTRY_API_URL") {
            config.registry.api_url = val;
        }
        if let Ok(val) = env::var("UPKEEP_REPO_OWNER") {
            config.registry.repo_owner = val;
        }
        if let Ok(val) = env::var("UPKEEP_REPO_NAME") {
            config.registry.repo_name = val;
        }

        // Host runtime
        if let Ok(val) = env::var("UPKEEP_HOST_API_URL") {
            config.host.api_url = val;
        }
        if let Ok(val) = env::var("UPKEEP_HOST_TOKEN") {
            config.host.token = Some(val);
        }
        if let Ok(val) = env::var("UPKEEP_RESOURCE_ID") {
            config.host.resource_id = val;
        }

        if let Ok(val) = env::var("UPKEEP_PACKAGE_MANAGER_API_URL") {
            config.package_manager.api_url = val;
        }

        // Schedule and network
        if let Some(val) = parse_env("UPKEEP_WARMUP_SECS")? {
            config.schedule.warmup_secs = val;
        }
        if let Some(val) = parse_env("UPKEEP_INTERVAL_SECS")? {
            config.schedule.interval_secs = val;
        }
        if let Some(val) = parse_env("UPKEEP_HTTP_TIMEOUT_SECS")? {
            config.network.http_timeout_secs = val;
        }

        if let Ok(val) = env::var("UPKEEP_MANIFEST_PATH") {
            config.manifest_path = val;
        }

        Ok(config)
    }

    /// Reject configurations the update loop cannot run with
    pub fn validate(config: &RuntimeConfig) -> Result<()> {
        if config.registry.repo_owner.trim().is_empty() || config.registry.repo_name.trim().is_empty()
        {
            return Err(Error::invalid_config(
                "registry repo-owner and repo-name must both be set",
            ));
        }
        if config.host.resource_id.trim().is_empty() {
            return Err(Error::invalid_config("host resource-id must be set"));
        }
        if config.schedule.interval_secs == 0 {
            return Err(Error::invalid_config(
                "schedule interval-secs must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(val) => val
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::invalid_config(format!("{} must be a valid number", name))),
        Err(_) => Ok(None),
    }
}

/// Recursively merge `overlay` into `base`; mappings merge key by key,
/// anything else is replaced.
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

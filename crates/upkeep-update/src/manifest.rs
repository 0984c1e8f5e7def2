//! Local manifest reader
//!
//! The manifest is a JSON document carrying the running release in its
//! `version` field. It is read once at start-up.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, UpdateError};
use crate::version::RunningRelease;

/// Version reported when the manifest carries none
pub const UNKNOWN_VERSION: &str = "unknown";

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    version: Option<String>,
}

/// Read the running release from a manifest file
pub fn read_running_release(path: impl AsRef<Path>) -> Result<RunningRelease> {
    let path = path.as_ref();
    let path_str = path.display().to_string();

    let content = fs::read_to_string(path).map_err(|e| UpdateError::manifest(&path_str, e))?;
    let manifest: Manifest =
        serde_json::from_str(&content).map_err(|e| UpdateError::manifest(&path_str, e))?;

    let version = manifest
        .version
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_VERSION.to_string());

    debug!("Running release from {}: {}", path_str, version);
    Ok(RunningRelease::new(version))
}

//! GitHub releases lookup

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use upkeep_core::types::{NetworkConfig, RegistryConfig};

use crate::error::{Result, UpdateError};
use crate::version::Version;

/// Source of the latest published version of a package
#[async_trait]
pub trait VersionSource: Send + Sync {
    /// Latest published version, or `None` when the registry cannot answer.
    ///
    /// Failures are logged here; callers only need to abort the cycle.
    async fn latest(&self, package_id: &str) -> Option<Version>;
}

/// Release information
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Release tag (e.g., "v3.0.0")
    #[serde(default)]
    pub tag_name: Option<String>,

    /// Release name
    #[serde(default)]
    pub name: Option<String>,

    /// Whether this is a prerelease
    #[serde(default)]
    pub prerelease: bool,

    /// Published date
    #[serde(default)]
    pub published_at: Option<String>,
}

impl Release {
    /// Normalized version carried by the tag, if the tag is present and non-empty
    pub fn version(&self) -> Option<Version> {
        self.tag_name
            .as_deref()
            .map(Version::new)
            .filter(|v| !v.is_empty())
    }
}

/// Latest-release client for the GitHub API
pub struct GitHubReleases {
    /// GitHub API client
    client: reqwest::Client,

    /// Base URL for the API
    api_url: String,
}

impl GitHubReleases {
    pub fn new(api_url: impl Into<String>, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(registry: &RegistryConfig, network: &NetworkConfig) -> Result<Self> {
        Self::new(
            registry.api_url.clone(),
            &network.user_agent,
            network.http_timeout(),
        )
    }

    /// Fetch the latest release for `owner/name`
    pub async fn get_latest(&self, package_id: &str) -> Result<Release> {
        let url = format!("{}/repos/{}/releases/latest", self.api_url, package_id);

        debug!("Fetching latest release from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| UpdateError::remote_unavailable(format!("GitHub API error: {}", e)))?;

        if response.status() != StatusCode::OK {
            return Err(UpdateError::remote_unavailable(format!(
                "GitHub API returned HTTP {}",
                response.status()
            )));
        }

        response
            .json::<Release>()
            .await
            .map_err(|e| UpdateError::remote_unavailable(format!("Invalid release body: {}", e)))
    }

    /// Fetch the latest release and extract its normalized version
    pub async fn fetch_latest_version(&self, package_id: &str) -> Result<Version> {
        let release = self.get_latest(package_id).await?;

        let version = release.version().ok_or_else(|| {
            UpdateError::remote_unavailable("Latest release has no tag_name")
        })?;

        debug!(
            "Latest release {} ({}) published {}",
            version,
            release.name.as_deref().unwrap_or("unnamed"),
            release.published_at.as_deref().unwrap_or("unknown")
        );

        Ok(version)
    }
}

#[async_trait]
impl VersionSource for GitHubReleases {
    async fn latest(&self, package_id: &str) -> Option<Version> {
        match self.fetch_latest_version(package_id).await {
            Ok(version) => Some(version),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }
}

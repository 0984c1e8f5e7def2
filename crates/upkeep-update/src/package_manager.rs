//! Package manager integration
//!
//! The package manager keeps its own record of every repository it tracks.
//! Forcing a refresh means re-fetching that record's metadata from the
//! registry, writing it to the package manager's store, and notifying the
//! listeners of the record's category so dependent state is recomputed.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use upkeep_core::types::{NetworkConfig, PackageManagerConfig};

use crate::error::{Result, UpdateError};

/// The package manager's record of one tracked repository
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageRecord {
    /// Package manager's own identifier
    pub id: String,

    /// Repository in `owner/name` form
    pub full_name: String,

    /// Category whose listeners are notified after a refresh
    pub category: String,
}

/// Internal package manager operations
#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Look up the record for `owner/name`
    async fn find_record(&self, package_id: &str) -> Result<Option<PackageRecord>>;

    /// Re-fetch the record's metadata from the registry
    async fn refresh_metadata(&self, record: &PackageRecord, force: bool) -> Result<()>;

    /// Write refreshed metadata to the package manager's store
    async fn persist(&self) -> Result<()>;

    /// Notify status listeners of a category
    async fn notify_listeners(&self, category: &str) -> Result<()>;
}

/// REST client for the package manager's API
pub struct HttpPackageManager {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl HttpPackageManager {
    pub fn new(
        api_url: impl Into<String>,
        token: Option<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// The package manager lives inside the host, so it shares the host token
    pub fn from_config(
        config: &PackageManagerConfig,
        token: Option<String>,
        network: &NetworkConfig,
    ) -> Result<Self> {
        Self::new(
            config.api_url.clone(),
            token,
            &network.user_agent,
            network.http_timeout(),
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<()> {
        let url = format!("{}/{}", self.api_url, path);

        let response = self
            .authorize(self.client.post(&url).json(&body))
            .send()
            .await
            .map_err(|e| UpdateError::refresh_failed(format!("{}: {}", path, e)))?;

        if !response.status().is_success() {
            return Err(UpdateError::refresh_failed(format!(
                "{} returned HTTP {}",
                path,
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PackageManager for HttpPackageManager {
    async fn find_record(&self, package_id: &str) -> Result<Option<PackageRecord>> {
        let url = format!("{}/repositories/{}", self.api_url, package_id);

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| UpdateError::gateway_unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json()
                .await
                .map(Some)
                .map_err(|e| UpdateError::gateway_unavailable(format!("Invalid record: {}", e))),
            status => Err(UpdateError::gateway_unavailable(format!(
                "Repository lookup returned HTTP {}",
                status
            ))),
        }
    }

    async fn refresh_metadata(&self, record: &PackageRecord, force: bool) -> Result<()> {
        self.post(
            &format!("repositories/{}/refresh", record.full_name),
            json!({ "force": force, "ignore_issues": true }),
        )
        .await
    }

    async fn persist(&self) -> Result<()> {
        self.post("data/write", json!({})).await
    }

    async fn notify_listeners(&self, category: &str) -> Result<()> {
        self.post(&format!("categories/{}/notify", category), json!({}))
            .await
    }
}

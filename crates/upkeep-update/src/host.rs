//! Host runtime integration
//!
//! The host owns the managed resource that mirrors the package manager's view
//! of the extension, and can install pending updates or restart itself. All
//! interaction goes through its REST API:
//!
//! - `POST {api}/api/services/{domain}/{service}` with `{"entity_id": ...}`
//! - `GET {api}/api/states/{entity_id}` (404 when the resource is unknown)

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};
use upkeep_core::types::{HostConfig, NetworkConfig};

use crate::error::{Result, UpdateError};

/// Raw view of a managed resource as reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSnapshot {
    /// State string reported by the host (e.g. "on", "off", "unavailable")
    pub state: String,

    /// Whether the state means an update can be installed
    pub ready: bool,

    pub installed_version: Option<String>,
    pub latest_version: Option<String>,
}

/// Host runtime service calls used by the gateway
#[async_trait]
pub trait HostRuntime: Send + Sync {
    /// Ask the host to refresh the resource from the package manager's cache.
    /// Waits until the host has applied the refresh.
    async fn refresh_resource(&self, resource_id: &str) -> Result<()>;

    /// Read the resource back; `None` when the host does not know it
    async fn resource_state(&self, resource_id: &str) -> Result<Option<ResourceSnapshot>>;

    /// Dispatch the install action for the resource without waiting for it
    fn dispatch_install(&self, resource_id: &str) -> Result<()>;
}

/// Capability to restart the whole host process.
///
/// Callers must not assume the restart succeeds or that control returns.
pub trait Restart: Send + Sync {
    fn restart(&self) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct HostState {
    state: String,
    #[serde(default)]
    attributes: HostStateAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct HostStateAttributes {
    #[serde(default)]
    installed_version: Option<String>,
    #[serde(default)]
    latest_version: Option<String>,
}

/// REST client for the host runtime
pub struct HttpHost {
    client: reqwest::Client,
    api_url: String,
    config: HostConfig,
    dispatches: TaskTracker,
}

impl HttpHost {
    pub fn new(config: HostConfig, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            config,
            dispatches: TaskTracker::new(),
        })
    }

    pub fn from_config(config: &HostConfig, network: &NetworkConfig) -> Result<Self> {
        Self::new(config.clone(), &network.user_agent, network.http_timeout())
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn service_request(&self, domain: &str, service: &str, body: Value) -> reqwest::RequestBuilder {
        let url = format!("{}/api/services/{}/{}", self.api_url, domain, service);
        self.authorize(self.client.post(url).json(&body))
    }

    /// Wait until every dispatched service call has been sent and answered.
    ///
    /// Call before the runtime shuts down; dispatches still pending when the
    /// runtime is dropped are lost.
    pub async fn drain(&self) {
        self.dispatches.close();
        self.dispatches.wait().await;
        self.dispatches.reopen();
    }

    /// Issue a service call on a tracked background task and return immediately
    fn dispatch(&self, domain: &str, service: &str, body: Value) -> Result<()> {
        let name = format!("{}.{}", domain, service);
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| UpdateError::host_call_failed(&name, e))?;

        let request = self.service_request(domain, service, body);
        debug!("Dispatching host service {}", name);

        self.dispatches.spawn_on(
            async move {
                match request.send().await {
                    Ok(response) if response.status().is_success() => {
                        debug!("Host service {} accepted", name);
                    }
                    Ok(response) => {
                        warn!("Host service {} returned HTTP {}", name, response.status());
                    }
                    Err(e) => {
                        warn!("Host service {} failed: {}", name, e);
                    }
                }
            },
            &handle,
        );

        Ok(())
    }
}

#[async_trait]
impl HostRuntime for HttpHost {
    async fn refresh_resource(&self, resource_id: &str) -> Result<()> {
        let name = format!("{}.{}", self.config.refresh_domain, self.config.refresh_service);

        let response = self
            .service_request(
                &self.config.refresh_domain,
                &self.config.refresh_service,
                json!({ "entity_id": resource_id }),
            )
            .send()
            .await
            .map_err(|e| UpdateError::host_call_failed(&name, e))?;

        if !response.status().is_success() {
            return Err(UpdateError::host_call_failed(
                &name,
                format!("HTTP {}", response.status()),
            ));
        }

        Ok(())
    }

    async fn resource_state(&self, resource_id: &str) -> Result<Option<ResourceSnapshot>> {
        let url = format!("{}/api/states/{}", self.api_url, resource_id);

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| UpdateError::host_call_failed("states", e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(UpdateError::host_call_failed(
                "states",
                format!("HTTP {}", response.status()),
            ));
        }

        let state: HostState = response
            .json()
            .await
            .map_err(|e| UpdateError::host_call_failed("states", e))?;

        Ok(Some(ResourceSnapshot {
            ready: state.state == self.config.ready_state,
            state: state.state,
            installed_version: state.attributes.installed_version,
            latest_version: state.attributes.latest_version,
        }))
    }

    fn dispatch_install(&self, resource_id: &str) -> Result<()> {
        self.dispatch(
            &self.config.install_domain,
            &self.config.install_service,
            json!({ "entity_id": resource_id }),
        )
    }
}

impl Restart for HttpHost {
    fn restart(&self) -> Result<()> {
        self.dispatch(
            &self.config.restart_domain,
            &self.config.restart_service,
            json!({}),
        )
    }
}

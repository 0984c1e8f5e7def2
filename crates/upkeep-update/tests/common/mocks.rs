//! Mock implementations for testing
//!
//! Recording mocks for the collaborator traits. Each mock is cheap to clone
//! and clones share state, so a test can hand one copy to the code under test
//! and inspect the other.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use upkeep_update::{
    HostRuntime, ManagedResourceState, PackageManager, PackageManagerGateway, PackageRecord,
    ResourceSnapshot, Restart, Result, UpdateError, Version, VersionSource,
};

use super::constants::*;

/// Version source returning a fixed answer
#[derive(Clone, Default)]
pub struct MockVersionSource {
    latest: Arc<Mutex<Option<Version>>>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl MockVersionSource {
    pub fn returning(tag: &str) -> Self {
        Self {
            latest: Arc::new(Mutex::new(Some(Version::new(tag)))),
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Sleep (on the tokio clock) before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_latest(&self, tag: &str) {
        *self.latest.lock().unwrap() = Some(Version::new(tag));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VersionSource for MockVersionSource {
    async fn latest(&self, _package_id: &str) -> Option<Version> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.latest.lock().unwrap().clone()
    }
}

/// Record of a gateway invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayCall {
    ForceRefresh(String),
    ReadState(String),
    TriggerInstall(String),
    TriggerRestart,
}

/// Gateway returning configured results and recording every call
#[derive(Clone)]
pub struct MockGateway {
    refresh_succeeds: bool,
    /// `None` makes `read_state` fail like a host error
    state: Arc<Mutex<Option<ManagedResourceState>>>,
    dispatch_fails: bool,
    calls: Arc<Mutex<Vec<GatewayCall>>>,
}

impl MockGateway {
    pub fn new(state: ManagedResourceState) -> Self {
        Self {
            refresh_succeeds: true,
            state: Arc::new(Mutex::new(Some(state))),
            dispatch_fails: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Gateway whose host rejects the state refresh
    pub fn failing_host() -> Self {
        Self {
            state: Arc::new(Mutex::new(None)),
            ..Self::new(ManagedResourceState::not_found())
        }
    }

    pub fn with_refresh_failure(mut self) -> Self {
        self.refresh_succeeds = false;
        self
    }

    pub fn with_dispatch_failure(mut self) -> Self {
        self.dispatch_fails = true;
        self
    }

    /// Change what later `read_state` calls report
    pub fn set_state(&self, state: ManagedResourceState) {
        *self.state.lock().unwrap() = Some(state);
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &GatewayCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn install_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, GatewayCall::TriggerInstall(_)))
            .count()
    }

    pub fn restart_count(&self) -> usize {
        self.count(&GatewayCall::TriggerRestart)
    }

    pub fn refresh_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, GatewayCall::ForceRefresh(_)))
            .count()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PackageManagerGateway for MockGateway {
    async fn force_refresh(&self, package_id: &str) -> bool {
        self.record(GatewayCall::ForceRefresh(package_id.to_string()));
        self.refresh_succeeds
    }

    async fn read_state(&self, resource_id: &str) -> Result<ManagedResourceState> {
        self.record(GatewayCall::ReadState(resource_id.to_string()));
        self.state
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| UpdateError::host_call_failed("homeassistant.update_entity", "HTTP 500"))
    }

    fn trigger_install(&self, resource_id: &str) -> Result<()> {
        self.record(GatewayCall::TriggerInstall(resource_id.to_string()));
        if self.dispatch_fails {
            return Err(UpdateError::host_call_failed("update.install", "no runtime"));
        }
        Ok(())
    }

    fn trigger_restart(&self) -> Result<()> {
        self.record(GatewayCall::TriggerRestart);
        if self.dispatch_fails {
            return Err(UpdateError::host_call_failed("homeassistant.restart", "no runtime"));
        }
        Ok(())
    }
}

/// Package manager step at which a mock fails
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailAt {
    Lookup,
    Refresh,
    Persist,
    Notify,
}

/// Record of a package manager invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PackageManagerCall {
    FindRecord(String),
    Refresh { id: String, force: bool },
    Persist,
    Notify(String),
}

#[derive(Clone)]
pub struct MockPackageManager {
    record: Option<PackageRecord>,
    fail_at: Option<FailAt>,
    calls: Arc<Mutex<Vec<PackageManagerCall>>>,
}

impl MockPackageManager {
    pub fn with_record() -> Self {
        Self {
            record: Some(test_record()),
            fail_at: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn without_record() -> Self {
        Self {
            record: None,
            ..Self::with_record()
        }
    }

    pub fn failing_at(mut self, step: FailAt) -> Self {
        self.fail_at = Some(step);
        self
    }

    pub fn calls(&self) -> Vec<PackageManagerCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record_call(&self, call: PackageManagerCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, step: FailAt) -> Result<()> {
        match (self.fail_at, step) {
            (Some(FailAt::Lookup), FailAt::Lookup) => {
                Err(UpdateError::gateway_unavailable("integration not loaded"))
            }
            (Some(at), step) if at == step => {
                Err(UpdateError::refresh_failed(format!("{:?} failed", step)))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl PackageManager for MockPackageManager {
    async fn find_record(&self, package_id: &str) -> Result<Option<PackageRecord>> {
        self.record_call(PackageManagerCall::FindRecord(package_id.to_string()));
        self.check(FailAt::Lookup)?;
        Ok(self.record.clone())
    }

    async fn refresh_metadata(&self, record: &PackageRecord, force: bool) -> Result<()> {
        self.record_call(PackageManagerCall::Refresh {
            id: record.id.clone(),
            force,
        });
        self.check(FailAt::Refresh)
    }

    async fn persist(&self) -> Result<()> {
        self.record_call(PackageManagerCall::Persist);
        self.check(FailAt::Persist)
    }

    async fn notify_listeners(&self, category: &str) -> Result<()> {
        self.record_call(PackageManagerCall::Notify(category.to_string()));
        self.check(FailAt::Notify)
    }
}

pub fn test_record() -> PackageRecord {
    PackageRecord {
        id: RECORD_ID.to_string(),
        full_name: PACKAGE_ID.to_string(),
        category: CATEGORY.to_string(),
    }
}

/// Record of a host invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostCall {
    Refresh(String),
    State(String),
    Install(String),
    Restart,
}

#[derive(Clone)]
pub struct MockHost {
    snapshot: Option<ResourceSnapshot>,
    refresh_fails: bool,
    calls: Arc<Mutex<Vec<HostCall>>>,
}

impl MockHost {
    pub fn with_snapshot(snapshot: ResourceSnapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
            refresh_fails: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Host that does not know the resource
    pub fn unknown_resource() -> Self {
        Self {
            snapshot: None,
            refresh_fails: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_refresh_failure(mut self) -> Self {
        self.refresh_fails = true;
        self
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl HostRuntime for MockHost {
    async fn refresh_resource(&self, resource_id: &str) -> Result<()> {
        self.record(HostCall::Refresh(resource_id.to_string()));
        if self.refresh_fails {
            return Err(UpdateError::host_call_failed(
                "homeassistant.update_entity",
                "HTTP 502",
            ));
        }
        Ok(())
    }

    async fn resource_state(&self, resource_id: &str) -> Result<Option<ResourceSnapshot>> {
        self.record(HostCall::State(resource_id.to_string()));
        Ok(self.snapshot.clone())
    }

    fn dispatch_install(&self, resource_id: &str) -> Result<()> {
        self.record(HostCall::Install(resource_id.to_string()));
        Ok(())
    }
}

impl Restart for MockHost {
    fn restart(&self) -> Result<()> {
        self.record(HostCall::Restart);
        Ok(())
    }
}

pub fn snapshot(state: &str, installed: Option<&str>, latest: Option<&str>) -> ResourceSnapshot {
    ResourceSnapshot {
        state: state.to_string(),
        ready: state == STATE_ON,
        installed_version: installed.map(String::from),
        latest_version: latest.map(String::from),
    }
}

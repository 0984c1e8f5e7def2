//! Mock server helpers for the HTTP collaborators
//!
//! Provides wiremock setups for the GitHub releases API, the host REST API,
//! and the package manager API.

use serde_json::{json, Value};
use std::time::Duration;
use upkeep_core::types::HostConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use super::constants::*;

fn latest_release_path() -> String {
    format!("/repos/{}/releases/latest", PACKAGE_ID)
}

/// Set up the latest-release endpoint returning `tag`
pub async fn mock_latest_release(server: &MockServer, tag: &str) {
    Mock::given(method("GET"))
        .and(path(latest_release_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tag_name": tag,
            "name": format!("Release {}", tag),
            "prerelease": false,
            "published_at": "2026-01-01T00:00:00Z",
        })))
        .mount(server)
        .await;
}

/// Set up the latest-release endpoint with an arbitrary status and body
pub async fn mock_latest_release_response(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(latest_release_path()))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Set up `GET /api/states/{RESOURCE_ID}`
pub async fn mock_host_state(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/states/{}", RESOURCE_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Set up a host service endpoint returning `status`
pub async fn mock_host_service(server: &MockServer, domain: &str, service: &str, status: u16) {
    Mock::given(method("POST"))
        .and(path(format!("/api/services/{}/{}", domain, service)))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!([])))
        .mount(server)
        .await;
}

/// Host state body in the host's REST format
pub fn host_state_body(state: &str, installed: &str, latest: &str) -> Value {
    json!({
        "entity_id": RESOURCE_ID,
        "state": state,
        "attributes": {
            "installed_version": installed,
            "latest_version": latest,
            "friendly_name": "Hello AWS IoT update",
        },
        "last_changed": "2026-01-01T00:00:00+00:00",
    })
}

/// Host configuration pointing at a mock server
pub fn host_config(server: &MockServer) -> HostConfig {
    HostConfig {
        api_url: server.uri(),
        token: Some("test-token".to_string()),
        resource_id: RESOURCE_ID.to_string(),
        ..Default::default()
    }
}

/// Set up `GET /repositories/{PACKAGE_ID}` returning the test record
pub async fn mock_package_record(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/repositories/{}", PACKAGE_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": RECORD_ID,
            "full_name": PACKAGE_ID,
            "category": CATEGORY,
            "installed_version": "1.0.0",
        })))
        .mount(server)
        .await;
}

/// Set up a POST endpoint on the package manager API
pub async fn mock_package_post(server: &MockServer, endpoint: &str, status: u16) {
    Mock::given(method("POST"))
        .and(path(endpoint.to_string()))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Requests received so far whose path matches `wanted`
pub async fn requests_to(server: &MockServer, wanted: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == wanted)
        .collect()
}

/// Wait for a fire-and-forget request to arrive at `wanted`
pub async fn wait_for_request(server: &MockServer, wanted: &str) -> Option<Request> {
    for _ in 0..100 {
        if let Some(request) = requests_to(server, wanted).await.into_iter().next() {
            return Some(request);
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    None
}

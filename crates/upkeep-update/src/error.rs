//! Error types for update orchestration
//!
//! Every variant is recoverable: the scheduler retries on the next interval.

use thiserror::Error;

/// Result type alias using upkeep-update's error type
pub type Result<T> = std::result::Result<T, UpdateError>;

#[derive(Error, Debug)]
pub enum UpdateError {
    /// Registry query failed (status, transport, or body shape)
    #[error("Registry unavailable: {0}")]
    RemoteUnavailable(String),

    /// The host's package manager integration is missing or unreachable
    #[error("Package manager unavailable: {0}")]
    GatewayUnavailable(String),

    /// The package manager failed while refreshing its metadata
    #[error("Package manager refresh failed: {0}")]
    RefreshFailed(String),

    /// A service call to the host runtime failed
    #[error("Host call {service} failed: {message}")]
    HostCallFailed { service: String, message: String },

    /// The local manifest could not be read
    #[error("Failed to read manifest {path}: {message}")]
    Manifest { path: String, message: String },

    /// HTTP client construction failed
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl UpdateError {
    pub fn remote_unavailable(message: impl Into<String>) -> Self {
        Self::RemoteUnavailable(message.into())
    }

    pub fn gateway_unavailable(message: impl Into<String>) -> Self {
        Self::GatewayUnavailable(message.into())
    }

    pub fn refresh_failed(message: impl Into<String>) -> Self {
        Self::RefreshFailed(message.into())
    }

    pub fn host_call_failed(service: impl Into<String>, message: impl ToString) -> Self {
        Self::HostCallFailed {
            service: service.into(),
            message: message.to_string(),
        }
    }

    pub fn manifest(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Manifest {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

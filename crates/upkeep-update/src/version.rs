//! Release identifiers
//!
//! Versions are compared by their normalized string form only. A release tag
//! such as `v1.2.3` and a manifest version `1.2.3` name the same release.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized release identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Version(String);

impl Version {
    /// Create a version, stripping surrounding whitespace and a single
    /// leading non-numeric prefix character (`v1.2.3` -> `1.2.3`)
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize(raw.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse as a semantic version, when the identifier is one
    pub fn semver(&self) -> Option<semver::Version> {
        semver::Version::parse(&self.0).ok()
    }
}

fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        // Only a marker directly in front of a number is a prefix
        (Some(first), Some(second)) if !first.is_ascii_digit() && second.is_ascii_digit() => {
            trimmed[first.len_utf8()..].to_string()
        }
        _ => trimmed.to_string(),
    }
}

impl From<String> for Version {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for Version {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Version of the code currently executing, fixed at process start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningRelease(Version);

impl RunningRelease {
    pub fn new(version: impl Into<Version>) -> Self {
        Self(version.into())
    }

    pub fn version(&self) -> &Version {
        &self.0
    }
}

impl fmt::Display for RunningRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

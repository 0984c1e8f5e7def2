//! # upkeep-core
//!
//! Core library for upkeep providing:
//! - Runtime configuration types (registry, host, package manager, schedule)
//! - Hierarchical configuration loading with embedded defaults
//! - Core error types

pub mod config;
pub mod error;
pub mod types;

pub use config::HierarchicalConfigLoader;
pub use error::{Error, Result};
pub use types::RuntimeConfig;

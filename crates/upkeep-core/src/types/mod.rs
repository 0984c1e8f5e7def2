//! Type definitions for upkeep configuration

mod runtime_config;

pub use runtime_config::*;

//! Shared bootstrap utilities for client front-ends.
//!
//! Provides configuration loading, the built-in module catalog, and host
//! setup that can be reused by the CLI or any other front-end crate.
pub mod builder;
pub mod catalog;
pub mod config;
pub mod dirs;

pub use builder::{ClientBuilder, HostSetup};
pub use catalog::{builtin_registry, register_builtin_modules};
pub use config::ClientConfig;

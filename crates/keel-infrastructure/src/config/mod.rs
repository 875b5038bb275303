//! Configuration management
//!
//! Layered configuration: defaults, then a TOML file, then `KEEL_`
//! environment variables.

pub mod loader;
pub mod types;

pub use loader::{ConfigBuilder, ConfigLoader, validate_app_config};
pub use types::*;

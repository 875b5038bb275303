//! # Infrastructure Layer
//!
//! Runs the assembly: container, phase orchestrator, configuration, logging
//! and shutdown coordination.
//!
//! ## Module Categories
//!
//! ### Assembly
//! | Module | Description |
//! |--------|-------------|
//! | [`di`] | Binding table, frozen container, phase orchestrator |
//! | [`graph`] | Dependency graph renderers |
//! | [`lifecycle`] | Shutdown coordinator and hook |
//!
//! ### Configuration
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment-layered TOML + environment configuration |
//! | [`constants`] | Centralized configuration constants |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`logging`] | Structured logging with tracing |
//! | [`error_ext`] | Context helpers mapping foreign errors into domain errors |

pub mod config;
pub mod constants;
pub mod di;
pub mod error_ext;
pub mod graph;
pub mod lifecycle;
pub mod logging;

pub use config::{AppConfig, ConfigBuilder, ConfigLoader};
pub use di::{AppContext, Assembler, FrozenContainer};
pub use error_ext::ErrorContext;

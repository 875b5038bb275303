//! # keel
//!
//! Application assembly runtime: classifies scanned candidates by their
//! declared binding intent, installs them through four ordered phases into a
//! dependency container, records the dependency graph for diagnostics, and
//! runs ordered migrations against the store the container provides.
//!
//! ## Example
//!
//! ```ignore
//! use keel::prelude::*;
//!
//! let context = Assembler::new(ConfigLoader::new().load()?)
//!     .scan(StaticScan)
//!     .assemble()?;
//!
//! let clock = context.container().get::<dyn Clock>()?;
//! context.run_migrations().await?;
//! ```
//!
//! ## Architecture
//!
//! - `domain` - error taxonomy, binding model, ports
//! - `application` - classifier, dependency graph, migration runner, registries
//! - `infrastructure` - container, phase orchestrator, config, logging
//! - `providers` - store providers selectable through configuration

/// Domain layer - binding model, errors and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use keel_domain::*;
}

/// Application layer - classifier, graph model, migration runner
///
/// Re-exports from the application crate for convenience
pub mod application {
    pub use keel_application::*;
}

/// Infrastructure layer - assembler, container, config and logging
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use keel_infrastructure::*;
}

/// Store providers
pub mod providers {
    pub use keel_providers::*;
}

/// Command line front end
pub mod cli;

/// The names most applications need
pub mod prelude {
    pub use keel_application::ports::{ListScan, ScanResult, StaticScan};
    pub use keel_domain::ports::{Binder, BinderExt, Injector, InjectorExt, Module};
    pub use keel_domain::{BindingKey, Candidate, DeclaredTag, Error, Result};
    pub use keel_infrastructure::config::{AppConfig, ConfigBuilder, ConfigLoader};
    pub use keel_infrastructure::{AppContext, Assembler};
}

// Re-export commonly used domain types at the crate root
pub use domain::{Error, Result};
pub use infrastructure::{AppContext, Assembler};

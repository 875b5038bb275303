//! # keel - Provider Implementations
//!
//! Store providers selectable through configuration. Each provider
//! implements the `StoreProvider` port from `keel-domain` and registers
//! itself into the `STORE_PROVIDERS` slice of `keel-application`.
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Store | `StoreProvider` | InMemory, Null |
//!
//! ## Usage
//!
//! ```ignore
//! use keel_providers::store::InMemoryStore;
//! ```

pub use keel_domain::error::{Error, Result};
pub use keel_domain::ports::StoreProvider;

/// Provider-specific constants
pub mod constants;

/// Store provider implementations
pub mod store;

pub use store::{InMemoryClient, InMemoryStore, NullStore};

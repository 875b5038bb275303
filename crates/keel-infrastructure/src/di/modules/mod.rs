//! Built-in Modules
//!
//! ```text
//! CONFIG_BOOTSTRAP   ConfigModule   application name, AppConfig, config sections
//! MAIN_INSTALL       StoreModule    Arc<dyn StoreProvider> from the registry
//! ```

/// Configuration bindings installed before anything else
pub mod config;
/// Store provider selection
pub mod store;

pub use config::ConfigModule;
pub use store::StoreModule;

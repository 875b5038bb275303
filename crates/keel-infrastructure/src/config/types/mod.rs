//! Configuration types module

pub mod app;
pub mod assembly;
pub mod logging;
pub mod store;

pub use app::{AppConfig, ApplicationConfig};
pub use assembly::{AssemblyConfig, MigrationsConfig};
pub use logging::LoggingConfig;
pub use store::StoreConfig;

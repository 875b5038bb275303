//! Domain Port Interfaces
//!
//! Boundary contracts between the assembly engine and everything it wires:
//! - **injector** - dependency lookups available to constructors
//! - **binder** - registrations available to modules
//! - **store** - key-item store consumed by the migration runner
//! - **migration** - migration unit contract
//! - **lifecycle** - lifecycle participants and shutdown coordination

/// Binder and module ports
pub mod binder;
/// Injector port
pub mod injector;
/// Lifecycle and shutdown ports
pub mod lifecycle;
/// Migration unit port
pub mod migration;
/// Store port
pub mod store;

pub use binder::{Binder, BinderExt, Module};
pub use injector::{Injector, InjectorExt};
pub use lifecycle::{LifecycleManaged, ServiceState, ShutdownCoordinator};
pub use migration::{Migration, MigrationContext};
pub use store::{Item, ItemKey, ItemValue, NativeClient, StoreProvider, TableKeySchema};

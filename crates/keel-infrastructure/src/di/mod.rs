//! Dependency Injection System
//!
//! ```text
//! Candidate ──classify──▶ BindingDescriptor ──register──▶ BindingTable
//!                                                             │ finalize
//!                                                             ▼
//!                     Injector::resolve ◀── FrozenContainer ──▶ DependencyGraph
//! ```
//!
//! - [`BindingTable`]: single-writer registration state used while the
//!   phases run; rejects duplicate keys unless override mode is on
//! - [`PhaseBinder`]: the `Binder` modules see, restricted during bootstrap
//! - [`FrozenContainer`]: lock-free reads, exactly-once lazy singletons,
//!   cycle detection and graph bookkeeping on every resolution
//! - [`Assembler`] / [`AppContext`]: the phase orchestrator and its result

pub mod binder;
pub mod binding;
pub mod bootstrap;
pub mod container;
pub mod modules;

pub use binder::PhaseBinder;
pub use binding::BindingTable;
pub use bootstrap::{AppContext, Assembler};
pub use container::FrozenContainer;

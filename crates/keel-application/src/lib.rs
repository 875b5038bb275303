//! Application Layer - keel
//!
//! Assembly logic that does not depend on how the container is stored or
//! how the process is hosted.
//!
//! ## Architecture
//!
//! The application layer:
//! - Classifies scanned candidates into binding descriptors
//! - Models the dependency graph the container records while resolving
//! - Runs ordered migrations through the store port
//! - Declares the linkme registries crates link candidates, migration units
//!   and store providers into
//!
//! ## Dependencies
//!
//! This crate depends only on:
//! - `keel-domain`: For the binding model, errors and port traits
//! - Pure Rust libraries for concurrency, time and registration

pub mod domain_services;
pub mod ports;
pub mod use_cases;

pub use domain_services::*;
pub use ports::*;
pub use use_cases::*;

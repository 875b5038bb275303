//! # keel domain
//!
//! Binding model, error taxonomy and port traits shared by every layer of
//! the assembly engine. Nothing in this crate performs I/O.

/// Domain-level constants
pub mod constants;
/// Error taxonomy
pub mod error;
/// Port traits
pub mod ports;
/// Value objects
pub mod value_objects;

pub use error::{Error, Result};
pub use value_objects::*;

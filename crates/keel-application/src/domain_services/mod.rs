//! Domain Services
//!
//! Stateless or self-contained logic the assembly engine is built from.
//!
//! | Service | Description |
//! |---------|-------------|
//! | [`BindingClassifier`] | Declared tags → one binding descriptor |
//! | [`DependencyGraph`] | Consumer → dependency edges and orphan detection |

/// Binding descriptor classifier
pub mod classifier;
/// Dependency graph model
pub mod graph;

pub use classifier::{BindingClassifier, MODIFIER_MARKERS, VARIANT_MARKERS, classify};
pub use graph::{DependencyGraph, GraphLayoutInput, Vertex};

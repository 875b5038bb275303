//! Domain Value Objects
//!
//! Immutable value objects the assembly engine passes between layers.
//!
//! ## Value Objects
//!
//! | Value Object | Description |
//! |--------------|-------------|
//! | [`TypeTag`] | Runtime identity of a bound type |
//! | [`BindingKey`] | Type + qualifier + shape: one container slot |
//! | [`DeclaredTag`] | Raw binding-intent marker reported by a scanner |
//! | [`Candidate`] | Scanned type with tags and a constructor or module |
//! | [`BindingDescriptor`] | Classified candidate with one binding strategy |
//! | [`Instance`] | Type-erased shared value |
//! | [`Factory`] | Assisted-construction factory for a produced type |
//! | [`MigrationRecord`] | Applied migration in the tracking table |

/// Assembly phases
pub mod phase;
/// Candidates and their builders
pub mod candidate;
/// Classified binding descriptors
pub mod descriptor;
/// Assisted-construction factories
pub mod factory;
/// Type-erased instances and alias conversions
pub mod instance;
/// Migration records and registry
pub mod migration;
/// Declared binding-intent markers
pub mod tags;
/// Type tags and binding keys
pub mod type_tag;

pub use candidate::{Candidate, CandidateBuilder, CandidateSource, Constructor};
pub use descriptor::{
    BindingDescriptor, BindingKind, BindingVariant, Construction, MapKey, ModulePhase,
    ProviderScope,
};
pub use factory::Factory;
pub use instance::{AliasCast, Instance};
pub use migration::{ApplicationName, MigrationRecord, MigrationRegistry};
pub use phase::AssemblyPhase;
pub use tags::{AttributeValue, DeclaredTag};
pub use type_tag::{BindingKey, KeyShape, Qualifier, TypeTag};

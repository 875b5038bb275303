//! Typed binding descriptors produced by classification

use crate::ports::Module;
use crate::value_objects::{AliasCast, BindingKey, Constructor, KeyShape, Qualifier, TypeTag};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Lifecycle scope of a provider binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderScope {
    /// New instance on every lookup
    #[default]
    None,
    /// One instance per transport request
    Request,
    /// One instance per transport session
    Session,
    /// One instance for the application, built eagerly at finalize
    Singleton,
}

impl FromStr for ProviderScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "request" => Ok(Self::Request),
            "session" => Ok(Self::Session),
            "singleton" => Ok(Self::Singleton),
            other => Err(format!(
                "unknown provider scope '{other}' (expected none, request, session or singleton)"
            )),
        }
    }
}

/// Phase in which a module contribution is installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModulePhase {
    /// Installed before the main container exists
    Bootstrap,
    /// Installed with the auto-bound descriptors
    #[default]
    Main,
}

impl FromStr for ModulePhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bootstrap" => Ok(Self::Bootstrap),
            "main" => Ok(Self::Main),
            other => Err(format!(
                "unknown module phase '{other}' (expected bootstrap or main)"
            )),
        }
    }
}

/// Key of a map multi-binding entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MapKey {
    /// Plain string key
    Str(String),
    /// Enum-backed key: the enum's name and the variant identifier
    Enum {
        /// Name of the enum type
        enum_type: String,
        /// Variant identifier
        variant: String,
    },
}

impl MapKey {
    /// The key as it appears in lookups
    pub fn as_str(&self) -> &str {
        match self {
            Self::Str(key) => key,
            Self::Enum { variant, .. } => variant,
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(key) => write!(f, "\"{key}\""),
            Self::Enum { enum_type, variant } => write!(f, "{enum_type}::{variant}"),
        }
    }
}

/// What a constructor-backed descriptor builds
#[derive(Clone)]
pub struct Construction {
    /// Type of the constructed value
    pub produces: TypeTag,
    /// The constructor
    pub constructor: Constructor,
}

impl fmt::Debug for Construction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Construction")
            .field("produces", &self.produces)
            .finish_non_exhaustive()
    }
}

/// The six binding strategies
#[derive(Clone)]
pub enum BindingVariant {
    /// At most one instance, optionally served under an alias
    Singleton {
        /// How to build it
        construction: Construction,
        /// Alias the instance is looked up as; the constructed type when absent
        alias: Option<AliasCast>,
        /// Also bind the constructed type itself when an alias is used
        expose_impl: bool,
        /// Build at finalize instead of on first lookup
        eager: bool,
    },
    /// Entry in a keyed multi-binding
    MapEntry {
        /// How to build it
        construction: Construction,
        /// Map value type when it differs from the constructed type
        alias: Option<AliasCast>,
        /// Entry key
        key: MapKey,
    },
    /// Element of an unkeyed multi-binding
    SetMember {
        /// How to build it
        construction: Construction,
        /// Set element type when it differs from the constructed type
        alias: Option<AliasCast>,
    },
    /// Thunk producing a type under a lifecycle scope
    Provider {
        /// How to build it
        construction: Construction,
        /// Lifecycle scope
        scope: ProviderScope,
    },
    /// Assisted-construction factory for a produced-type family
    ///
    /// The construction builds the `Factory<A, T>` object, bound once under
    /// its own type; every `create` call on it builds a new `T`.
    Factory {
        /// How to build the factory object
        construction: Construction,
        /// The `T` each `create` call builds
        product: TypeTag,
    },
    /// Self-contained unit of additional bindings
    ModuleContribution {
        /// The module
        module: Arc<dyn Module>,
        /// When to install it
        phase: ModulePhase,
    },
}

/// Discriminant of [`BindingVariant`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// See [`BindingVariant::Singleton`]
    Singleton,
    /// See [`BindingVariant::MapEntry`]
    MapEntry,
    /// See [`BindingVariant::SetMember`]
    SetMember,
    /// See [`BindingVariant::Provider`]
    Provider,
    /// See [`BindingVariant::Factory`]
    Factory,
    /// See [`BindingVariant::ModuleContribution`]
    ModuleContribution,
}

impl BindingVariant {
    /// Which strategy this is
    pub fn kind(&self) -> BindingKind {
        match self {
            Self::Singleton { .. } => BindingKind::Singleton,
            Self::MapEntry { .. } => BindingKind::MapEntry,
            Self::SetMember { .. } => BindingKind::SetMember,
            Self::Provider { .. } => BindingKind::Provider,
            Self::Factory { .. } => BindingKind::Factory,
            Self::ModuleContribution { .. } => BindingKind::ModuleContribution,
        }
    }
}

impl fmt::Debug for BindingVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Singleton {
                construction,
                alias,
                expose_impl,
                eager,
            } => f
                .debug_struct("Singleton")
                .field("produces", &construction.produces)
                .field("alias", &alias.as_ref().map(AliasCast::target))
                .field("expose_impl", expose_impl)
                .field("eager", eager)
                .finish(),
            Self::MapEntry {
                construction,
                alias,
                key,
            } => f
                .debug_struct("MapEntry")
                .field("produces", &construction.produces)
                .field("alias", &alias.as_ref().map(AliasCast::target))
                .field("key", key)
                .finish(),
            Self::SetMember {
                construction,
                alias,
            } => f
                .debug_struct("SetMember")
                .field("produces", &construction.produces)
                .field("alias", &alias.as_ref().map(AliasCast::target))
                .finish(),
            Self::Provider {
                construction,
                scope,
            } => f
                .debug_struct("Provider")
                .field("produces", &construction.produces)
                .field("scope", scope)
                .finish(),
            Self::Factory {
                construction,
                product,
            } => f
                .debug_struct("Factory")
                .field("factory", &construction.produces)
                .field("product", product)
                .finish(),
            Self::ModuleContribution { module, phase } => f
                .debug_struct("ModuleContribution")
                .field("module", &module.name())
                .field("phase", phase)
                .finish(),
        }
    }
}

/// A candidate type with exactly one resolved binding strategy
#[derive(Clone, Debug)]
pub struct BindingDescriptor {
    /// The candidate type the descriptor came from
    pub origin: TypeTag,
    /// Qualifier from a `named` marker
    pub qualifier: Option<Qualifier>,
    /// The strategy and its parameters
    pub variant: BindingVariant,
}

impl BindingDescriptor {
    /// Which strategy this descriptor uses
    pub fn kind(&self) -> BindingKind {
        self.variant.kind()
    }

    /// Keys this descriptor occupies once registered
    ///
    /// Module contributions occupy no key of their own.
    pub fn keys(&self) -> Vec<BindingKey> {
        let key_for = |tag: TypeTag, shape: KeyShape| {
            BindingKey::new(tag)
                .with_qualifier(self.qualifier.clone())
                .with_shape(shape)
        };
        let target = |construction: &Construction, alias: &Option<AliasCast>| {
            alias
                .as_ref()
                .map_or(construction.produces, AliasCast::target)
        };
        match &self.variant {
            BindingVariant::Singleton {
                construction,
                alias,
                expose_impl,
                ..
            } => {
                let mut keys = vec![key_for(target(construction, alias), KeyShape::Single)];
                if *expose_impl && alias.is_some() {
                    keys.push(key_for(construction.produces, KeyShape::Single));
                }
                keys
            }
            BindingVariant::MapEntry {
                construction,
                alias,
                ..
            } => vec![key_for(target(construction, alias), KeyShape::Map)],
            BindingVariant::SetMember {
                construction,
                alias,
            } => vec![key_for(target(construction, alias), KeyShape::Set)],
            BindingVariant::Provider { construction, .. }
            | BindingVariant::Factory { construction, .. } => {
                vec![key_for(construction.produces, KeyShape::Single)]
            }
            BindingVariant::ModuleContribution { .. } => Vec::new(),
        }
    }
}

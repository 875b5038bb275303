//! Declared binding-intent metadata
//!
//! A scanner reports, for every candidate type, the markers it found on it
//! together with their raw attributes. Nothing here is validated: turning a
//! tag set into a binding descriptor is the classifier's job.

use crate::constants::{
    ATTR_ALIAS, ATTR_FACTORY_TYPE, ATTR_KEY, ATTR_PRODUCES, ATTR_VALUE, MARKER_EAGER,
    MARKER_FACTORY, MARKER_MAP_ENTRY, MARKER_MODULE, MARKER_NAMED, MARKER_PROVIDER,
    MARKER_SET_MEMBER, MARKER_SINGLETON,
};
use crate::value_objects::{Factory, TypeTag};
use std::collections::BTreeMap;
use std::fmt;

/// Raw attribute value attached to a marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// String literal
    Str(String),
    /// Boolean flag
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// Reference to a type
    Type(TypeTag),
}

impl AttributeValue {
    /// Name of the attribute kind, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Type(_) => "type",
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<TypeTag> for AttributeValue {
    fn from(value: TypeTag) -> Self {
        Self::Type(value)
    }
}

/// One binding-intent marker found on a candidate type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredTag {
    marker: String,
    attributes: BTreeMap<String, AttributeValue>,
}

impl DeclaredTag {
    /// Create a tag with the given marker and no attributes
    pub fn new<S: Into<String>>(marker: S) -> Self {
        Self {
            marker: marker.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// `singleton` marker
    pub fn singleton() -> Self {
        Self::new(MARKER_SINGLETON)
    }

    /// `map_entry` marker with a string key
    pub fn map_entry<S: Into<String>>(key: S) -> Self {
        Self::new(MARKER_MAP_ENTRY).with(ATTR_KEY, key.into())
    }

    /// `set_member` marker
    pub fn set_member() -> Self {
        Self::new(MARKER_SET_MEMBER)
    }

    /// `provider` marker producing `P`
    pub fn provider<P: ?Sized + 'static>() -> Self {
        Self::new(MARKER_PROVIDER).with(ATTR_PRODUCES, TypeTag::of::<P>())
    }

    /// `factory` marker: the candidate builds a `Factory<A, T>` producing `T`
    pub fn factory<A: 'static, T: ?Sized + 'static>() -> Self {
        Self::new(MARKER_FACTORY)
            .with(ATTR_PRODUCES, TypeTag::of::<T>())
            .with(ATTR_FACTORY_TYPE, TypeTag::of::<Factory<A, T>>())
    }

    /// `module` marker
    pub fn module() -> Self {
        Self::new(MARKER_MODULE)
    }

    /// `named` qualifier marker
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self::new(MARKER_NAMED).with(ATTR_VALUE, name.into())
    }

    /// `eager` modifier marker
    pub fn eager() -> Self {
        Self::new(MARKER_EAGER)
    }

    /// Set an attribute
    #[must_use]
    pub fn with<K: Into<String>, V: Into<AttributeValue>>(mut self, name: K, value: V) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the `alias` attribute to `A`
    #[must_use]
    pub fn alias<A: ?Sized + 'static>(self) -> Self {
        self.with(ATTR_ALIAS, TypeTag::of::<A>())
    }

    /// The marker name
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Look up one attribute
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// All attributes, ordered by name
    pub fn attributes(&self) -> &BTreeMap<String, AttributeValue> {
        &self.attributes
    }
}

impl fmt::Display for DeclaredTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.marker)
    }
}

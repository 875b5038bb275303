//! Type tags, qualifiers and binding keys
//!
//! A binding key names one slot in the container: the looked-up type, an
//! optional qualifier, and whether the slot is a single binding or a map/set
//! multi-binding. Aliasing is expressed by binding the same value under a
//! second key rather than through subtyping.

use std::any::TypeId;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Runtime identity of a (possibly unsized) Rust type
#[derive(Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// Tag for `T`; trait objects such as `dyn Service` are allowed
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying `TypeId`
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name with module paths stripped, e.g. `Arc<dyn Clock>`
    pub fn short_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        let mut segment = String::new();
        for ch in self.name.chars() {
            if ch.is_alphanumeric() || ch == '_' || ch == ':' {
                segment.push(ch);
            } else {
                out.push_str(last_path_segment(&segment));
                segment.clear();
                out.push(ch);
            }
        }
        out.push_str(last_path_segment(&segment));
        out
    }
}

fn last_path_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for TypeTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeTag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(other.name)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeTag").field(&self.name).finish()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_name())
    }
}

/// Name that distinguishes two bindings of the same type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Qualifier(String);

impl Qualifier {
    /// Create a named qualifier
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    /// The qualifier name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Shape of the slot a key addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum KeyShape {
    /// One instance or provider
    #[default]
    Single,
    /// Keyed multi-binding
    Map,
    /// Unkeyed multi-binding
    Set,
}

/// Identifies a unique binding slot
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingKey {
    type_tag: TypeTag,
    qualifier: Option<Qualifier>,
    shape: KeyShape,
}

impl BindingKey {
    /// Single-binding key for a type tag
    pub fn new(type_tag: TypeTag) -> Self {
        Self {
            type_tag,
            qualifier: None,
            shape: KeyShape::Single,
        }
    }

    /// Single-binding key for `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeTag::of::<T>())
    }

    /// Qualified single-binding key for `T`
    pub fn named<T: ?Sized + 'static>(qualifier: &str) -> Self {
        Self::of::<T>().with_qualifier(Some(Qualifier::named(qualifier)))
    }

    /// Map multi-binding key whose values are `T`
    pub fn map_of<T: ?Sized + 'static>() -> Self {
        Self::of::<T>().with_shape(KeyShape::Map)
    }

    /// Set multi-binding key whose elements are `T`
    pub fn set_of<T: ?Sized + 'static>() -> Self {
        Self::of::<T>().with_shape(KeyShape::Set)
    }

    /// Replace the qualifier
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: Option<Qualifier>) -> Self {
        self.qualifier = qualifier;
        self
    }

    /// Replace the shape
    #[must_use]
    pub fn with_shape(mut self, shape: KeyShape) -> Self {
        self.shape = shape;
        self
    }

    /// The bound type
    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    /// The qualifier, if any
    pub fn qualifier(&self) -> Option<&Qualifier> {
        self.qualifier.as_ref()
    }

    /// Single, map or set
    pub fn shape(&self) -> KeyShape {
        self.shape
    }

    /// Same type and qualifier as a single binding
    #[must_use]
    pub fn as_single(&self) -> Self {
        self.clone().with_shape(KeyShape::Single)
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape {
            KeyShape::Single => write!(f, "{}", self.type_tag)?,
            KeyShape::Map => write!(f, "Map<{}>", self.type_tag)?,
            KeyShape::Set => write!(f, "Set<{}>", self.type_tag)?,
        }
        if let Some(qualifier) = &self.qualifier {
            write!(f, " {qualifier}")?;
        }
        Ok(())
    }
}

//! Type-erased instances and alias conversions

use crate::value_objects::TypeTag;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A bound value, stored as a type-erased `Arc<T>`
///
/// `T` may be unsized, so an `Instance` can hold `Arc<dyn Trait>` directly.
#[derive(Clone)]
pub struct Instance {
    type_tag: TypeTag,
    value: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    /// Wrap a shared value
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            type_tag: TypeTag::of::<T>(),
            value: Arc::new(value),
        }
    }

    /// Wrap an owned value
    pub fn from_value<T: Send + Sync + 'static>(value: T) -> Self {
        Self::new(Arc::new(value))
    }

    /// Type the instance was created as
    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    /// Recover the shared value if it was created as `T`
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.value.downcast_ref::<Arc<T>>().cloned()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.type_tag)
            .finish_non_exhaustive()
    }
}

type ConvertFn = dyn Fn(&Instance) -> Option<Instance> + Send + Sync;

/// Converts an instance of the constructed type into one of an alias type
///
/// Built from a plain coercion such as `|it: Arc<Impl>| -> Arc<dyn Trait> { it }`.
#[derive(Clone)]
pub struct AliasCast {
    source: TypeTag,
    target: TypeTag,
    convert: Arc<ConvertFn>,
}

impl AliasCast {
    /// Conversion from `Arc<T>` to `Arc<A>`
    pub fn new<T, A>(cast: fn(Arc<T>) -> Arc<A>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        A: ?Sized + Send + Sync + 'static,
    {
        Self {
            source: TypeTag::of::<T>(),
            target: TypeTag::of::<A>(),
            convert: Arc::new(move |instance: &Instance| {
                instance.downcast::<T>().map(|value| Instance::new(cast(value)))
            }),
        }
    }

    /// Conversion that returns the instance unchanged
    pub fn identity(tag: TypeTag) -> Self {
        Self {
            source: tag,
            target: tag,
            convert: Arc::new(|instance: &Instance| Some(instance.clone())),
        }
    }

    /// Type accepted by the conversion
    pub fn source(&self) -> TypeTag {
        self.source
    }

    /// Type produced by the conversion
    pub fn target(&self) -> TypeTag {
        self.target
    }

    /// Apply the conversion; `None` if the instance has the wrong type
    pub fn apply(&self, instance: &Instance) -> Option<Instance> {
        (self.convert)(instance)
    }
}

impl fmt::Debug for AliasCast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AliasCast({} -> {})", self.source, self.target)
    }
}

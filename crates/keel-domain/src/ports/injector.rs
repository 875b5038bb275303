//! Injector Port
//!
//! The view a constructor gets of the container while it is being built.
//! The object-safe [`Injector`] works on erased instances; [`InjectorExt`]
//! adds the typed helpers constructors actually call.

use crate::error::{Error, Result};
use crate::value_objects::{BindingKey, Factory, Instance, MapKey};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Resolves bindings by key
pub trait Injector: Send + Sync {
    /// Resolve a single binding
    fn resolve(&self, key: &BindingKey) -> Result<Instance>;

    /// Resolve every entry of a map multi-binding (`key` must have `Map` shape)
    fn resolve_map(&self, key: &BindingKey) -> Result<Vec<(MapKey, Instance)>>;

    /// Resolve every element of a set multi-binding (`key` must have `Set` shape)
    fn resolve_set(&self, key: &BindingKey) -> Result<Vec<Instance>>;

    /// Whether a binding exists for the key
    fn contains(&self, key: &BindingKey) -> bool;
}

fn downcast<T: ?Sized + Send + Sync + 'static>(
    key: &BindingKey,
    instance: &Instance,
) -> Result<Arc<T>> {
    instance.downcast::<T>().ok_or_else(|| Error::TypeMismatch {
        key: key.to_string(),
        expected: std::any::type_name::<T>().to_string(),
        actual: instance.type_tag().name().to_string(),
    })
}

/// Typed lookups on top of [`Injector`]
pub trait InjectorExt: Injector {
    /// Resolve `T` by its unqualified key
    fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.get_key::<T>(&BindingKey::of::<T>())
    }

    /// Resolve `T` bound under a qualifier
    fn get_named<T: ?Sized + Send + Sync + 'static>(&self, qualifier: &str) -> Result<Arc<T>> {
        self.get_key::<T>(&BindingKey::named::<T>(qualifier))
    }

    /// Resolve the factory that builds `T` from arguments `A`
    fn get_factory<A: 'static, T: ?Sized + 'static>(&self) -> Result<Arc<Factory<A, T>>> {
        self.get::<Factory<A, T>>()
    }

    /// Resolve `T` by an explicit key
    fn get_key<T: ?Sized + Send + Sync + 'static>(&self, key: &BindingKey) -> Result<Arc<T>> {
        let instance = self.resolve(key)?;
        downcast::<T>(key, &instance)
    }

    /// Resolve `T` if it is bound
    fn try_get<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>> {
        let key = BindingKey::of::<T>();
        if self.contains(&key) {
            self.get_key::<T>(&key).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Resolve the map multi-binding of `T`
    fn get_map<T: ?Sized + Send + Sync + 'static>(&self) -> Result<BTreeMap<MapKey, Arc<T>>> {
        let key = BindingKey::map_of::<T>();
        self.resolve_map(&key)?
            .into_iter()
            .map(|(entry, instance)| downcast::<T>(&key, &instance).map(|value| (entry, value)))
            .collect()
    }

    /// Resolve the set multi-binding of `T`, in registration order
    fn get_set<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<T>>> {
        let key = BindingKey::set_of::<T>();
        self.resolve_set(&key)?
            .iter()
            .map(|instance| downcast::<T>(&key, instance))
            .collect()
    }
}

impl<I: Injector + ?Sized> InjectorExt for I {}

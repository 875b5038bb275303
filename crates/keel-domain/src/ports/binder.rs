//! Binder and Module Ports
//!
//! Modules contribute bindings through a [`Binder`]. The binder handed to a
//! module depends on the phase: bootstrap binders only accept instance
//! bindings and nested modules, because no container exists yet to
//! construct anything.

use crate::error::Result;
use crate::value_objects::{AssemblyPhase, BindingKey, Candidate, Instance};
use std::sync::Arc;

/// Receives registrations from modules
pub trait Binder {
    /// Phase the binder belongs to
    fn phase(&self) -> AssemblyPhase;

    /// Classify and register a candidate
    fn install(&mut self, candidate: Candidate) -> Result<()>;

    /// Install a nested module
    fn install_module(&mut self, module: Arc<dyn Module>) -> Result<()>;

    /// Bind an already built instance
    fn bind_instance(&mut self, key: BindingKey, instance: Instance) -> Result<()>;

    /// Instance bound so far under `key`, if it was bound as an instance
    fn bound_instance(&self, key: &BindingKey) -> Option<Instance>;
}

/// Typed helpers on top of [`Binder`]
pub trait BinderExt: Binder {
    /// Bind an owned value under its own type
    fn bind_value<T: Send + Sync + 'static>(&mut self, value: T) -> Result<()> {
        self.bind_instance(BindingKey::of::<T>(), Instance::from_value(value))
    }

    /// Bind a shared value under `T`
    fn bind_arc<T: ?Sized + Send + Sync + 'static>(&mut self, value: Arc<T>) -> Result<()> {
        self.bind_instance(BindingKey::of::<T>(), Instance::new(value))
    }

    /// Bind a shared value under `T` with a qualifier
    fn bind_named<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        qualifier: &str,
        value: Arc<T>,
    ) -> Result<()> {
        self.bind_instance(BindingKey::named::<T>(qualifier), Instance::new(value))
    }

    /// Read back a value bound earlier, e.g. configuration during bootstrap
    fn bound<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.bound_instance(&BindingKey::of::<T>())
            .and_then(|instance| instance.downcast::<T>())
    }
}

impl<B: Binder + ?Sized> BinderExt for B {}

/// Self-contained unit of bindings
pub trait Module: Send + Sync {
    /// Name used in logs and conflict messages
    fn name(&self) -> &str;

    /// Register this module's bindings
    fn configure(&self, binder: &mut dyn Binder) -> Result<()>;
}

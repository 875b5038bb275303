//! Assisted-construction factories
//!
//! A `Factory<A, T>` is bound once and builds a fresh `T` on every
//! [`Factory::create`] call. Its constructor pulls the injected
//! dependencies from the container; the caller supplies the rest as `A`.
//!
//! ```ignore
//! Candidate::of::<Factory<String, Session>>()
//!     .constructor(|injector| {
//!         let clock = injector.get::<dyn Clock>()?;
//!         Ok(Factory::new(move |user: String| Ok(Session::open(user, clock.now()))))
//!     })
//!     .tag(DeclaredTag::factory::<String, Session>())
//!     .build();
//! ```

use crate::error::Result;
use crate::value_objects::TypeTag;
use std::fmt;
use std::sync::Arc;

type Create<A, T> = Arc<dyn Fn(A) -> Result<Arc<T>> + Send + Sync>;

/// Builds a new `T` from runtime arguments `A` plus captured dependencies
pub struct Factory<A, T: ?Sized> {
    create: Create<A, T>,
}

impl<A: 'static, T: ?Sized + 'static> Factory<A, T> {
    /// Factory whose closure already returns a shared value
    ///
    /// Use this for families served as a trait object, e.g. `Factory<A, dyn Job>`.
    pub fn from_arc<F>(create: F) -> Self
    where
        F: Fn(A) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        Self {
            create: Arc::new(create),
        }
    }

    /// Build a new product
    pub fn create(&self, args: A) -> Result<Arc<T>> {
        (self.create)(args)
    }

    /// Tag of the product type
    pub fn product() -> TypeTag {
        TypeTag::of::<T>()
    }
}

impl<A: 'static, T: Send + Sync + 'static> Factory<A, T> {
    /// Factory whose closure returns an owned value
    pub fn new<F>(create: F) -> Self
    where
        F: Fn(A) -> Result<T> + Send + Sync + 'static,
    {
        Self::from_arc(move |args| create(args).map(Arc::new))
    }
}

impl<A, T: ?Sized> Clone for Factory<A, T> {
    fn clone(&self) -> Self {
        Self {
            create: Arc::clone(&self.create),
        }
    }
}

impl<A: 'static, T: ?Sized + 'static> fmt::Debug for Factory<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("args", &TypeTag::of::<A>())
            .field("product", &Self::product())
            .finish()
    }
}

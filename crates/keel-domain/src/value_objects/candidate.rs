//! Scanner output: candidate types with their declared binding intent
//!
//! ## Usage
//!
//! ```ignore
//! let candidate = Candidate::of::<SystemClock>()
//!     .constructor(|_| Ok(SystemClock::default()))
//!     .exposing::<dyn Clock>(|it| it)
//!     .tag(DeclaredTag::singleton().alias::<dyn Clock>())
//!     .build();
//! ```

use crate::error::Result;
use crate::ports::{Injector, Module};
use crate::value_objects::{AliasCast, DeclaredTag, Instance, TypeTag};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Builds the value of a binding, pulling dependencies from the injector
pub type Constructor = Arc<dyn Fn(&dyn Injector) -> Result<Instance> + Send + Sync>;

/// How a candidate is turned into bindings
#[derive(Clone)]
pub enum CandidateSource {
    /// A constructor producing instances of `produces`
    Constructor {
        /// Type of the constructed value
        produces: TypeTag,
        /// The constructor itself
        constructor: Constructor,
    },
    /// A self-contained unit of further bindings
    Module(Arc<dyn Module>),
    /// The scanner found binding metadata but nothing to build
    Missing,
}

impl fmt::Debug for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constructor { produces, .. } => f
                .debug_struct("Constructor")
                .field("produces", produces)
                .finish_non_exhaustive(),
            Self::Module(module) => f.debug_tuple("Module").field(&module.name()).finish(),
            Self::Missing => f.write_str("Missing"),
        }
    }
}

/// One discovered type and everything the scanner knows about it
#[derive(Clone, Debug)]
pub struct Candidate {
    type_tag: TypeTag,
    tags: Vec<DeclaredTag>,
    source: CandidateSource,
    conversions: Vec<AliasCast>,
}

impl Candidate {
    /// Start describing a candidate whose constructor yields `T`
    pub fn of<T: ?Sized + Send + Sync + 'static>() -> CandidateBuilder<T> {
        CandidateBuilder {
            origin: TypeTag::of::<T>(),
            tags: Vec::new(),
            conversions: Vec::new(),
            constructor: None,
            _produces: PhantomData,
        }
    }

    /// Candidate backed by a module, tagged with the `module` marker
    pub fn module<M: Module + 'static>(module: M) -> Self {
        Self {
            type_tag: TypeTag::of::<M>(),
            tags: vec![DeclaredTag::module()],
            source: CandidateSource::Module(Arc::new(module)),
            conversions: Vec::new(),
        }
    }

    /// Assemble a candidate from raw parts
    pub fn from_parts(
        type_tag: TypeTag,
        tags: Vec<DeclaredTag>,
        source: CandidateSource,
        conversions: Vec<AliasCast>,
    ) -> Self {
        Self {
            type_tag,
            tags,
            source,
            conversions,
        }
    }

    /// Add another declared tag
    #[must_use]
    pub fn tagged(mut self, tag: DeclaredTag) -> Self {
        self.tags.push(tag);
        self
    }

    /// The candidate type
    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    /// Declared tags in scan order
    pub fn tags(&self) -> &[DeclaredTag] {
        &self.tags
    }

    /// How the candidate is built
    pub fn source(&self) -> &CandidateSource {
        &self.source
    }

    /// Declared alias conversion into `target`
    pub fn conversion_to(&self, target: TypeTag) -> Option<&AliasCast> {
        self.conversions.iter().find(|cast| cast.target() == target)
    }
}

/// Typed builder for constructor-backed candidates
pub struct CandidateBuilder<T: ?Sized> {
    origin: TypeTag,
    tags: Vec<DeclaredTag>,
    conversions: Vec<AliasCast>,
    constructor: Option<Constructor>,
    _produces: PhantomData<fn(Arc<T>)>,
}

impl<T: ?Sized + Send + Sync + 'static> CandidateBuilder<T> {
    /// Report the candidate under another type, e.g. a provider class
    #[must_use]
    pub fn origin<O: ?Sized + 'static>(mut self) -> Self {
        self.origin = TypeTag::of::<O>();
        self
    }

    /// Add a declared tag
    #[must_use]
    pub fn tag(mut self, tag: DeclaredTag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Constructor returning an already shared value
    #[must_use]
    pub fn constructor_arc<F>(mut self, constructor: F) -> Self
    where
        F: Fn(&dyn Injector) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(move |injector: &dyn Injector| {
            constructor(injector).map(Instance::new)
        }));
        self
    }

    /// Declare that the constructed value may be served as `A`
    #[must_use]
    pub fn exposing<A: ?Sized + Send + Sync + 'static>(
        mut self,
        cast: fn(Arc<T>) -> Arc<A>,
    ) -> Self {
        self.conversions.push(AliasCast::new(cast));
        self
    }

    /// Finish the candidate
    pub fn build(self) -> Candidate {
        let source = match self.constructor {
            Some(constructor) => CandidateSource::Constructor {
                produces: TypeTag::of::<T>(),
                constructor,
            },
            None => CandidateSource::Missing,
        };
        Candidate {
            type_tag: self.origin,
            tags: self.tags,
            source,
            conversions: self.conversions,
        }
    }
}

impl<T: Send + Sync + 'static> CandidateBuilder<T> {
    /// Constructor returning an owned value
    #[must_use]
    pub fn constructor<F>(self, constructor: F) -> Self
    where
        F: Fn(&dyn Injector) -> Result<T> + Send + Sync + 'static,
    {
        self.constructor_arc(move |injector| constructor(injector).map(Arc::new))
    }
}

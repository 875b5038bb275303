//! Frozen Container
//!
//! Serves lookups once assembly has finished. Shared bindings are built on
//! first lookup, at most once, and every successful resolution made while
//! building something adds a `consumer -> dependency` edge to the graph.
//!
//! Each constructor receives a `Resolution` rather than the container
//! itself. The resolution remembers the chain of shared bindings being
//! built, so a constructor that re-enters one of them fails with a circular
//! dependency error instead of deadlocking on the cell.

use super::binding::{Binding, MemberEntry, Served, SingleEntry};
use keel_application::domain_services::{DependencyGraph, Vertex};
use keel_domain::error::{Error, Result};
use keel_domain::ports::Injector;
use keel_domain::{BindingKey, Construction, Instance, KeyShape, MapKey, TypeTag};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

struct ContainerCore {
    singles: BTreeMap<BindingKey, SingleEntry>,
    maps: BTreeMap<BindingKey, BTreeMap<MapKey, MemberEntry>>,
    sets: BTreeMap<BindingKey, Vec<MemberEntry>>,
    graph: Arc<DependencyGraph>,
}

/// Read-only container produced by finalizing a binding table
///
/// Cheap to clone; clones share instances and the dependency graph.
#[derive(Clone)]
pub struct FrozenContainer {
    core: Arc<ContainerCore>,
}

impl FrozenContainer {
    pub(crate) fn new(
        singles: BTreeMap<BindingKey, SingleEntry>,
        maps: BTreeMap<BindingKey, BTreeMap<MapKey, MemberEntry>>,
        sets: BTreeMap<BindingKey, Vec<MemberEntry>>,
        graph: Arc<DependencyGraph>,
    ) -> Self {
        Self {
            core: Arc::new(ContainerCore {
                singles,
                maps,
                sets,
                graph,
            }),
        }
    }

    /// Graph of the resolutions made so far
    pub fn graph(&self) -> &Arc<DependencyGraph> {
        &self.core.graph
    }

    /// Every bound key, sorted
    pub fn keys(&self) -> Vec<BindingKey> {
        let mut keys: Vec<_> = self
            .core
            .singles
            .keys()
            .chain(self.core.maps.keys())
            .chain(self.core.sets.keys())
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Set members of `T` that have already been built, in registration order
    ///
    /// Never constructs anything.
    pub fn initialized_members<T: ?Sized + Send + Sync + 'static>(&self) -> Vec<Arc<T>> {
        self.core
            .sets
            .get(&BindingKey::set_of::<T>())
            .map(|members| {
                members
                    .iter()
                    .filter_map(|member| member.served.built())
                    .filter_map(|instance| instance.downcast::<T>())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Resolve every binding once so wiring errors surface now
    ///
    /// Returns the number of keys resolved.
    pub fn validate(&self) -> Result<usize> {
        let root = self.root();
        for key in self.core.singles.keys() {
            root.resolve(key)?;
        }
        for key in self.core.maps.keys() {
            root.resolve_map(key)?;
        }
        for key in self.core.sets.keys() {
            root.resolve_set(key)?;
        }
        Ok(self.keys().len())
    }

    pub(crate) fn build_eager(&self, key: &BindingKey) -> Result<()> {
        self.root().resolve(key).map(|_| ())
    }

    fn root(&self) -> Resolution<'_> {
        Resolution {
            core: &self.core,
            consumer: None,
            chain: Vec::new(),
        }
    }
}

impl Injector for FrozenContainer {
    fn resolve(&self, key: &BindingKey) -> Result<Instance> {
        self.root().resolve(key)
    }

    fn resolve_map(&self, key: &BindingKey) -> Result<Vec<(MapKey, Instance)>> {
        self.root().resolve_map(key)
    }

    fn resolve_set(&self, key: &BindingKey) -> Result<Vec<Instance>> {
        self.root().resolve_set(key)
    }

    fn contains(&self, key: &BindingKey) -> bool {
        self.root().contains(key)
    }
}

impl fmt::Debug for FrozenContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrozenContainer")
            .field("keys", &self.keys())
            .field("vertices", &self.core.graph.vertex_count())
            .field("edges", &self.core.graph.edge_count())
            .finish()
    }
}

#[derive(Clone)]
struct Frame {
    id: usize,
    label: String,
}

/// The injector handed to constructors
///
/// Knows which vertex is being built and the chain of shared bindings
/// currently under construction on this call path.
struct Resolution<'c> {
    core: &'c ContainerCore,
    consumer: Option<Vertex>,
    chain: Vec<Frame>,
}

impl Resolution<'_> {
    fn record(&self, dependency: &Vertex) {
        match &self.consumer {
            Some(consumer) => {
                self.core.graph.add_edge(consumer.clone(), dependency.clone());
            }
            None => {
                self.core.graph.add_vertex(dependency.clone());
            }
        }
    }

    /// Same chain, different consumer
    fn consumed_by(&self, consumer: Vertex) -> Self {
        Resolution {
            core: self.core,
            consumer: Some(consumer),
            chain: self.chain.clone(),
        }
    }

    /// Consumer `vertex`, with `frame` pushed onto the chain
    fn building(&self, vertex: &Vertex, frame: Frame) -> Self {
        let mut chain = self.chain.clone();
        chain.push(frame);
        Resolution {
            core: self.core,
            consumer: Some(vertex.clone()),
            chain,
        }
    }

    fn enter(&self, id: usize, vertex: &Vertex) -> Result<Frame> {
        let label = vertex.to_string();
        if let Some(start) = self.chain.iter().position(|frame| frame.id == id) {
            let cycle: Vec<_> = self.chain[start..]
                .iter()
                .map(|frame| frame.label.as_str())
                .chain(std::iter::once(label.as_str()))
                .collect();
            return Err(Error::CircularDependency {
                chain: cycle.join(" -> "),
            });
        }
        Ok(Frame { id, label })
    }

    fn build_shared(&self, served: &Served, vertex: &Vertex) -> Result<Instance> {
        let instance = match served.cell.get() {
            Some(instance) => instance.clone(),
            None => {
                let frame = self.enter(served.cell.id(), vertex)?;
                let inner = self.building(vertex, frame);
                let injector: &dyn Injector = &inner;
                let constructor = &served.cell.construction().constructor;
                served
                    .cell
                    .get_or_try_init(|| constructor(injector))
                    .map_err(|e| e.required_by(vertex.to_string()))?
                    .clone()
            }
        };
        served
            .cast
            .apply(&instance)
            .ok_or_else(|| mismatch(vertex.key(), served.cast.source(), instance.type_tag()))
    }

    fn build_transient(&self, construction: &Construction, vertex: &Vertex) -> Result<Instance> {
        let id = Arc::as_ptr(&construction.constructor).cast::<()>() as usize;
        let frame = self.enter(id, vertex)?;
        let inner = self.building(vertex, frame);
        let injector: &dyn Injector = &inner;
        (construction.constructor)(injector).map_err(|e| e.required_by(vertex.to_string()))
    }

    fn build_member(&self, map_or_set: &BindingKey, member: &MemberEntry) -> Result<Instance> {
        let vertex = member.vertex(map_or_set);
        let instance = self.build_shared(&member.served, &vertex)?;
        self.record(&vertex);
        Ok(instance)
    }
}

fn mismatch(key: &BindingKey, expected: TypeTag, actual: TypeTag) -> Error {
    Error::TypeMismatch {
        key: key.to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

impl Injector for Resolution<'_> {
    fn resolve(&self, key: &BindingKey) -> Result<Instance> {
        let entry = self
            .core
            .singles
            .get(key)
            .ok_or_else(|| Error::missing_binding(key.to_string()))?;
        let vertex = entry.vertex(key);
        let instance = match &entry.binding {
            Binding::Instance(instance) => instance.clone(),
            Binding::Shared(served) => self.build_shared(served, &vertex)?,
            Binding::Transient(construction) => self.build_transient(construction, &vertex)?,
        };
        self.record(&vertex);
        Ok(instance)
    }

    fn resolve_map(&self, key: &BindingKey) -> Result<Vec<(MapKey, Instance)>> {
        let entries = self
            .core
            .maps
            .get(key)
            .ok_or_else(|| Error::missing_binding(key.to_string()))?;
        let vertex = Vertex::of_key(key.clone());
        let map = self.consumed_by(vertex.clone());
        let mut resolved = Vec::with_capacity(entries.len());
        for (map_key, member) in entries {
            resolved.push((map_key.clone(), map.build_member(key, member)?));
        }
        self.record(&vertex);
        Ok(resolved)
    }

    fn resolve_set(&self, key: &BindingKey) -> Result<Vec<Instance>> {
        let members = self
            .core
            .sets
            .get(key)
            .ok_or_else(|| Error::missing_binding(key.to_string()))?;
        let vertex = Vertex::of_key(key.clone());
        let set = self.consumed_by(vertex.clone());
        let resolved = members
            .iter()
            .map(|member| set.build_member(key, member))
            .collect::<Result<Vec<_>>>()?;
        self.record(&vertex);
        Ok(resolved)
    }

    fn contains(&self, key: &BindingKey) -> bool {
        match key.shape() {
            KeyShape::Single => self.core.singles.contains_key(key),
            KeyShape::Map => self.core.maps.contains_key(key),
            KeyShape::Set => self.core.sets.contains_key(key),
        }
    }
}

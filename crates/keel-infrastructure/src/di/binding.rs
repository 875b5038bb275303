//! Binding Table
//!
//! Mutable registration state collected during the install phases. Every
//! single-shaped key holds exactly one binding; map and set keys collect
//! members. [`BindingTable::finalize`] consumes the table, so a frozen
//! container can never receive another registration.

use super::container::FrozenContainer;
use keel_application::domain_services::{DependencyGraph, Vertex};
use keel_domain::error::{Error, Result};
use keel_domain::{
    AliasCast, BindingDescriptor, BindingKey, BindingVariant, Construction, Instance, KeyShape,
    MapKey, ProviderScope, TypeTag,
};
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Lazily built value shared by every key that serves it
pub(crate) struct SingletonCell {
    construction: Construction,
    value: OnceCell<Instance>,
}

impl SingletonCell {
    pub(crate) fn new(construction: Construction) -> Arc<Self> {
        Arc::new(Self {
            construction,
            value: OnceCell::new(),
        })
    }

    /// Identity used for cycle detection
    pub(crate) fn id(self: &Arc<Self>) -> usize {
        Arc::as_ptr(self).cast::<()>() as usize
    }

    pub(crate) fn construction(&self) -> &Construction {
        &self.construction
    }

    pub(crate) fn get(&self) -> Option<&Instance> {
        self.value.get()
    }

    pub(crate) fn get_or_try_init<F>(&self, build: F) -> Result<&Instance>
    where
        F: FnOnce() -> Result<Instance>,
    {
        self.value.get_or_try_init(build)
    }
}

/// A shared cell served through a conversion to the key's type
#[derive(Clone)]
pub(crate) struct Served {
    pub(crate) cell: Arc<SingletonCell>,
    pub(crate) cast: AliasCast,
}

impl Served {
    fn new(construction: Construction, alias: Option<AliasCast>) -> Self {
        let cast = alias.unwrap_or_else(|| AliasCast::identity(construction.produces));
        Self {
            cell: SingletonCell::new(construction),
            cast,
        }
    }

    /// Built value converted to the served type, if already built
    pub(crate) fn built(&self) -> Option<Instance> {
        self.cell.get().and_then(|instance| self.cast.apply(instance))
    }
}

/// What stands behind a single-shaped key
#[derive(Clone)]
pub(crate) enum Binding {
    /// Already built value
    Instance(Instance),
    /// Built at most once
    Shared(Served),
    /// Built on every lookup
    Transient(Construction),
}

/// A single-shaped key's binding and where it came from
#[derive(Clone)]
pub(crate) struct SingleEntry {
    pub(crate) binding: Binding,
    pub(crate) source: Option<TypeTag>,
    pub(crate) contributor: String,
    pub(crate) eager: bool,
}

impl SingleEntry {
    pub(crate) fn vertex(&self, key: &BindingKey) -> Vertex {
        Vertex::new(key.clone(), self.source)
    }
}

/// One contribution to a map or set multi-binding
#[derive(Clone)]
pub(crate) struct MemberEntry {
    pub(crate) served: Served,
    pub(crate) source: TypeTag,
}

impl MemberEntry {
    pub(crate) fn vertex(&self, key: &BindingKey) -> Vertex {
        Vertex::new(key.clone(), Some(self.source))
    }
}

/// Registrations collected before the container is frozen
#[derive(Default)]
pub struct BindingTable {
    singles: BTreeMap<BindingKey, SingleEntry>,
    maps: BTreeMap<BindingKey, BTreeMap<MapKey, MemberEntry>>,
    sets: BTreeMap<BindingKey, Vec<MemberEntry>>,
    override_mode: bool,
}

impl BindingTable {
    /// Empty table, override mode off
    pub fn new() -> Self {
        Self::default()
    }

    /// While on, a registration replaces an earlier one for the same key
    pub fn set_override_mode(&mut self, enabled: bool) {
        self.override_mode = enabled;
    }

    /// Whether later registrations currently replace earlier ones
    pub fn override_mode(&self) -> bool {
        self.override_mode
    }

    /// Register a classified descriptor
    ///
    /// Module contributions are installed by the binder, never registered.
    pub fn register(&mut self, descriptor: &BindingDescriptor) -> Result<()> {
        let contributor = descriptor.origin.to_string();
        let key_for = |tag: TypeTag, shape: KeyShape| {
            BindingKey::new(tag)
                .with_qualifier(descriptor.qualifier.clone())
                .with_shape(shape)
        };
        debug!(origin = %descriptor.origin, kind = ?descriptor.kind(), "Registering binding");

        match &descriptor.variant {
            BindingVariant::Singleton {
                construction,
                alias,
                expose_impl,
                eager,
            } => {
                let served = Served::new(construction.clone(), alias.clone());
                let primary = key_for(served.cast.target(), KeyShape::Single);
                if *expose_impl && alias.is_some() {
                    let implementation = Served {
                        cell: Arc::clone(&served.cell),
                        cast: AliasCast::identity(construction.produces),
                    };
                    self.insert_single(
                        key_for(construction.produces, KeyShape::Single),
                        SingleEntry {
                            binding: Binding::Shared(implementation),
                            source: Some(descriptor.origin),
                            contributor: contributor.clone(),
                            eager: false,
                        },
                    )?;
                }
                self.insert_single(
                    primary,
                    SingleEntry {
                        binding: Binding::Shared(served),
                        source: Some(descriptor.origin),
                        contributor,
                        eager: *eager,
                    },
                )
            }
            BindingVariant::MapEntry {
                construction,
                alias,
                key,
            } => {
                let served = Served::new(construction.clone(), alias.clone());
                let map = key_for(served.cast.target(), KeyShape::Map);
                self.insert_map_entry(
                    map,
                    key.clone(),
                    MemberEntry {
                        served,
                        source: descriptor.origin,
                    },
                )
            }
            BindingVariant::SetMember {
                construction,
                alias,
            } => {
                let served = Served::new(construction.clone(), alias.clone());
                let set = key_for(served.cast.target(), KeyShape::Set);
                self.sets.entry(set).or_default().push(MemberEntry {
                    served,
                    source: descriptor.origin,
                });
                Ok(())
            }
            BindingVariant::Provider {
                construction,
                scope,
            } => {
                let (binding, eager) = match scope {
                    ProviderScope::Singleton => {
                        (Binding::Shared(Served::new(construction.clone(), None)), true)
                    }
                    ProviderScope::None | ProviderScope::Request | ProviderScope::Session => {
                        (Binding::Transient(construction.clone()), false)
                    }
                };
                self.insert_single(
                    key_for(construction.produces, KeyShape::Single),
                    SingleEntry {
                        binding,
                        source: Some(descriptor.origin),
                        contributor,
                        eager,
                    },
                )
            }
            BindingVariant::Factory {
                construction,
                product,
            } => {
                debug!(factory = %construction.produces, product = %product, "Binding factory");
                self.insert_single(
                    key_for(construction.produces, KeyShape::Single),
                    SingleEntry {
                        binding: Binding::Shared(Served::new(construction.clone(), None)),
                        source: Some(descriptor.origin),
                        contributor,
                        eager: false,
                    },
                )
            }
            BindingVariant::ModuleContribution { module, .. } => Err(Error::phase(format!(
                "module '{}' must be installed, not registered as a binding",
                module.name()
            ))),
        }
    }

    /// Bind an already built instance to a single-shaped key
    pub fn bind_instance(
        &mut self,
        key: BindingKey,
        instance: Instance,
        contributor: &str,
    ) -> Result<()> {
        if key.shape() != KeyShape::Single {
            return Err(Error::phase(format!(
                "{key} is a multi-binding; instances can only be bound to single keys"
            )));
        }
        if instance.type_tag() != key.type_tag() {
            return Err(Error::TypeMismatch {
                key: key.to_string(),
                expected: key.type_tag().to_string(),
                actual: instance.type_tag().to_string(),
            });
        }
        self.insert_single(
            key,
            SingleEntry {
                binding: Binding::Instance(instance),
                source: None,
                contributor: contributor.to_string(),
                eager: false,
            },
        )
    }

    /// Instance bound under `key`, if it was bound as an instance
    pub fn instance(&self, key: &BindingKey) -> Option<Instance> {
        match self.singles.get(key).map(|entry| &entry.binding) {
            Some(Binding::Instance(instance)) => Some(instance.clone()),
            _ => None,
        }
    }

    /// Whether anything is registered under `key`
    pub fn contains(&self, key: &BindingKey) -> bool {
        match key.shape() {
            KeyShape::Single => self.singles.contains_key(key),
            KeyShape::Map => self.maps.contains_key(key),
            KeyShape::Set => self.sets.contains_key(key),
        }
    }

    /// Number of registered keys of every shape
    pub fn len(&self) -> usize {
        self.singles.len() + self.maps.len() + self.sets.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freeze the table into a container
    ///
    /// Every registered key becomes a graph vertex, then eager singletons
    /// and singleton-scoped providers are built. The first construction
    /// failure aborts finalization.
    pub fn finalize(self, graph: Arc<DependencyGraph>) -> Result<FrozenContainer> {
        for (key, entry) in &self.singles {
            graph.add_vertex(entry.vertex(key));
        }
        for (key, entries) in &self.maps {
            for member in entries.values() {
                graph.add_vertex(member.vertex(key));
            }
        }
        for (key, members) in &self.sets {
            for member in members {
                graph.add_vertex(member.vertex(key));
            }
        }

        let eager: Vec<BindingKey> = self
            .singles
            .iter()
            .filter(|(_, entry)| entry.eager)
            .map(|(key, _)| key.clone())
            .collect();

        let container = FrozenContainer::new(self.singles, self.maps, self.sets, graph);
        for key in &eager {
            debug!(key = %key, "Building eager binding");
            container.build_eager(key)?;
        }
        info!(
            keys = container.keys().len(),
            eager = eager.len(),
            "Container finalized"
        );
        Ok(container)
    }

    fn insert_single(&mut self, key: BindingKey, entry: SingleEntry) -> Result<()> {
        if let Some(existing) = self.singles.get(&key) {
            if !self.override_mode {
                return Err(Error::binding_conflict(
                    key.to_string(),
                    existing.contributor.clone(),
                    entry.contributor,
                ));
            }
            info!(
                key = %key,
                replaced = %existing.contributor,
                by = %entry.contributor,
                "Overriding binding"
            );
        }
        self.singles.insert(key, entry);
        Ok(())
    }

    fn insert_map_entry(
        &mut self,
        map: BindingKey,
        map_key: MapKey,
        member: MemberEntry,
    ) -> Result<()> {
        let entries = self.maps.entry(map.clone()).or_default();
        if let Some(existing) = entries.get(&map_key) {
            if !self.override_mode {
                return Err(Error::duplicate_map_key(
                    map.to_string(),
                    map_key.to_string(),
                    existing.source.to_string(),
                    member.source.to_string(),
                ));
            }
            info!(map = %map, map_key = %map_key, by = %member.source, "Overriding map entry");
        }
        entries.insert(map_key, member);
        Ok(())
    }
}

impl fmt::Debug for BindingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingTable")
            .field("singles", &self.singles.keys().collect::<Vec<_>>())
            .field("maps", &self.maps.keys().collect::<Vec<_>>())
            .field("sets", &self.sets.keys().collect::<Vec<_>>())
            .field("override_mode", &self.override_mode)
            .finish()
    }
}

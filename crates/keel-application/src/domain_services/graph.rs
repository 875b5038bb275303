//! Dependency Graph Model
//!
//! Vertices are bound keys, optionally tagged with the type that contributed
//! the binding. An edge `from -> to` records that `from` was built by
//! consuming `to`. Edges are kept in two complementary multimaps so that
//! both directions, and orphan checks, are single lookups.
//!
//! The container appends edges from its resolution path, possibly from many
//! threads at once, so the maps are `DashMap`s and every mutation touches at
//! most one shard at a time.

use dashmap::{DashMap, DashSet};
use keel_domain::{BindingKey, TypeTag};
use std::collections::BTreeSet;
use std::fmt;

/// A bound key as it appears in the dependency graph
///
/// Equality and hashing cover the key (type, qualifier and shape) and the
/// originating type; two vertices differing in any of them are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Vertex {
    key: BindingKey,
    source: Option<TypeTag>,
}

impl Vertex {
    /// Vertex for a key and the type that bound it
    pub fn new(key: BindingKey, source: Option<TypeTag>) -> Self {
        Self { key, source }
    }

    /// Vertex for a key with no known origin
    pub fn of_key(key: BindingKey) -> Self {
        Self::new(key, None)
    }

    /// The bound key
    pub fn key(&self) -> &BindingKey {
        &self.key
    }

    /// The type that contributed the binding
    pub fn source(&self) -> Option<TypeTag> {
        self.source
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)?;
        match self.source {
            Some(source) if source != self.key.type_tag() => write!(f, " [{source}]"),
            _ => Ok(()),
        }
    }
}

/// Edges and isolated vertices ready for layout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphLayoutInput {
    /// Every `(from, to)` pair, sorted
    pub edges: Vec<(Vertex, Vertex)>,
    /// Vertices with no edges at all, sorted
    pub isolated: Vec<Vertex>,
}

/// Directed consumer -> dependency graph
#[derive(Debug, Default)]
pub struct DependencyGraph {
    vertices: DashSet<Vertex>,
    outbound: DashMap<Vertex, BTreeSet<Vertex>>,
    inbound: DashMap<Vertex, BTreeSet<Vertex>>,
}

impl DependencyGraph {
    /// Empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex; returns `false` if an equal vertex was already present
    pub fn add_vertex(&self, vertex: Vertex) -> bool {
        self.vertices.insert(vertex)
    }

    /// Record that `from` consumed `to`, adding both vertices
    ///
    /// Returns `false` if the edge was already recorded.
    pub fn add_edge(&self, from: Vertex, to: Vertex) -> bool {
        self.vertices.insert(from.clone());
        self.vertices.insert(to.clone());
        self.inbound
            .entry(to.clone())
            .or_default()
            .insert(from.clone());
        self.outbound.entry(from).or_default().insert(to)
    }

    /// True iff the vertex has neither outbound nor inbound edges
    pub fn is_orphan(&self, vertex: &Vertex) -> bool {
        let no_edges = |map: &DashMap<Vertex, BTreeSet<Vertex>>| {
            map.get(vertex).is_none_or(|targets| targets.is_empty())
        };
        no_edges(&self.outbound) && no_edges(&self.inbound)
    }

    /// Whether the vertex was ever added
    pub fn contains(&self, vertex: &Vertex) -> bool {
        self.vertices.contains(vertex)
    }

    /// Dependencies of a vertex, sorted
    pub fn dependencies(&self, vertex: &Vertex) -> Vec<Vertex> {
        self.outbound
            .get(vertex)
            .map(|targets| targets.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Consumers of a vertex, sorted
    pub fn consumers(&self, vertex: &Vertex) -> Vec<Vertex> {
        self.inbound
            .get(vertex)
            .map(|sources| sources.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// All vertices, sorted
    pub fn vertices(&self) -> Vec<Vertex> {
        let mut vertices: Vec<_> = self.vertices.iter().map(|v| v.key().clone()).collect();
        vertices.sort();
        vertices
    }

    /// The outbound multimap flattened into single `(from, to)` pairs, sorted
    pub fn edges(&self) -> Vec<(Vertex, Vertex)> {
        let mut edges: Vec<_> = self
            .outbound
            .iter()
            .flat_map(|entry| {
                let from = entry.key().clone();
                entry
                    .value()
                    .iter()
                    .map(|to| (from.clone(), to.clone()))
                    .collect::<Vec<_>>()
            })
            .collect();
        edges.sort();
        edges
    }

    /// Vertices with no edges, sorted
    pub fn orphans(&self) -> Vec<Vertex> {
        self.vertices()
            .into_iter()
            .filter(|vertex| self.is_orphan(vertex))
            .collect()
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of distinct edges
    pub fn edge_count(&self) -> usize {
        self.outbound.iter().map(|entry| entry.value().len()).sum()
    }

    /// Flatten the edges and collect the orphans, the shared first step of
    /// every renderer
    pub fn layout_input(&self) -> GraphLayoutInput {
        GraphLayoutInput {
            edges: self.edges(),
            isolated: self.orphans(),
        }
    }
}

//! Tests for the dependency graph model

use keel_application::domain_services::{DependencyGraph, Vertex};
use keel_domain::{BindingKey, TypeTag};
use std::collections::HashSet;
use std::hash::{BuildHasher, RandomState};

struct Consumer;
struct OtherSource;

fn vertex(qualifier: Option<&str>, source: Option<TypeTag>) -> Vertex {
    let key = match qualifier {
        Some(name) => BindingKey::named::<String>(name),
        None => BindingKey::of::<String>(),
    };
    Vertex::new(key, source)
}

#[test]
fn test_equal_vertices_hash_equal() {
    let a = vertex(Some("db"), Some(TypeTag::of::<Consumer>()));
    let b = vertex(Some("db"), Some(TypeTag::of::<Consumer>()));
    assert_eq!(a, b);

    let hasher = RandomState::new();
    assert_eq!(hasher.hash_one(&a), hasher.hash_one(&b));
}

#[test]
fn test_each_field_breaks_equality() {
    let base = vertex(Some("db"), Some(TypeTag::of::<Consumer>()));
    let other_qualifier = vertex(Some("cache"), Some(TypeTag::of::<Consumer>()));
    let other_type = Vertex::new(
        BindingKey::named::<u64>("db"),
        Some(TypeTag::of::<Consumer>()),
    );
    let other_source = vertex(Some("db"), Some(TypeTag::of::<OtherSource>()));
    let no_source = vertex(Some("db"), None);

    assert_ne!(base, other_qualifier);
    assert_ne!(base, other_type);
    assert_ne!(base, other_source);
    assert_ne!(base, no_source);
}

#[test]
fn test_vertex_set_deduplicates() {
    let set: HashSet<Vertex> = [
        vertex(None, None),
        vertex(None, None),
        vertex(Some("db"), None),
        vertex(Some("db"), None),
        vertex(Some("db"), Some(TypeTag::of::<Consumer>())),
    ]
    .into_iter()
    .collect();
    assert_eq!(set.len(), 3);

    let graph = DependencyGraph::new();
    assert!(graph.add_vertex(vertex(None, None)));
    assert!(!graph.add_vertex(vertex(None, None)));
    assert_eq!(graph.vertex_count(), 1);
}

#[test]
fn test_orphan_detection() {
    let graph = DependencyGraph::new();
    let lonely = vertex(Some("lonely"), None);
    let consumer = Vertex::of_key(BindingKey::of::<Consumer>());
    let dependency = vertex(None, None);

    graph.add_vertex(lonely.clone());
    graph.add_vertex(consumer.clone());
    graph.add_vertex(dependency.clone());
    assert!(graph.is_orphan(&lonely));
    assert!(graph.is_orphan(&consumer));

    graph.add_edge(consumer.clone(), dependency.clone());
    assert!(!graph.is_orphan(&consumer), "outbound edge");
    assert!(!graph.is_orphan(&dependency), "inbound edge");
    assert_eq!(graph.orphans(), vec![lonely]);
}

#[test]
fn test_layout_input_is_sorted_and_complete() {
    let graph = DependencyGraph::new();
    let a = Vertex::of_key(BindingKey::of::<u8>());
    let b = Vertex::of_key(BindingKey::of::<u16>());
    let c = Vertex::of_key(BindingKey::of::<u32>());
    let orphan = Vertex::of_key(BindingKey::of::<bool>());
    graph.add_edge(a.clone(), c.clone());
    graph.add_edge(a.clone(), b.clone());
    graph.add_edge(b.clone(), c.clone());
    graph.add_vertex(orphan.clone());

    let layout = graph.layout_input();
    assert_eq!(
        layout.edges,
        vec![(b.clone(), c.clone()), (a.clone(), b), (a, c)]
    );
    assert_eq!(layout.isolated, vec![orphan]);
}

#[test]
fn test_vertex_display() {
    let plain = Vertex::new(BindingKey::of::<Consumer>(), Some(TypeTag::of::<Consumer>()));
    assert_eq!(plain.to_string(), "Consumer");

    let aliased = Vertex::new(BindingKey::named::<String>("db"), Some(TypeTag::of::<Consumer>()));
    assert_eq!(aliased.to_string(), "String @db [Consumer]");
}

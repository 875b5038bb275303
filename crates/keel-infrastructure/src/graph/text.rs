//! Text renderer
//!
//! ```text
//! App ──▶ dyn Clock [SystemClock]
//!     ├─▶ Repository ──▶ dyn StoreProvider
//!     │              └─▶ MigrationRegistry
//!     └─▶ Set<dyn Plugin> ──▶ Set<dyn Plugin> [Audit]
//! Worker ──▶ Repository (*)
//! LoggingConfig (orphan)
//! ```
//!
//! Roots are vertices nobody consumes. A vertex whose dependencies were
//! already drawn is marked `(*)` and not expanded again, which also stops
//! cycles. Orphans are listed after the trees. Everything is sorted, so the
//! same graph always renders to the same text.

use crate::constants::{
    GRAPH_BLANK_RAIL, GRAPH_FIRST_EDGE, GRAPH_LAST_EDGE, GRAPH_MIDDLE_EDGE, GRAPH_ORPHAN_MARK,
    GRAPH_RAIL, GRAPH_REPEAT_MARK,
};
use keel_application::domain_services::{DependencyGraph, Vertex};
use keel_application::ports::GraphRenderer;
use std::collections::{BTreeMap, BTreeSet};

/// Renders the graph as horizontal trees
#[derive(Debug, Default, Clone, Copy)]
pub struct TextGraphRenderer;

impl TextGraphRenderer {
    /// New renderer
    pub fn new() -> Self {
        Self
    }
}

struct Layout<'g> {
    adjacency: BTreeMap<&'g Vertex, Vec<&'g Vertex>>,
    expanded: BTreeSet<&'g Vertex>,
}

impl<'g> Layout<'g> {
    fn block(&mut self, vertex: &'g Vertex) -> Vec<String> {
        let label = vertex.to_string();
        let children = self.adjacency.get(vertex).cloned().unwrap_or_default();
        if children.is_empty() {
            return vec![label];
        }
        if !self.expanded.insert(vertex) {
            return vec![format!("{label}{GRAPH_REPEAT_MARK}")];
        }

        let indent = " ".repeat(label.chars().count());
        let mut lines = Vec::new();
        let last = children.len() - 1;
        for (position, child) in children.into_iter().enumerate() {
            let block = self.block(child);
            let head = match position {
                0 => format!("{label}{GRAPH_FIRST_EDGE}"),
                p if p == last => format!("{indent}{GRAPH_LAST_EDGE}"),
                _ => format!("{indent}{GRAPH_MIDDLE_EDGE}"),
            };
            let rail = if position < last { GRAPH_RAIL } else { GRAPH_BLANK_RAIL };
            for (row, line) in block.into_iter().enumerate() {
                if row == 0 {
                    lines.push(format!("{head}{line}"));
                } else {
                    lines.push(format!("{indent}{rail}{line}"));
                }
            }
        }
        lines
    }
}

impl GraphRenderer for TextGraphRenderer {
    fn name(&self) -> &str {
        "text"
    }

    fn render(&self, graph: &DependencyGraph) -> String {
        let input = graph.layout_input();
        let mut adjacency: BTreeMap<&Vertex, Vec<&Vertex>> = BTreeMap::new();
        let mut consumed = BTreeSet::new();
        for (from, to) in &input.edges {
            adjacency.entry(from).or_default().push(to);
            consumed.insert(to);
        }

        let mut layout = Layout {
            adjacency,
            expanded: BTreeSet::new(),
        };
        let consumers: Vec<&Vertex> = layout.adjacency.keys().copied().collect();
        let roots = consumers.iter().filter(|v| !consumed.contains(*v));
        // Vertices inside a cycle with no root reaching them come last
        let cyclic = consumers.iter().filter(|v| consumed.contains(*v));

        let mut lines = Vec::new();
        for &vertex in roots.chain(cyclic) {
            if layout.expanded.contains(vertex) {
                continue;
            }
            lines.extend(layout.block(vertex));
        }
        lines.extend(
            input
                .isolated
                .iter()
                .map(|vertex| format!("{vertex}{GRAPH_ORPHAN_MARK}")),
        );
        lines.join("\n")
    }
}

//! Dependency graph rendering port

use crate::domain_services::graph::DependencyGraph;

/// Turns a dependency graph into operator-facing text
pub trait GraphRenderer: Send + Sync {
    /// Renderer name, for logs
    fn name(&self) -> &str;

    /// Render the graph; output must depend only on its vertices and edges
    fn render(&self, graph: &DependencyGraph) -> String;
}

//! Null renderer

use keel_application::domain_services::DependencyGraph;
use keel_application::ports::GraphRenderer;

/// Prepares the layout input like every renderer, then outputs nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullGraphRenderer;

impl GraphRenderer for NullGraphRenderer {
    fn name(&self) -> &str {
        "null"
    }

    fn render(&self, graph: &DependencyGraph) -> String {
        let _ = graph.layout_input();
        String::new()
    }
}

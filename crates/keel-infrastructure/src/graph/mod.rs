//! Dependency graph renderers
//!
//! Every renderer starts from [`DependencyGraph::layout_input`]. The text
//! renderer draws each root as a horizontal tree, the JSON renderer lists
//! edges and orphans for tooling, and the null renderer discards the result.
//!
//! [`DependencyGraph::layout_input`]: keel_application::domain_services::DependencyGraph::layout_input

pub mod json;
pub mod null;
pub mod text;

pub use json::JsonGraphRenderer;
pub use null::NullGraphRenderer;
pub use text::TextGraphRenderer;

use keel_application::ports::GraphRenderer;
use std::sync::Arc;

/// Renderer selected by the `render_graph` setting
pub fn renderer_for(render_graph: bool) -> Arc<dyn GraphRenderer> {
    if render_graph {
        Arc::new(TextGraphRenderer::new())
    } else {
        Arc::new(NullGraphRenderer)
    }
}

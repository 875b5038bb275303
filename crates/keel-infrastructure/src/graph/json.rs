//! JSON renderer
//!
//! ```json
//! {
//!   "edges": [{ "from": "Greeter", "to": "dyn Clock [SystemClock]" }],
//!   "orphans": ["ApplicationName"]
//! }
//! ```

use keel_application::domain_services::DependencyGraph;
use keel_application::ports::GraphRenderer;
use serde_json::{Value, json};

/// Renders the layout input as pretty-printed JSON for tooling
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonGraphRenderer;

impl JsonGraphRenderer {
    /// New renderer
    pub fn new() -> Self {
        Self
    }

    /// The layout input as a JSON value
    pub fn to_value(graph: &DependencyGraph) -> Value {
        let input = graph.layout_input();
        let edges: Vec<Value> = input
            .edges
            .iter()
            .map(|(from, to)| json!({ "from": from.to_string(), "to": to.to_string() }))
            .collect();
        let orphans: Vec<String> = input.isolated.iter().map(ToString::to_string).collect();
        json!({ "edges": edges, "orphans": orphans })
    }
}

impl GraphRenderer for JsonGraphRenderer {
    fn name(&self) -> &str {
        "json"
    }

    fn render(&self, graph: &DependencyGraph) -> String {
        format!("{:#}", Self::to_value(graph))
    }
}

use crate::config::DisplaySettings;
use crate::lineage::graph::{LineageGraph, TypedEdge};
use crate::recorder::MemberAttributes;
use crate::types::EdgeKind;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Node weights that expose the attributes kept by the projection
pub trait ScoredNode {
    fn cost(&self) -> Option<f64>;
    fn loss(&self) -> Option<f64>;
    /// The expression rendered as text, if the member has one
    fn tree_text(&self) -> Option<String>;
}

impl ScoredNode for MemberAttributes {
    fn cost(&self) -> Option<f64> {
        self.get("cost").and_then(Value::as_f64)
    }

    fn loss(&self) -> Option<f64> {
        self.get("loss").and_then(Value::as_f64)
    }

    fn tree_text(&self) -> Option<String> {
        match self.get("tree")? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayNode {
    pub cost: Option<f64>,
    pub loss: Option<f64>,
    pub tree: String,
    pub display_tree: String,
}

impl ScoredNode for DisplayNode {
    fn cost(&self) -> Option<f64> {
        self.cost
    }

    fn loss(&self) -> Option<f64> {
        self.loss
    }

    fn tree_text(&self) -> Option<String> {
        Some(self.tree.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayEdge {
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    pub time: Option<f64>,
}

impl TypedEdge for DisplayEdge {
    fn kind(&self) -> EdgeKind {
        self.kind
    }

    fn time(&self) -> Option<f64> {
        self.time
    }
}

/// Reduced graph handed to the exporters
pub type SimplifiedGraph = LineageGraph<DisplayNode, DisplayEdge>;

/// Projects a lineage graph onto the attributes needed for rendering
#[derive(Debug, Clone, Default)]
pub struct GraphSimplifier {
    display: DisplaySettings,
}

impl GraphSimplifier {
    pub fn new(display: DisplaySettings) -> Self {
        Self { display }
    }

    /// Build a new graph with the same members and edges but only
    /// cost, loss, tree and display_tree on nodes and type and time on edges.
    pub fn simplify<N: ScoredNode, E: TypedEdge>(&self, graph: &LineageGraph<N, E>) -> SimplifiedGraph {
        let mut simple = SimplifiedGraph::new();

        for (id, node) in graph.nodes() {
            let tree = node
                .tree_text()
                .unwrap_or_else(|| self.display.missing_tree.clone());
            let display_tree = self.truncate(&tree);

            simple.add_node(
                id,
                DisplayNode {
                    cost: node.cost(),
                    loss: node.loss(),
                    tree,
                    display_tree,
                },
            );
        }

        for (from, to, edge) in graph.edges() {
            simple.add_edge(
                from,
                to,
                DisplayEdge {
                    kind: edge.kind(),
                    time: edge.time(),
                },
            );
        }

        debug!(
            "Simplified graph: {} nodes, {} edges",
            simple.node_count(),
            simple.edge_count()
        );
        simple
    }

    /// Shorten text longer than the display limit, counting characters
    pub fn truncate(&self, text: &str) -> String {
        if text.chars().count() <= self.display.max_len {
            return text.to_string();
        }

        let mut shortened: String = text.chars().take(self.display.keep_chars).collect();
        shortened.push_str(&self.display.ellipsis);
        shortened
    }
}

use crate::error::Result;
use crate::lineage::simplify::SimplifiedGraph;
use crate::types::{EdgeKind, MemberId};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write;

/// Trait for graph serializers
pub trait GraphFormatter {
    fn format(&self, graph: &SimplifiedGraph) -> Result<String>;

    /// Conventional file extension for the output
    fn extension(&self) -> &'static str;
}

/// GraphML formatter. Parallel edges are written as separate `<edge>`
/// elements, each with its own id.
pub struct GraphMlFormatter;

impl GraphMlFormatter {
    const HEADER: &'static str = r#"<?xml version="1.0" encoding="UTF-8"?>
<graphml xmlns="http://graphml.graphdrawing.org/xmlns" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://graphml.graphdrawing.org/xmlns http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd">
  <key id="d0" for="node" attr.name="cost" attr.type="double" />
  <key id="d1" for="node" attr.name="loss" attr.type="double" />
  <key id="d2" for="node" attr.name="tree" attr.type="string" />
  <key id="d3" for="node" attr.name="display_tree" attr.type="string" />
  <key id="d4" for="edge" attr.name="type" attr.type="string" />
  <key id="d5" for="edge" attr.name="time" attr.type="double" />
  <graph edgedefault="directed" parse.nodes="{nodes}" parse.edges="{edges}">
"#;

    fn push_data(out: &mut String, key: &str, value: &str) {
        // Writing to a String cannot fail
        let _ = writeln!(out, r#"      <data key="{}">{}</data>"#, key, escape_xml(value));
    }
}

impl GraphFormatter for GraphMlFormatter {
    fn format(&self, graph: &SimplifiedGraph) -> Result<String> {
        let mut out = Self::HEADER
            .replace("{nodes}", &graph.node_count().to_string())
            .replace("{edges}", &graph.edge_count().to_string());

        for (id, node) in graph.nodes() {
            let _ = writeln!(out, r#"    <node id="{}">"#, id);
            if let Some(cost) = node.cost {
                Self::push_data(&mut out, "d0", &cost.to_string());
            }
            if let Some(loss) = node.loss {
                Self::push_data(&mut out, "d1", &loss.to_string());
            }
            Self::push_data(&mut out, "d2", &node.tree);
            Self::push_data(&mut out, "d3", &node.display_tree);
            out.push_str("    </node>\n");
        }

        for (index, (from, to, edge)) in graph.edges().enumerate() {
            let _ = writeln!(
                out,
                r#"    <edge id="e{}" source="{}" target="{}">"#,
                index, from, to
            );
            Self::push_data(&mut out, "d4", edge.kind.as_str());
            if let Some(time) = edge.time {
                Self::push_data(&mut out, "d5", &time.to_string());
            }
            out.push_str("    </edge>\n");
        }

        out.push_str("  </graph>\n</graphml>\n");
        Ok(out)
    }

    fn extension(&self) -> &'static str {
        "graphml"
    }
}

/// Node-link JSON formatter (`nodes` plus `links`, one link per parallel edge)
pub struct NodeLinkFormatter {
    pub pretty: bool,
}

#[derive(Serialize)]
struct NodeLinkDocument<'a> {
    directed: bool,
    multigraph: bool,
    nodes: Vec<NodeLinkNode<'a>>,
    links: Vec<NodeLinkEdge>,
}

#[derive(Serialize)]
struct NodeLinkNode<'a> {
    id: MemberId,
    cost: Option<f64>,
    loss: Option<f64>,
    tree: &'a str,
    display_tree: &'a str,
}

#[derive(Serialize)]
struct NodeLinkEdge {
    source: MemberId,
    target: MemberId,
    /// Index among the parallel edges of this ordered pair
    key: usize,
    #[serde(rename = "type")]
    kind: EdgeKind,
    time: Option<f64>,
}

impl GraphFormatter for NodeLinkFormatter {
    fn format(&self, graph: &SimplifiedGraph) -> Result<String> {
        let nodes = graph
            .nodes()
            .map(|(id, node)| NodeLinkNode {
                id,
                cost: node.cost,
                loss: node.loss,
                tree: &node.tree,
                display_tree: &node.display_tree,
            })
            .collect();

        let mut parallel: HashMap<(MemberId, MemberId), usize> = HashMap::new();
        let links = graph
            .edges()
            .map(|(source, target, edge)| {
                let key = parallel.entry((source, target)).or_insert(0);
                let link = NodeLinkEdge {
                    source,
                    target,
                    key: *key,
                    kind: edge.kind,
                    time: edge.time,
                };
                *key += 1;
                link
            })
            .collect();

        let document = NodeLinkDocument {
            directed: true,
            multigraph: true,
            nodes,
            links,
        };

        let content = if self.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok(content)
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}

/// Characters XML 1.0 forbids in text become U+FFFD
fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => escaped.push(c),
            '\u{0}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}' => escaped.push(char::REPLACEMENT_CHARACTER),
            c => escaped.push(c),
        }
    }
    escaped
}

use crate::lineage::diagnostics::DiagnosticsCounter;
use crate::lineage::graph::{LineageGraph, TypedEdge};
use crate::recorder::{Event, MemberAttributes, MemberRecord, RecordSet};
use crate::types::{EdgeKind, MemberId};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, trace};

/// Full provenance edge as materialized from the event log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineageEdge {
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    pub time: Option<f64>,
    pub details: Option<Value>,
    /// Other contributing parent, only set on crossover edges
    pub partner: Option<MemberId>,
}

impl LineageEdge {
    pub fn parent() -> Self {
        Self {
            kind: EdgeKind::Parent,
            time: None,
            details: None,
            partner: None,
        }
    }
}

impl TypedEdge for LineageEdge {
    fn kind(&self) -> EdgeKind {
        self.kind
    }

    fn time(&self) -> Option<f64> {
        self.time
    }
}

/// Lineage graph carrying each member's full attribute bag
pub type ProvenanceGraph = LineageGraph<MemberAttributes, LineageEdge>;

/// Two-pass builder: every node first, then every edge
#[derive(Debug, Default)]
pub struct LineageGraphBuilder;

impl LineageGraphBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, records: &RecordSet) -> (ProvenanceGraph, DiagnosticsCounter) {
        let mut graph = ProvenanceGraph::new();
        let mut diagnostics = DiagnosticsCounter::new();

        info!("Building lineage graph - adding nodes");
        self.add_nodes(&mut graph, records);

        info!("Building lineage graph - adding edges");
        self.add_edges(&mut graph, records, &mut diagnostics);

        info!(
            "Lineage graph built with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        (graph, diagnostics)
    }

    fn add_nodes(&self, graph: &mut ProvenanceGraph, records: &RecordSet) {
        for (&id, record) in records {
            graph.add_node(id, record.attributes.clone());
        }

        debug!("Added {} nodes to lineage graph", graph.node_count());
    }

    fn add_edges(
        &self,
        graph: &mut ProvenanceGraph,
        records: &RecordSet,
        diagnostics: &mut DiagnosticsCounter,
    ) {
        for record in records.values() {
            self.add_member_edges(graph, record, diagnostics);
        }

        debug!(
            "Added {} edges from {} events",
            diagnostics.total_edges(),
            diagnostics.total_events()
        );
    }

    fn add_member_edges(
        &self,
        graph: &mut ProvenanceGraph,
        record: &MemberRecord,
        diagnostics: &mut DiagnosticsCounter,
    ) {
        if let Some(parent) = record.parent {
            Self::connect(graph, parent, record.id, LineageEdge::parent(), diagnostics);
        }

        for event in &record.events {
            diagnostics.record_event(event.kind());
            self.add_event_edges(graph, record.id, event, diagnostics);
        }
    }

    fn add_event_edges(
        &self,
        graph: &mut ProvenanceGraph,
        member: MemberId,
        event: &Event,
        diagnostics: &mut DiagnosticsCounter,
    ) {
        match event {
            Event::Mutate {
                child,
                time,
                mutation,
            } => {
                if let Some(child) = *child {
                    let edge = LineageEdge {
                        kind: EdgeKind::Mutate,
                        time: *time,
                        details: mutation.clone(),
                        partner: None,
                    };
                    Self::connect(graph, member, child, edge, diagnostics);
                }
            }
            Event::Tuning {
                child,
                time,
                mutation,
            } => {
                if let Some(child) = *child {
                    let edge = LineageEdge {
                        kind: EdgeKind::Tuning,
                        time: *time,
                        details: mutation.clone(),
                        partner: None,
                    };
                    Self::connect(graph, member, child, edge, diagnostics);
                }
            }
            Event::Crossover {
                parent1,
                parent2,
                child1,
                child2,
                time,
                details,
            } => {
                for child in [*child1, *child2].into_iter().flatten() {
                    for (parent, partner) in [(*parent1, *parent2), (*parent2, *parent1)] {
                        let Some(parent) = parent else { continue };
                        let edge = LineageEdge {
                            kind: EdgeKind::Crossover,
                            time: *time,
                            details: details.clone(),
                            partner,
                        };
                        Self::connect(graph, parent, child, edge, diagnostics);
                    }
                }
            }
            Event::Unclassified { type_name } => {
                trace!("Member {} has unclassified event {:?}", member, type_name);
            }
        }
    }

    /// Single insertion point: the edge is counted only if the graph accepted it
    fn connect(
        graph: &mut ProvenanceGraph,
        from: MemberId,
        to: MemberId,
        edge: LineageEdge,
        diagnostics: &mut DiagnosticsCounter,
    ) {
        let kind = edge.kind;
        if graph.add_edge(from, to, edge) {
            diagnostics.record_edge(kind);
        } else {
            trace!("Dropped {} edge {} -> {}: endpoint not in graph", kind, from, to);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::EventLogReader;
    use crate::types::EventKind;
    use serde_json::json;

    fn build(document: Value) -> (ProvenanceGraph, DiagnosticsCounter) {
        let records = EventLogReader::parse_document(&document).unwrap();
        LineageGraphBuilder::new().build(&records)
    }

    fn crossover_log(event: Value) -> Value {
        json!({
            "mutations": {
                "1": {"tree": "x"},
                "2": {"tree": "y"},
                "3": {"tree": "x*y"},
                "4": {"tree": "y*x"},
                "5": {"tree": "x", "events": [event]}
            }
        })
    }

    #[test]
    fn test_parent_and_mutate_edges() {
        let (graph, diagnostics) = build(json!({
            "mutations": {
                "1": {"tree": "x", "cost": 1.0, "loss": 0.5, "events": []},
                "2": {
                    "tree": "x+1", "cost": 2.0, "loss": 0.3, "parent": "1",
                    "events": [{"type": "mutate", "child": "2", "time": 10, "mutation": {"op": "add_const"}}]
                }
            }
        }));

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edges_between(1, 2), vec![&LineageEdge::parent()]);

        let self_edges = graph.edges_between(2, 2);
        assert_eq!(self_edges.len(), 1);
        assert_eq!(self_edges[0].kind, EdgeKind::Mutate);
        assert_eq!(self_edges[0].time, Some(10.0));
        assert_eq!(self_edges[0].details, Some(json!({"op": "add_const"})));

        assert_eq!(diagnostics.edges_created(EdgeKind::Parent), 1);
        assert_eq!(diagnostics.edges_created(EdgeKind::Mutate), 1);
        assert_eq!(diagnostics.events_seen(EventKind::Mutate), 1);
    }

    #[test]
    fn test_crossover_full_fan_out() {
        let (graph, diagnostics) = build(crossover_log(json!({
            "type": "crossover", "parent1": "1", "parent2": "2",
            "child1": "3", "child2": "4", "time": 7, "details": {"point": 2}
        })));

        assert_eq!(graph.edge_count(), 4);
        assert_eq!(diagnostics.edges_created(EdgeKind::Crossover), 4);

        for (parent, partner) in [(1, 2), (2, 1)] {
            for child in [3, 4] {
                let edges = graph.edges_between(parent, child);
                assert_eq!(edges.len(), 1);
                assert_eq!(edges[0].partner, Some(partner));
                assert_eq!(edges[0].details, Some(json!({"point": 2})));
                assert_eq!(edges[0].time, Some(7.0));
            }
        }
    }

    #[test]
    fn test_crossover_with_one_child() {
        let (graph, diagnostics) = build(crossover_log(json!({
            "type": "crossover", "parent1": "1", "parent2": "2", "child1": "3", "child2": null
        })));

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(diagnostics.edges_created(EdgeKind::Crossover), 2);
        assert!(graph.edges_between(1, 4).is_empty());
    }

    #[test]
    fn test_crossover_with_unknown_child() {
        let (graph, _) = build(crossover_log(json!({
            "type": "crossover", "parent1": "1", "parent2": "2", "child1": "3", "child2": "99"
        })));

        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_crossover_without_parents() {
        let (graph, diagnostics) = build(crossover_log(json!({
            "type": "crossover", "parent1": null, "parent2": "0", "child1": "3", "child2": "4"
        })));

        assert_eq!(graph.edge_count(), 0);
        assert_eq!(diagnostics.events_seen(EventKind::Crossover), 1);
        assert_eq!(diagnostics.edges_created(EdgeKind::Crossover), 0);
    }

    #[test]
    fn test_crossover_with_single_parent_has_no_partner() {
        let (graph, _) = build(crossover_log(json!({
            "type": "crossover", "parent1": "1", "child1": "3", "child2": "4"
        })));

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edges_between(1, 3)[0].partner, None);
    }

    #[test]
    fn test_crossover_with_missing_parent_node() {
        let (graph, diagnostics) = build(crossover_log(json!({
            "type": "crossover", "parent1": "1", "parent2": "77", "child1": "3", "child2": "4"
        })));

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(diagnostics.edges_created(EdgeKind::Crossover), 2);
        assert_eq!(graph.edges_between(1, 4)[0].partner, Some(77));
    }

    #[test]
    fn test_dangling_mutate_is_counted_but_dropped() {
        let (graph, diagnostics) = build(json!({
            "mutations": {
                "1": {"tree": "x", "events": [{"type": "mutate", "child": "404", "time": 3}]}
            }
        }));

        assert_eq!(graph.edge_count(), 0);
        assert_eq!(diagnostics.events_seen(EventKind::Mutate), 1);
        assert_eq!(diagnostics.edges_created(EdgeKind::Mutate), 0);
    }

    #[test]
    fn test_missing_parent_node_is_skipped() {
        let (graph, diagnostics) = build(json!({
            "mutations": {"5": {"tree": "x", "parent": "4"}, "6": {"tree": "x", "parent": 0}}
        }));

        assert_eq!(graph.edge_count(), 0);
        assert_eq!(diagnostics.edges_created(EdgeKind::Parent), 0);
    }

    #[test]
    fn test_tuning_and_other_events() {
        let (graph, diagnostics) = build(json!({
            "mutations": {
                "1": {"tree": "x", "events": [
                    {"type": "tuning", "child": "2", "time": 4, "mutation": {"iterations": 8}},
                    {"type": "death", "time": 5},
                    {"time": 6}
                ]},
                "2": {"tree": "1.02*x"}
            }
        }));

        let edges = graph.edges_between(1, 2);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].kind, EdgeKind::Tuning);
        assert_eq!(diagnostics.events_seen(EventKind::Tuning), 1);
        assert_eq!(diagnostics.events_seen(EventKind::Other), 2);
        assert_eq!(diagnostics.edges_created(EdgeKind::Tuning), 1);
    }

    #[test]
    fn test_nodes_carry_full_attributes() {
        let (graph, _) = build(json!({
            "mutations": {"3": {"tree": "x", "cost": 1.5, "parent": "1", "extra": [1, 2]}}
        }));

        let attributes = graph.node(3).unwrap();
        assert_eq!(attributes.get("cost"), Some(&json!(1.5)));
        assert_eq!(attributes.get("parent"), Some(&json!("1")));
        assert_eq!(attributes.get("extra"), Some(&json!([1, 2])));
        assert_eq!(attributes.get("loss"), None);
    }
}

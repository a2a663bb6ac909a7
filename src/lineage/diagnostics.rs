use crate::types::{EdgeKind, EventKind};
use serde::Serialize;
use std::collections::BTreeMap;

/// Tallies of what the builder observed and what it actually inserted.
///
/// Purely observational: nothing reads these back while building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticsCounter {
    events_seen: BTreeMap<EventKind, usize>,
    edges_created: BTreeMap<EdgeKind, usize>,
}

impl Default for DiagnosticsCounter {
    fn default() -> Self {
        Self {
            events_seen: EventKind::ALL.iter().map(|&kind| (kind, 0)).collect(),
            edges_created: EdgeKind::ALL.iter().map(|&kind| (kind, 0)).collect(),
        }
    }
}

impl DiagnosticsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event(&mut self, kind: EventKind) {
        *self.events_seen.entry(kind).or_insert(0) += 1;
    }

    pub fn record_edge(&mut self, kind: EdgeKind) {
        *self.edges_created.entry(kind).or_insert(0) += 1;
    }

    pub fn events_seen(&self, kind: EventKind) -> usize {
        self.events_seen.get(&kind).copied().unwrap_or(0)
    }

    pub fn edges_created(&self, kind: EdgeKind) -> usize {
        self.edges_created.get(&kind).copied().unwrap_or(0)
    }

    pub fn event_tally(&self) -> &BTreeMap<EventKind, usize> {
        &self.events_seen
    }

    pub fn edge_tally(&self) -> &BTreeMap<EdgeKind, usize> {
        &self.edges_created
    }

    pub fn total_events(&self) -> usize {
        self.events_seen.values().sum()
    }

    pub fn total_edges(&self) -> usize {
        self.edges_created.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_all_categories_at_zero() {
        let counter = DiagnosticsCounter::new();

        assert_eq!(counter.event_tally().len(), 4);
        assert_eq!(counter.edge_tally().len(), 4);
        assert_eq!(counter.total_events(), 0);
        assert_eq!(counter.edges_created(EdgeKind::Parent), 0);
    }

    #[test]
    fn test_tallies_are_independent() {
        let mut counter = DiagnosticsCounter::new();
        counter.record_event(EventKind::Crossover);
        counter.record_edge(EdgeKind::Crossover);
        counter.record_edge(EdgeKind::Crossover);
        counter.record_event(EventKind::Other);

        assert_eq!(counter.events_seen(EventKind::Crossover), 1);
        assert_eq!(counter.events_seen(EventKind::Other), 1);
        assert_eq!(counter.edges_created(EdgeKind::Crossover), 2);
        assert_eq!(counter.total_events(), 2);
        assert_eq!(counter.total_edges(), 2);
    }

    #[test]
    fn test_serializes_with_type_names() {
        let mut counter = DiagnosticsCounter::new();
        counter.record_edge(EdgeKind::Tuning);

        let value = serde_json::to_value(&counter).unwrap();
        assert_eq!(value["edges_created"]["tuning"], 1);
        assert_eq!(value["events_seen"]["other"], 0);
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Core types shared by the reader, builder and exporters

/// Stable primary key of a population member
pub type MemberId = i64;

/// Operation recorded on a lineage edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Parent,
    Mutate,
    Crossover,
    Tuning,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 4] = [
        EdgeKind::Parent,
        EdgeKind::Mutate,
        EdgeKind::Crossover,
        EdgeKind::Tuning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Parent => "parent",
            EdgeKind::Mutate => "mutate",
            EdgeKind::Crossover => "crossover",
            EdgeKind::Tuning => "tuning",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event classification used for diagnostics tallies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Mutate,
    Crossover,
    Tuning,
    Other,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Mutate,
        EventKind::Crossover,
        EventKind::Tuning,
        EventKind::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Mutate => "mutate",
            EventKind::Crossover => "crossover",
            EventKind::Tuning => "tuning",
            EventKind::Other => "other",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use crate::types::{EventKind, MemberId};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Raw attribute bag of a member, kept verbatim from the event log
pub type MemberAttributes = Map<String, Value>;

/// All members of one run, keyed by identifier
pub type RecordSet = BTreeMap<MemberId, MemberRecord>;

/// One population member as read from the recorder output
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRecord {
    pub id: MemberId,
    pub attributes: MemberAttributes,
    pub parent: Option<MemberId>,
    pub events: Vec<Event>,
}

/// A genetic operation recorded against a member
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Mutate {
        child: Option<MemberId>,
        time: Option<f64>,
        mutation: Option<Value>,
    },
    Crossover {
        parent1: Option<MemberId>,
        parent2: Option<MemberId>,
        child1: Option<MemberId>,
        child2: Option<MemberId>,
        time: Option<f64>,
        details: Option<Value>,
    },
    Tuning {
        child: Option<MemberId>,
        time: Option<f64>,
        mutation: Option<Value>,
    },
    /// Any record whose `type` is missing or not one of the above
    Unclassified { type_name: Option<String> },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Mutate { .. } => EventKind::Mutate,
            Event::Crossover { .. } => EventKind::Crossover,
            Event::Tuning { .. } => EventKind::Tuning,
            Event::Unclassified { .. } => EventKind::Other,
        }
    }
}

impl MemberRecord {
    pub fn new(id: MemberId, attributes: MemberAttributes) -> Self {
        Self {
            id,
            attributes,
            parent: None,
            events: Vec::new(),
        }
    }
}

/// Interpret a reference field. Absent, null, zero and unparseable
/// values all collapse to "no reference".
pub fn member_ref(value: Option<&Value>) -> Option<MemberId> {
    let id = match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<MemberId>().ok(),
        _ => None,
    }?;

    (id != 0).then_some(id)
}

use crate::error::{LineageError, Result};
use crate::recorder::member::{member_ref, Event, MemberRecord, RecordSet};
use crate::types::MemberId;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Reader for the recorder JSON written by the search engine
#[derive(Debug, Clone)]
pub struct EventLogReader {
    path: PathBuf,
}

impl EventLogReader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole document and parse it into a record set
    pub fn read(&self) -> Result<RecordSet> {
        debug!("Loading event log from: {:?}", self.path);

        let content = fs::read_to_string(&self.path)?;
        let records = Self::parse_str(&content)?;

        info!("Loaded {} members from {:?}", records.len(), self.path);
        Ok(records)
    }

    pub fn parse_str(content: &str) -> Result<RecordSet> {
        let document: Value = serde_json::from_str(content)?;
        Self::parse_document(&document)
    }

    /// Parse an already-decoded document. Only `mutations` is consulted.
    pub fn parse_document(document: &Value) -> Result<RecordSet> {
        let root = document
            .as_object()
            .ok_or_else(|| LineageError::malformed("document root is not an object"))?;

        let mutations = match root.get("mutations") {
            None | Some(Value::Null) => {
                warn!("Event log has no mutations field");
                return Ok(RecordSet::new());
            }
            Some(Value::Object(members)) => members,
            Some(_) => return Err(LineageError::malformed("mutations is not an object")),
        };

        let mut records = RecordSet::new();

        for (key, member_data) in mutations {
            let id = Self::parse_member_key(key)?;
            let record = Self::parse_member(id, key, member_data)?;

            if records.insert(id, record).is_some() {
                return Err(LineageError::DuplicateMemberId {
                    key: key.clone(),
                    id,
                });
            }
        }

        if let Some(sample) = records.values().next() {
            debug!(
                "Sample member: id={} parent={:?} events={}",
                sample.id,
                sample.parent,
                sample.events.len()
            );
            if let Some(first) = sample.events.first() {
                debug!("First event: {:?}", first);
            }
        }

        Ok(records)
    }

    fn parse_member_key(key: &str) -> Result<MemberId> {
        key.trim()
            .parse::<MemberId>()
            .map_err(|_| LineageError::InvalidMemberId {
                key: key.to_string(),
            })
    }

    fn parse_member(id: MemberId, key: &str, member_data: &Value) -> Result<MemberRecord> {
        let attributes = member_data.as_object().ok_or_else(|| {
            LineageError::MalformedDocument(format!("member {:?} is not an object", key))
        })?;

        let mut record = MemberRecord::new(id, attributes.clone());
        record.parent = member_ref(attributes.get("parent"));
        record.events = attributes
            .get("events")
            .and_then(Value::as_array)
            .map(|events| events.iter().map(Self::parse_event).collect())
            .unwrap_or_default();

        Ok(record)
    }

    /// Classify one event by its `type` field. Shapes that cannot be
    /// classified become `Event::Unclassified` instead of failing the load.
    fn parse_event(event: &Value) -> Event {
        let type_name = event.get("type").and_then(Value::as_str);
        let time = event.get("time").and_then(Value::as_f64);
        let detail = |field: &str| event.get(field).filter(|v| !v.is_null()).cloned();

        match type_name {
            Some("mutate") => Event::Mutate {
                child: member_ref(event.get("child")),
                time,
                mutation: detail("mutation"),
            },
            Some("tuning") => Event::Tuning {
                child: member_ref(event.get("child")),
                time,
                mutation: detail("mutation"),
            },
            Some("crossover") => Event::Crossover {
                parent1: member_ref(event.get("parent1")),
                parent2: member_ref(event.get("parent2")),
                child1: member_ref(event.get("child1")),
                child2: member_ref(event.get("child2")),
                time,
                details: detail("details"),
            },
            other => Event::Unclassified {
                type_name: other.map(str::to_string),
            },
        }
    }
}

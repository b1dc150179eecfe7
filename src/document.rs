//! Document-level views over extracted events.

use crate::event::EventInstance;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

/// Coarse document classification by event count and event-type variety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocType {
    /// No events.
    None,
    /// One event instance ("one-to-one").
    Single,
    /// Several instances of one event type ("one-to-many").
    RepeatedSingleType,
    /// Several event types ("many-to-many").
    MultiType,
}

impl DocType {
    pub fn as_str(self) -> &'static str {
        match self {
            DocType::None => "none",
            DocType::Single => "single",
            DocType::RepeatedSingleType => "repeated-single-type",
            DocType::MultiType => "multi-type",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(recguid, event type, instance)` record of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentEvent {
    pub recguid: String,
    pub event_type: String,
    pub instance: EventInstance,
}

impl DocumentEvent {
    pub fn new(recguid: impl Into<String>, event_type: impl Into<String>, instance: EventInstance) -> Self {
        DocumentEvent { recguid: recguid.into(), event_type: event_type.into(), instance }
    }
}

/// Classify a document from its event records. Only the event-type labels
/// matter.
pub fn classify(document: &[DocumentEvent]) -> DocType {
    classify_labels(document.iter().map(|e| e.event_type.as_str()))
}

/// Classify from event-type labels alone.
pub fn classify_labels<'a, I>(labels: I) -> DocType
where
    I: IntoIterator<Item = &'a str>,
{
    let labels: Vec<&str> = labels.into_iter().collect();
    match labels.len() {
        0 => DocType::None,
        1 => DocType::Single,
        _ => {
            let distinct: HashSet<&str> = labels.into_iter().collect();
            if distinct.len() == 1 { DocType::RepeatedSingleType } else { DocType::MultiType }
        }
    }
}

/// Union of argument roles seen per event type in annotated records.
///
/// Each item is an event type and its role → argument map; a role counts
/// even when its argument is `None`.
pub fn infer_event_roles<'a, I>(records: I) -> BTreeMap<String, BTreeSet<String>>
where
    I: IntoIterator<Item = (&'a str, &'a HashMap<String, Option<String>>)>,
{
    let mut roles: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (event_type, arguments) in records {
        roles.entry(event_type.to_string()).or_default().extend(arguments.keys().cloned());
    }
    roles
}

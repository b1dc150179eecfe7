//! Schema compiler.
//!
//! Turns a parsed [`TriggerSpec`] into schemas:
//!
//! ```text
//! TriggerSpec ── compile(mapping) ──▶ DraftCatalog ── finalize_* ──▶ SchemaCatalog
//!                  │                                    │
//!                  └─ every event type must be mapped   └─ key fields narrowed
//! ```
//!
//! The "all" list becomes the schema's field order, which is also the
//! positional order of [`EventInstance::as_tuple`](crate::EventInstance::as_tuple).
//!
//! Duplicate event types are not merged: the last one wins in the lookup
//! tables, and all of them stay in [`SchemaCatalog::event_type_fields_list`].

use crate::error::{Error, Result};
use crate::event::EventInstance;
use crate::schema::{DraftSchema, EventSchema, finalize_schema};
use crate::triggers::{TriggerBlock, TriggerSpec};
use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Event-type name (as written in the trigger spec) → short identifier.
pub type EventTypeMap = HashMap<String, String>;

/// Compile one trigger block into a draft named `identifier`.
pub fn compile_schema(block: &TriggerBlock, identifier: &str) -> Result<DraftSchema> {
    DraftSchema::new(block.event_type.clone(), identifier, block.all_fields.clone())
}

/// Compile every block of `spec`, in order.
///
/// Fails without producing anything if any event type is missing from
/// `mapping`.
pub fn compile(spec: &TriggerSpec, mapping: &EventTypeMap) -> Result<DraftCatalog> {
    if let Some(unmapped) = spec.event_types().find(|name| !mapping.contains_key(*name)) {
        return Err(Error::UnmappedEventType { event_type: unmapped.to_string() });
    }

    let used: HashSet<&str> = spec.event_types().collect();
    let mut unused: Vec<&str> = mapping.keys().map(String::as_str).filter(|k| !used.contains(k)).collect();
    unused.sort_unstable();
    for name in unused {
        warn!(event_type = name, "mapping entry has no trigger block");
    }

    let mut drafts = Vec::with_capacity(spec.blocks().len());
    for block in spec.blocks() {
        let identifier = &mapping[&block.event_type];
        let draft = compile_schema(block, identifier)?;
        debug!(
            event_type = draft.name(),
            identifier = draft.identifier(),
            fields = draft.fields().len(),
            "compiled schema"
        );
        drafts.push(draft);
    }

    Ok(DraftCatalog { drafts })
}

/// Key fields to keep per identifier when finalizing a [`DraftCatalog`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyFieldPlan {
    keys: HashMap<String, Vec<String>>,
}

impl KeyFieldPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `keys` for the schema named `identifier`.
    pub fn with(mut self, identifier: impl Into<String>, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.keys.insert(identifier.into(), keys.into_iter().map(Into::into).collect());
        self
    }

    /// Key fields taken from the field list at importance `rank` of each block.
    ///
    /// Blocks without that rank (or with unmapped names) are left out of the
    /// plan and keep all fields as keys.
    pub fn from_rank(spec: &TriggerSpec, mapping: &EventTypeMap, rank: u32) -> Self {
        let mut plan = KeyFieldPlan::new();
        for block in spec.blocks() {
            if let (Some(identifier), Some(fields)) = (mapping.get(&block.event_type), block.rank_fields(rank)) {
                plan.keys.insert(identifier.clone(), fields.to_vec());
            }
        }
        plan
    }

    pub fn get(&self, identifier: &str) -> Option<&[String]> {
        self.keys.get(identifier).map(Vec::as_slice)
    }
}

/// Compiled drafts, in trigger-spec order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftCatalog {
    drafts: Vec<DraftSchema>,
}

impl DraftCatalog {
    pub fn drafts(&self) -> &[DraftSchema] {
        &self.drafts
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// Finalize every draft with all of its fields as key fields.
    pub fn finalize_default(self) -> Result<SchemaCatalog> {
        self.finalize_with(&KeyFieldPlan::default())
    }

    /// Finalize every draft using `plan`; drafts the plan does not name keep
    /// all fields as key fields.
    pub fn finalize_with(self, plan: &KeyFieldPlan) -> Result<SchemaCatalog> {
        let schemas = self
            .drafts
            .into_iter()
            .map(|draft| match plan.get(draft.identifier()) {
                Some(keys) => {
                    let keys = keys.to_vec();
                    finalize_schema(draft, keys)
                }
                None => draft.finalize_default(),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SchemaCatalog::from_schemas(schemas))
    }
}

/// One row of [`SchemaCatalog::event_type_fields_list`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventTypeFields {
    pub identifier: String,
    pub fields: Vec<String>,
    pub key_fields: Vec<String>,
    pub min_match_count: usize,
}

/// Finalized schemas plus the lookup structures used by extraction code.
///
/// Serializes as `{"schemas": [...], "event_type_fields": [...]}`; the lookup
/// tables are rebuilt from the schemas and are not part of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaCatalog {
    schemas: Vec<EventSchema>,
    by_event_type: HashMap<String, usize>,
    by_identifier: HashMap<String, usize>,
}

impl Serialize for SchemaCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SchemaCatalog", 2)?;
        state.serialize_field("schemas", &self.schemas)?;
        state.serialize_field("event_type_fields", &self.event_type_fields_list())?;
        state.end()
    }
}

impl SchemaCatalog {
    /// Build a catalog; later schemas shadow earlier ones with the same name.
    pub fn from_schemas(schemas: Vec<EventSchema>) -> Self {
        let mut by_event_type = HashMap::with_capacity(schemas.len());
        let mut by_identifier = HashMap::with_capacity(schemas.len());

        for (idx, schema) in schemas.iter().enumerate() {
            if by_event_type.insert(schema.name().to_string(), idx).is_some() {
                warn!(event_type = schema.name(), "duplicate event type; last definition wins");
            }
            if let Some(prev) = by_identifier.insert(schema.identifier().to_string(), idx) {
                if schemas[prev].name() != schema.name() {
                    warn!(
                        identifier = schema.identifier(),
                        shadowed = schemas[prev].name(),
                        event_type = schema.name(),
                        "identifier shared by several event types; last definition wins"
                    );
                }
            }
        }

        SchemaCatalog { schemas, by_event_type, by_identifier }
    }

    /// Schema for an event-type name.
    pub fn get(&self, event_type: &str) -> Option<&EventSchema> {
        self.by_event_type.get(event_type).map(|&i| &self.schemas[i])
    }

    /// Schema for a mapping identifier.
    pub fn get_by_identifier(&self, identifier: &str) -> Option<&EventSchema> {
        self.by_identifier.get(identifier).map(|&i| &self.schemas[i])
    }

    /// All schemas in compile order, duplicates included.
    pub fn schemas(&self) -> &[EventSchema] {
        &self.schemas
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Event-type name → schema (last definition wins).
    pub fn event_type_to_schema(&self) -> HashMap<&str, &EventSchema> {
        self.by_event_type.iter().map(|(k, &i)| (k.as_str(), &self.schemas[i])).collect()
    }

    /// `(identifier, fields, key_fields, min_match_count)` rows in compile
    /// order, one per compiled block.
    pub fn event_type_fields_list(&self) -> Vec<EventTypeFields> {
        self.schemas
            .iter()
            .map(|s| EventTypeFields {
                identifier: s.identifier().to_string(),
                fields: s.fields().to_vec(),
                key_fields: s.key_fields().to_vec(),
                min_match_count: s.min_match_count(),
            })
            .collect()
    }

    /// Event types defined more than once, in first-seen order.
    pub fn duplicate_event_types(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut dups = Vec::new();
        for schema in &self.schemas {
            if !seen.insert(schema.name()) && !dups.contains(&schema.name()) {
                dups.push(schema.name());
            }
        }
        dups
    }

    /// Identifiers mapped from more than one distinct event type, in
    /// first-seen order.
    pub fn duplicate_identifiers(&self) -> Vec<&str> {
        let mut first: HashMap<&str, &str> = HashMap::new();
        let mut dups = Vec::new();
        for schema in &self.schemas {
            let name = *first.entry(schema.identifier()).or_insert(schema.name());
            if name != schema.name() && !dups.contains(&schema.identifier()) {
                dups.push(schema.identifier());
            }
        }
        dups
    }

    /// A fresh, empty instance of `event_type`'s schema.
    pub fn instantiate(&self, event_type: &str) -> Result<EventInstance> {
        let schema =
            self.get(event_type).ok_or_else(|| Error::UnknownEventType { event_type: event_type.to_string() })?;
        EventInstance::new(schema)
    }
}

#[cfg(test)]
#[path = "compiler/tests.rs"]
mod tests;

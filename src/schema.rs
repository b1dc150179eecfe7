//! Event schemas.
//!
//! A schema is produced in two stages:
//!
//! ```text
//! TriggerBlock ── compile_schema ──▶ DraftSchema     (key fields = all fields)
//!                                        │
//!                  finalize_schema ◀─────┘
//!                        │
//!                        v
//!                   EventSchema     (key fields ⊆ fields, validated)
//! ```
//!
//! Only an [`EventSchema`] can be instantiated into an
//! [`EventInstance`](crate::EventInstance). Narrowing the key fields is an
//! explicit call even when the caller keeps the default (see
//! [`DraftSchema::finalize_default`]).

use crate::error::{Error, Result};
use crate::event::EventInstance;
use serde::Serialize;
use std::collections::HashSet;

/// Default threshold of populated fields for a "good candidate".
pub const DEFAULT_MIN_MATCH_COUNT: usize = 2;

/// Compiler output before key-field narrowing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSchema {
    name: String,
    identifier: String,
    fields: Vec<String>,
    min_match_count: usize,
}

impl DraftSchema {
    /// Build a draft; rejects duplicate field names. An empty field list is
    /// accepted here and rejected later by [`EventInstance::new`].
    pub fn new(name: impl Into<String>, identifier: impl Into<String>, fields: Vec<String>) -> Result<Self> {
        let name = name.into();
        check_unique(&name, &fields)?;
        Ok(DraftSchema { name, identifier: identifier.into(), fields, min_match_count: DEFAULT_MIN_MATCH_COUNT })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Drafts treat every field as a key field.
    pub fn key_fields(&self) -> &[String] {
        &self.fields
    }

    pub fn min_match_count(&self) -> usize {
        self.min_match_count
    }

    /// Finalize with `key_fields` (see [`finalize_schema`]).
    pub fn finalize<I, S>(self, key_fields: I) -> Result<EventSchema>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        finalize_schema(self, key_fields)
    }

    /// Finalize keeping every field as a key field.
    pub fn finalize_default(self) -> Result<EventSchema> {
        let keys = self.fields.clone();
        finalize_schema(self, keys)
    }
}

/// Narrow a draft's key fields and produce a usable [`EventSchema`].
///
/// Every key must be one of the draft's fields. Keys are stored in schema
/// field order with duplicates collapsed.
pub fn finalize_schema<I, S>(draft: DraftSchema, key_fields: I) -> Result<EventSchema>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let DraftSchema { name, identifier, fields, min_match_count } = draft;
    let key_fields = order_keys(&name, &fields, key_fields)?;
    Ok(EventSchema { name, identifier, fields, key_fields, min_match_count })
}

/// A finalized event schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSchema {
    name: String,
    identifier: String,
    fields: Vec<String>,
    key_fields: Vec<String>,
    min_match_count: usize,
}

impl EventSchema {
    /// Build a schema directly, validating field uniqueness and key membership.
    pub fn new<I, S>(
        name: impl Into<String>,
        identifier: impl Into<String>,
        fields: Vec<String>,
        key_fields: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DraftSchema::new(name, identifier, fields)?.finalize(key_fields)
    }

    /// Event-type name as written in the trigger spec.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short identifier supplied by the caller's mapping.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn key_fields(&self) -> &[String] {
        &self.key_fields
    }

    /// Advisory threshold for downstream consumers; instances do not enforce it.
    pub fn min_match_count(&self) -> usize {
        self.min_match_count
    }

    pub fn with_min_match_count(mut self, min_match_count: usize) -> Self {
        self.min_match_count = min_match_count;
        self
    }

    pub fn is_key_field(&self, field: &str) -> bool {
        self.key_fields.iter().any(|k| k == field)
    }

    /// Create an empty [`EventInstance`] of this schema.
    pub fn instantiate(&self) -> Result<EventInstance> {
        EventInstance::new(self)
    }
}

fn check_unique(schema: &str, fields: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(fields.len());
    for field in fields {
        if !seen.insert(field.as_str()) {
            return Err(Error::DuplicateField { schema: schema.to_string(), field: field.clone() });
        }
    }
    Ok(())
}

/// Validate `keys` against `fields` and return them in field order.
pub(crate) fn order_keys<I, S>(schema: &str, fields: &[String], keys: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut wanted: HashSet<String> = HashSet::new();
    for key in keys {
        let key = key.into();
        if !fields.contains(&key) {
            return Err(Error::UnknownKeyField { schema: schema.to_string(), field: key });
        }
        wanted.insert(key);
    }
    Ok(fields.iter().filter(|f| wanted.contains(f.as_str())).cloned().collect())
}

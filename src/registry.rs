//! Named schema templates.
//!
//! A [`SchemaRegistry`] maps a template name to a constructor that builds a
//! [`SchemaCatalog`]. Built-in templates are registered in
//! [`SchemaRegistry::builtin`]; the process-wide default registry is built
//! lazily on first use and never mutated afterwards.

use crate::compiler::{self, EventTypeMap, KeyFieldPlan, SchemaCatalog};
use crate::error::{Error, Result};
use crate::triggers;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Builds a template's catalog on request.
pub type TemplateFn = fn() -> Result<SchemaCatalog>;

static DEFAULT_REGISTRY: Lazy<SchemaRegistry> = Lazy::new(SchemaRegistry::builtin);

const CHFINANN_TRIGGERS: &str = include_str!("templates/chfinann.triggers");

/// ChFinAnn event types and the identifiers their schemas are named after.
const CHFINANN_EVENT_TYPES: &[(&str, &str)] = &[
    ("破产清算", "Bankruptcy"),
    ("重大安全事故", "Accident"),
    ("股东减持", "EquityUnderweight"),
    ("股权质押", "EquityPledge"),
    ("股东增持", "EquityOverweight"),
    ("股权冻结", "EquityFreeze"),
    ("高层死亡", "LeaderDeath"),
    ("重大资产损失", "AssetLoss"),
    ("重大对外赔付", "ExternalIndemnity"),
];

/// Name → template constructor table.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    templates: BTreeMap<String, TemplateFn>,
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in templates.
    pub fn builtin() -> Self {
        let mut registry = SchemaRegistry::new();
        registry.register("chfinann", chfinann);
        registry
    }

    /// Register (or replace) `name`.
    pub fn register(&mut self, name: impl Into<String>, ctor: TemplateFn) -> &mut Self {
        self.templates.insert(name.into(), ctor);
        self
    }

    /// Registered names, sorted.
    pub fn available(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Build the catalog of template `name`.
    pub fn load(&self, name: &str) -> Result<SchemaCatalog> {
        let ctor = self
            .templates
            .get(name)
            .ok_or_else(|| Error::UnknownTemplate { name: name.to_string(), available: self.available().join(", ") })?;
        ctor()
    }
}

/// Load template `name` from the default registry.
pub fn get_event_template(name: &str) -> Result<SchemaCatalog> {
    DEFAULT_REGISTRY.load(name)
}

/// Names in the default registry.
pub fn available_templates() -> Vec<&'static str> {
    DEFAULT_REGISTRY.available()
}

/// ChFinAnn financial announcements, keyed on each event type's rank-1 field.
fn chfinann() -> Result<SchemaCatalog> {
    let mapping: EventTypeMap = CHFINANN_EVENT_TYPES.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    let spec = triggers::parse_trigger_spec(CHFINANN_TRIGGERS, true)?;
    let plan = KeyFieldPlan::from_rank(&spec, &mapping, 1);
    compiler::compile(&spec, &mapping)?.finalize_with(&plan)
}

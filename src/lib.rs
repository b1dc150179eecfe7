//! Document-level event schemas.
//!
//! ```text
//! trigger spec text ── triggers ──▶ TriggerSpec ── compiler ──▶ DraftCatalog
//!                                                                   │ finalize
//!                                                                   v
//!                  documents ◀── EventInstance ◀── instantiate ── SchemaCatalog
//!                     │
//!                     └── document::classify ──▶ DocType
//! ```
//!
//! - [`triggers`]: reads the trigger-spec text format.
//! - [`compiler`]: builds drafts and catalogs from parsed specs.
//! - [`EventSchema`] / [`EventInstance`]: schema definitions and runtime events.
//! - [`document`]: document classification and role inference.
//! - [`registry`]: named built-in templates.
//!
//! Set `DEE_LOG=debug` when running the CLI to see per-block traces.

#[macro_use]
mod macros;
mod api;
pub mod compiler;
pub mod document;
mod error;
mod event;
pub mod registry;
mod schema;
pub mod triggers;

pub use api::{
    BlockSummary, CompileDetails, CompileResultVerbose, Options, compile_triggers, compile_triggers_verbose_with,
    compile_triggers_with,
};
pub use compiler::{DraftCatalog, EventTypeFields, EventTypeMap, KeyFieldPlan, SchemaCatalog, compile, compile_schema};
pub use document::{DocType, DocumentEvent, classify, classify_labels, infer_event_roles};
pub use error::{Error, ErrorKind, Result};
pub use event::EventInstance;
pub use registry::{SchemaRegistry, available_templates, get_event_template};
pub use schema::{DEFAULT_MIN_MATCH_COUNT, DraftSchema, EventSchema, finalize_schema};
pub use triggers::{Rank, RankIssues, SkippedBlock, TriggerBlock, TriggerSpec, parse_trigger_spec};

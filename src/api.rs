use crate::compiler::{self, DraftCatalog, EventTypeMap};
use crate::error::Result;
use crate::triggers::{self, SkippedBlock, TriggerSpec};
use std::time::{Duration, Instant};

/// Options that affect trigger-spec parsing.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Fail on the first unreadable block instead of skipping it.
    pub strict: bool,
}

/// A compact per-block summary used in verbose output.
#[derive(Debug, Clone)]
pub struct BlockSummary {
    pub event_type: String,
    pub identifier: String,
    pub line: usize,
    pub fields: usize,
    pub ranks: usize,
    /// Labels of the block's [`RankIssues`](crate::RankIssues).
    pub issues: Vec<&'static str>,
}

/// Additional details returned by [`compile_triggers_verbose_with`].
#[derive(Debug, Clone)]
pub struct CompileDetails {
    /// Total elapsed time.
    pub total: Duration,
    /// Time spent scanning and reading blocks.
    pub parse: Duration,
    /// Time spent building drafts.
    pub compile: Duration,
    pub blocks: Vec<BlockSummary>,
    pub skipped: Vec<SkippedBlock>,
}

/// Result from [`compile_triggers_verbose_with`].
#[derive(Debug, Clone)]
pub struct CompileResultVerbose {
    pub drafts: DraftCatalog,
    /// The parsed spec, kept for rank-based key plans.
    pub spec: TriggerSpec,
    pub details: CompileDetails,
}

/// Parse `text` and compile it against `mapping` with default [`Options`].
///
/// # Example
/// ```
/// use dee_schema::compile_triggers;
/// use std::collections::HashMap;
///
/// let text = "股东增持 = {\n 1: ['增持金额'],\n}\nTRIGGERS['all'] = ['增持金额', '增持的股东']\n";
/// let mapping = HashMap::from([("股东增持".to_string(), "EquityOverweight".to_string())]);
///
/// let catalog = compile_triggers(text, &mapping).unwrap().finalize_default().unwrap();
/// assert_eq!(catalog.event_type_fields_list()[0].identifier, "EquityOverweight");
/// ```
pub fn compile_triggers(text: &str, mapping: &EventTypeMap) -> Result<DraftCatalog> {
    compile_triggers_with(text, mapping, &Options::default())
}

/// Parse `text` with `options` and compile it against `mapping`.
pub fn compile_triggers_with(text: &str, mapping: &EventTypeMap, options: &Options) -> Result<DraftCatalog> {
    let spec = triggers::parse_trigger_spec(text, options.strict)?;
    compiler::compile(&spec, mapping)
}

/// Like [`compile_triggers_with`], also returning the parsed spec and
/// compact timing/diagnostic details.
pub fn compile_triggers_verbose_with(
    text: &str,
    mapping: &EventTypeMap,
    options: &Options,
) -> Result<CompileResultVerbose> {
    let started = Instant::now();
    let spec = triggers::parse_trigger_spec(text, options.strict)?;
    let parse = started.elapsed();

    let compile_started = Instant::now();
    let drafts = compiler::compile(&spec, mapping)?;
    let compile = compile_started.elapsed();

    let blocks = spec
        .blocks()
        .iter()
        .map(|b| BlockSummary {
            event_type: b.event_type.clone(),
            identifier: mapping.get(&b.event_type).cloned().unwrap_or_default(),
            line: b.line,
            fields: b.all_fields.len(),
            ranks: b.ranks.len(),
            issues: b.issues.labels(),
        })
        .collect();

    let details = CompileDetails { total: started.elapsed(), parse, compile, blocks, skipped: spec.skipped().to_vec() };

    Ok(CompileResultVerbose { drafts, spec, details })
}

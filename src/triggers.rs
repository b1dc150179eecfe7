//! Trigger-spec parsing.
//!
//! A trigger specification is externally authored text (usually generated by
//! a statistics script) that lists, per event type, which argument fields are
//! required at increasing levels of importance:
//!
//! ```text
//! 股东增持 = {
//!         1: ['增持金额'],  # importance: 0.96
//!         2: ['增持的股东', '增持金额'],  # importance: 0.98
//! }
//! TRIGGERS['all'] = ['增持金额', '增持的股东']
//! ```
//!
//! ## How the parts work together
//!
//! ```text
//! text ── scan (scan.rs) ──┬─ RawBlock ── read_ranks / check_ranks (ranks.rs) ──▶ TriggerBlock
//!                          └─ Skipped  ──▶ SkippedBlock (lenient) | Error::MalformedSpec (strict)
//! ```
//!
//! - `cursor.rs`: reads quoted strings, string lists, comments and braces.
//! - `scan.rs`: finds block boundaries and the `TRIGGERS['all']` list.
//! - `ranks.rs`: reads the ranked mapping and checks it against "all".
//!
//! Blocks are returned in text order. The ranked mapping is kept verbatim as
//! `ranked_source`; only the "all" list drives schema field order.

#[path = "triggers/cursor.rs"]
mod cursor;
#[path = "triggers/ranks.rs"]
mod ranks;
#[path = "triggers/scan.rs"]
mod scan;

pub use ranks::{Rank, RankIssues};
pub use scan::SkippedBlock;

use crate::error::{Error, Result};
use scan::{Scanned, line_of};
use tracing::{debug, warn};

/// One event type's entry in a trigger specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerBlock {
    /// Event-type name: the trimmed text before `=`.
    pub event_type: String,
    /// The `{ ... }` ranked mapping, verbatim.
    pub ranked_source: String,
    /// Ranked entries; empty when the mapping could not be read
    /// (see [`RankIssues::UNPARSED_RANKS`]).
    pub ranks: Vec<Rank>,
    /// The `TRIGGERS['all']` list, in written order.
    pub all_fields: Vec<String>,
    /// Non-fatal inconsistencies in the ranked mapping.
    pub issues: RankIssues,
    /// 1-based line of the block header.
    pub line: usize,
}

impl TriggerBlock {
    /// Field list of `rank`, if present.
    pub fn rank_fields(&self, rank: u32) -> Option<&[String]> {
        self.ranks.iter().find(|r| r.rank == rank).map(|r| r.fields.as_slice())
    }
}

/// Parsed trigger specification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerSpec {
    blocks: Vec<TriggerBlock>,
    skipped: Vec<SkippedBlock>,
}

impl TriggerSpec {
    /// Blocks in text order.
    pub fn blocks(&self) -> &[TriggerBlock] {
        &self.blocks
    }

    /// Segments the scanner could not read (lenient mode only).
    pub fn skipped(&self) -> &[SkippedBlock] {
        &self.skipped
    }

    /// Event-type names in text order (duplicates included).
    pub fn event_types(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(|b| b.event_type.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Record an unreadable block, or fail with it in strict mode.
    fn skip(&mut self, line: usize, reason: String, strict: bool) -> Result<()> {
        if strict {
            return Err(Error::malformed(line, reason));
        }
        warn!(line, reason = %reason, "skipping malformed trigger block");
        self.skipped.push(SkippedBlock { line, reason });
        Ok(())
    }
}

/// Parse trigger-spec `text`.
///
/// With `strict == false`, unreadable blocks are skipped and reported through
/// [`TriggerSpec::skipped`]. With `strict == true`, the first unreadable block
/// is an [`Error::MalformedSpec`]. A block whose ranked mapping names a field
/// missing from the "all" list counts as unreadable.
pub fn parse_trigger_spec(text: &str, strict: bool) -> Result<TriggerSpec> {
    let mut spec = TriggerSpec::default();

    for item in scan::scan(text) {
        match item {
            Scanned::Block(raw) => {
                let line = line_of(text, raw.offset);
                let ranks = ranks::read_ranks(raw.ranked_source);
                let issues = match ranks::check_ranks(ranks.as_deref(), &raw.all_fields) {
                    Ok(issues) => issues,
                    Err(reason) => {
                        spec.skip(line, reason, strict)?;
                        continue;
                    }
                };

                if !issues.is_empty() {
                    warn!(event_type = raw.event_type, line, issues = ?issues.labels(), "inconsistent ranked triggers");
                }
                debug!(event_type = raw.event_type, line, fields = raw.all_fields.len(), "parsed trigger block");

                spec.blocks.push(TriggerBlock {
                    event_type: raw.event_type.to_string(),
                    ranked_source: raw.ranked_source.to_string(),
                    ranks: ranks.unwrap_or_default(),
                    all_fields: raw.all_fields,
                    issues,
                    line,
                });
            }
            Scanned::Skipped { offset, reason } => spec.skip(line_of(text, offset), reason, strict)?,
        }
    }

    Ok(spec)
}

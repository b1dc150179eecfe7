//! Block scanner.
//!
//! Splits trigger-spec text into blocks of the form
//!
//! ```text
//! <event type> = {
//!         1: ['field', ...],  # importance: ...
//!         ...
//! }
//! TRIGGERS['all'] = ['field', ...]
//! ```
//!
//! The scanner walks the text once. At every block start it tries, in order:
//!
//! ```text
//! header   `<name> = {`          (anchored regex)
//! ranked   `{ ... }`             (Cursor::closing_brace, quote/comment aware)
//! all      `TRIGGERS['all'] =`   (anchored regex)
//! list     `[ ... ]`             (Cursor::string_list)
//! ```
//!
//! A step that fails makes the whole block a [`SkippedBlock`]; scanning then
//! resumes after the next blank line.

use super::cursor::Cursor;

/// A block as found in the text; ranks are read later.
#[derive(Debug, Clone)]
pub(crate) struct RawBlock<'a> {
    pub event_type: &'a str,
    pub ranked_source: &'a str,
    pub all_fields: Vec<String>,
    pub offset: usize,
}

/// A block the scanner could not read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBlock {
    /// 1-based line where the block starts.
    pub line: usize,
    pub reason: String,
}

/// Either a block or the reason the segment was skipped.
#[derive(Debug)]
pub(crate) enum Scanned<'a> {
    Block(RawBlock<'a>),
    Skipped { offset: usize, reason: String },
}

/// Scan `text` into blocks and skipped segments, in text order.
pub(crate) fn scan(text: &str) -> Vec<Scanned<'_>> {
    let mut out = Vec::new();
    let mut cur = Cursor::new(text, 0);

    loop {
        cur.skip_trivia();
        if cur.is_eof() {
            break;
        }

        let start = cur.pos();
        match scan_block(text, start) {
            Ok((block, end)) => {
                out.push(Scanned::Block(block));
                cur = Cursor::new(text, end);
            }
            Err(reason) => {
                out.push(Scanned::Skipped { offset: start, reason });
                cur = Cursor::new(text, resync(text, start));
            }
        }
    }

    out
}

fn scan_block(text: &str, start: usize) -> Result<(RawBlock<'_>, usize), String> {
    let rest = &text[start..];
    let header = regex!(r"\A([^=\n{}]+?)[ \t]*=[ \t]*\{").captures(rest).ok_or_else(|| describe_bad_header(rest))?;
    let event_type = header.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
    if event_type.is_empty() {
        return Err("empty event type name before '='".to_string());
    }

    let brace = start + header.get(0).map(|m| m.end()).unwrap_or_default() - 1;
    let close = Cursor::new(text, brace).closing_brace().ok_or_else(|| "unbalanced '{' in ranked block".to_string())?;
    let ranked_source = &text[brace..=close];

    let after = close + 1;
    let all_line = regex!(r#"\A\s*TRIGGERS[ \t]*\[[ \t]*['"]all['"][ \t]*\][ \t]*=[ \t]*"#)
        .find(&text[after..])
        .ok_or_else(|| "missing TRIGGERS['all'] line".to_string())?;

    let mut cur = Cursor::new(text, after + all_line.end());
    let all_fields = cur.string_list().map_err(|e| format!("bad TRIGGERS['all'] list: {e}"))?;

    Ok((RawBlock { event_type, ranked_source, all_fields, offset: start }, cur.pos()))
}

fn describe_bad_header(rest: &str) -> String {
    let line = rest.lines().next().unwrap_or_default().trim();
    if line.starts_with("TRIGGERS") {
        "TRIGGERS['all'] line without a preceding ranked block".to_string()
    } else if !line.contains('=') {
        format!("expected '<event type> = {{', found '{}'", preview(line))
    } else {
        format!("expected '{{' after '=' in '{}'", preview(line))
    }
}

fn preview(line: &str) -> String {
    line.chars().take(40).collect()
}

/// Offset just past the next blank line after `start`, or end of text.
fn resync(text: &str, start: usize) -> usize {
    regex!(r"\n[ \t]*\r?\n").find(&text[start..]).map(|m| start + m.end()).unwrap_or(text.len())
}

/// 1-based line number of byte `offset`.
pub(crate) fn line_of(text: &str, offset: usize) -> usize {
    text[..offset.min(text.len())].matches('\n').count() + 1
}

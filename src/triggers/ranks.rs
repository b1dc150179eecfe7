//! Ranked importance mapping (`{ 1: [...], 2: [...], ... }`).
//!
//! The ranked mapping is informational: schema field order comes from the
//! `TRIGGERS['all']` list alone. It is still read (leniently) so that the
//! parser can report authoring mistakes:
//!
//! - a ranked field that is missing from the "all" list makes the block
//!   malformed,
//! - everything else (non-increasing ranks, non-cumulative lists, fields that
//!   no rank mentions, text that cannot be read at all) is a [`RankIssues`]
//!   warning.

use super::cursor::Cursor;

/// One `<rank>: [<field>, ...],  # comment` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rank {
    pub rank: u32,
    pub fields: Vec<String>,
    /// Trailing `#` comment on the same line (e.g. `importance: 0.99`).
    pub comment: Option<String>,
}

bitflags::bitflags! {
    /// Non-fatal inconsistencies found in a ranked mapping.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RankIssues: u8 {
        /// Rank keys are not strictly increasing.
        const NON_INCREASING  = 1 << 0;
        /// A rank's field list does not contain the previous rank's fields.
        const NOT_CUMULATIVE  = 1 << 1;
        /// `TRIGGERS['all']` lists fields no rank mentions.
        const UNRANKED_FIELDS = 1 << 2;
        /// The ranked text could not be read; only kept verbatim.
        const UNPARSED_RANKS  = 1 << 3;
    }
}

impl RankIssues {
    /// Short names of the set flags, for logs and reports.
    pub fn labels(self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.contains(RankIssues::NON_INCREASING) {
            out.push("non-increasing ranks");
        }
        if self.contains(RankIssues::NOT_CUMULATIVE) {
            out.push("non-cumulative ranks");
        }
        if self.contains(RankIssues::UNRANKED_FIELDS) {
            out.push("unranked fields");
        }
        if self.contains(RankIssues::UNPARSED_RANKS) {
            out.push("unparsed ranks");
        }
        out
    }
}

/// Read the ranked mapping from its verbatim `{...}` text.
///
/// Returns `None` when the text is not a plain `int: [strings]` mapping.
pub(crate) fn read_ranks(source: &str) -> Option<Vec<Rank>> {
    let mut cur = Cursor::new(source, 0);
    if !cur.eat('{') {
        return None;
    }

    let mut ranks = Vec::new();
    loop {
        cur.skip_trivia();
        if cur.eat('}') {
            cur.skip_ws();
            return cur.is_eof().then_some(ranks);
        }

        let digits: String = cur.rest().chars().take_while(char::is_ascii_digit).collect();
        let rank: u32 = digits.parse().ok()?;
        cur.advance(digits.len());

        cur.skip_ws();
        if !cur.eat(':') {
            return None;
        }
        cur.skip_ws();
        let fields = cur.string_list().ok()?;

        cur.skip_inline_ws();
        let had_comma = cur.eat(',');
        cur.skip_inline_ws();
        let comment = if cur.peek() == Some('#') { Some(cur.line_comment().trim().to_string()) } else { None };

        ranks.push(Rank { rank, fields, comment });

        if !had_comma {
            cur.skip_trivia();
            if cur.peek() != Some('}') {
                return None;
            }
        }
    }
}

/// Check `ranks` against the "all" list.
///
/// `Err` carries the reason for the one fatal inconsistency: a ranked field
/// that `all_fields` does not contain.
pub(crate) fn check_ranks(ranks: Option<&[Rank]>, all_fields: &[String]) -> Result<RankIssues, String> {
    let Some(ranks) = ranks else {
        return Ok(RankIssues::UNPARSED_RANKS);
    };

    let mut issues = RankIssues::empty();

    for rank in ranks {
        if let Some(missing) = rank.fields.iter().find(|f| !all_fields.contains(f)) {
            return Err(format!("ranked field '{}' (rank {}) is missing from TRIGGERS['all']", missing, rank.rank));
        }
    }

    for pair in ranks.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        if cur.rank <= prev.rank {
            issues |= RankIssues::NON_INCREASING;
        }
        if !prev.fields.iter().all(|f| cur.fields.contains(f)) {
            issues |= RankIssues::NOT_CUMULATIVE;
        }
    }

    if !ranks.is_empty() && all_fields.iter().any(|f| !ranks.iter().any(|r| r.fields.contains(f))) {
        issues |= RankIssues::UNRANKED_FIELDS;
    }

    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    const FREEZE: &str = "{
        1: ['冻结金额'],  # importance: 0.8524822695035461
        2: ['冻结开始日期', '冻结金额'],  # importance: 0.9687943262411347
        3: ['冻结开始日期', '冻结金额', '被冻结股东'],  # importance: 0.9716312056737588
}";

    #[test]
    fn reads_ranks_with_comments() {
        let ranks = read_ranks(FREEZE).unwrap();
        assert_eq!(ranks.len(), 3);
        assert_eq!(ranks[0].rank, 1);
        assert_eq!(ranks[0].fields, strings(&["冻结金额"]));
        assert_eq!(ranks[2].fields.len(), 3);
        assert_eq!(ranks[1].comment.as_deref(), Some("importance: 0.9687943262411347"));
    }

    #[test]
    fn last_entry_may_omit_comma() {
        let ranks = read_ranks("{1: ['a'], 2: ['a', 'b']}").unwrap();
        assert_eq!(ranks.len(), 2);
        assert!(ranks.iter().all(|r| r.comment.is_none()));
    }

    #[test]
    fn unreadable_ranks_are_none() {
        assert_eq!(read_ranks("{one: ['a']}"), None);
        assert_eq!(read_ranks("{1 ['a']}"), None);
        assert_eq!(read_ranks("{1: ['a'] 2: ['b']}"), None);
        assert_eq!(check_ranks(None, &[]).unwrap(), RankIssues::UNPARSED_RANKS);
    }

    #[test]
    fn consistent_ranks_have_no_issues() {
        let ranks = read_ranks(FREEZE).unwrap();
        let all = strings(&["冻结金额", "冻结开始日期", "被冻结股东"]);
        assert_eq!(check_ranks(Some(&ranks), &all).unwrap(), RankIssues::empty());
    }

    #[test]
    fn ranked_field_missing_from_all_is_fatal() {
        let ranks = read_ranks(FREEZE).unwrap();
        let all = strings(&["冻结金额", "冻结开始日期"]);
        let reason = check_ranks(Some(&ranks), &all).unwrap_err();
        assert!(reason.contains("被冻结股东"));
        assert!(reason.contains("rank 3"));
    }

    #[test]
    fn warnings_are_collected() {
        let ranks = read_ranks("{2: ['a', 'b'], 1: ['c']}").unwrap();
        let all = strings(&["a", "b", "c", "d"]);
        let issues = check_ranks(Some(&ranks), &all).unwrap();
        assert!(issues.contains(RankIssues::NON_INCREASING));
        assert!(issues.contains(RankIssues::NOT_CUMULATIVE));
        assert!(issues.contains(RankIssues::UNRANKED_FIELDS));
        assert_eq!(issues.labels(), vec!["non-increasing ranks", "non-cumulative ranks", "unranked fields"]);
    }
}

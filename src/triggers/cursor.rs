//! Character cursor over trigger-spec text.
//!
//! The trigger text embeds Python-style literals: quoted strings (single or
//! double quotes, backslash escapes), string lists (`['a', "b",]`) and `#`
//! line comments. `Cursor` reads exactly those pieces and nothing more; it is
//! shared by the block scanner and the ranked-mapping reader.
//!
//! Positions are byte offsets into the full text so errors can be mapped back
//! to a line number.

/// Byte-offset cursor over `src`.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(src: &'a str, pos: usize) -> Self {
        Cursor { src, pos: pos.min(src.len()) }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    pub(crate) fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consume `c` if it is next.
    pub(crate) fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub(crate) fn advance(&mut self, bytes: usize) {
        self.pos = (self.pos + bytes).min(self.src.len());
    }

    pub(crate) fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Skip spaces/tabs without crossing a newline.
    pub(crate) fn skip_inline_ws(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace() && c != '\n') {
            self.bump();
        }
    }

    /// Skip whitespace and whole `#` comment lines.
    pub(crate) fn skip_trivia(&mut self) {
        loop {
            self.skip_ws();
            if self.peek() == Some('#') {
                self.line_comment();
            } else {
                break;
            }
        }
    }

    /// Consume a `#` comment up to (not including) the newline and return its
    /// text without the leading `#`.
    pub(crate) fn line_comment(&mut self) -> &'a str {
        debug_assert_eq!(self.peek(), Some('#'));
        let start = self.pos + 1;
        let end = self.rest().find('\n').map(|i| self.pos + i).unwrap_or(self.src.len());
        self.pos = end;
        &self.src[start.min(end)..end]
    }

    /// Read a quoted string starting at the cursor.
    pub(crate) fn quoted(&mut self) -> Result<String, String> {
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            Some(c) => return Err(format!("expected a quoted field name, found '{c}'")),
            None => return Err("expected a quoted field name, found end of input".to_string()),
        };
        self.bump();

        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err("unterminated quoted field name".to_string()),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c @ ('\\' | '\'' | '"')) => out.push(c),
                    Some(c) => {
                        out.push('\\');
                        out.push(c);
                    }
                    None => return Err("unterminated quoted field name".to_string()),
                },
                Some(c) => out.push(c),
            }
        }
    }

    /// Read a bracketed list of quoted strings (`[...]`), allowing a trailing
    /// comma and arbitrary whitespace.
    pub(crate) fn string_list(&mut self) -> Result<Vec<String>, String> {
        if !self.eat('[') {
            return Err("expected '[' to open a field list".to_string());
        }

        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(']') {
                return Ok(items);
            }
            items.push(self.quoted()?);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat(']') {
                return Ok(items);
            }
            return match self.peek() {
                Some(c) => Err(format!("expected ',' or ']' in field list, found '{c}'")),
                None => Err("unterminated field list".to_string()),
            };
        }
    }

    /// From an opening `{` at the cursor, find the byte offset of the matching
    /// `}`. Braces inside quotes and comments are ignored.
    pub(crate) fn closing_brace(&self) -> Option<usize> {
        let mut probe = self.clone();
        if !probe.eat('{') {
            return None;
        }

        let mut depth = 1usize;
        while let Some(c) = probe.peek() {
            match c {
                '\'' | '"' => {
                    probe.quoted().ok()?;
                    continue;
                }
                '#' => {
                    probe.line_comment();
                    continue;
                }
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(probe.pos);
                    }
                }
                _ => {}
            }
            probe.bump();
        }
        None
    }
}

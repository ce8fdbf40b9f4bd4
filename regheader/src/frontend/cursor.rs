use std::ops;

use crate::{
    error::{FormatError, ParseError, PositionalError},
    frontend::row::Row,
};

/// Forward-only position within the body of a register description
///
/// The cursor keeps indexes relative to the whole file so that errors can point at file lines.
pub(crate) struct Cursor<'a> {
    lines: &'a [&'a str],
    pos: usize,
    end: usize,
}

impl<'a> Cursor<'a> {
    /// Place a cursor at the start of `body` within `lines`
    pub(crate) fn new(lines: &'a [&'a str], body: ops::Range<usize>) -> Self {
        assert!(body.end <= lines.len(), "body must be within lines");
        Self {
            lines,
            pos: body.start,
            end: body.end,
        }
    }

    /// 1-based file line number of the current line
    pub(crate) const fn line_no(&self) -> usize {
        self.pos + 1
    }

    /// Text of the current line, None at the end of the body
    pub(crate) fn line(&self) -> Option<&'a str> {
        (self.pos < self.end).then(|| self.lines[self.pos])
    }

    /// Text of the line before the current one
    pub(crate) fn previous_line(&self) -> Option<&'a str> {
        self.pos.checked_sub(1).map(|idx| self.lines[idx])
    }

    /// Meaning of the current line
    pub(crate) fn peek(&self) -> Row<'a> {
        self.line().map_or(Row::EndOfBody, Row::classify)
    }

    /// Meaning of the line after the current one
    pub(crate) fn peek_next(&self) -> Row<'a> {
        if self.pos + 1 < self.end {
            Row::classify(self.lines[self.pos + 1])
        } else {
            Row::EndOfBody
        }
    }

    /// Lines from the current one to the end of the body
    pub(crate) fn remaining(&self) -> &'a [&'a str] {
        &self.lines[self.pos.min(self.end)..self.end]
    }

    pub(crate) fn advance(&mut self) {
        self.skip(1);
    }

    pub(crate) fn skip(&mut self, count: usize) {
        self.pos = (self.pos + count).min(self.end);
    }

    /// Report `make_err` for the current line, passing it the line text
    pub(crate) fn error(&self, make_err: fn(String) -> FormatError) -> PositionalError<ParseError> {
        self.error_at(0, make_err)
    }

    /// Report `make_err` for the line `ahead` lines after the current one
    pub(crate) fn error_at(
        &self,
        ahead: usize,
        make_err: fn(String) -> FormatError,
    ) -> PositionalError<ParseError> {
        let idx = self.pos + ahead;
        let text = if idx < self.end { self.lines[idx] } else { "" };
        make_err(text.to_owned()).at_line(idx + 1)
    }
}

#[test]
fn cursor_stays_within_body() {
    let lines = ["pre", "A", "", "B", "post"];
    let mut cursor = Cursor::new(&lines, 1..4);

    assert_eq!(cursor.line_no(), 2);
    assert_eq!(cursor.peek(), Row::Text("A"));
    assert_eq!(cursor.peek_next(), Row::Blank);
    cursor.skip(2);
    assert_eq!(cursor.remaining(), &["B"]);
    assert_eq!(cursor.peek_next(), Row::EndOfBody);
    cursor.skip(5);
    assert_eq!(cursor.line(), None);
    assert_eq!(cursor.peek(), Row::EndOfBody);
    assert_eq!(cursor.line_no(), 5);
}

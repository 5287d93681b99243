use std::iter::Enumerate;
use std::str::Lines;

use crate::error::{ParseError, ParseErrorKind};

/// A non-blank input line with its 1-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    pub number: usize,
    /// line as it appears in the input
    pub raw: &'a str,
    /// `raw` without surrounding whitespace
    pub text: &'a str,
}

impl<'a> Line<'a> {
    pub fn tokens(&self) -> impl Iterator<Item = &'a str> {
        self.text.split_whitespace()
    }

    pub fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.number, self.raw)
    }
}

/// Walks the input line by line, skipping blank separator lines.
pub(crate) struct LineReader<'a> {
    lines: Enumerate<Lines<'a>>,
    last_line: usize,
}

impl<'a> LineReader<'a> {
    pub fn new(text: &'a str) -> Self {
        LineReader {
            lines: text.lines().enumerate(),
            last_line: 0,
        }
    }

    /// Next non-blank line, or `None` at end of input.
    pub fn next_line(&mut self) -> Option<Line<'a>> {
        for (i, raw) in self.lines.by_ref() {
            self.last_line = i + 1;
            let text = raw.trim();
            if !text.is_empty() {
                return Some(Line {
                    number: i + 1,
                    raw,
                    text,
                });
            }
        }
        None
    }

    /// Like [`next_line`](Self::next_line) but running out of input is an error.
    pub fn expect_line(&mut self) -> Result<Line<'a>, ParseError> {
        self.next_line().ok_or_else(|| self.eof_error())
    }

    pub fn eof_error(&self) -> ParseError {
        ParseError::new(ParseErrorKind::UnexpectedEof, self.last_line, "")
    }
}

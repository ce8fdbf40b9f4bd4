use std::fmt;

use thiserror::Error;

use crate::frontend::{PREAMBLE, TRAILER};

/// Error that happened while reading the line structure of a register description
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("{0:?}: has trailing white space")]
    TrailingWhitespace(String),
    #[error("{0:?}: can not use tab for indenting")]
    TabIndent(String),
    #[error("two consecutive blank lines")]
    DoubleBlankLine,
    #[error("rst file must start with:\n{}", PREAMBLE.join("\n"))]
    MissingPreamble,
    #[error("rst file must end with:\n{TRAILER}")]
    MissingTrailer,
    #[error("{0:?}: register name format error\ncorrect is NAME[space](des,[space]0xXXXX_XXXX)[space]des_ex, followed by a '^' underline at least as long")]
    BadRegisterHeader(String),
    #[error("{0:?}: register table must start with a '.. list-table::' block with columns Bits, Description, Access, Reset, Value")]
    BadTableHeader(String),
    #[error("{0:?}: bit range format error\ncorrect is '   * - <high>[:<low>]', and the field table ends with the row holding bit 0")]
    BadBitRange(String),
    #[error("{0:?}: description format is error\ncorrect string is 'Reserved' or '**signal**[space]description'")]
    BadDescription(String),
    #[error("{0:?}: can not find any access flag\ncorrect flag is 'R/W|R|W1P|W1C|W1P/R|--'")]
    BadAccess(String),
    #[error("{0:?}: reset value is error\ncorrect eg: 0xA4. must be upper case and fit in 32 bits")]
    BadReset(String),
    #[error("{0:?}: type flag incorrect\ncorrect is 'U|S|--'")]
    BadType(String),
}

/// The fields of a register do not tile bits 31..0 exactly
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BitConflictError {
    #[error("bit conflict at {label} bit {bit}")]
    Bit { label: String, bit: u32 },
    #[error("bit conflict at {label} bit {high}:{low}")]
    Range { label: String, high: u32, low: u32 },
    #[error("{label} is not end with bit 31, bit {high}:{low} not covered")]
    Incomplete { label: String, high: u32, low: u32 },
}

/// A register offset breaks the alignment or ordering of its module
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OffsetAlignmentError {
    #[error("{label} address offset error: {offset:#x} is not a multiple of 4")]
    Misaligned { label: String, offset: u32 },
    #[error("{label} address offset error: {offset:#x} must be above the previous register at {previous:#x}")]
    NotIncreasing {
        label: String,
        offset: u32,
        previous: u32,
    },
}

/// Any fatal problem found in a register description
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("format error: {0}")]
    Format(#[from] FormatError),
    #[error("{0}")]
    BitConflict(#[from] BitConflictError),
    #[error("{0}")]
    OffsetAlignment(#[from] OffsetAlignmentError),
}

/// Representation of a file position in an error
///
/// Line numbers start from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Line { line: usize },
    MultiLine { start_line: usize, end_line: usize },
}

impl Position {
    /// First line covered by this position
    pub const fn line(&self) -> usize {
        match self {
            Self::Line { line } => *line,
            Self::MultiLine { start_line, .. } => *start_line,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Line { line } => write!(f, "{line}"),
            Position::MultiLine {
                start_line,
                end_line,
            } => write!(f, "{start_line}..{end_line}"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{pos}\n{err}")]
pub struct PositionalError<T> {
    pub(crate) pos: Position,
    pub(crate) err: T,
}

impl<T> PositionalError<T> {
    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn error(&self) -> &T {
        &self.err
    }

    pub(crate) fn with_fname(self, fname: String) -> ParseFileError
    where
        ParseError: From<T>,
    {
        ParseFileError {
            fname,
            err: PositionalError {
                pos: self.pos,
                err: self.err.into(),
            },
        }
    }
}

impl FormatError {
    /// Convert into positional error, adding the 1-based line number
    pub(crate) fn at_line(self, line: usize) -> PositionalError<ParseError> {
        PositionalError {
            pos: Position::Line { line },
            err: self.into(),
        }
    }
}

impl PositionalError<ParseError> {
    pub(crate) fn new(pos: Position, err: impl Into<ParseError>) -> Self {
        Self {
            pos,
            err: err.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("register table parse error --> {fname}:{err}")]
pub struct ParseFileError {
    fname: String,
    err: PositionalError<ParseError>,
}

impl ParseFileError {
    /// Name of the file the error was found in
    pub fn fname(&self) -> &str {
        &self.fname
    }

    pub fn position(&self) -> Position {
        self.err.pos
    }

    pub fn kind(&self) -> &ParseError {
        &self.err.err
    }
}

#[test]
fn positional_error_displays_file_and_line() {
    let err = FormatError::TabIndent("\tfoo".to_owned())
        .at_line(12)
        .with_fname("isp/registers.rst".to_owned());

    assert_eq!(err.position().line(), 12);
    assert!(err
        .to_string()
        .starts_with("register table parse error --> isp/registers.rst:12\n"));
    assert!(matches!(
        err.kind(),
        ParseError::Format(FormatError::TabIndent(_))
    ));
}

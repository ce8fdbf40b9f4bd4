//! Line-level checks shared by every register description: whitespace rules and the fixed frame
//! around the register tables.

use std::ops;

use crate::error::{FormatError, ParseError, PositionalError};

/// Lines every description must start with
pub(crate) const PREAMBLE: [&str; 6] = [
    ".. raw:: latex",
    "",
    r"   \setregistertablestyle",
    "",
    ".. tabularcolumns:: |K{1cm}|p{10cm}|K{1.2cm}|K{1cm}|K{1cm}|",
    "",
];

/// Last non-blank line of every description
pub(crate) const TRAILER: &str = ".. tabularcolumns:: |l|l|l|l|l|l|l|l|l|l|";

/// Split `text` into lines, rejecting trailing white space, tabs and doubled blank lines
///
/// Line terminators (`\n` or `\r\n`) are removed.
///
/// # Errors
///
/// The first offending line, with its 1-based line number
pub(crate) fn sanitize(text: &str) -> Result<Vec<&str>, PositionalError<ParseError>> {
    let mut lines = Vec::new();
    let mut prev_blank = false;
    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if line.ends_with([' ', '\t']) {
            return Err(FormatError::TrailingWhitespace(line.to_owned()).at_line(line_no));
        }
        if line.contains('\t') {
            return Err(FormatError::TabIndent(line.to_owned()).at_line(line_no));
        }
        let blank = line.is_empty();
        if blank && prev_blank {
            return Err(FormatError::DoubleBlankLine.at_line(line_no));
        }
        prev_blank = blank;
        lines.push(line);
    }
    Ok(lines)
}

/// Locate the body between the preamble and the trailer
///
/// Returns the range of `lines` holding register tables. Indexes are kept relative to the whole
/// file so that errors can report file line numbers.
///
/// # Errors
///
/// - The first lines are not [`PREAMBLE`]
/// - The last non-blank line is not [`TRAILER`]
pub(crate) fn extract_body(lines: &[&str]) -> Result<ops::Range<usize>, PositionalError<ParseError>> {
    if !lines.starts_with(&PREAMBLE) {
        let line_no = lines
            .iter()
            .zip(PREAMBLE)
            .position(|(line, expected)| *line != expected)
            .unwrap_or(lines.len())
            + 1;
        return Err(FormatError::MissingPreamble.at_line(line_no));
    }

    let trailer_idx = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .filter(|idx| *idx >= PREAMBLE.len() && lines[*idx] == TRAILER)
        .ok_or_else(|| FormatError::MissingTrailer.at_line(lines.len().max(1)))?;

    Ok(PREAMBLE.len()..trailer_idx)
}

#[cfg(test)]
fn kind(err: PositionalError<ParseError>) -> (usize, ParseError) {
    (err.position().line(), err.error().clone())
}

#[test]
fn sanitize_rejects_whitespace_rules() {
    assert_eq!(
        sanitize("a\nb \nc\n").map_err(kind),
        Err((
            2,
            ParseError::Format(FormatError::TrailingWhitespace("b ".to_owned()))
        ))
    );
    assert_eq!(
        sanitize("a\n\tb\n").map_err(kind),
        Err((2, ParseError::Format(FormatError::TabIndent("\tb".to_owned()))))
    );
    assert_eq!(
        sanitize("a\n\n\nb\n").map_err(kind),
        Err((3, ParseError::Format(FormatError::DoubleBlankLine)))
    );
    assert_eq!(sanitize("a\r\n\r\nb\n"), Ok(vec!["a", "", "b"]));
}

#[test]
fn extract_body_works() {
    let mut lines = PREAMBLE.to_vec();
    lines.extend(["body", "", TRAILER, ""]);
    assert_eq!(extract_body(&lines), Ok(6..8));

    let mut empty = PREAMBLE.to_vec();
    empty.push(TRAILER);
    assert_eq!(extract_body(&empty), Ok(6..6));
}

#[test]
fn extract_body_rejects_missing_frame() {
    let mut lines = PREAMBLE.to_vec();
    lines[2] = r"  \setregistertablestyle";
    lines.push(TRAILER);
    assert_eq!(
        extract_body(&lines).map_err(kind),
        Err((3, ParseError::Format(FormatError::MissingPreamble)))
    );

    let mut lines = PREAMBLE.to_vec();
    lines.extend(["body", ""]);
    assert_eq!(
        extract_body(&lines).map_err(kind),
        Err((8, ParseError::Format(FormatError::MissingTrailer)))
    );

    assert_eq!(
        extract_body(&PREAMBLE).map_err(kind),
        Err((6, ParseError::Format(FormatError::MissingTrailer)))
    );
}

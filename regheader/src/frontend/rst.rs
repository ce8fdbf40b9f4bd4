//! Register table parser
//!
//! Walks the body of a description one line at a time. Each register is read in four steps:
//!
//! 1. register header line and its `^` underline
//! 2. table header block, short or long variant
//! 3. field rows, from the most significant field down to the field containing bit 0
//! 4. free text up to the next register header
//!
//! Anything that does not fit the expected step is an error; nothing is skipped or repaired
//! except prose in front of a register header.

use log::debug;

use crate::{
    error::{FormatError, ParseError, Position, PositionalError},
    frontend::{
        cursor::Cursor,
        row::{Row, LIST_TABLE},
    },
    model::{Access, Field, Module, Register, RegisterHeader, ResetValue, TableStyle, ValueType},
};

const SHORT_TABLE_HEADER: [&str; 8] = [
    LIST_TABLE,
    "   :header-rows: 1",
    "",
    "   * - Bits",
    "     - Description",
    "     - Access",
    "     - Reset",
    "     - Value",
];

const LONG_TABLE_HEADER: [&str; 9] = [
    LIST_TABLE,
    "   :header-rows: 1",
    "   :class: longtable",
    "",
    "   * - Bits",
    "     - Description",
    "     - Access",
    "     - Reset",
    "     - Value",
];

/// Lines of the table header block for `style`
pub(crate) const fn table_header(style: TableStyle) -> &'static [&'static str] {
    match style {
        TableStyle::Short => &SHORT_TABLE_HEADER,
        TableStyle::Long => &LONG_TABLE_HEADER,
    }
}

type ParseResult<T> = Result<T, PositionalError<ParseError>>;

/// Parse every register from the cursor position to the end of the body into `module`
pub(crate) fn parse_registers(cursor: &mut Cursor, module: &mut Module) -> ParseResult<()> {
    while let Some((header, header_line)) = seek_register_header(cursor)? {
        let table = match_table_header(cursor)?;
        let fields = parse_fields(cursor)?;
        let fields_end_line = cursor.line_no() - 1;
        let description_end = parse_description_end(cursor)?;

        let label = header.label();
        let register = Register::new(header, fields, Some(description_end), table).map_err(|e| {
            PositionalError::new(
                Position::MultiLine {
                    start_line: header_line,
                    end_line: fields_end_line,
                },
                e,
            )
        })?;
        debug!(
            "line {header_line}: parsed register {label} with {} fields",
            register.fields().len()
        );
        module
            .push(register)
            .map_err(|e| PositionalError::new(Position::Line { line: header_line }, e))?;
    }
    Ok(())
}

/// Move past the next register header and its underline
///
/// Returns the header and its line number, or None if the body has no more registers.
fn seek_register_header(cursor: &mut Cursor) -> ParseResult<Option<(RegisterHeader, usize)>> {
    loop {
        match cursor.peek() {
            Row::EndOfBody => return Ok(None),
            Row::RegisterHeader(header) => {
                let header_line = cursor.line_no();
                let header_len = cursor.line().map_or(0, |line| line.chars().count());
                return match cursor.peek_next() {
                    Row::Underline(len) if len >= header_len => {
                        cursor.skip(2);
                        Ok(Some((header, header_line)))
                    }
                    _ => Err(cursor.error(FormatError::BadRegisterHeader)),
                };
            }
            // Underlined, but the line above is not a valid register header
            Row::Underline(_) => {
                let text = cursor.previous_line().unwrap_or_default();
                return Err(
                    FormatError::BadRegisterHeader(text.to_owned()).at_line(cursor.line_no() - 1)
                );
            }
            _ => cursor.advance(),
        }
    }
}

/// Move past a table header block, returning which variant it was
fn match_table_header(cursor: &mut Cursor) -> ParseResult<TableStyle> {
    if cursor.peek() == Row::Blank {
        cursor.advance();
    }
    if cursor.peek() != Row::TableHeader {
        return Err(cursor.error(FormatError::BadTableHeader));
    }

    let remaining = cursor.remaining();
    // The third line tells the variants apart
    let style = if remaining.get(2) == Some(&LONG_TABLE_HEADER[2]) {
        TableStyle::Long
    } else {
        TableStyle::Short
    };
    let expected = table_header(style);
    if let Some(mismatch) = (0..expected.len()).find(|i| remaining.get(*i) != Some(&expected[*i]))
    {
        return Err(cursor.error_at(mismatch, FormatError::BadTableHeader));
    }

    cursor.skip(expected.len());
    Ok(style)
}

/// Parse field rows until the field containing bit 0 has been read
fn parse_fields(cursor: &mut Cursor) -> ParseResult<Vec<Field>> {
    let mut fields = vec![];
    loop {
        let field = parse_field(cursor)?;
        let low = field.bits().low;
        fields.push(field);
        if low == 0 {
            return Ok(fields);
        }
    }
}

fn parse_field(cursor: &mut Cursor) -> ParseResult<Field> {
    while cursor.peek() == Row::Blank {
        cursor.advance();
    }
    let Row::BitRange(bits) = cursor.peek() else {
        return Err(cursor.error(FormatError::BadBitRange));
    };
    cursor.advance();

    let name_and_description = match cursor.peek() {
        Row::ReservedMarker => {
            cursor.advance();
            None
        }
        Row::NamedDescription { name, text } => {
            cursor.advance();
            Some((name, parse_description(cursor, text)))
        }
        _ => return Err(cursor.error(FormatError::BadDescription)),
    };

    let access = expect_token(cursor, FormatError::BadAccess, |row| match row {
        Row::Access(access) => Some(access),
        Row::ReservedToken => Some(Access::Reserved),
        _ => None,
    })?;
    let reset = expect_token(cursor, FormatError::BadReset, |row| match row {
        Row::Reset(reset) => Some(reset),
        Row::ReservedToken => Some(ResetValue::Reserved),
        _ => None,
    })?;
    let value_type = expect_token(cursor, FormatError::BadType, |row| match row {
        Row::Type(value_type) => Some(value_type),
        Row::ReservedToken => Some(ValueType::Reserved),
        _ => None,
    })?;

    Ok(match name_and_description {
        Some((name, description)) => {
            Field::new(bits, name, description, access, reset, value_type)
        }
        // Whatever tokens were given for reserved bits, they are reserved
        None => Field::reserved(bits),
    })
}

/// Read a token row, moving past it if `pick` accepts it
fn expect_token<T>(
    cursor: &mut Cursor,
    make_err: fn(String) -> FormatError,
    pick: impl FnOnce(Row) -> Option<T>,
) -> ParseResult<T> {
    let value = pick(cursor.peek()).ok_or_else(|| cursor.error(make_err))?;
    cursor.advance();
    Ok(value)
}

/// Collect continuation lines of a field description
///
/// Continuations are joined with a space, or with `\n` when a blank line precedes them.
fn parse_description(cursor: &mut Cursor, first: &str) -> String {
    let mut description = first.to_owned();
    let mut after_blank = false;
    loop {
        match cursor.peek() {
            Row::Continuation(text) => {
                description.push(if after_blank { '\n' } else { ' ' });
                description.push_str(text);
                after_blank = false;
            }
            Row::Blank => after_blank = true,
            _ => break,
        }
        cursor.advance();
    }
    description
}

/// Collect free text up to the next register header or the end of the body
///
/// Lines are joined with a space; a blank line starts a new paragraph, separated by `\n\n`.
///
/// # Errors
///
/// A bit range row, i.e., another field row after the one holding bit 0
fn parse_description_end(cursor: &mut Cursor) -> ParseResult<String> {
    let mut description = String::new();
    let mut after_blank = false;
    loop {
        match cursor.peek() {
            Row::EndOfBody | Row::RegisterHeader(_) | Row::Underline(_) => break,
            Row::BitRange(_) => return Err(cursor.error(FormatError::BadBitRange)),
            Row::Blank => after_blank = true,
            _ => {
                if !description.is_empty() {
                    description.push_str(if after_blank { "\n\n" } else { " " });
                }
                description.push_str(cursor.line().unwrap_or_default());
                after_blank = false;
            }
        }
        cursor.advance();
    }
    Ok(description.trim_start().to_owned())
}

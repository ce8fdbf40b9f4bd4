//! Reads register descriptions written as reStructuredText list tables

mod cursor;
mod lines;
mod row;
mod rst;

pub(crate) use lines::{PREAMBLE, TRAILER};
pub(crate) use rst::table_header;

use crate::{
    error::{ParseError, ParseFileError, PositionalError},
    model::Module,
};

/// Parse the description `text` of module `name`
///
/// `fname` identifies the source in errors.
///
/// # Errors
///
/// Any deviation from the description format, bit layout or offset rules
pub(crate) fn parse_module(name: &str, fname: &str, text: &str) -> Result<Module, ParseFileError> {
    parse(name, text).map_err(|err| err.with_fname(fname.to_owned()))
}

fn parse(name: &str, text: &str) -> Result<Module, PositionalError<ParseError>> {
    let lines = lines::sanitize(text)?;
    let body = lines::extract_body(&lines)?;

    let mut module = Module::new(name);
    let mut cursor = cursor::Cursor::new(&lines, body);
    rst::parse_registers(&mut cursor, &mut module)?;
    Ok(module)
}

/// Wrap `body` into the preamble and trailer of a description
#[cfg(test)]
pub(crate) fn describe(body: &str) -> String {
    format!("{}\n{body}{TRAILER}\n", PREAMBLE.join("\n"))
}

#[cfg(test)]
fn parse_err(body: &str) -> (usize, ParseError) {
    let err = parse("test", &describe(body)).unwrap_err();
    (err.position().line(), err.error().clone())
}

#[cfg(test)]
use crate::{
    error::{BitConflictError, FormatError, OffsetAlignmentError},
    model::{Access, BitRange, FieldName, ResetValue, TableStyle, ValueType},
};
#[cfg(test)]
use indoc::indoc;

#[test]
fn parse_single_register() {
    let module = parse(
        "isp",
        &describe(indoc! {"
            FOO (ctrl, 0x0000_0000)
            ^^^^^^^^^^^^^^^^^^^^^^^

            .. list-table::
               :header-rows: 1

               * - Bits
                 - Description
                 - Access
                 - Reset
                 - Value
               * - 31:1
                 - **EN** enable
                 - R/W
                 - 0x0
                 - U
               * - 0
                 - Reserved
                 - --
                 - --
                 - --

        "}),
    )
    .unwrap();

    assert_eq!(module.name(), "isp");
    assert_eq!(module.len(), 1);
    let reg = &module[0];
    assert_eq!(reg.name(), "foo");
    assert_eq!(reg.offset(), 0);
    assert_eq!(reg.label(), "FOO (ctrl, 0x0000_0000)");
    assert_eq!(reg.table_style(), TableStyle::Short);
    assert_eq!(reg.description_end(), None);

    let fields = reg.fields();
    assert_eq!(fields.len(), 2);
    assert!(fields[0].is_reserved());
    assert_eq!(fields[0].bits(), BitRange::single(0));
    assert_eq!(fields[1].name(), &FieldName::Named("EN".to_owned()));
    assert_eq!(fields[1].description(), "enable");
    assert_eq!(fields[1].access(), Access::ReadWrite);
    assert_eq!(fields[1].reset(), ResetValue::Value(0));
    assert_eq!(fields[1].value_type(), ValueType::Unsigned);
}

#[test]
fn parse_descriptions_and_long_table() {
    let module = parse(
        "isp",
        &describe(indoc! {"
            Leading prose is ignored.

            ISP_CTRL (control, 0x0000_0004) shadowed
            ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^
            .. list-table::
               :header-rows: 1
               :class: longtable

               * - Bits
                 - Description
                 - Access
                 - Reset
                 - Value
               * - 31:8
                 - **LEVEL** signed level
                   which continues here

                   and has a second paragraph
                 - R
                 - 0x0FF
                 - S
               * - 7:0
                 - Reserved
                 - R/W
                 - 0x1
                 - U

            First paragraph
               continues.

            Second paragraph.

            ISP_STAT (status, 0x0000_000C)
            ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^

            .. list-table::
               :header-rows: 1

               * - Bits
                 - Description
                 - Access
                 - Reset
                 - Value
               * - 31:0
                 - **ALL** everything
                 - W1C
                 - 0xDEADBEEF
                 - U
        "}),
    )
    .unwrap();

    assert_eq!(module.len(), 2);
    let ctrl = &module[0];
    assert_eq!(ctrl.table_style(), TableStyle::Long);
    assert_eq!(ctrl.description_ex(), Some("shadowed"));
    assert_eq!(
        ctrl.description_end(),
        Some("First paragraph    continues.\n\nSecond paragraph.")
    );
    let level = &ctrl.fields()[1];
    assert_eq!(
        level.description(),
        "signed level which continues here\nand has a second paragraph"
    );
    assert_eq!(level.reset().to_string(), "0xFF");
    assert_eq!(level.value_type(), ValueType::Signed);
    // Reserved bits ignore the tokens given in the table
    assert_eq!(ctrl.fields()[0].access(), Access::Reserved);
    assert_eq!(ctrl.fields()[0].reset(), ResetValue::Reserved);

    let stat = &module[1];
    assert_eq!(stat.offset(), 0xc);
    assert_eq!(stat.fields()[0].reset(), ResetValue::Value(0xdead_beef));
}

#[test]
fn parse_empty_body() {
    let module = parse("empty", &describe("Only prose.\n\n")).unwrap();
    assert!(module.is_empty());
}

#[test]
fn parse_rejects_bad_register_header() {
    // Underline too short
    assert_eq!(
        parse_err("FOO (ctrl, 0x0000_0000)\n^^^^\n"),
        (
            7,
            ParseError::Format(FormatError::BadRegisterHeader("FOO (ctrl, 0x0000_0000)".to_owned()))
        )
    );
    // Underline without a valid header above it
    assert_eq!(
        parse_err("Foo (ctrl, 0x0000_0000)\n^^^^^^^^^^^^^^^^^^^^^^^\n"),
        (
            7,
            ParseError::Format(FormatError::BadRegisterHeader("Foo (ctrl, 0x0000_0000)".to_owned()))
        )
    );
}

#[cfg(test)]
const FOO_HEAD: &str = indoc! {"
    FOO (ctrl, 0x0000_0000)
    ^^^^^^^^^^^^^^^^^^^^^^^

    .. list-table::
       :header-rows: 1

       * - Bits
         - Description
         - Access
         - Reset
         - Value
"};

#[test]
fn parse_rejects_bad_table_header() {
    let body = indoc! {"
        FOO (ctrl, 0x0000_0000)
        ^^^^^^^^^^^^^^^^^^^^^^^

        .. list-table::
           :header-rows: 1

           * - Bits
             - Description
             - Access
             - Value
    "};
    assert_eq!(
        parse_err(body),
        (
            16,
            ParseError::Format(FormatError::BadTableHeader("     - Value".to_owned()))
        )
    );
    assert_eq!(
        parse_err("FOO (ctrl, 0x0000_0000)\n^^^^^^^^^^^^^^^^^^^^^^^\n\nprose\n"),
        (10, ParseError::Format(FormatError::BadTableHeader("prose".to_owned())))
    );
}

#[test]
fn parse_rejects_bad_field_rows() {
    let field = |rows: &str| format!("{FOO_HEAD}{rows}");

    assert_eq!(
        parse_err(&field("   * - 31:0\n     - EN enable\n     - R\n     - 0x0\n     - U\n")),
        (
            19,
            ParseError::Format(FormatError::BadDescription("     - EN enable".to_owned()))
        )
    );
    assert_eq!(
        parse_err(&field("   * - 31:0\n     - **EN** enable\n     - RW\n     - 0x0\n     - U\n")),
        (20, ParseError::Format(FormatError::BadAccess("     - RW".to_owned())))
    );
    assert_eq!(
        parse_err(&field("   * - 31:0\n     - **EN** enable\n     - R\n     - 0xa4\n     - U\n")),
        (21, ParseError::Format(FormatError::BadReset("     - 0xa4".to_owned())))
    );
    assert_eq!(
        parse_err(&field("   * - 31:0\n     - **EN** enable\n     - R\n     - 0x0\n     - X\n")),
        (22, ParseError::Format(FormatError::BadType("     - X".to_owned())))
    );
    // Field list ends before bit 0 was reached
    assert_eq!(
        parse_err(&field("   * - 31:1\n     - **EN** enable\n     - R\n     - 0x0\n     - U\n")),
        (23, ParseError::Format(FormatError::BadBitRange(String::new())))
    );
}

/// Lines of one field row
#[cfg(test)]
fn field_row(bits: &str, description: &str) -> String {
    format!("   * - {bits}\n     - {description}\n     - R\n     - 0x0\n     - U\n")
}

#[test]
fn parse_rejects_overlapping_fields() {
    let body = [
        FOO_HEAD.to_owned(),
        field_row("31:8", "Reserved"),
        field_row("7:4", "**A** first"),
        field_row("7:4", "**B** second"),
        field_row("3:0", "**C** third"),
    ]
    .concat();
    let (line, err) = parse_err(&body);
    assert_eq!(line, 7);
    assert_eq!(
        err,
        ParseError::BitConflict(BitConflictError::Range {
            label: "FOO (ctrl, 0x0000_0000)".to_owned(),
            high: 7,
            low: 4
        })
    );
    assert!(err.to_string().contains("bit 7:4"));
}

#[test]
fn parse_rejects_field_rows_after_bit_zero() {
    let body = [
        FOO_HEAD.to_owned(),
        field_row("31:1", "**EN** enable"),
        field_row("0", "Reserved"),
        "\n".to_owned(),
        field_row("0", "**GO** start"),
    ]
    .concat();
    assert_eq!(
        parse_err(&body),
        (
            29,
            ParseError::Format(FormatError::BadBitRange("   * - 0".to_owned()))
        )
    );
}

#[test]
fn parse_rejects_offset_order() {
    let register = |name: &str, offset: &str| {
        let header = format!("{name} (reg, 0x{offset})");
        format!(
            "{header}\n{}\n{}",
            "^".repeat(header.len()),
            indoc! {"

                .. list-table::
                   :header-rows: 1

                   * - Bits
                     - Description
                     - Access
                     - Reset
                     - Value
                   * - 31:0
                     - Reserved
                     - --
                     - --
                     - --

            "}
        )
    };

    let body = [
        register("A", "0000_0000"),
        register("B", "0000_0004"),
        register("C", "0000_0004"),
    ]
    .concat();
    assert_eq!(
        parse_err(&body),
        (
            41,
            ParseError::OffsetAlignment(OffsetAlignmentError::NotIncreasing {
                label: "C (reg, 0x0000_0004)".to_owned(),
                offset: 4,
                previous: 4
            })
        )
    );

    let body = [register("A", "0000_0000"), register("B", "0000_0006")].concat();
    let (_, err) = parse_err(&body);
    assert!(matches!(
        err,
        ParseError::OffsetAlignment(OffsetAlignmentError::Misaligned { offset: 6, .. })
    ));

    // Nothing fits after the last word of the address space
    let body = [register("AA", "FFFF_FFFC"), register("BB", "0000_0000")].concat();
    let (_, err) = parse_err(&body);
    assert_eq!(
        err,
        ParseError::OffsetAlignment(OffsetAlignmentError::NotIncreasing {
            label: "BB (reg, 0x0000_0000)".to_owned(),
            offset: 0,
            previous: 0xffff_fffc
        })
    );
}

#[test]
fn parse_module_reports_file_name() {
    let err = parse_module("isp", "isp/registers.rst", "not a description\n").unwrap_err();
    assert_eq!(err.fname(), "isp/registers.rst");
    assert_eq!(err.position().line(), 1);
    assert_eq!(err.kind(), &ParseError::Format(FormatError::MissingPreamble));
}

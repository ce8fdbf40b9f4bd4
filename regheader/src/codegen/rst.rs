//! Render a module back into its canonical register description

use std::fmt;

use crate::{
    frontend::{table_header, PREAMBLE, TRAILER},
    model::{Field, FieldName, Module, Register},
};

/// Canonical description of a module
///
/// Parsing the rendered text yields the same module.
pub(crate) struct RstModule<'a>(pub(crate) &'a Module);

impl fmt::Display for RstModule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in PREAMBLE {
            writeln!(f, "{line}")?;
        }
        for reg in self.0.iter() {
            write_register(f, reg)?;
        }
        writeln!(f, "{TRAILER}")
    }
}

fn write_register(f: &mut fmt::Formatter<'_>, reg: &Register) -> fmt::Result {
    let label = reg.label();
    writeln!(f, "{label}")?;
    writeln!(f, "{}", "^".repeat(label.chars().count()))?;
    writeln!(f)?;
    for line in table_header(reg.table_style()) {
        writeln!(f, "{line}")?;
    }
    // Most significant field first
    for field in reg.fields().iter().rev() {
        write_field(f, field)?;
    }
    writeln!(f)?;
    if let Some(description_end) = reg.description_end() {
        writeln!(f, "{description_end}")?;
        writeln!(f)?;
    }
    Ok(())
}

fn write_field(f: &mut fmt::Formatter<'_>, field: &Field) -> fmt::Result {
    writeln!(f, "   * - {}", field.bits())?;
    match field.name() {
        FieldName::Reserved => writeln!(f, "     - {}", field.description())?,
        FieldName::Named(name) => writeln!(
            f,
            "     - **{name}** {}",
            field.description().replace('\n', "\n\n       ")
        )?,
    }
    writeln!(f, "     - {}", field.access())?;
    writeln!(f, "     - {}", field.reset())?;
    writeln!(f, "     - {}", field.value_type())
}

#[cfg(test)]
use crate::frontend::{describe, parse_module};
#[cfg(test)]
use indoc::indoc;

#[test]
fn rendered_description_parses_back() {
    let canonical = describe(indoc! {"
        ISP_CTRL (control, 0x0000_0004) shadowed
        ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^

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

               second paragraph
             - R
             - 0xFF
             - S
           * - 7:1
             - Reserved
             - --
             - --
             - --
           * - 0
             - **GO** start
             - W1P
             - 0x0
             - U

        First paragraph.

        Second paragraph.

        ISP_STAT (status, 0x0000_0010)
        ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^

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

    "});

    let module = parse_module("isp", "isp.rst", &canonical).unwrap();
    let rendered = RstModule(&module).to_string();
    assert_eq!(rendered, canonical);
    assert_eq!(parse_module("isp", "isp.rst", &rendered), Ok(module));
}

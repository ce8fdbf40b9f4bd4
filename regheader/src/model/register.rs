//! `Register` is the main primitive of the model. It represents one 32-bit register parsed from a
//! register table, with its fields validated to cover every bit exactly once.

use itertools::Itertools;

use crate::{
    error::BitConflictError,
    model::{BitRange, Field},
};

/// Number of bits in every register
pub const REGISTER_BITS: u32 = 32;

/// Which of the two accepted table header blocks introduced the field rows
///
/// Only affects how the register is rendered back into a description.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TableStyle {
    #[default]
    Short,
    /// Table marked with `:class: longtable`, allowed to break across pages
    Long,
}

/// Register header line, e.g., `CTRL_EN (control, 0x0000_0004) extra`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterHeader {
    pub name: String,
    pub description: String,
    pub offset: u32,
    pub description_ex: Option<String>,
}

impl RegisterHeader {
    /// Human-readable label used in error messages, e.g., `FOO (ctrl, 0x0000_0004)`
    pub fn label(&self) -> String {
        let base = format!(
            "{} ({}, 0x{:04X}_{:04X})",
            self.name.to_uppercase(),
            self.description,
            self.offset >> 16,
            self.offset & 0xffff
        );
        match &self.description_ex {
            Some(ex) => format!("{base} {ex}"),
            None => base,
        }
    }
}

/// Represents a single 32-bit register.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Register {
    /// Lower case register name
    name: String,
    description: String,
    description_ex: Option<String>,
    /// Byte offset from the start of the module
    offset: u32,
    /// Sorted by ascending low bit
    fields: Vec<Field>,
    /// Free text following the field table; paragraphs separated by a blank line
    description_end: Option<String>,
    table: TableStyle,
}

impl Register {
    /// Validate `fields` and build a register out of them
    ///
    /// # Errors
    ///
    /// The fields leave a bit uncovered or cover a bit twice
    pub fn new(
        header: RegisterHeader,
        mut fields: Vec<Field>,
        description_end: Option<String>,
        table: TableStyle,
    ) -> Result<Self, BitConflictError> {
        check_bits(&fields, &header.label())?;
        fields.sort_by_key(|f| f.bits.low);
        Ok(Self {
            name: header.name.to_lowercase(),
            description: header.description,
            description_ex: header.description_ex,
            offset: header.offset,
            fields,
            description_end: description_end.filter(|d| !d.is_empty()),
            table,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn description_ex(&self) -> Option<&str> {
        self.description_ex.as_deref()
    }

    pub fn description_end(&self) -> Option<&str> {
        self.description_end.as_deref()
    }

    pub const fn offset(&self) -> u32 {
        self.offset
    }

    /// Fields in ascending bit order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub const fn table_style(&self) -> TableStyle {
        self.table
    }

    /// Get register's label, as used in the header line of the description
    pub fn label(&self) -> String {
        RegisterHeader {
            name: self.name.clone(),
            description: self.description.clone(),
            offset: self.offset,
            description_ex: self.description_ex.clone(),
        }
        .label()
    }
}

/// Check that `fields` tile bits 31..0 without gaps or overlap
///
/// The order of `fields` does not matter.
///
/// # Errors
///
/// Returns the first offending field in ascending bit order, or the uncovered high bits if the
/// fields stop short of bit 31.
pub fn check_bits(fields: &[Field], label: &str) -> Result<(), BitConflictError> {
    let conflict = |bits: BitRange| {
        if bits.is_single() {
            BitConflictError::Bit {
                label: label.to_owned(),
                bit: bits.high,
            }
        } else {
            BitConflictError::Range {
                label: label.to_owned(),
                high: bits.high,
                low: bits.low,
            }
        }
    };

    let mut next_low = 0;
    for bits in fields.iter().map(|f| f.bits).sorted_by_key(|b| b.low) {
        if bits.low != next_low {
            return Err(conflict(bits));
        }
        if bits.high < bits.low || bits.high >= REGISTER_BITS {
            return Err(BitConflictError::Range {
                label: label.to_owned(),
                high: bits.high,
                low: bits.low,
            });
        }
        next_low = bits.high + 1;
    }

    if next_low != REGISTER_BITS {
        return Err(BitConflictError::Incomplete {
            label: label.to_owned(),
            high: REGISTER_BITS - 1,
            low: next_low,
        });
    }
    Ok(())
}

#[cfg(test)]
fn named(high: u32, low: u32) -> Field {
    use crate::model::{Access, ResetValue, ValueType};
    Field::new(
        BitRange::new(high, low),
        "F",
        "field",
        Access::ReadWrite,
        ResetValue::Value(0),
        ValueType::Unsigned,
    )
}

#[test]
fn check_bits_accepts_full_cover_in_any_order() {
    let fields = vec![
        named(31, 16),
        Field::reserved(BitRange::single(0)),
        named(15, 1),
    ];
    assert_eq!(check_bits(&fields, "R"), Ok(()));
    assert_eq!(check_bits(&[named(31, 0)], "R"), Ok(()));
}

#[test]
fn check_bits_names_offending_bits() {
    // Gap at bit 8
    assert_eq!(
        check_bits(&[named(31, 9), named(7, 0)], "R"),
        Err(BitConflictError::Range {
            label: "R".to_owned(),
            high: 31,
            low: 9
        })
    );
    // Overlap on a single bit
    assert_eq!(
        check_bits(&[named(31, 5), named(4, 4), named(4, 4), named(3, 0)], "R"),
        Err(BitConflictError::Bit {
            label: "R".to_owned(),
            bit: 4
        })
    );
    // Overlapping ranges
    assert_eq!(
        check_bits(&[named(31, 8), named(7, 4), named(7, 4), named(3, 0)], "R"),
        Err(BitConflictError::Range {
            label: "R".to_owned(),
            high: 7,
            low: 4
        })
    );
    // Missing bit 0
    assert_eq!(
        check_bits(&[named(31, 1)], "R"),
        Err(BitConflictError::Range {
            label: "R".to_owned(),
            high: 31,
            low: 1
        })
    );
    // Missing bit 31
    assert_eq!(
        check_bits(&[named(30, 0)], "R"),
        Err(BitConflictError::Incomplete {
            label: "R".to_owned(),
            high: 31,
            low: 31
        })
    );
    // Beyond bit 31
    assert_eq!(
        check_bits(&[named(32, 0)], "R"),
        Err(BitConflictError::Range {
            label: "R".to_owned(),
            high: 32,
            low: 0
        })
    );
    // Inverted range
    assert_eq!(
        check_bits(&[named(31, 8), named(0, 7), named(6, 0)], "R"),
        Err(BitConflictError::Range {
            label: "R".to_owned(),
            high: 0,
            low: 7
        })
    );
}

#[test]
fn register_sorts_fields_and_lowercases_name() {
    let header = RegisterHeader {
        name: "ISP_CTRL".to_owned(),
        description: "control".to_owned(),
        offset: 0x1_0004,
        description_ex: Some("(shadowed)".to_owned()),
    };
    assert_eq!(header.label(), "ISP_CTRL (control, 0x0001_0004) (shadowed)");

    let reg = Register::new(
        header,
        vec![named(31, 1), Field::reserved(BitRange::single(0))],
        Some(String::new()),
        TableStyle::Short,
    )
    .unwrap();
    assert_eq!(reg.name(), "isp_ctrl");
    assert_eq!(reg.fields()[0].bits(), BitRange::single(0));
    assert_eq!(reg.description_end(), None);
    assert_eq!(reg.label(), "ISP_CTRL (control, 0x0001_0004) (shadowed)");
}

//! `Field` is a contiguous bit range of a register together with its access, reset and type
//! metadata.

use std::{fmt, str};

use strum::{Display, EnumString};

use crate::error::FormatError;

/// Inclusive bit range `high:low` within a 32-bit register
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitRange {
    pub high: u32,
    pub low: u32,
}

impl BitRange {
    pub const fn new(high: u32, low: u32) -> Self {
        Self { high, low }
    }

    /// A range covering exactly one bit
    pub const fn single(bit: u32) -> Self {
        Self::new(bit, bit)
    }

    pub const fn is_single(&self) -> bool {
        self.high == self.low
    }

    /// Number of bits covered by the range
    pub const fn width(&self) -> u32 {
        self.high.saturating_sub(self.low) + 1
    }
}

impl fmt::Display for BitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.high)
        } else {
            write!(f, "{}:{}", self.high, self.low)
        }
    }
}

/// Software access rights of a field as written in the register table
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, Display)]
pub enum Access {
    #[strum(to_string = "R")]
    Read,
    #[strum(to_string = "R/W")]
    ReadWrite,
    /// Write one to pulse
    #[strum(to_string = "W1P")]
    WriteOnePulse,
    /// Write one to clear
    #[strum(to_string = "W1C")]
    WriteOneClear,
    /// Write one to pulse, readable
    #[strum(to_string = "W1P/R")]
    WriteOnePulseRead,
    #[strum(to_string = "--")]
    Reserved,
}

/// Signedness of the value held by a field
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, Display)]
pub enum ValueType {
    #[strum(to_string = "U")]
    Unsigned,
    #[strum(to_string = "S")]
    Signed,
    #[strum(to_string = "--")]
    Reserved,
}

impl ValueType {
    /// C type used for a bit-field member of this signedness
    pub(crate) const fn c_type(&self) -> &'static str {
        match self {
            Self::Signed => "int32_t",
            Self::Unsigned | Self::Reserved => "uint32_t",
        }
    }
}

/// Field value after reset
///
/// Values are kept numerically so that `0xa4`-style spellings cannot leak into output; they are
/// always printed in the canonical `0xA4` form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetValue {
    Value(u32),
    Reserved,
}

impl str::FromStr for ResetValue {
    type Err = FormatError;

    /// Convert from an upper case hexadecimal literal, e.g., `0x0A4`, or the reserved token `--`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == RESERVED_TOKEN {
            return Ok(Self::Reserved);
        }
        s.strip_prefix("0x")
            .filter(|digits| {
                !digits.is_empty()
                    && digits
                        .chars()
                        .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
            })
            .and_then(|digits| u32::from_str_radix(digits, 16).ok())
            .map(Self::Value)
            .ok_or_else(|| FormatError::BadReset(s.to_owned()))
    }
}

impl fmt::Display for ResetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "0x{v:X}"),
            Self::Reserved => f.write_str(RESERVED_TOKEN),
        }
    }
}

/// Token standing in for access, reset and type of reserved bits
pub(crate) const RESERVED_TOKEN: &str = "--";

/// Fixed description of reserved bits
pub(crate) const RESERVED_DESCRIPTION: &str = "Reserved";

/// Name of a field, or the marker for reserved bits
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldName {
    Named(String),
    Reserved,
}

/// A contiguous bit range of a register carrying one signal
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub(crate) bits: BitRange,
    pub(crate) name: FieldName,
    pub(crate) description: String,
    pub(crate) access: Access,
    pub(crate) reset: ResetValue,
    pub(crate) value_type: ValueType,
}

impl Field {
    /// Create a named field
    ///
    /// Paragraph breaks in `description` are represented by `\n`.
    pub fn new(
        bits: BitRange,
        name: impl Into<String>,
        description: impl Into<String>,
        access: Access,
        reset: ResetValue,
        value_type: ValueType,
    ) -> Self {
        Self {
            bits,
            name: FieldName::Named(name.into()),
            description: description.into(),
            access,
            reset,
            value_type,
        }
    }

    /// Create reserved bits
    ///
    /// Metadata of reserved bits is always the reserved token, whatever the source table said.
    pub fn reserved(bits: BitRange) -> Self {
        Self {
            bits,
            name: FieldName::Reserved,
            description: RESERVED_DESCRIPTION.to_owned(),
            access: Access::Reserved,
            reset: ResetValue::Reserved,
            value_type: ValueType::Reserved,
        }
    }

    pub const fn bits(&self) -> BitRange {
        self.bits
    }

    pub const fn name(&self) -> &FieldName {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn access(&self) -> Access {
        self.access
    }

    pub const fn reset(&self) -> ResetValue {
        self.reset
    }

    pub const fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub const fn is_reserved(&self) -> bool {
        matches!(self.name, FieldName::Reserved)
    }
}

#[test]
fn reset_value_normalizes() {
    let parse = |s: &str| s.parse::<ResetValue>().map(|v| v.to_string());

    assert_eq!(parse("0xA4"), Ok("0xA4".to_owned()));
    assert_eq!(parse("0x0A4"), Ok("0xA4".to_owned()));
    assert_eq!(parse("0x00000000"), Ok("0x0".to_owned()));
    assert_eq!(parse("0xFFFFFFFF"), Ok("0xFFFFFFFF".to_owned()));
    assert_eq!(parse("--"), Ok("--".to_owned()));
    assert!(matches!(parse("0xa4"), Err(FormatError::BadReset(_))));
    assert!(matches!(parse("0x"), Err(FormatError::BadReset(_))));
    assert!(matches!(parse("164"), Err(FormatError::BadReset(_))));
    assert!(matches!(parse("0x100000000"), Err(FormatError::BadReset(_))));
}

#[test]
fn access_and_type_tokens_are_closed() {
    assert_eq!("R/W".parse::<Access>(), Ok(Access::ReadWrite));
    assert_eq!("W1P/R".parse::<Access>(), Ok(Access::WriteOnePulseRead));
    assert_eq!(Access::WriteOneClear.to_string(), "W1C");
    assert!("RW".parse::<Access>().is_err());
    assert!("r".parse::<Access>().is_err());

    assert_eq!("S".parse::<ValueType>(), Ok(ValueType::Signed));
    assert_eq!(ValueType::Reserved.to_string(), "--");
    assert!("u".parse::<ValueType>().is_err());
}

#[test]
fn reserved_field_carries_sentinels() {
    let field = Field::reserved(BitRange::new(7, 4));

    assert!(field.is_reserved());
    assert_eq!(field.description(), "Reserved");
    assert_eq!(field.access(), Access::Reserved);
    assert_eq!(field.reset(), ResetValue::Reserved);
    assert_eq!(field.value_type(), ValueType::Reserved);
    assert_eq!(field.bits().width(), 4);
    assert_eq!(field.bits().to_string(), "7:4");
}

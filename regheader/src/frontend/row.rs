//! Classification of single body lines into the row shapes of a register table

use lazy_static::lazy_static;
use regex::Regex;

use crate::model::{Access, BitRange, RegisterHeader, ResetValue, ValueType, RESERVED_TOKEN};

// Compile Regexes only once as recommended by the documentation of the Regex crate
lazy_static! {
    /// Register header, e.g., `ISP_CTRL (control, 0x0000_0004) optional extra description`
    static ref HEADER_RE: Regex = Regex::new(
        r"^([A-Z][A-Z0-9_]*) \((.+?), 0x([0-9A-F]{4})_([0-9A-F]{4})\)(?: (.+?))?$"
    ).unwrap();
    /// Section underline below a register header
    static ref UNDERLINE_RE: Regex = Regex::new(r"^\^+$").unwrap();
    /// First column of a field row: `   * - 31:16` or `   * - 0`
    static ref BIT_RANGE_RE: Regex = Regex::new(r"^ {3}\* - (\d+)(?::(\d+))?$").unwrap();
    /// Field name and start of its description: `     - **EN** enable the block`
    static ref DESCRIPTION_RE: Regex =
        Regex::new(r"^ {5}- \*\*([A-Za-z_][A-Za-z0-9_]*)\*\* (.*)$").unwrap();
    /// Description continued on an indented line
    static ref CONTINUATION_RE: Regex = Regex::new(r"^ {7}(.+)$").unwrap();
    /// Any other cell of a field row: `     - R/W`
    static ref TOKEN_RE: Regex = Regex::new(r"^ {5}- (\S+)$").unwrap();
}

/// Exact second column of a reserved field row
pub(crate) const RESERVED_MARKER: &str = "     - Reserved";

/// First line of both table header variants
pub(crate) const LIST_TABLE: &str = ".. list-table::";

/// Meaning of one line of the body
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Row<'a> {
    /// No line left in the body
    EndOfBody,
    Blank,
    RegisterHeader(RegisterHeader),
    /// Line consisting of `^` only, with its length
    Underline(usize),
    /// `.. list-table::`, start of a table header block
    TableHeader,
    BitRange(BitRange),
    ReservedMarker,
    /// Field name and the first line of its description
    NamedDescription { name: &'a str, text: &'a str },
    Continuation(&'a str),
    /// `--`, valid in place of access, reset value and type
    ReservedToken,
    Access(Access),
    Reset(ResetValue),
    Type(ValueType),
    /// Any other line, e.g., prose
    Text(&'a str),
}

impl<'a> Row<'a> {
    /// Classify `line` by its shape alone
    ///
    /// Numbers that cannot be represented, such as a bit index or reset value exceeding 32 bits,
    /// make the line fall back to [`Row::Text`].
    pub(crate) fn classify(line: &'a str) -> Self {
        if line.is_empty() {
            return Self::Blank;
        }
        if line == RESERVED_MARKER {
            return Self::ReservedMarker;
        }
        if line == LIST_TABLE {
            return Self::TableHeader;
        }
        if UNDERLINE_RE.is_match(line) {
            return Self::Underline(line.len());
        }
        if let Some(header) = parse_register_header(line) {
            return Self::RegisterHeader(header);
        }
        if let Some(caps) = BIT_RANGE_RE.captures(line) {
            let high = caps[1].parse::<u32>();
            let low = caps.get(2).map_or(high.clone(), |low| low.as_str().parse());
            return match (high, low) {
                (Ok(high), Ok(low)) => Self::BitRange(BitRange::new(high, low)),
                _ => Self::Text(line),
            };
        }
        if let Some(caps) = DESCRIPTION_RE.captures(line) {
            // Safety: both groups are mandatory in the regex
            let (name, text) = (caps.get(1).unwrap(), caps.get(2).unwrap());
            return Self::NamedDescription {
                name: name.as_str(),
                text: text.as_str(),
            };
        }
        if let Some(caps) = CONTINUATION_RE.captures(line) {
            // Safety: the group is mandatory in the regex
            return Self::Continuation(caps.get(1).unwrap().as_str());
        }
        if let Some(caps) = TOKEN_RE.captures(line) {
            return classify_token(&caps[1]).unwrap_or(Self::Text(line));
        }
        Self::Text(line)
    }
}

fn classify_token<'a>(token: &str) -> Option<Row<'a>> {
    if token == RESERVED_TOKEN {
        return Some(Row::ReservedToken);
    }
    if let Ok(access) = token.parse::<Access>() {
        return Some(Row::Access(access));
    }
    if let Ok(value_type) = token.parse::<ValueType>() {
        return Some(Row::Type(value_type));
    }
    token.parse::<ResetValue>().ok().map(Row::Reset)
}

fn parse_register_header(line: &str) -> Option<RegisterHeader> {
    let caps = HEADER_RE.captures(line)?;
    let offset_hi = u32::from_str_radix(&caps[3], 16).ok()?;
    let offset_lo = u32::from_str_radix(&caps[4], 16).ok()?;
    Some(RegisterHeader {
        name: caps[1].to_owned(),
        description: caps[2].to_owned(),
        offset: offset_hi << 16 | offset_lo,
        description_ex: caps.get(5).map(|m| m.as_str().to_owned()),
    })
}

#[test]
fn classify_register_header() {
    assert_eq!(
        Row::classify("ISP_CTRL (control, 0x0001_00A0) see below"),
        Row::RegisterHeader(RegisterHeader {
            name: "ISP_CTRL".to_owned(),
            description: "control".to_owned(),
            offset: 0x0001_00a0,
            description_ex: Some("see below".to_owned()),
        })
    );
    assert!(matches!(
        Row::classify("FOO (ctrl, 0x0000_0000)"),
        Row::RegisterHeader(RegisterHeader {
            description_ex: None,
            ..
        })
    ));
    // Lower case names and short offsets are prose
    assert!(matches!(
        Row::classify("foo (ctrl, 0x0000_0000)"),
        Row::Text(_)
    ));
    assert!(matches!(Row::classify("FOO (ctrl, 0x0000)"), Row::Text(_)));
    assert!(matches!(
        Row::classify("A (reg, 0x0000_0004)"),
        Row::RegisterHeader(RegisterHeader { offset: 4, .. })
    ));
    assert!(matches!(Row::classify("_A (reg, 0x0000_0004)"), Row::Text(_)));
    assert_eq!(Row::classify("^^^^"), Row::Underline(4));
}

#[test]
fn classify_field_rows() {
    assert_eq!(
        Row::classify("   * - 31:16"),
        Row::BitRange(BitRange::new(31, 16))
    );
    assert_eq!(Row::classify("   * - 7"), Row::BitRange(BitRange::single(7)));
    assert!(matches!(Row::classify("  * - 7"), Row::Text(_)));
    assert!(matches!(Row::classify("   * - 7:"), Row::Text(_)));
    assert_eq!(Row::classify("     - Reserved"), Row::ReservedMarker);
    assert_eq!(
        Row::classify("     - **EN** enable the block"),
        Row::NamedDescription {
            name: "EN",
            text: "enable the block"
        }
    );
    assert!(matches!(Row::classify("     - EN enable"), Row::Text(_)));
    assert_eq!(Row::classify("       more text"), Row::Continuation("more text"));
    assert_eq!(Row::classify("     - --"), Row::ReservedToken);
    assert_eq!(Row::classify("     - W1C"), Row::Access(Access::WriteOneClear));
    assert_eq!(Row::classify("     - S"), Row::Type(ValueType::Signed));
    assert_eq!(
        Row::classify("     - 0x00A4"),
        Row::Reset(ResetValue::Value(0xa4))
    );
    assert!(matches!(Row::classify("     - 0xa4"), Row::Text(_)));
    assert!(matches!(Row::classify("     - RW"), Row::Text(_)));
    assert_eq!(Row::classify(""), Row::Blank);
    assert_eq!(Row::classify(".. list-table::"), Row::TableHeader);
}

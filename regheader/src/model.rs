//! Encodes information about hardware registers. This information can be used to generate
//! headers.

mod field;
mod register;

// Anything that's part of the public API of field and register is also part of the public API of
// model
pub use field::*;
pub use register::*;

use std::ops;

use itertools::Itertools;

use crate::error::OffsetAlignmentError;

/// Registers are word aligned
const REGISTER_BYTES: u32 = REGISTER_BITS / 8;

/// An ordered collection of registers sharing one address space
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Module {
    name: String,
    registers: Vec<Register>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registers: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a register after the ones already in the module
    ///
    /// # Errors
    ///
    /// - `register` is not word aligned
    /// - `register` does not start after the previous register
    pub fn push(&mut self, register: Register) -> Result<(), OffsetAlignmentError> {
        let offset = register.offset();
        if offset % REGISTER_BYTES != 0 {
            return Err(OffsetAlignmentError::Misaligned {
                label: register.label(),
                offset,
            });
        }
        // Both offsets are aligned, so any larger offset leaves room for the previous register
        if let Some(prev) = self.registers.last() {
            if offset <= prev.offset() {
                return Err(OffsetAlignmentError::NotIncreasing {
                    label: register.label(),
                    offset,
                    previous: prev.offset(),
                });
            }
        }
        self.registers.push(register);
        Ok(())
    }

    /// Name token shared by all registers in the module, e.g., `isp` for `isp_ctrl` and
    /// `isp_status`
    ///
    /// Returns None if the registers disagree or if any register name has no `_` to split at.
    pub fn common_prefix(&self) -> Option<&str> {
        self.registers
            .iter()
            .map(|reg| reg.name().split_once('_').map(|(prefix, _)| prefix))
            .all_equal_value()
            .ok()
            .flatten()
    }
}

impl ops::Deref for Module {
    type Target = Vec<Register>;

    fn deref(&self) -> &Self::Target {
        &self.registers
    }
}

#[cfg(test)]
fn register_at(name: &str, offset: u32) -> Register {
    Register::new(
        RegisterHeader {
            name: name.to_owned(),
            description: "test".to_owned(),
            offset,
            description_ex: None,
        },
        vec![Field::reserved(BitRange::new(31, 0))],
        None,
        TableStyle::Short,
    )
    .unwrap()
}

#[test]
fn push_rejects_misaligned_offsets() {
    let mut module = Module::new("isp");
    module.push(register_at("A", 0x00)).unwrap();
    assert_eq!(
        module.push(register_at("B", 0x06)),
        Err(OffsetAlignmentError::Misaligned {
            label: "B (test, 0x0000_0006)".to_owned(),
            offset: 0x06
        })
    );
}

#[test]
fn push_rejects_repeated_offsets() {
    let mut module = Module::new("isp");
    module.push(register_at("A", 0x00)).unwrap();
    module.push(register_at("B", 0x04)).unwrap();
    assert_eq!(
        module.push(register_at("C", 0x04)),
        Err(OffsetAlignmentError::NotIncreasing {
            label: "C (test, 0x0000_0004)".to_owned(),
            offset: 0x04,
            previous: 0x04
        })
    );
    assert_eq!(module.len(), 2);
}

#[test]
fn push_rejects_offsets_after_last_word() {
    let mut module = Module::new("isp");
    module.push(register_at("TOP", 0xffff_fffc)).unwrap();
    assert_eq!(
        module.push(register_at("BOTTOM", 0x0)),
        Err(OffsetAlignmentError::NotIncreasing {
            label: "BOTTOM (test, 0x0000_0000)".to_owned(),
            offset: 0x0,
            previous: 0xffff_fffc
        })
    );
    assert_eq!(module.len(), 1);
}

#[test]
fn common_prefix_works() {
    let module_of = |names: &[&str]| {
        let mut module = Module::new("m");
        for (i, name) in names.iter().enumerate() {
            module.push(register_at(name, 4 * i as u32)).unwrap();
        }
        module
    };

    assert_eq!(
        module_of(&["ISP_CTRL", "ISP_STATUS"]).common_prefix(),
        Some("isp")
    );
    assert_eq!(module_of(&["ISP_CTRL", "DMA_STATUS"]).common_prefix(), None);
    assert_eq!(module_of(&["ISP_CTRL", "ISP"]).common_prefix(), None);
    assert_eq!(module_of(&["FOO"]).common_prefix(), None);
    assert_eq!(module_of(&[]).common_prefix(), None);
}

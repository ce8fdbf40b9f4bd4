//! Generate C headers from [`Module`]s

mod rst;
mod user;

pub(crate) use self::rst::RstModule;

use std::fmt;

use indoc::formatdoc;
use strum::{AsRefStr, EnumIter};

use self::user::UserHeader;
use crate::model::Module;

/// Which consumer a header is generated for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum AddressSpace {
    /// Offset macros plus a bit-field struct covering the whole module
    User,
    /// Offset macros only, with module-relative 16-bit offsets
    Kernel,
}

/// File name of the header generated for module `name`, e.g., `isp_reg.h`
pub(crate) fn header_file_name(name: &str) -> String {
    format!("{name}_reg.h")
}

/// Generate the header for `module`, wrapped in an include guard
pub(crate) fn gen_header(module: &Module, space: AddressSpace) -> String {
    let guard = format!("_{}_REG_H", module.name().to_uppercase());
    let body = match space {
        AddressSpace::User => UserHeader(module).to_string(),
        AddressSpace::Kernel => KernelHeader(module).to_string(),
    };
    formatdoc! {"
        #ifndef {guard}
        #define {guard}

        {body}
        #endif /* {guard} */
    "}
}

struct KernelHeader<'a>(&'a Module);

impl fmt::Display for KernelHeader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for reg in self.0.iter() {
            writeln!(f, "#define {} 0x{:04X}", reg.name().to_uppercase(), reg.offset())?;
        }
        Ok(())
    }
}

/// Generate a header including each of `headers`
///
/// Headers are included in sorted order so that the output does not depend on directory listing
/// order.
pub(crate) fn gen_aggregate<'a>(headers: impl IntoIterator<Item = &'a str>) -> String {
    let mut headers = headers.into_iter().collect::<Vec<_>>();
    headers.sort_unstable();
    headers
        .into_iter()
        .map(|h| format!("#include \"{h}\"\n"))
        .collect()
}

#[cfg(test)]
use crate::model::{
    Access, BitRange, Field, Register, RegisterHeader, ResetValue, TableStyle, ValueType,
};

#[cfg(test)]
pub(crate) fn test_module(regs: &[(&str, u32)]) -> Module {
    let mut module = Module::new("isp");
    for (name, offset) in regs {
        let reg = Register::new(
            RegisterHeader {
                name: (*name).to_owned(),
                description: "test".to_owned(),
                offset: *offset,
                description_ex: None,
            },
            vec![
                Field::new(
                    BitRange::new(31, 1),
                    "EN",
                    "enable",
                    Access::ReadWrite,
                    ResetValue::Value(0),
                    ValueType::Unsigned,
                ),
                Field::reserved(BitRange::single(0)),
            ],
            None,
            TableStyle::Short,
        )
        .unwrap();
        module.push(reg).unwrap();
    }
    module
}

#[test]
fn gen_kernel_header_works() {
    let module = test_module(&[("FOO", 0x0), ("BAR", 0x1_0004)]);
    assert_eq!(
        gen_header(&module, AddressSpace::Kernel),
        "#ifndef _ISP_REG_H\n\
         #define _ISP_REG_H\n\
         \n\
         #define FOO 0x0000\n\
         #define BAR 0x10004\n\
         \n\
         #endif /* _ISP_REG_H */\n"
    );
}

#[test]
fn gen_aggregate_sorts_includes() {
    assert_eq!(
        gen_aggregate(["isp_reg.h", "dma_reg.h"]),
        "#include \"dma_reg.h\"\n#include \"isp_reg.h\"\n"
    );
    assert_eq!(gen_aggregate([]), "");
}

#[test]
fn address_space_names_directories() {
    use strum::IntoEnumIterator;

    let names = AddressSpace::iter().map(|s| s.as_ref().to_owned()).collect::<Vec<_>>();
    assert_eq!(names, ["user", "kernel"]);
}

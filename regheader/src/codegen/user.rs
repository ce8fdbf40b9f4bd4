//! User-space header: offset macros and a struct mapping the whole module as bit-field unions

use std::fmt;

use crate::model::{FieldName, Module, Register};

/// Bytes per 32-bit word in the generated struct
const WORD_BYTES: u64 = 4;

pub(crate) struct UserHeader<'a>(pub(crate) &'a Module);

impl fmt::Display for UserHeader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let module = self.0;
        writeln!(f, "#include <stdint.h>")?;
        writeln!(f)?;
        for reg in module.iter() {
            writeln!(f, "#define {} 0x{:08X}", reg.name().to_uppercase(), reg.offset())?;
        }
        writeln!(f)?;

        writeln!(f, "struct {}_reg {{", module.name())?;
        let prefix = module.common_prefix();
        // Wider than an offset so that the end of the last word of the address space fits
        let mut next_offset = 0u64;
        let mut reserved_idx = 0;
        for reg in module.iter() {
            let offset = u64::from(reg.offset());
            // Pad the address gap in front of the register
            if offset > next_offset {
                writeln!(
                    f,
                    "\tuint32_t reserved{reserved_idx}[{}];",
                    (offset - next_offset) / WORD_BYTES
                )?;
                reserved_idx += 1;
            }
            next_offset = offset + WORD_BYTES;
            write!(f, "{}", RegisterUnion { reg, prefix })?;
        }
        writeln!(f, "}};")
    }
}

/// Union of the raw register value and its bit fields
struct RegisterUnion<'a> {
    reg: &'a Register,
    /// Module-wide prefix to drop from member names
    prefix: Option<&'a str>,
}

impl RegisterUnion<'_> {
    fn member_name(&self) -> &str {
        let name = self.reg.name();
        self.prefix
            .and_then(|prefix| name.strip_prefix(prefix))
            .and_then(|rest| rest.strip_prefix('_'))
            .unwrap_or(name)
    }
}

impl fmt::Display for RegisterUnion<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.member_name();
        writeln!(f, "\tunion {{")?;
        writeln!(f, "\t\tuint32_t {name};")?;
        writeln!(f, "\t\tstruct {{")?;
        let mut reserved_idx = 0;
        for field in self.reg.fields() {
            let width = field.bits().width();
            match field.name() {
                FieldName::Reserved => {
                    writeln!(f, "\t\t\tuint32_t reserved{reserved_idx}:{width};")?;
                    reserved_idx += 1;
                }
                FieldName::Named(field_name) => writeln!(
                    f,
                    "\t\t\t{} {}:{width};",
                    field.value_type().c_type(),
                    field_name.to_lowercase()
                )?,
            }
        }
        writeln!(f, "\t\t}} {name}_bit;")?;
        writeln!(f, "\t}};")
    }
}

#[cfg(test)]
use crate::codegen::{gen_header, test_module, AddressSpace};

#[test]
fn gen_user_header_works() {
    let module = test_module(&[("FOO", 0x0)]);
    assert_eq!(
        gen_header(&module, AddressSpace::User),
        "#ifndef _ISP_REG_H\n\
         #define _ISP_REG_H\n\
         \n\
         #include <stdint.h>\n\
         \n\
         #define FOO 0x00000000\n\
         \n\
         struct isp_reg {\n\
         \tunion {\n\
         \t\tuint32_t foo;\n\
         \t\tstruct {\n\
         \t\t\tuint32_t reserved0:1;\n\
         \t\t\tuint32_t en:31;\n\
         \t\t} foo_bit;\n\
         \t};\n\
         };\n\
         \n\
         #endif /* _ISP_REG_H */\n"
    );
}

#[test]
fn gen_user_header_pads_gaps_and_trims_prefix() {
    let module = test_module(&[("ISP_A", 0x0), ("ISP_B", 0x8), ("ISP_C", 0x14)]);
    let header = gen_header(&module, AddressSpace::User);

    assert!(header.contains("#define ISP_A 0x00000000\n#define ISP_B 0x00000008\n"));
    let members = header
        .lines()
        .filter(|l| l.starts_with("\tuint32_t") || l.starts_with("\t\tuint32_t"))
        .collect::<Vec<_>>();
    assert_eq!(
        members,
        [
            "\t\tuint32_t a;",
            "\tuint32_t reserved0[1];",
            "\t\tuint32_t b;",
            "\tuint32_t reserved1[2];",
            "\t\tuint32_t c;",
        ]
    );
    assert!(header.contains("\t\t} b_bit;\n"));
}

#[test]
fn gen_user_header_keeps_names_without_common_prefix() {
    let module = test_module(&[("ISP_A", 0x0), ("DMA_B", 0x4)]);
    let header = gen_header(&module, AddressSpace::User);

    assert!(header.contains("\t\tuint32_t isp_a;\n"));
    assert!(header.contains("\t\t} dma_b_bit;\n"));
    assert!(!header.contains("reserved0["));
}

#[test]
fn gen_user_header_pads_up_to_last_word() {
    let module = test_module(&[("ISP_A", 0x0), ("ISP_B", 0xffff_fffc)]);
    let header = gen_header(&module, AddressSpace::User);

    assert!(header.contains("#define ISP_B 0xFFFFFFFC\n"));
    assert!(header.contains(
        "\t};\n\
         \tuint32_t reserved0[1073741822];\n\
         \tunion {\n\
         \t\tuint32_t b;\n"
    ));
}

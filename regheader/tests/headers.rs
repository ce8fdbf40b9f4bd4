use std::{fs, path::Path};

use indoc::indoc;
use regheader::{
    AddressSpace, ApiError, BitConflictError, HeaderConfig, HeaderTree, ModuleSource, ParseError,
};
use tempfile::TempDir;

const PREAMBLE: &str = ".. raw:: latex\n\
                        \n   \\setregistertablestyle\n\
                        \n.. tabularcolumns:: |K{1cm}|p{10cm}|K{1.2cm}|K{1cm}|K{1cm}|\n\
                        \n";
const TRAILER: &str = ".. tabularcolumns:: |l|l|l|l|l|l|l|l|l|l|";

const FOO_BODY: &str = indoc! {"
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
"};

const DMA_BODY: &str = indoc! {"
    DMA_SRC (source address, 0x0000_0000)
    ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^

    .. list-table::
       :header-rows: 1

       * - Bits
         - Description
         - Access
         - Reset
         - Value
       * - 31:0
         - **ADDR** first byte to copy
         - R/W
         - 0x0
         - U

    DMA_DST (destination address, 0x0000_0008)
    ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^

    .. list-table::
       :header-rows: 1
       :class: longtable

       * - Bits
         - Description
         - Access
         - Reset
         - Value
       * - 31:0
         - **ADDR** first byte to write
         - R/W
         - 0xFFFFFFFF
         - U
"};

/// Overlapping 7:4 fields
const OVERLAP_BODY: &str = indoc! {"
    BAD_CTRL (ctrl, 0x0000_0000)
    ^^^^^^^^^^^^^^^^^^^^^^^^^^^^

    .. list-table::
       :header-rows: 1

       * - Bits
         - Description
         - Access
         - Reset
         - Value
       * - 31:8
         - Reserved
         - --
         - --
         - --
       * - 7:4
         - **MODE** mode
         - R/W
         - 0x0
         - U
       * - 7:4
         - **LEVEL** level
         - R/W
         - 0x0
         - U
       * - 3:0
         - Reserved
         - --
         - --
         - --
"};

fn description(body: &str) -> String {
    format!("{PREAMBLE}{body}\n{TRAILER}\n")
}

/// Create `<root>/<module>/<file>` holding a description with `body`
fn add_module(root: &Path, module: &str, file: &str, body: &str) {
    let dir = root.join(module);
    fs::create_dir_all(&dir).expect("failed to create module dir");
    fs::write(dir.join(file), description(body)).expect("failed to write description");
}

fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path.as_ref())
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.as_ref().display()))
}

#[test]
fn header_tree_converts_modules() {
    let modules = TempDir::new().unwrap();
    let headers = TempDir::new().unwrap();
    add_module(modules.path(), "foo", "registers.rst", FOO_BODY);
    add_module(modules.path(), "dma", "registers.rst", DMA_BODY);
    // Not a module
    fs::create_dir(modules.path().join("docs")).unwrap();

    let config = HeaderConfig::default();
    let sources = regheader::discover_modules(modules.path(), &config).unwrap();
    let names = sources.iter().map(ModuleSource::name).collect::<Vec<_>>();
    assert_eq!(names, ["dma", "foo"]);

    let tree = HeaderTree::create(headers.path(), &config).unwrap();
    for src in &sources {
        tree.convert(src).unwrap();
    }
    tree.write_aggregates().unwrap();

    let user = tree.dir(AddressSpace::User);
    let kernel = tree.dir(AddressSpace::Kernel);
    assert_eq!(user, headers.path().join("user"));
    assert_eq!(kernel, headers.path().join("kernel"));

    assert_eq!(
        read(user.join("foo_reg.h")),
        indoc! {"
            #ifndef _FOO_REG_H
            #define _FOO_REG_H

            #include <stdint.h>

            #define FOO 0x00000000

            struct foo_reg {
            \tunion {
            \t\tuint32_t foo;
            \t\tstruct {
            \t\t\tuint32_t reserved0:1;
            \t\t\tuint32_t en:31;
            \t\t} foo_bit;
            \t};
            };

            #endif /* _FOO_REG_H */
        "}
    );
    assert_eq!(
        read(kernel.join("foo_reg.h")),
        "#ifndef _FOO_REG_H\n#define _FOO_REG_H\n\n#define FOO 0x0000\n\n#endif /* _FOO_REG_H */\n"
    );

    let dma = read(user.join("dma_reg.h"));
    assert!(dma.contains("#define DMA_SRC 0x00000000\n#define DMA_DST 0x00000008\n"));
    assert!(dma.contains(
        "\t\t} src_bit;\n\
         \t};\n\
         \tuint32_t reserved0[1];\n\
         \tunion {\n\
         \t\tuint32_t dst;\n"
    ));
    assert!(read(kernel.join("dma_reg.h")).contains("#define DMA_DST 0x0008\n"));

    let aggregate = "#include \"dma_reg.h\"\n#include \"foo_reg.h\"\n";
    assert_eq!(read(user.join("isp_reg.h")), aggregate);
    assert_eq!(read(kernel.join("isp_reg.h")), aggregate);

    // The aggregate never includes itself
    tree.write_aggregates().unwrap();
    assert_eq!(read(user.join("isp_reg.h")), aggregate);
}

#[test]
fn failing_module_writes_nothing() {
    let modules = TempDir::new().unwrap();
    let headers = TempDir::new().unwrap();
    add_module(modules.path(), "bad", "registers.rst", OVERLAP_BODY);

    let config = HeaderConfig::default();
    let sources = regheader::discover_modules(modules.path(), &config).unwrap();
    let tree = HeaderTree::create(headers.path(), &config).unwrap();

    let Err(ApiError::Parse(err)) = tree.convert(&sources[0]) else {
        panic!("overlapping fields must not convert");
    };
    assert!(err.fname().ends_with("registers.rst"));
    assert_eq!(
        err.kind(),
        &ParseError::BitConflict(BitConflictError::Range {
            label: "BAD_CTRL (ctrl, 0x0000_0000)".to_owned(),
            high: 7,
            low: 4,
        })
    );
    assert!(!tree.dir(AddressSpace::User).join("bad_reg.h").exists());
    assert!(!tree.dir(AddressSpace::Kernel).join("bad_reg.h").exists());

    assert!(matches!(
        regheader::dry_run(&sources),
        Err(ApiError::Parse(_))
    ));
}

#[test]
fn failing_header_write_removes_module_output() {
    let headers = TempDir::new().unwrap();
    let tree = HeaderTree::create(headers.path(), &HeaderConfig::default()).unwrap();
    let module = regheader::parse_module("foo", "foo.rst", &description(FOO_BODY)).unwrap();
    // A directory in place of the kernel header makes its write fail
    fs::create_dir(tree.dir(AddressSpace::Kernel).join("foo_reg.h")).unwrap();

    assert!(matches!(tree.write_module(&module), Err(ApiError::Io(_))));
    assert!(!tree.dir(AddressSpace::User).join("foo_reg.h").exists());
}

#[test]
fn file_names_follow_config() {
    let modules = TempDir::new().unwrap();
    let headers = TempDir::new().unwrap();
    add_module(modules.path(), "foo", "regs.rst", FOO_BODY);
    add_module(modules.path(), "dma", "registers.rst", DMA_BODY);

    let config = HeaderConfig::default()
        .source_file_name("regs.rst")
        .aggregate_name("all_reg.h");
    let sources = regheader::discover_modules(modules.path(), &config).unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].path(), modules.path().join("foo").join("regs.rst"));
    regheader::dry_run(&sources).unwrap();

    let tree = HeaderTree::create(headers.path(), &config).unwrap();
    tree.convert(&sources[0]).unwrap();
    tree.write_aggregates().unwrap();
    assert_eq!(
        read(tree.dir(AddressSpace::Kernel).join("all_reg.h")),
        "#include \"foo_reg.h\"\n"
    );
    assert!(!tree.dir(AddressSpace::Kernel).join("isp_reg.h").exists());
}

#[test]
fn rendered_description_matches_canonical_input() {
    let text = description(DMA_BODY);
    let module = regheader::parse_module("dma", "dma.rst", &text).unwrap();

    assert_eq!(regheader::render_rst(&module), text);
    assert_eq!(
        regheader::generate_header(&module, AddressSpace::Kernel),
        regheader::generate_header(&module, AddressSpace::Kernel)
    );
}

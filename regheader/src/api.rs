//! Exposes functionality supported by this crate
mod error;

use std::path;

use log::{info, warn};
use strum::IntoEnumIterator;

use crate::{codegen, frontend, util};

pub use crate::codegen::AddressSpace;
pub use crate::error::{
    BitConflictError, FormatError, OffsetAlignmentError, ParseError, ParseFileError, Position,
    PositionalError,
};
pub use crate::model::{
    check_bits, Access, BitRange, Field, FieldName, Module, Register, RegisterHeader, ResetValue,
    TableStyle, ValueType, REGISTER_BITS,
};
pub use error::ApiError;

/// A register description of one module, e.g., `modules/isp/registers.rst`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleSource {
    name: String,
    path: path::PathBuf,
}

impl ModuleSource {
    pub fn new(name: impl Into<String>, path: path::PathBuf) -> Self {
        Self {
            name: name.into(),
            path,
        }
    }

    /// Name of the module, used for the generated header and its include guard
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &path::Path {
        &self.path
    }
}

/// File names used when walking a module tree and writing a header tree
#[derive(Clone, Debug)]
pub struct HeaderConfig {
    /// Description file looked up in each module directory
    source_file_name: String,
    /// Header including every module header of an address space
    aggregate_name: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            source_file_name: "registers.rst".to_owned(),
            aggregate_name: "isp_reg.h".to_owned(),
        }
    }
}

impl HeaderConfig {
    pub fn source_file_name(mut self, source_file_name: impl Into<String>) -> Self {
        self.source_file_name = source_file_name.into();
        self
    }

    pub fn aggregate_name(mut self, aggregate_name: impl Into<String>) -> Self {
        self.aggregate_name = aggregate_name.into();
        self
    }
}

/// Find the modules under `dir`
///
/// Every subdirectory containing the configured description file is a module named after the
/// subdirectory. Modules are returned sorted by name.
///
/// # Errors
///
/// - `dir` cannot be listed
/// - A module directory name is not valid UTF-8
pub fn discover_modules(
    dir: &path::Path,
    config: &HeaderConfig,
) -> Result<Vec<ModuleSource>, ApiError> {
    let mut sources = vec![];
    for module_dir in util::list_dirs(dir)? {
        let source = module_dir.join(&config.source_file_name);
        if !source.is_file() {
            warn!(
                "skipping {}: no {} found",
                module_dir.display(),
                config.source_file_name
            );
            continue;
        }
        let name = module_dir
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ApiError::NonUtf8ModuleName(module_dir.clone()))?;
        sources.push(ModuleSource::new(name, source));
    }
    Ok(sources)
}

/// Parse the register description `text` of module `name`
///
/// `fname` identifies the description in errors, e.g., the path it was read from.
///
/// # Errors
///
/// The first format, bit layout or offset violation found in `text`
pub fn parse_module(name: &str, fname: &str, text: &str) -> Result<Module, ParseFileError> {
    let module = frontend::parse_module(name, fname, text)?;
    if module.is_empty() {
        warn!("{fname}: module {name} has no registers");
    }
    Ok(module)
}

/// Read and parse the description of `src`
///
/// # Errors
///
/// - The description cannot be read
/// - The description is malformed, see [`parse_module`]
pub fn read_module(src: &ModuleSource) -> Result<Module, ApiError> {
    let text = util::read_file(src.path())?;
    Ok(parse_module(
        src.name(),
        &src.path().display().to_string(),
        &text,
    )?)
}

/// Run the parser on the inputs without writing anything
///
/// Good for checking whether the descriptions are well-formed.
///
/// # Errors
///
/// The first source that cannot be read or parsed
pub fn dry_run(sources: &[ModuleSource]) -> Result<(), ApiError> {
    for src in sources {
        let module = read_module(src)?;
        info!(
            "{}: {} registers in module {}",
            src.path().display(),
            module.len(),
            module.name()
        );
    }
    Ok(())
}

/// Generate the C header of `module` for `space`, include guard included
pub fn generate_header(module: &Module, space: AddressSpace) -> String {
    codegen::gen_header(module, space)
}

/// Render `module` back into a register description in canonical form
pub fn render_rst(module: &Module) -> String {
    codegen::RstModule(module).to_string()
}

/// Output directory holding one subdirectory per [`AddressSpace`]
#[derive(Clone, Debug)]
pub struct HeaderTree {
    root: path::PathBuf,
    aggregate_name: String,
}

impl HeaderTree {
    /// Create the tree under `root`, along with its address space subdirectories
    ///
    /// # Errors
    ///
    /// A directory cannot be created
    pub fn create(root: &path::Path, config: &HeaderConfig) -> Result<Self, ApiError> {
        let tree = Self {
            root: root.to_owned(),
            aggregate_name: config.aggregate_name.clone(),
        };
        for space in AddressSpace::iter() {
            util::create_dir(&tree.dir(space))?;
        }
        Ok(tree)
    }

    /// Directory holding the headers of `space`, e.g., `<root>/kernel`
    pub fn dir(&self, space: AddressSpace) -> path::PathBuf {
        self.root.join(space.as_ref())
    }

    /// Write the headers of `module` for every address space
    ///
    /// Either every header of the module is written or none is: headers written before a failing
    /// one are removed again.
    ///
    /// # Errors
    ///
    /// A header cannot be written
    pub fn write_module(&self, module: &Module) -> Result<(), ApiError> {
        let fname = codegen::header_file_name(module.name());
        let headers = AddressSpace::iter()
            .map(|space| (self.dir(space).join(&fname), generate_header(module, space)))
            .collect::<Vec<_>>();

        for (idx, (path, contents)) in headers.iter().enumerate() {
            if let Err(e) = util::write_file(path, contents) {
                for (written, _) in &headers[..idx] {
                    if let Err(rm_err) = util::remove_file(written) {
                        warn!("cannot remove partial output: {rm_err}");
                    }
                }
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Parse `src` and write its headers
    ///
    /// Nothing is written if `src` fails to parse.
    ///
    /// # Errors
    ///
    /// - The description cannot be read or parsed
    /// - A header cannot be written
    pub fn convert(&self, src: &ModuleSource) -> Result<Module, ApiError> {
        let module = read_module(src)?;
        self.write_module(&module)?;
        info!(
            "convert {} to {}",
            src.path().display(),
            codegen::header_file_name(module.name())
        );
        Ok(module)
    }

    /// Write the aggregate header of every address space
    ///
    /// The aggregate includes every `.h` file found in the address space directory except itself.
    ///
    /// # Errors
    ///
    /// A directory cannot be listed or the aggregate cannot be written
    pub fn write_aggregates(&self) -> Result<(), ApiError> {
        for space in AddressSpace::iter() {
            let dir = self.dir(space);
            let headers = util::list_files(&dir)?
                .into_iter()
                .filter(|name| name.ends_with(".h") && *name != self.aggregate_name)
                .collect::<Vec<_>>();
            let contents = codegen::gen_aggregate(headers.iter().map(String::as_str));
            util::write_file(&dir.join(&self.aggregate_name), &contents)?;
            info!(
                "merged {} headers into {}",
                headers.len(),
                dir.join(&self.aggregate_name).display()
            );
        }
        Ok(())
    }
}

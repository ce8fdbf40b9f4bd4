//! Methods for reading and writing files

use std::{io, path};

use fs_err as fs;

/// Returns contents of the file at `path`
///
/// # Errors
///
/// The file does not exist or cannot be read as UTF-8. The error message names the path.
pub(crate) fn read_file(path: &path::Path) -> io::Result<String> {
    fs::read_to_string(path)
}

/// Replace the contents of the file at `path` with `contents`
pub(crate) fn write_file(path: &path::Path, contents: &str) -> io::Result<()> {
    fs::write(path, contents)
}

pub(crate) fn remove_file(path: &path::Path) -> io::Result<()> {
    fs::remove_file(path)
}

/// Create `dir` and any missing parents
pub(crate) fn create_dir(dir: &path::Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

/// Names of the regular files directly under `dir`, in sorted order
pub(crate) fn list_files(dir: &path::Path) -> io::Result<Vec<String>> {
    let mut names = vec![];
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort_unstable();
    Ok(names)
}

/// Subdirectories directly under `dir`, in sorted order
pub(crate) fn list_dirs(dir: &path::Path) -> io::Result<Vec<path::PathBuf>> {
    let mut dirs = vec![];
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort_unstable();
    Ok(dirs)
}

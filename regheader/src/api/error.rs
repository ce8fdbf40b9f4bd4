use std::{io, path};

use thiserror::Error;

use crate::error::ParseFileError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Parse(#[from] ParseFileError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("module directory name {0:?} is not valid UTF-8")]
    NonUtf8ModuleName(path::PathBuf),
}

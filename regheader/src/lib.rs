//! Regheader --- Generate C register headers from reStructuredText register tables.

// Export full API at crate root
pub use api::*;

mod api;
mod codegen;
mod error;
mod frontend;
mod model;
mod util;

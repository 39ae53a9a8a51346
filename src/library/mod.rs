//! Document store
//!
//! Reads document files and their metadata headers from the content
//! directory. One file per document; the file stem is the document id.

mod descriptor;
mod metadata;
mod store;

pub use descriptor::*;
pub use metadata::*;
pub use store::*;

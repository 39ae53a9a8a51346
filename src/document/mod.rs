//! Document compiler
//!
//! Turns a document body (markdown-style blocks plus JSX-style custom
//! components) into a serializable render tree. Compilation is pure and
//! fails the whole document on malformed block syntax.
//!
//! # Modules
//!
//! - `types`: render tree node types
//! - `parser`: block-level scan and the `Compiler` entry point
//! - `inline`: inline-level scan (emphasis, code spans, links, images)
//! - `code`: fence info strings and per-line code metadata
//! - `highlight`: syntax scopes for code tokens
//! - `error`: `ParseError`

mod code;
mod error;
mod highlight;
mod inline;
mod parser;
mod types;

pub use code::{build_lines, is_terminal_language, FenceInfo, HighlightSet, DEFAULT_LANGUAGE};
pub use error::{ParseError, Result};
pub use inline::parse_inlines;
pub use parser::{compile, slugify, CompileOptions, Compiler};
pub use types::*;

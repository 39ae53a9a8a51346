//! Compiler error types
//!
//! Any malformed block fails the whole document; there is no partial output.

use thiserror::Error;

/// Malformed block syntax in a document body. Line numbers are 1-based and
/// relative to the body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: code fence is never closed")]
    UnterminatedFence { line: usize },

    #[error("line {line}: table is missing its header separator row")]
    MissingTableSeparator { line: usize },

    #[error("line {line}: table separator has {found} columns, header has {expected}")]
    TableColumnMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: `:::{kind}` container is never closed")]
    UnterminatedContainer { line: usize, kind: String },

    #[error("line {line}: component <{name}> is never closed")]
    UnterminatedComponent { line: usize, name: String },

    #[error("line {line}: malformed component tag")]
    MalformedComponent { line: usize },

    #[error("line {line}: invalid highlight range `{range}`")]
    InvalidHighlightRange { line: usize, range: String },

    #[error("line {line}: blocks are nested too deeply")]
    NestingTooDeep { line: usize },
}

impl ParseError {
    /// Body line the error points at
    pub fn line(&self) -> usize {
        match self {
            Self::UnterminatedFence { line }
            | Self::MissingTableSeparator { line }
            | Self::TableColumnMismatch { line, .. }
            | Self::UnterminatedContainer { line, .. }
            | Self::UnterminatedComponent { line, .. }
            | Self::MalformedComponent { line }
            | Self::InvalidHighlightRange { line, .. }
            | Self::NestingTooDeep { line } => *line,
        }
    }
}

/// Result type alias for compiler operations
pub type Result<T> = std::result::Result<T, ParseError>;

//! Metadata header parsing
//!
//! A document starts with an optional header block delimited by `---` lines:
//!
//! ```text
//! ---
//! title: Backend Performance Optimization
//! publishedAt: 2024-11-15
//! tags: [Backend, "Performance"]
//! featured: true
//! ---
//! ```
//!
//! The block between the delimiters is YAML and must be a mapping (or
//! empty). Values are kept as JSON values so they serialize unchanged.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

/// Parsed header key/value pairs, in key order
pub type FrontMatter = BTreeMap<String, Value>;

const DELIMITER: &str = "---";

/// Header parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("metadata header opened on line 1 is never closed")]
    Unterminated,

    #[error("line {line}: invalid YAML: {message}")]
    Yaml { line: usize, message: String },

    #[error("metadata header must be a mapping of keys to values")]
    NotAMapping,
}

/// Split a document source into its header and body.
///
/// Sources without a leading `---` line have an empty header and the whole
/// source as body.
pub fn split_header(source: &str) -> Result<(FrontMatter, &str), HeaderError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    let mut lines = source.split_inclusive('\n');
    match lines.next() {
        Some(first) if first.trim_end() == DELIMITER => {}
        _ => return Ok((FrontMatter::new(), source)),
    }

    let header_start = source.find('\n').map(|i| i + 1).unwrap_or(source.len());
    let mut offset = header_start;

    for line in lines {
        let end = offset + line.len();
        if line.trim_end() == DELIMITER {
            let front_matter = parse_yaml(&source[header_start..offset])?;
            return Ok((front_matter, &source[end..]));
        }
        offset = end;
    }

    Err(HeaderError::Unterminated)
}

fn parse_yaml(header: &str) -> Result<FrontMatter, HeaderError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(header).map_err(|e| HeaderError::Yaml {
        // Header text starts on line 2 of the file
        line: e.location().map(|l| l.line() + 1).unwrap_or(2),
        message: e.to_string(),
    })?;

    match yaml {
        serde_yaml::Value::Null => Ok(FrontMatter::new()),
        serde_yaml::Value::Mapping(_) => match serde_json::to_value(&yaml) {
            Ok(Value::Object(map)) => Ok(map.into_iter().collect()),
            Ok(_) => Err(HeaderError::NotAMapping),
            Err(e) => Err(HeaderError::Yaml {
                line: 2,
                message: e.to_string(),
            }),
        },
        _ => Err(HeaderError::NotAMapping),
    }
}

//! Code block decoration
//!
//! Parses the fence info string (`rust title="main.rs" {1,3-5}`) and builds
//! the per-line metadata that keeps line-number gutters aligned.

use std::ops::RangeInclusive;
use std::sync::LazyLock;

use regex::Regex;

use super::error::{ParseError, Result};
use super::highlight::Highlighter;
use super::types::{CodeLine, CodeToken};

/// Language used when a fence has no info string
pub const DEFAULT_LANGUAGE: &str = "text";

/// Languages rendered as a terminal session
const TERMINAL_LANGUAGES: &[&str] = &["bash", "sh", "shell", "zsh", "terminal", "console"];

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"title=(?:"([^"]*)"|'([^']*)'|(\S+))"#).expect("title pattern is valid")
});

static RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]*)\}").expect("range pattern is valid"));

pub fn is_terminal_language(language: &str) -> bool {
    TERMINAL_LANGUAGES.contains(&language)
}

/// Parsed fence info string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceInfo {
    pub language: String,
    pub title: Option<String>,
    pub meta: Option<String>,
    pub highlights: HighlightSet,
}

impl FenceInfo {
    /// Parse the info string of a fence opened on body line `line`
    pub fn parse(info: &str, line: usize) -> Result<Self> {
        let info = info.trim();
        let (first, rest) = info
            .split_once(char::is_whitespace)
            .unwrap_or((info, ""));

        // `{1,2}` or `title=...` directly after the fence means no language
        let (language, meta) = if first.is_empty() || first.starts_with('{') || first.contains('=') {
            (DEFAULT_LANGUAGE.to_string(), info)
        } else {
            let language = first.strip_prefix("language-").unwrap_or(first);
            (language.to_ascii_lowercase(), rest.trim())
        };

        let title = TITLE_RE.captures(meta).and_then(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().to_string())
        });

        let mut highlights = HighlightSet::default();
        for caps in RANGE_RE.captures_iter(meta) {
            highlights.extend(&caps[1], line)?;
        }

        Ok(Self {
            language,
            title: title.filter(|t| !t.is_empty()),
            meta: (!meta.is_empty()).then(|| meta.to_string()),
            highlights,
        })
    }
}

/// Highlighted line numbers from `{1,3-5}` specs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightSet {
    ranges: Vec<RangeInclusive<usize>>,
}

impl HighlightSet {
    fn extend(&mut self, spec: &str, line: usize) -> Result<()> {
        let invalid = || ParseError::InvalidHighlightRange {
            line,
            range: spec.to_string(),
        };

        for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let range = match part.split_once('-') {
                Some((start, end)) => {
                    let start: usize = start.trim().parse().map_err(|_| invalid())?;
                    let end: usize = end.trim().parse().map_err(|_| invalid())?;
                    start..=end
                }
                None => {
                    let n: usize = part.parse().map_err(|_| invalid())?;
                    n..=n
                }
            };
            if *range.start() == 0 || range.start() > range.end() {
                return Err(invalid());
            }
            self.ranges.push(range);
        }
        Ok(())
    }

    pub fn contains(&self, line_number: usize) -> bool {
        self.ranges.iter().any(|r| r.contains(&line_number))
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Build line metadata for the content lines of a code block.
///
/// Produces exactly one entry per content line. Lines without visible
/// characters get a single space token; other lines are split into
/// syntax-classified tokens.
pub fn build_lines(
    content: &[&str],
    language: &str,
    highlights: &HighlightSet,
    tab_size: usize,
) -> Vec<CodeLine> {
    let terminal = is_terminal_language(language);
    let mut highlighter = Highlighter::new(language);

    content
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let number = i + 1;
            CodeLine {
                number,
                highlighted: highlights.contains(number),
                tokens: tokenize(line, terminal, tab_size, &mut highlighter),
            }
        })
        .collect()
}

fn tokenize(
    line: &str,
    terminal: bool,
    tab_size: usize,
    highlighter: &mut Highlighter,
) -> Vec<CodeToken> {
    let text = expand_tabs(line, tab_size);
    if text.trim().is_empty() {
        highlighter.advance(&text);
        return vec![CodeToken::plain(" ")];
    }

    if terminal {
        let body = text.trim_start();
        let indent = &text[..text.len() - body.len()];
        if body.starts_with(['$', '#', '>']) {
            let prompt_len = 1 + body[1..].len() - body[1..].trim_start().len();
            let (prompt, command) = body.split_at(prompt_len);

            let mut tokens = Vec::with_capacity(3);
            if !indent.is_empty() {
                tokens.push(CodeToken::plain(indent));
            }
            tokens.push(CodeToken::prompt(prompt));
            if !command.is_empty() {
                tokens.extend(highlighter.line(command));
            }
            return tokens;
        }
        // Command output is not shell code
        return vec![CodeToken::plain(text)];
    }

    highlighter.line(&text)
}

fn expand_tabs(line: &str, tab_size: usize) -> String {
    if tab_size == 0 || !line.contains('\t') {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + tab_size);
    let mut column = 0;
    for ch in line.chars() {
        if ch == '\t' {
            let pad = tab_size - column % tab_size;
            out.extend(std::iter::repeat(' ').take(pad));
            column += pad;
        } else {
            out.push(ch);
            column += 1;
        }
    }
    out
}

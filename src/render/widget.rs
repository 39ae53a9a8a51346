//! Presentation widgets
//!
//! Toolkit-neutral description of what the reader shows. A front end maps
//! each widget to its own components.

use crate::document::{Alignment, CodeLine};

/// Heading sizes, largest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingSize {
    Xl3,
    Xl2,
    Xl,
    Lg,
    Md,
    Sm,
}

impl HeadingSize {
    pub fn for_level(level: u8) -> Self {
        match level {
            0 | 1 => HeadingSize::Xl3,
            2 => HeadingSize::Xl2,
            3 => HeadingSize::Xl,
            4 => HeadingSize::Lg,
            5 => HeadingSize::Md,
            _ => HeadingSize::Sm,
        }
    }
}

/// Visual treatment of a callout box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalloutTreatment {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
    Default,
}

impl CalloutTreatment {
    /// Map an admonition kind, accepting the common aliases
    pub fn from_kind(kind: &str) -> Self {
        match kind.trim().to_ascii_lowercase().as_str() {
            "note" | "info" => CalloutTreatment::Note,
            "tip" | "hint" | "success" => CalloutTreatment::Tip,
            "important" => CalloutTreatment::Important,
            "warning" | "warn" => CalloutTreatment::Warning,
            "caution" | "danger" | "error" => CalloutTreatment::Caution,
            _ => CalloutTreatment::Default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmphasisKind {
    Strong,
    Emphasis,
}

/// Icon shown next to a code block's filename
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileIcon {
    Script,
    Data,
    Markup,
    Style,
    Terminal,
    Generic,
}

/// Code display
#[derive(Debug, Clone, PartialEq)]
pub struct CodeView {
    pub language: String,
    pub display_name: String,
    pub filename: String,
    pub icon: FileIcon,
    pub terminal: bool,
    pub show_line_numbers: bool,
    /// Starts collapsed with an expand control
    pub collapsed: bool,
    pub lines: Vec<CodeLine>,
    /// Text placed on the clipboard by the copy control
    pub copy_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Column {
        children: Vec<Widget>,
    },
    Heading {
        size: HeadingSize,
        anchor: String,
        children: Vec<Widget>,
    },
    Paragraph {
        children: Vec<Widget>,
    },
    List {
        ordered: bool,
        start: u64,
        items: Vec<Vec<Widget>>,
    },
    Code(CodeView),
    Table {
        alignments: Vec<Alignment>,
        header: Vec<Vec<Widget>>,
        rows: Vec<Vec<Vec<Widget>>>,
    },
    Figure {
        src: String,
        alt: String,
        caption: Option<String>,
    },
    Callout {
        treatment: CalloutTreatment,
        title: Option<String>,
        children: Vec<Widget>,
    },
    Quote {
        children: Vec<Widget>,
    },
    Divider,
    Text(String),
    Emphasis {
        kind: EmphasisKind,
        children: Vec<Widget>,
    },
    CodeSpan(String),
    Link {
        href: String,
        /// Opens outside the site
        external: bool,
        children: Vec<Widget>,
    },
    /// Block the reader has no dedicated treatment for; children render plainly
    Passthrough {
        label: String,
        children: Vec<Widget>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_sizes() {
        assert_eq!(HeadingSize::for_level(1), HeadingSize::Xl3);
        assert_eq!(HeadingSize::for_level(4), HeadingSize::Lg);
        assert_eq!(HeadingSize::for_level(6), HeadingSize::Sm);
    }

    #[test]
    fn test_callout_treatments() {
        assert_eq!(CalloutTreatment::from_kind("NOTE"), CalloutTreatment::Note);
        assert_eq!(CalloutTreatment::from_kind("danger"), CalloutTreatment::Caution);
        assert_eq!(CalloutTreatment::from_kind("important"), CalloutTreatment::Important);
        assert_eq!(CalloutTreatment::from_kind("sparkles"), CalloutTreatment::Default);
    }
}

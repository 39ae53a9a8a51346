//! Render tree types
//!
//! The compiled, transportable form of a document body. Serialized as JSON
//! with a `type` tag on every node.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::library::FrontMatter;

/// Compiled document: render tree plus the header it was compiled with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledDocument {
    pub render_tree: RenderNode,
    pub front_matter: FrontMatter,
}

/// One node of the render tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderNode {
    Root {
        children: Vec<RenderNode>,
    },
    Heading {
        level: u8,
        /// Anchor slug, unique within the document
        id: String,
        children: Vec<RenderNode>,
    },
    Paragraph {
        children: Vec<RenderNode>,
    },
    List {
        ordered: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<u64>,
        items: Vec<ListItem>,
    },
    CodeBlock(CodeBlock),
    Table(Table),
    Image {
        src: String,
        alt: String,
    },
    Admonition {
        kind: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        children: Vec<RenderNode>,
    },
    BlockQuote {
        children: Vec<RenderNode>,
    },
    ThematicBreak,
    Text {
        value: String,
    },
    Strong {
        children: Vec<RenderNode>,
    },
    Emphasis {
        children: Vec<RenderNode>,
    },
    InlineCode {
        value: String,
    },
    Link {
        href: String,
        children: Vec<RenderNode>,
    },
    /// Custom block component, e.g. `<Callout type="tip">`
    Component {
        name: String,
        props: BTreeMap<String, String>,
        children: Vec<RenderNode>,
    },
    /// Any node type this build does not know about
    #[serde(other)]
    Unknown,
}

impl RenderNode {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    /// Direct children of this node, in order
    pub fn children(&self) -> &[RenderNode] {
        match self {
            Self::Root { children }
            | Self::Heading { children, .. }
            | Self::Paragraph { children }
            | Self::Admonition { children, .. }
            | Self::BlockQuote { children }
            | Self::Strong { children }
            | Self::Emphasis { children }
            | Self::Link { children, .. }
            | Self::Component { children, .. } => children,
            _ => &[],
        }
    }

    /// Concatenated text content, used for heading anchors
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text { value } | Self::InlineCode { value } => out.push_str(value),
            Self::Image { alt, .. } => out.push_str(alt),
            other => other.children().iter().for_each(|c| c.collect_text(out)),
        }
    }
}

/// One item of a list; holds block content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub children: Vec<RenderNode>,
}

/// Fenced code block with per-line metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeBlock {
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Fence info string after the language, verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    pub raw: String,
    pub lines: Vec<CodeLine>,
}

/// One line of a code block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeLine {
    /// 1-based line number
    pub number: usize,
    pub highlighted: bool,
    /// Never empty: blank lines carry a single space token
    pub tokens: Vec<CodeToken>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeToken {
    pub kind: TokenKind,
    pub text: String,
}

impl CodeToken {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Plain,
            text: text.into(),
        }
    }

    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Prompt,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Plain,
    /// Shell prompt marker in terminal blocks
    Prompt,
    Keyword,
    String,
    Comment,
    Number,
    /// Language constants such as `true` or `None`
    Constant,
    Function,
    Type,
    Operator,
    Punctuation,
}

/// Table with a header row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub alignments: Vec<Alignment>,
    pub header: Vec<TableCell>,
    /// Body rows, each normalized to the header width
    pub rows: Vec<Vec<TableCell>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub children: Vec<RenderNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    None,
    Left,
    Center,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_tags() {
        let node = RenderNode::Heading {
            level: 2,
            id: "intro".to_string(),
            children: vec![RenderNode::text("Intro")],
        };
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["type"], "heading");
        assert_eq!(json["children"][0], json!({"type": "text", "value": "Intro"}));
    }

    #[test]
    fn test_unknown_node_type_deserializes() {
        let node: RenderNode =
            serde_json::from_value(json!({"type": "mermaidDiagram", "source": "graph"})).unwrap();
        assert_eq!(node, RenderNode::Unknown);
    }

    #[test]
    fn test_plain_text() {
        let node = RenderNode::Paragraph {
            children: vec![
                RenderNode::text("Use "),
                RenderNode::InlineCode {
                    value: "cargo".to_string(),
                },
                RenderNode::Strong {
                    children: vec![RenderNode::text(" now")],
                },
            ],
        };
        assert_eq!(node.plain_text(), "Use cargo now");
    }
}

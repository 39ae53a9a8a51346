//! Render tree interpreter
//!
//! Total mapping from render nodes to widgets. Nodes and components without
//! a dedicated rule become `Passthrough` so one unfamiliar block never
//! blocks the rest of the document.

use crate::document::{RenderNode, TableCell};

use super::code::code_view;
use super::widget::{CalloutTreatment, EmphasisKind, HeadingSize, Widget};

/// Build the widget tree for a render tree
pub fn render(tree: &RenderNode) -> Widget {
    match tree {
        RenderNode::Root { children } => Widget::Column {
            children: render_all(children),
        },
        RenderNode::Heading { level, id, children } => Widget::Heading {
            size: HeadingSize::for_level(*level),
            anchor: id.clone(),
            children: render_all(children),
        },
        RenderNode::Paragraph { children } => Widget::Paragraph {
            children: render_all(children),
        },
        RenderNode::List { ordered, start, items } => Widget::List {
            ordered: *ordered,
            start: start.unwrap_or(1),
            items: items.iter().map(|item| render_all(&item.children)).collect(),
        },
        RenderNode::CodeBlock(block) => Widget::Code(code_view(block)),
        RenderNode::Table(table) => Widget::Table {
            alignments: table.alignments.clone(),
            header: render_cells(&table.header),
            rows: table.rows.iter().map(|row| render_cells(row)).collect(),
        },
        RenderNode::Image { src, alt } => Widget::Figure {
            src: src.clone(),
            alt: alt.clone(),
            caption: None,
        },
        RenderNode::Admonition { kind, title, children } => Widget::Callout {
            treatment: CalloutTreatment::from_kind(kind),
            title: title.clone(),
            children: render_all(children),
        },
        RenderNode::BlockQuote { children } => Widget::Quote {
            children: render_all(children),
        },
        RenderNode::ThematicBreak => Widget::Divider,
        RenderNode::Text { value } => Widget::Text(value.clone()),
        RenderNode::Strong { children } => Widget::Emphasis {
            kind: EmphasisKind::Strong,
            children: render_all(children),
        },
        RenderNode::Emphasis { children } => Widget::Emphasis {
            kind: EmphasisKind::Emphasis,
            children: render_all(children),
        },
        RenderNode::InlineCode { value } => Widget::CodeSpan(value.clone()),
        RenderNode::Link { href, children } => Widget::Link {
            href: href.clone(),
            external: is_external(href),
            children: render_all(children),
        },
        RenderNode::Component { name, props, children } => match name.as_str() {
            "Callout" | "Admonition" | "Alert" => Widget::Callout {
                treatment: props
                    .get("type")
                    .or_else(|| props.get("kind"))
                    .map(|kind| CalloutTreatment::from_kind(kind))
                    .unwrap_or(CalloutTreatment::Default),
                title: props.get("title").cloned(),
                children: render_all(children),
            },
            "Image" | "Figure" => Widget::Figure {
                src: props.get("src").cloned().unwrap_or_default(),
                alt: props.get("alt").cloned().unwrap_or_default(),
                caption: props.get("caption").cloned(),
            },
            _ => Widget::Passthrough {
                label: name.clone(),
                children: render_all(children),
            },
        },
        RenderNode::Unknown => Widget::Passthrough {
            label: "unknown".to_string(),
            children: Vec::new(),
        },
    }
}

fn render_all(nodes: &[RenderNode]) -> Vec<Widget> {
    nodes.iter().map(render).collect()
}

fn render_cells(cells: &[TableCell]) -> Vec<Vec<Widget>> {
    cells.iter().map(|cell| render_all(&cell.children)).collect()
}

fn is_external(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://") || href.starts_with("//")
}

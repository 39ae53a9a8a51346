//! Inline-level scan
//!
//! Turns the text of one block into leaf nodes: text, strong, emphasis,
//! inline code, links and images. Unmatched markers are kept as literal text.

use super::types::RenderNode;

/// Deepest nesting of links and emphasis; anything deeper stays literal
const MAX_INLINE_DEPTH: usize = 32;

/// Parse inline content of a block
pub fn parse_inlines(text: &str) -> Vec<RenderNode> {
    scan(text, 0)
}

fn scan(text: &str, depth: usize) -> Vec<RenderNode> {
    if depth > MAX_INLINE_DEPTH {
        return vec![RenderNode::text(text)];
    }

    let mut out = InlineBuilder::default();
    let mut pos = 0;
    let mut prev: Option<char> = None;

    while pos < text.len() {
        let rest = &text[pos..];
        let Some(ch) = rest.chars().next() else { break };

        let consumed = match ch {
            '\\' => escape(rest, &mut out),
            '`' => code_span(rest, &mut out),
            '!' if rest.starts_with("![") => image(rest, &mut out),
            '[' => link(rest, depth, &mut out),
            '*' => emphasis(rest, ch, depth, &mut out),
            // No intraword underscore emphasis: `snake_case_name`
            '_' if !prev.is_some_and(char::is_alphanumeric) => emphasis(rest, ch, depth, &mut out),
            _ => None,
        };

        match consumed {
            Some(len) => pos += len,
            None => {
                out.push_char(ch);
                pos += ch.len_utf8();
            }
        }
        prev = text[..pos].chars().next_back();
    }

    out.finish()
}

/// Accumulates nodes, merging adjacent text
#[derive(Default)]
struct InlineBuilder {
    nodes: Vec<RenderNode>,
    text: String,
}

impl InlineBuilder {
    fn push_char(&mut self, ch: char) {
        self.text.push(ch);
    }

    fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    fn push_node(&mut self, node: RenderNode) {
        self.flush();
        self.nodes.push(node);
    }

    fn flush(&mut self) {
        if !self.text.is_empty() {
            self.nodes.push(RenderNode::text(std::mem::take(&mut self.text)));
        }
    }

    fn finish(mut self) -> Vec<RenderNode> {
        self.flush();
        self.nodes
    }
}

fn escape(rest: &str, out: &mut InlineBuilder) -> Option<usize> {
    let next = rest[1..].chars().next()?;
    if next.is_ascii_punctuation() {
        out.push_char(next);
        Some(1 + next.len_utf8())
    } else {
        None
    }
}

fn code_span(rest: &str, out: &mut InlineBuilder) -> Option<usize> {
    let run = rest.len() - rest.trim_start_matches('`').len();
    let fence = &rest[..run];
    let body = &rest[run..];

    let mut search = 0;
    while let Some(found) = body[search..].find(fence) {
        let at = search + found;
        let closing_run = body[at..].len() - body[at..].trim_start_matches('`').len();
        if closing_run == run {
            let inner = &body[..at];
            // One surrounding space is stripped so code can start with a backtick
            let value = match inner.strip_prefix(' ').and_then(|s| s.strip_suffix(' ')) {
                Some(stripped) if !stripped.trim().is_empty() => stripped,
                _ => inner,
            };
            out.push_node(RenderNode::InlineCode {
                value: value.to_string(),
            });
            return Some(run + at + run);
        }
        search = at + closing_run;
    }

    // No closing run: the whole backtick run is literal
    out.push_str(fence);
    Some(run)
}

/// Parse `[label](target)` starting at `rest`; returns label, target and length
fn bracket_target(rest: &str) -> Option<(&str, &str, usize)> {
    debug_assert!(rest.starts_with('['));
    let mut depth = 0usize;
    let mut close = None;
    let mut chars = rest.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    let close = close?;
    let after = &rest[close + 1..];
    let target_body = after.strip_prefix('(')?;
    let end = target_body.find(')')?;
    let target = target_body[..end].trim();
    // `(url "title")`: keep only the destination
    let target = target.split_whitespace().next().unwrap_or("");

    Some((&rest[1..close], target, close + 1 + 1 + end + 1))
}

fn image(rest: &str, out: &mut InlineBuilder) -> Option<usize> {
    let (alt, src, len) = bracket_target(&rest[1..])?;
    out.push_node(RenderNode::Image {
        src: src.to_string(),
        alt: alt.to_string(),
    });
    Some(1 + len)
}

fn link(rest: &str, depth: usize, out: &mut InlineBuilder) -> Option<usize> {
    let (label, href, len) = bracket_target(rest)?;
    out.push_node(RenderNode::Link {
        href: href.to_string(),
        children: scan(label, depth + 1),
    });
    Some(len)
}

fn emphasis(rest: &str, marker: char, depth: usize, out: &mut InlineBuilder) -> Option<usize> {
    let run = rest.len() - rest.trim_start_matches(marker).len();
    let width = if run >= 2 { 2 } else { 1 };
    let delim = &rest[..width];
    let body = &rest[width..];

    // Openers must be followed by non-whitespace
    if body.starts_with(char::is_whitespace) || body.is_empty() {
        return None;
    }

    let mut search = 0;
    while let Some(found) = body[search..].find(delim) {
        let at = search + found;
        let inner = &body[..at];
        let closes = !inner.is_empty()
            && !inner.ends_with(char::is_whitespace)
            // A single marker must not close on half of a double one
            && (width == 2 || !body[at + 1..].starts_with(marker))
            && (marker == '*' || !body[at + width..].starts_with(char::is_alphanumeric));
        if closes {
            let children = scan(inner, depth + 1);
            out.push_node(if width == 2 {
                RenderNode::Strong { children }
            } else {
                RenderNode::Emphasis { children }
            });
            return Some(width + at + width);
        }
        search = at + width;
    }

    // Unmatched run is literal
    out.push_str(&rest[..run]);
    Some(run)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RenderNode {
        RenderNode::text(s)
    }

    #[test]
    fn test_plain_text_merges() {
        assert_eq!(parse_inlines("hello world"), vec![text("hello world")]);
    }

    #[test]
    fn test_strong_and_emphasis() {
        let nodes = parse_inlines("a **bold** and *it* and _u_");
        assert_eq!(
            nodes,
            vec![
                text("a "),
                RenderNode::Strong { children: vec![text("bold")] },
                text(" and "),
                RenderNode::Emphasis { children: vec![text("it")] },
                text(" and "),
                RenderNode::Emphasis { children: vec![text("u")] },
            ]
        );
    }

    #[test]
    fn test_nested_emphasis_in_strong() {
        let nodes = parse_inlines("**a *b* c**");
        assert_eq!(
            nodes,
            vec![RenderNode::Strong {
                children: vec![
                    text("a "),
                    RenderNode::Emphasis { children: vec![text("b")] },
                    text(" c"),
                ]
            }]
        );
    }

    #[test]
    fn test_unmatched_markers_are_literal() {
        assert_eq!(parse_inlines("2 * 3 = 6"), vec![text("2 * 3 = 6")]);
        assert_eq!(parse_inlines("**open"), vec![text("**open")]);
        assert_eq!(parse_inlines("`tick"), vec![text("`tick")]);
    }

    #[test]
    fn test_code_span() {
        assert_eq!(
            parse_inlines("run `cargo *test*` now"),
            vec![
                text("run "),
                RenderNode::InlineCode { value: "cargo *test*".to_string() },
                text(" now"),
            ]
        );
        assert_eq!(
            parse_inlines("`` a`b ``"),
            vec![RenderNode::InlineCode { value: "a`b".to_string() }]
        );
    }

    #[test]
    fn test_link_and_image() {
        let nodes = parse_inlines("see [the **docs**](https://x.dev \"t\") ![logo](/l.png)");
        assert_eq!(
            nodes,
            vec![
                text("see "),
                RenderNode::Link {
                    href: "https://x.dev".to_string(),
                    children: vec![
                        text("the "),
                        RenderNode::Strong { children: vec![text("docs")] },
                    ],
                },
                text(" "),
                RenderNode::Image { src: "/l.png".to_string(), alt: "logo".to_string() },
            ]
        );
    }

    #[test]
    fn test_bracket_without_target() {
        assert_eq!(parse_inlines("[not a link]"), vec![text("[not a link]")]);
    }

    #[test]
    fn test_intraword_underscore_is_literal() {
        assert_eq!(parse_inlines("snake_case_name"), vec![text("snake_case_name")]);
        assert_eq!(
            parse_inlines("_whole_ word"),
            vec![RenderNode::Emphasis { children: vec![text("whole")] }, text(" word")]
        );
    }

    #[test]
    fn test_deeply_nested_links_stay_bounded() {
        let levels = 5_000;
        let text = format!("{}x{}", "[a ".repeat(levels), "](u)".repeat(levels));
        let nodes = parse_inlines(&text);

        let mut depth = 0;
        let mut node = &nodes[0];
        while let RenderNode::Link { children, .. } = node {
            depth += 1;
            node = children.last().unwrap();
        }
        assert_eq!(depth, MAX_INLINE_DEPTH + 1);
        assert!(matches!(node, RenderNode::Text { .. }));
    }

    #[test]
    fn test_escapes() {
        assert_eq!(parse_inlines(r"\*literal\*"), vec![text("*literal*")]);
        assert_eq!(parse_inlines(r"back\slash"), vec![text(r"back\slash")]);
    }
}

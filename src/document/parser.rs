//! Block-level scan
//!
//! A single left-to-right pass over the body lines builds the block tree;
//! each block's text then goes through the inline scan. Container blocks
//! (list items, quotes, `:::` directives, components) re-run the block scan
//! over their own lines, so line numbers in errors always refer to the body.

use std::collections::{BTreeMap, HashMap};

use super::code::{build_lines, FenceInfo};
use super::error::{ParseError, Result};
use super::inline::parse_inlines;
use super::types::{
    Alignment, CodeBlock, CompiledDocument, ListItem, RenderNode, Table, TableCell,
};
use crate::library::FrontMatter;

/// Compiler options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Tab stop width for code line tokens; 0 keeps tabs
    pub tab_size: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { tab_size: 2 }
    }
}

/// Document compiler
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile a document body into a render tree.
    ///
    /// Pure and deterministic. Any malformed block fails the whole document.
    pub fn compile(&self, raw_body: &str, front_matter: FrontMatter) -> Result<CompiledDocument> {
        let lines: Vec<Line<'_>> = raw_body
            .lines()
            .enumerate()
            .map(|(i, text)| Line { number: i + 1, text })
            .collect();

        let mut ctx = Context {
            options: &self.options,
            slugs: HashMap::new(),
            depth: 0,
        };
        let children = parse_blocks(&lines, &mut ctx)?;

        Ok(CompiledDocument {
            render_tree: RenderNode::Root { children },
            front_matter,
        })
    }
}

/// Compile with default options
pub fn compile(raw_body: &str, front_matter: FrontMatter) -> Result<CompiledDocument> {
    Compiler::default().compile(raw_body, front_matter)
}

#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    /// 1-based body line number
    number: usize,
    text: &'a str,
}

impl<'a> Line<'a> {
    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    fn indent(&self) -> usize {
        leading_spaces(self.text)
    }

    /// Drop up to `n` leading spaces
    fn dedent(&self, n: usize) -> Line<'a> {
        let strip = leading_spaces(self.text).min(n);
        Line {
            number: self.number,
            text: &self.text[strip..],
        }
    }
}

struct Context<'o> {
    options: &'o CompileOptions,
    /// Heading anchors already handed out, for de-duplication
    slugs: HashMap<String, usize>,
    /// Container blocks currently open around the scan
    depth: usize,
}

impl Context<'_> {
    fn unique_slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let seen = self.slugs.entry(base.clone()).or_insert(0);
        *seen += 1;
        if *seen == 1 {
            base
        } else {
            format!("{}-{}", base, *seen - 1)
        }
    }
}

/// Deepest container nesting (quotes, lists, directives, components)
const MAX_NESTING: usize = 64;

/// Block scan of a container's content, opened on body line `line`
fn parse_nested(lines: &[Line<'_>], line: usize, ctx: &mut Context<'_>) -> Result<Vec<RenderNode>> {
    if ctx.depth >= MAX_NESTING {
        return Err(ParseError::NestingTooDeep { line });
    }
    ctx.depth += 1;
    let result = parse_blocks(lines, ctx);
    ctx.depth -= 1;
    result
}

fn parse_blocks(lines: &[Line<'_>], ctx: &mut Context<'_>) -> Result<Vec<RenderNode>> {
    let mut nodes = Vec::new();
    let mut pos = 0;

    while pos < lines.len() {
        let line = lines[pos];
        if line.is_blank() {
            pos += 1;
            continue;
        }
        let rest = line.text.trim_start();

        let (node, next) = if let Some(fence) = Fence::open(rest) {
            parse_fence(lines, pos, fence, ctx)?
        } else if let Some((level, content)) = heading(rest) {
            let children = parse_inlines(content);
            let anchor: String = children.iter().map(RenderNode::plain_text).collect();
            let id = ctx.unique_slug(&anchor);
            (RenderNode::Heading { level, id, children }, pos + 1)
        } else if is_thematic_break(rest) {
            (RenderNode::ThematicBreak, pos + 1)
        } else if let Some((kind, title)) = container_open(rest) {
            parse_container(lines, pos, kind, title, ctx)?
        } else if is_component_start(rest) {
            parse_component(lines, pos, ctx)?
        } else if rest.starts_with('>') {
            parse_quote(lines, pos, ctx)?
        } else if rest.starts_with('|') {
            parse_table(lines, pos)?
        } else if let Some(marker) = ListMarker::parse(line.text) {
            parse_list(lines, pos, marker, ctx)?
        } else {
            parse_paragraph(lines, pos)
        };

        nodes.push(node);
        pos = next;
    }

    Ok(nodes)
}

/// Whether a (left-trimmed) line begins a block that interrupts a paragraph
fn starts_block(rest: &str) -> bool {
    Fence::open(rest).is_some()
        || heading(rest).is_some()
        || is_thematic_break(rest)
        || container_open(rest).is_some()
        || is_component_start(rest)
        || rest.starts_with('>')
        || rest.starts_with('|')
        || ListMarker::parse(rest).is_some()
}

// ============================================================================
// Code fences
// ============================================================================

struct Fence<'a> {
    marker: char,
    len: usize,
    info: &'a str,
}

impl<'a> Fence<'a> {
    fn open(rest: &'a str) -> Option<Self> {
        let marker = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = rest.len() - rest.trim_start_matches(marker).len();
        if len < 3 {
            return None;
        }
        let info = &rest[len..];
        if marker == '`' && info.contains('`') {
            return None;
        }
        Some(Self { marker, len, info })
    }

    fn closes(&self, line: &Line<'_>) -> bool {
        let rest = line.text.trim_start();
        let run = rest.len() - rest.trim_start_matches(self.marker).len();
        run >= self.len && rest[run..].trim().is_empty()
    }
}

fn parse_fence(
    lines: &[Line<'_>],
    pos: usize,
    fence: Fence<'_>,
    ctx: &mut Context<'_>,
) -> Result<(RenderNode, usize)> {
    let open = lines[pos];
    let indent = open.indent();

    let close = lines[pos + 1..]
        .iter()
        .position(|l| fence.closes(l))
        .map(|i| pos + 1 + i)
        .ok_or(ParseError::UnterminatedFence { line: open.number })?;

    let info = FenceInfo::parse(fence.info, open.number)?;
    let content: Vec<&str> = lines[pos + 1..close]
        .iter()
        .map(|l| l.dedent(indent).text)
        .collect();

    let code_lines = build_lines(&content, &info.language, &info.highlights, ctx.options.tab_size);
    let node = RenderNode::CodeBlock(CodeBlock {
        language: info.language,
        title: info.title,
        meta: info.meta,
        raw: content.join("\n"),
        lines: code_lines,
    });

    Ok((node, close + 1))
}

// ============================================================================
// Headings, breaks, paragraphs
// ============================================================================

fn heading(rest: &str) -> Option<(u8, &str)> {
    let level = rest.len() - rest.trim_start_matches('#').len();
    if !(1..=6).contains(&level) {
        return None;
    }
    let after = &rest[level..];
    if !(after.is_empty() || after.starts_with(' ') || after.starts_with('\t')) {
        return None;
    }

    let content = after.trim();
    // Optional closing sequence: `## Title ##`
    let without_closing = content.trim_end_matches('#');
    let content = if without_closing.is_empty() || without_closing.ends_with(' ') {
        without_closing.trim_end()
    } else {
        content
    };

    Some((level as u8, content))
}

fn is_thematic_break(rest: &str) -> bool {
    let mut chars = rest.chars().filter(|c| !c.is_whitespace());
    let Some(first) = chars.next() else {
        return false;
    };
    if !matches!(first, '-' | '*' | '_') {
        return false;
    }
    let mut count = 1;
    for c in chars {
        if c != first {
            return false;
        }
        count += 1;
    }
    count >= 3
}

fn parse_paragraph(lines: &[Line<'_>], pos: usize) -> (RenderNode, usize) {
    let mut end = pos + 1;
    while end < lines.len() && !lines[end].is_blank() && !starts_block(lines[end].text.trim_start()) {
        end += 1;
    }

    let text = lines[pos..end]
        .iter()
        .map(|l| l.text.trim())
        .collect::<Vec<_>>()
        .join(" ");

    (
        RenderNode::Paragraph {
            children: parse_inlines(&text),
        },
        end,
    )
}

/// Heading anchor: lowercase words joined by `-`
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

// ============================================================================
// Quotes and admonitions
// ============================================================================

fn parse_quote(
    lines: &[Line<'_>],
    pos: usize,
    ctx: &mut Context<'_>,
) -> Result<(RenderNode, usize)> {
    let mut end = pos;
    let mut inner = Vec::new();
    while end < lines.len() {
        let Some(stripped) = lines[end].text.trim_start().strip_prefix('>') else {
            break;
        };
        inner.push(Line {
            number: lines[end].number,
            text: stripped.strip_prefix(' ').unwrap_or(stripped),
        });
        end += 1;
    }

    // GitHub alert: `> [!NOTE] optional title`
    if let Some(first) = inner.first() {
        if let Some((kind, title)) = alert_marker(first.text) {
            let children = parse_nested(&inner[1..], lines[pos].number, ctx)?;
            return Ok((
                RenderNode::Admonition {
                    kind,
                    title,
                    children,
                },
                end,
            ));
        }
    }

    let children = parse_nested(&inner, lines[pos].number, ctx)?;
    Ok((RenderNode::BlockQuote { children }, end))
}

fn alert_marker(text: &str) -> Option<(String, Option<String>)> {
    let body = text.trim().strip_prefix("[!")?;
    let (kind, title) = body.split_once(']')?;
    if kind.is_empty() || !kind.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let title = title.trim();
    Some((
        kind.to_ascii_lowercase(),
        (!title.is_empty()).then(|| title.to_string()),
    ))
}

/// `:::kind optional title`
fn container_open(rest: &str) -> Option<(String, Option<String>)> {
    let body = rest.strip_prefix(":::")?.trim_start_matches(':');
    let kind_len = body
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(body.len());
    if kind_len == 0 {
        return None;
    }
    let title = body[kind_len..].trim();
    Some((
        body[..kind_len].to_ascii_lowercase(),
        (!title.is_empty()).then(|| title.to_string()),
    ))
}

fn is_container_close(line: &Line<'_>) -> bool {
    let rest = line.text.trim();
    rest.len() >= 3 && rest.chars().all(|c| c == ':')
}

fn parse_container(
    lines: &[Line<'_>],
    pos: usize,
    kind: String,
    title: Option<String>,
    ctx: &mut Context<'_>,
) -> Result<(RenderNode, usize)> {
    let mut depth = 0usize;
    let mut close = None;
    let mut in_fence: Option<Fence<'_>> = None;

    for (i, line) in lines.iter().enumerate().skip(pos + 1) {
        let rest = line.text.trim_start();
        if let Some(fence) = &in_fence {
            if fence.closes(line) {
                in_fence = None;
            }
            continue;
        }
        if let Some(fence) = Fence::open(rest) {
            in_fence = Some(fence);
        } else if container_open(rest).is_some() {
            depth += 1;
        } else if is_container_close(line) {
            if depth == 0 {
                close = Some(i);
                break;
            }
            depth -= 1;
        }
    }

    let close = close.ok_or_else(|| ParseError::UnterminatedContainer {
        line: lines[pos].number,
        kind: kind.clone(),
    })?;
    let children = parse_nested(&lines[pos + 1..close], lines[pos].number, ctx)?;

    Ok((
        RenderNode::Admonition {
            kind,
            title,
            children,
        },
        close + 1,
    ))
}

// ============================================================================
// Custom components
// ============================================================================

fn is_component_start(rest: &str) -> bool {
    rest.strip_prefix('<')
        .and_then(|r| r.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

struct Tag<'a> {
    name: &'a str,
    props: BTreeMap<String, String>,
    self_closing: bool,
    /// Text after the tag on the same line
    tail: &'a str,
}

/// Parse `<Name key="value" flag other={expr}>` or the self-closing form
fn parse_tag(rest: &str) -> Option<Tag<'_>> {
    let body = rest.strip_prefix('<')?;
    let name_len = body
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '.' || c == '_'))
        .unwrap_or(body.len());
    let name = &body[..name_len];
    let mut cursor = &body[name_len..];
    let mut props = BTreeMap::new();

    loop {
        cursor = cursor.trim_start();
        if let Some(tail) = cursor.strip_prefix("/>") {
            return Some(Tag { name, props, self_closing: true, tail });
        }
        if let Some(tail) = cursor.strip_prefix('>') {
            return Some(Tag { name, props, self_closing: false, tail });
        }

        let key_len = cursor
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':'))
            .unwrap_or(cursor.len());
        if key_len == 0 {
            return None;
        }
        let key = &cursor[..key_len];
        cursor = &cursor[key_len..];

        let Some(after_eq) = cursor.strip_prefix('=') else {
            props.insert(key.to_string(), "true".to_string());
            continue;
        };

        let (value, remaining) = attribute_value(after_eq)?;
        props.insert(key.to_string(), value);
        cursor = remaining;
    }
}

fn attribute_value(input: &str) -> Option<(String, &str)> {
    let quote = input.chars().next()?;
    match quote {
        '"' | '\'' => {
            let end = input[1..].find(quote)? + 1;
            Some((input[1..end].to_string(), &input[end + 1..]))
        }
        '{' => {
            let mut depth = 0usize;
            for (i, c) in input.char_indices() {
                match c {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            let expr = input[1..i].trim();
                            let expr = expr
                                .strip_prefix('"')
                                .and_then(|e| e.strip_suffix('"'))
                                .unwrap_or(expr);
                            return Some((expr.to_string(), &input[i + 1..]));
                        }
                    }
                    _ => {}
                }
            }
            None
        }
        _ => None,
    }
}

fn parse_component(
    lines: &[Line<'_>],
    pos: usize,
    ctx: &mut Context<'_>,
) -> Result<(RenderNode, usize)> {
    let open = lines[pos];
    let tag = parse_tag(open.text.trim_start())
        .filter(|t| !t.name.is_empty())
        .ok_or(ParseError::MalformedComponent { line: open.number })?;
    let name = tag.name.to_string();

    if tag.self_closing {
        if !tag.tail.trim().is_empty() {
            return Err(ParseError::MalformedComponent { line: open.number });
        }
        return Ok((
            RenderNode::Component {
                name,
                props: tag.props,
                children: Vec::new(),
            },
            pos + 1,
        ));
    }

    let closing = format!("</{}>", name);

    // Single-line form: `<Badge>new</Badge>`
    if let Some(inner) = tag.tail.trim_end().strip_suffix(closing.as_str()) {
        let inner = inner.trim();
        let children = if inner.is_empty() {
            Vec::new()
        } else {
            vec![RenderNode::Paragraph {
                children: parse_inlines(inner),
            }]
        };
        return Ok((
            RenderNode::Component {
                name,
                props: tag.props,
                children,
            },
            pos + 1,
        ));
    }

    let mut depth = 0usize;
    let mut close = None;
    for (i, line) in lines.iter().enumerate().skip(pos + 1) {
        let rest = line.text.trim();
        if rest == closing {
            if depth == 0 {
                close = Some(i);
                break;
            }
            depth -= 1;
        } else if let Some(nested) = parse_tag(rest).filter(|t| t.name == name) {
            if !nested.self_closing && !nested.tail.trim_end().ends_with(closing.as_str()) {
                depth += 1;
            }
        }
    }

    let close = close.ok_or_else(|| ParseError::UnterminatedComponent {
        line: open.number,
        name: name.clone(),
    })?;

    let mut children = Vec::new();
    if !tag.tail.trim().is_empty() {
        children.push(RenderNode::Paragraph {
            children: parse_inlines(tag.tail.trim()),
        });
    }
    children.extend(parse_nested(&lines[pos + 1..close], open.number, ctx)?);

    Ok((
        RenderNode::Component {
            name,
            props: tag.props,
            children,
        },
        close + 1,
    ))
}

// ============================================================================
// Tables
// ============================================================================

/// Split a pipe table row into trimmed cell texts
fn split_row(text: &str) -> Vec<&str> {
    let row = text.trim();
    let row = row.strip_prefix('|').unwrap_or(row);
    let row = match row.strip_suffix('|') {
        Some(r) if !r.ends_with('\\') => r,
        _ => row,
    };

    let mut cells = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in row.char_indices() {
        match c {
            '\\' => escaped = !escaped,
            '|' if !escaped => {
                cells.push(row[start..i].trim());
                start = i + 1;
            }
            _ => escaped = false,
        }
    }
    cells.push(row[start..].trim());
    cells
}

fn separator_alignment(cell: &str) -> Option<Alignment> {
    let left = cell.starts_with(':');
    let right = cell.ends_with(':') && cell.len() > 1;
    let dashes = cell.trim_start_matches(':').trim_end_matches(':');
    if dashes.is_empty() || !dashes.chars().all(|c| c == '-') {
        return None;
    }
    Some(match (left, right) {
        (true, true) => Alignment::Center,
        (true, false) => Alignment::Left,
        (false, true) => Alignment::Right,
        (false, false) => Alignment::None,
    })
}

fn parse_table(lines: &[Line<'_>], pos: usize) -> Result<(RenderNode, usize)> {
    let header_line = lines[pos];
    let header = split_row(header_line.text);

    let separator = lines
        .get(pos + 1)
        .filter(|l| !l.is_blank())
        .ok_or(ParseError::MissingTableSeparator { line: header_line.number })?;
    let alignments = split_row(separator.text)
        .into_iter()
        .map(separator_alignment)
        .collect::<Option<Vec<_>>>()
        .ok_or(ParseError::MissingTableSeparator { line: header_line.number })?;

    if alignments.len() != header.len() {
        return Err(ParseError::TableColumnMismatch {
            line: separator.number,
            expected: header.len(),
            found: alignments.len(),
        });
    }

    let cell = |text: &str| TableCell {
        children: parse_inlines(text),
    };

    let mut end = pos + 2;
    let mut rows = Vec::new();
    while end < lines.len() && lines[end].text.trim_start().starts_with('|') {
        let mut row: Vec<TableCell> = split_row(lines[end].text)
            .into_iter()
            .take(header.len())
            .map(cell)
            .collect();
        row.resize_with(header.len(), || TableCell { children: Vec::new() });
        rows.push(row);
        end += 1;
    }

    Ok((
        RenderNode::Table(Table {
            alignments,
            header: header.into_iter().map(cell).collect(),
            rows,
        }),
        end,
    ))
}

// ============================================================================
// Lists
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct ListMarker {
    ordered: bool,
    /// Bullet character or ordered delimiter (`.` / `)`)
    delimiter: char,
    start: u64,
    indent: usize,
    /// Column where item content starts
    content_offset: usize,
}

impl ListMarker {
    fn parse(text: &str) -> Option<Self> {
        let indent = leading_spaces(text);
        let rest = &text[indent..];

        let (ordered, delimiter, start, width) = match rest.chars().next()? {
            c @ ('-' | '*' | '+') => (false, c, 1, 1),
            c if c.is_ascii_digit() => {
                let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
                if digits > 9 {
                    return None;
                }
                let delimiter = rest[digits..].chars().next().filter(|c| *c == '.' || *c == ')')?;
                let start = rest[..digits].parse().ok()?;
                (true, delimiter, start, digits + 1)
            }
            _ => return None,
        };

        let after = &rest[width..];
        if after.is_empty() {
            return Some(Self { ordered, delimiter, start, indent, content_offset: indent + width + 1 });
        }
        if !after.starts_with(' ') {
            return None;
        }
        let spaces = leading_spaces(after);
        let spaces = if spaces > 4 || after.trim().is_empty() { 1 } else { spaces };

        Some(Self {
            ordered,
            delimiter,
            start,
            indent,
            content_offset: indent + width + spaces,
        })
    }

    fn same_list(&self, other: &ListMarker) -> bool {
        self.ordered == other.ordered && self.delimiter == other.delimiter
    }
}

fn parse_list(
    lines: &[Line<'_>],
    pos: usize,
    first: ListMarker,
    ctx: &mut Context<'_>,
) -> Result<(RenderNode, usize)> {
    let mut items = Vec::new();
    let mut i = pos;
    let mut marker = first;

    loop {
        let head = lines[i];
        let mut item_lines = vec![Line {
            number: head.number,
            text: head.text.get(marker.content_offset..).unwrap_or(""),
        }];
        i += 1;

        while i < lines.len() {
            let line = lines[i];
            if line.is_blank() {
                let next = lines[i..].iter().position(|l| !l.is_blank()).map(|n| i + n);
                match next {
                    Some(n) if lines[n].indent() >= marker.content_offset => {
                        item_lines.push(Line { number: line.number, text: "" });
                        i += 1;
                        continue;
                    }
                    _ => break,
                }
            }

            if line.indent() >= marker.content_offset {
                item_lines.push(line.dedent(marker.content_offset));
            } else if ListMarker::parse(line.text).is_some() {
                break;
            } else if !item_lines.last().is_some_and(|l| l.is_blank())
                && !starts_block(line.text.trim_start())
            {
                // Lazy continuation of the item's paragraph
                item_lines.push(Line { number: line.number, text: line.text.trim_start() });
            } else {
                break;
            }
            i += 1;
        }

        items.push(ListItem {
            children: parse_nested(&item_lines, head.number, ctx)?,
        });

        // Siblings may follow blank lines
        let next = lines[i..].iter().position(|l| !l.is_blank()).map(|n| i + n);
        let sibling = next.and_then(|n| {
            ListMarker::parse(lines[n].text)
                .filter(|m| m.same_list(&first) && m.indent < first.content_offset)
                .map(|m| (n, m))
        });
        match sibling {
            Some((n, m)) => {
                i = n;
                marker = m;
            }
            None => break,
        }
    }

    Ok((
        RenderNode::List {
            ordered: first.ordered,
            start: (first.ordered && first.start != 1).then_some(first.start),
            items,
        },
        i,
    ))
}

fn leading_spaces(text: &str) -> usize {
    text.len() - text.trim_start_matches(' ').len()
}

//! Finding the comment under the cursor.
//!
//! Documents are parsed with tree-sitter; the node at the hover position is
//! walked up to the nearest comment. Runs of `//` or `#` comments on
//! consecutive lines are gathered into one block, and every physical line
//! becomes a [`CommentToken`] whose ignore offsets cover the comment markers.

use crate::model::{CommentBlock, CommentToken, ScopeSpan};
use crate::position::{offset_to_position, position_to_offset};
use tower_lsp::lsp_types::{Position, Range};
use tracing::{debug, warn};
use tree_sitter::{Language, Node, Parser, Point};

/// Something that can find a comment block at a document position
pub trait CommentLocator: Send + Sync {
    fn locate(&self, source: &str, language_id: &str, position: Position) -> Option<CommentBlock>;
}

/// Languages with a bundled grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentLanguage {
    Rust,
    Python,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentKind {
    Line,
    Block,
    Docstring,
}

impl CommentLanguage {
    /// Map an editor language id to a grammar
    pub fn from_language_id(language_id: &str) -> Option<Self> {
        match language_id {
            "rust" => Some(Self::Rust),
            "python" => Some(Self::Python),
            _ => None,
        }
    }

    fn grammar(self) -> Language {
        match self {
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
            Self::Python => tree_sitter_python::LANGUAGE.into(),
        }
    }

    fn id(self) -> &'static str {
        match self {
            Self::Rust => "rust",
            Self::Python => "python",
        }
    }

    /// Line comment markers, longest first
    fn line_markers(self) -> &'static [&'static str] {
        match self {
            Self::Rust => &["///", "//!", "//"],
            Self::Python => &["#"],
        }
    }

    fn classify(self, node: Node) -> Option<CommentKind> {
        match (self, node.kind()) {
            (Self::Rust, "line_comment") => Some(CommentKind::Line),
            (Self::Rust, "block_comment") => Some(CommentKind::Block),
            (Self::Python, "comment") => Some(CommentKind::Line),
            (Self::Python, "string") if is_docstring(node) => Some(CommentKind::Docstring),
            _ => None,
        }
    }
}

/// A string literal that is the first statement of a module, class or function body
fn is_docstring(node: Node) -> bool {
    let Some(statement) = node.parent().filter(|p| p.kind() == "expression_statement") else {
        return false;
    };
    if statement.named_child_count() != 1 {
        return false;
    }
    let Some(body) = statement.parent() else {
        return false;
    };
    if !matches!(body.kind(), "module" | "block") {
        return false;
    }
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|child| !matches!(child.kind(), "comment"));
    first.is_some_and(|first| first.id() == statement.id())
}

/// Comment locator backed by tree-sitter grammars
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeSitterLocator;

impl TreeSitterLocator {
    pub fn new() -> Self {
        Self
    }
}

impl CommentLocator for TreeSitterLocator {
    fn locate(&self, source: &str, language_id: &str, position: Position) -> Option<CommentBlock> {
        let language = CommentLanguage::from_language_id(language_id)?;

        let mut parser = Parser::new();
        if let Err(e) = parser.set_language(&language.grammar()) {
            warn!(language_id, error = %e, "failed to load grammar");
            return None;
        }
        let tree = parser.parse(source, None)?;

        let offset = position_to_offset(source, position)?;
        let point = byte_point(source, offset);
        let leaf = tree.root_node().descendant_for_point_range(point, point)?;

        let mut current = Some(leaf);
        let (node, kind) = loop {
            let node = current?;
            if let Some(kind) = language.classify(node) {
                break (node, kind);
            }
            current = node.parent();
        };

        let nodes = match kind {
            CommentKind::Line => line_comment_run(source, node, language),
            CommentKind::Block | CommentKind::Docstring => vec![node],
        };
        debug!(language_id, nodes = nodes.len(), kind = ?kind, "located comment");
        Some(build_block(source, &nodes, kind, language))
    }
}

fn byte_point(source: &str, offset: usize) -> Point {
    let line_start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    Point::new(source[..offset].matches('\n').count(), offset - line_start)
}

/// Whether only whitespace precedes the node on its line
fn starts_line(source: &str, node: Node) -> bool {
    let start = node.start_byte();
    let line_start = source[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    source[line_start..start].trim().is_empty()
}

/// The node plus neighbouring line comments on directly adjacent lines
fn line_comment_run<'t>(source: &str, node: Node<'t>, language: CommentLanguage) -> Vec<Node<'t>> {
    if !starts_line(source, node) {
        return vec![node];
    }
    let joins = |candidate: Node<'t>, row: usize| {
        language.classify(candidate) == Some(CommentKind::Line)
            && candidate.start_position().row == row
            && starts_line(source, candidate)
    };

    let mut before = Vec::new();
    let mut current = node;
    while let Some(prev) = current.prev_sibling() {
        let row = current.start_position().row;
        if row == 0 || !joins(prev, row - 1) {
            break;
        }
        before.push(prev);
        current = prev;
    }

    let mut run: Vec<Node> = before.into_iter().rev().collect();
    run.push(node);

    let mut current = node;
    while let Some(next) = current.next_sibling() {
        if !joins(next, current.start_position().row + 1) {
            break;
        }
        run.push(next);
        current = next;
    }
    run
}

fn node_text<'s>(source: &'s str, node: Node) -> &'s str {
    source[node.start_byte()..node.end_byte()].trim_end_matches(['\n', '\r'])
}

fn build_block(source: &str, nodes: &[Node], kind: CommentKind, language: CommentLanguage) -> CommentBlock {
    let scope_name = match kind {
        CommentKind::Line => format!("comment.line.{}", language.id()),
        CommentKind::Block => format!("comment.block.{}", language.id()),
        CommentKind::Docstring => format!("string.quoted.docstring.{}", language.id()),
    };

    let mut tokens = Vec::new();
    let mut texts = Vec::new();
    for node in nodes {
        let text = node_text(source, *node);
        texts.push(text);
        match kind {
            CommentKind::Line => {
                let marker = language
                    .line_markers()
                    .iter()
                    .find(|m| text.starts_with(**m))
                    .map(|m| m.len())
                    .unwrap_or(0);
                tokens.push(line_token(text, marker, 0, &scope_name));
            }
            CommentKind::Block | CommentKind::Docstring => {
                tokens.extend(block_tokens(text, kind, &scope_name));
            }
        }
    }

    let first = nodes[0];
    let last = nodes[nodes.len() - 1];
    let end = last.start_byte() + node_text(source, last).len();
    let range = Range::new(
        offset_to_position(source, first.start_byte()),
        offset_to_position(source, end),
    );

    CommentBlock::comment(range, texts.join("\n"), tokens)
}

fn line_token(text: &str, ignore_start: usize, ignore_end: usize, scope: &str) -> CommentToken {
    let len = text.chars().count();
    CommentToken::new(text)
        .with_ignore(ignore_start, ignore_end)
        .with_scope(vec![ScopeSpan {
            scopes: vec![scope.to_string()],
            len,
        }])
}

fn block_tokens(text: &str, kind: CommentKind, scope: &str) -> Vec<CommentToken> {
    let (opener, closer) = match kind {
        CommentKind::Docstring => {
            let quotes_at = text.find(['"', '\'']).unwrap_or(0);
            let quote = text[quotes_at..].chars().next().unwrap_or('"');
            let run = text[quotes_at..].chars().take_while(|c| *c == quote).count();
            let width = if run >= 3 { 3 } else { 1 };
            (text[..quotes_at].chars().count() + width, width)
        }
        _ => {
            let opener = ["/**", "/*!", "/*"]
                .iter()
                .find(|o| text.starts_with(**o))
                .map(|o| o.len())
                .unwrap_or(0);
            (opener, if text.ends_with("*/") { 2 } else { 0 })
        }
    };

    let lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();
    let last = lines.len() - 1;
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let start = if i == 0 { opener } else { 0 };
            let end = if i == last { closer } else { 0 };
            // Keep the two ranges from overlapping on one-line blocks like "/**/"
            let len = line.chars().count();
            let end = end.min(len.saturating_sub(start));
            line_token(line, start, end, scope)
        })
        .collect()
}

//! Markdown for comment hovers.

use crate::model::TranslationResult;
use crate::position::intersect;
use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position, Range};

/// Characters either side of the cursor kept by near-show
pub const NEAR_CHARS: u32 = 10;

pub const TRANSLATE_ERROR: &str =
    "**Translate Error**: Check the language server log for details.";

fn with_link(body: String, link: &str) -> String {
    if link.is_empty() {
        body
    } else {
        format!("{body}\n\n{link}")
    }
}

/// Translation in a code block tagged with the document language
///
/// A humanized identifier is shown above its translation.
pub fn comment_markdown(result: &TranslationResult, language_id: &str) -> String {
    let shown = if result.humanize_text.is_empty() {
        result.translated_text.clone()
    } else {
        format!("{}:\n{}", result.humanize_text, result.translated_text)
    };
    with_link(
        format!("```{language_id}\n{shown}\n```"),
        &result.translate_link,
    )
}

/// Notice shown in place of an empty translation
pub fn error_markdown(result: &TranslationResult) -> String {
    with_link(TRANSLATE_ERROR.to_string(), &result.translate_link)
}

/// Part of `block` within [`NEAR_CHARS`] of `position` on its line
///
/// Falls back to the whole block when the two do not meet.
pub fn near_range(block: Range, position: Position) -> Range {
    let near = Range::new(
        Position::new(position.line, position.character.saturating_sub(NEAR_CHARS)),
        Position::new(position.line, position.character.saturating_add(NEAR_CHARS)),
    );
    intersect(block, near).unwrap_or(block)
}

pub fn markdown_hover(value: String, range: Option<Range>) -> Hover {
    Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }),
        range,
    }
}

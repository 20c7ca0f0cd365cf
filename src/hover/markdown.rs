//! Re-translation of markdown shown by other hover providers.
//!
//! Prose is pulled out of the markdown and translated as one text; fenced and
//! indented code blocks are kept verbatim in front of the translation.

use crate::mt::{TranslateManager, TranslateOptions};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use tower_lsp::lsp_types::{HoverContents, MarkedString};
use tracing::debug;

/// Markdown split into code blocks and translatable prose
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MarkdownParts {
    /// Source of every code block, in order
    pub code: Vec<String>,
    /// Prose, one paragraph/heading/list item per line
    pub text: String,
}

pub fn split_markdown(markdown: &str) -> MarkdownParts {
    let mut parts = MarkdownParts::default();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_code = false;

    let mut flush = |current: &mut String| {
        let paragraph = current.trim();
        if !paragraph.is_empty() {
            paragraphs.push(paragraph.to_string());
        }
        current.clear();
    };

    for (event, span) in Parser::new(markdown).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(_)) => {
                in_code = true;
                parts
                    .code
                    .push(markdown[span].trim_end_matches('\n').to_string());
            }
            Event::End(TagEnd::CodeBlock) => in_code = false,
            Event::Text(text) | Event::Code(text) if !in_code => current.push_str(&text),
            Event::SoftBreak => current.push(' '),
            Event::HardBreak => current.push('\n'),
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item) => {
                flush(&mut current)
            }
            _ => {}
        }
    }
    flush(&mut current);

    parts.text = paragraphs.join("\n");
    parts
}

/// Plain translatable text of a markdown document
pub fn extract_text(markdown: &str) -> String {
    split_markdown(markdown).text
}

/// Every content of a hover as markdown source
pub fn hover_markdown(contents: HoverContents) -> Vec<String> {
    fn marked(string: MarkedString) -> String {
        match string {
            MarkedString::String(s) => s,
            MarkedString::LanguageString(ls) => format!("```{}\n{}\n```", ls.language, ls.value),
        }
    }

    match contents {
        HoverContents::Scalar(s) => vec![marked(s)],
        HoverContents::Array(items) => items.into_iter().map(marked).collect(),
        HoverContents::Markup(markup) => vec![markup.value],
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedMarkdown {
    pub result: String,
    pub has_translated: bool,
}

impl TranslatedMarkdown {
    fn untouched(markdown: &str) -> Self {
        Self {
            result: markdown.to_string(),
            has_translated: false,
        }
    }
}

/// Translate the prose of one markdown content
///
/// Content without prose, or whose translation fails, comes back unchanged
/// with `has_translated` unset.
pub async fn translate_markdown(
    translator: &TranslateManager,
    markdown: &str,
    options: &TranslateOptions,
) -> TranslatedMarkdown {
    let parts = split_markdown(markdown);
    if parts.text.is_empty() {
        return TranslatedMarkdown::untouched(markdown);
    }

    match translator.translate(&parts.text, options).await {
        Ok(translated) if !translated.is_empty() => {
            let mut sections = parts.code;
            sections.push(translated);
            TranslatedMarkdown {
                result: sections.join("\n\n"),
                has_translated: true,
            }
        }
        Ok(_) => TranslatedMarkdown::untouched(markdown),
        Err(e) => {
            debug!(error = %e, "hover content left untranslated");
            TranslatedMarkdown::untouched(markdown)
        }
    }
}

//! Data passed between the comment locator, the compiler and the hover layer.
//!
//! The JSON shape (camelCase) matches what editor clients send for
//! selections and what the `commentTranslate.translate` command returns.

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::Range;

/// Location of a block in a document (start/end line and character)
pub type SourceSpan = Range;

/// A run of characters in a token and the lexical categories it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSpan {
    pub scopes: Vec<String>,
    pub len: usize,
}

/// One physical line of a comment
///
/// `ignore_start` and `ignore_end` count characters (not bytes) at either end
/// of `text` that are decoration rather than content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentToken {
    #[serde(default)]
    pub ignore_start: usize,
    #[serde(default)]
    pub ignore_end: usize,
    pub text: String,
    #[serde(default)]
    pub scope: Vec<ScopeSpan>,
}

impl CommentToken {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            ignore_start: 0,
            ignore_end: 0,
            text: text.into(),
            scope: Vec::new(),
        }
    }

    pub fn with_ignore(mut self, start: usize, end: usize) -> Self {
        self.ignore_start = start;
        self.ignore_end = end;
        self
    }

    pub fn with_scope(mut self, scope: Vec<ScopeSpan>) -> Self {
        self.scope = scope;
        self
    }

    /// The text between the ignored prefix and suffix
    ///
    /// Offsets past the end of the text are clamped, so an over-long
    /// `ignore_start` yields an empty slice rather than a panic.
    pub fn valid_text(&self) -> &str {
        let len = self.text.chars().count();
        let end = len.saturating_sub(self.ignore_end);
        let start = self.ignore_start.min(end);
        &self.text[char_to_byte(&self.text, start)..char_to_byte(&self.text, end)]
    }
}

/// A contiguous comment or selection translated as one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentBlock {
    pub range: SourceSpan,
    pub text: String,
    /// Present when the block came from a comment parse, absent for selections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<CommentToken>>,
    #[serde(default)]
    pub humanize: bool,
}

impl CommentBlock {
    /// A block for manually selected text
    pub fn selection(range: SourceSpan, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
            tokens: None,
            humanize: false,
        }
    }

    /// A block for a parsed comment
    pub fn comment(range: SourceSpan, text: impl Into<String>, tokens: Vec<CommentToken>) -> Self {
        Self {
            range,
            text: text.into(),
            tokens: Some(tokens),
            humanize: false,
        }
    }
}

/// What the compiler hands to the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    /// Empty when translation was skipped or failed
    pub translated_text: String,
    /// Phrase form of an identifier; empty when no humanization happened
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub humanize_text: String,
    pub translate_link: String,
}

impl TranslationResult {
    pub fn is_translated(&self) -> bool {
        !self.translated_text.is_empty()
    }
}

/// Byte index of the `chars`-th character, or the end of the string
pub(crate) fn char_to_byte(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

//! Comment block compilation: from a located comment or selection to a
//! [`TranslationResult`].
//!
//! Token-less blocks (selections, single identifiers) go through the
//! humanizer. Parsed comments first lose their decoration, then have wrapped
//! lines re-joined, and are translated as one text. Backend failures never
//! escape: they leave `translated_text` empty for the presentation layer to
//! report. A block with nothing left to translate compiles to `None`.

use crate::config::{IgnoreRule, ignore_pattern_for};
use crate::model::{CommentBlock, CommentToken, TranslationResult};
use crate::mt::{TranslateManager, TranslateOptions};
use crate::text::{combine_lines, humanize, strip_ignored};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct BlockCompiler {
    translator: TranslateManager,
    ignore: Vec<IgnoreRule>,
    source_language: Option<String>,
}

impl BlockCompiler {
    pub fn new(translator: TranslateManager, ignore: Vec<IgnoreRule>) -> Self {
        Self {
            translator,
            ignore,
            source_language: None,
        }
    }

    /// Translate from `source_language` instead of letting the backend detect it
    pub fn with_source_language(mut self, source_language: &str) -> Self {
        self.source_language = Some(source_language.to_string());
        self
    }

    /// Translate a block into `target_language` (backend default when `None`)
    ///
    /// Returns `None` without calling the backend when the block holds no text
    /// once its comment markers are gone, e.g. an empty `//` line.
    pub async fn compile(
        &self,
        block: &CommentBlock,
        language_id: &str,
        target_language: Option<&str>,
    ) -> Option<TranslationResult> {
        let options = TranslateOptions {
            from: self.source_language.clone(),
            to: target_language.map(str::to_string),
        };

        match &block.tokens {
            None => self.compile_text(&block.text, &options).await,
            Some(tokens) => {
                self.compile_tokens(tokens, block.humanize, language_id, &options)
                    .await
            }
        }
    }

    async fn compile_text(
        &self,
        text: &str,
        options: &TranslateOptions,
    ) -> Option<TranslationResult> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let humanize_text = humanize(text);
        let source = if humanize_text.is_empty() {
            text
        } else {
            humanize_text.as_str()
        };

        Some(TranslationResult {
            translated_text: self.translate_or_empty(source, options).await,
            translate_link: self.translator.link(source, options),
            humanize_text,
        })
    }

    async fn compile_tokens(
        &self,
        tokens: &[CommentToken],
        humanize_block: bool,
        language_id: &str,
        options: &TranslateOptions,
    ) -> Option<TranslationResult> {
        let mut tokens = tokens.to_vec();
        let pattern = ignore_pattern_for(&self.ignore, language_id);
        if let Err(e) = strip_ignored(&mut tokens, pattern) {
            warn!(language_id, error = %e, "ignoring invalid ignore pattern");
        }

        let lines: Vec<&str> = tokens.iter().map(|t| t.valid_text().trim()).collect();
        let combined = combine_lines(&lines);
        let merged = combined.merged_text();
        if merged.trim().is_empty() {
            debug!(language_id, lines = lines.len(), "comment has no text");
            return None;
        }
        debug!(
            language_id,
            lines = lines.len(),
            merged = combined.combined.iter().filter(|&&c| c).count(),
            "compiled comment tokens"
        );

        let humanize_text = if humanize_block {
            humanize(&merged)
        } else {
            String::new()
        };
        let source = if humanize_text.is_empty() {
            merged.as_str()
        } else {
            humanize_text.as_str()
        };

        Some(TranslationResult {
            translated_text: self.translate_or_empty(source, options).await,
            translate_link: self.translator.link(source, options),
            humanize_text,
        })
    }

    async fn translate_or_empty(&self, text: &str, options: &TranslateOptions) -> String {
        match self.translator.translate(text, options).await {
            Ok(translated) => translated,
            Err(e) => {
                debug!(error = %e, "translation dropped to empty result");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::mt::{MockMode, MockTranslator};
    use std::sync::Arc;
    use tower_lsp::lsp_types::{Position, Range};

    fn span() -> Range {
        Range::new(Position::new(0, 0), Position::new(0, 10))
    }

    fn compiler(mode: MockMode) -> (BlockCompiler, Arc<MockTranslator>) {
        let mock = Arc::new(MockTranslator::new(mode));
        let compiler = BlockCompiler::new(
            TranslateManager::new(mock.clone()),
            Settings::default().ignore,
        );
        (compiler, mock)
    }

    #[tokio::test]
    async fn test_identifier_is_humanized_before_translation() {
        let (compiler, mock) = compiler(MockMode::Suffix);
        let block = CommentBlock::selection(span(), "getUserName");
        let result = compiler.compile(&block, "rust", Some("zh-CN")).await.unwrap();

        assert_eq!(result.humanize_text, "get user name");
        assert_eq!(result.translated_text, "get user name_zh-CN");
        assert_eq!(mock.calls(), vec!["get user name"]);
        assert_eq!(result.translate_link, "[Mock](mock://auto/zh-CN/get%20user%20name)");
    }

    #[tokio::test]
    async fn test_worded_selection_is_translated_directly() {
        let (compiler, mock) = compiler(MockMode::Suffix);
        let block = CommentBlock::selection(span(), "hello world");
        let result = compiler.compile(&block, "rust", Some("fr")).await.unwrap();

        assert_eq!(result.humanize_text, "");
        assert_eq!(mock.calls(), vec!["hello world"]);
        assert_eq!(result.translated_text, "hello world_fr");
        assert_eq!(result.translate_link, "[Mock](mock://auto/fr/hello%20world)");
    }

    #[tokio::test]
    async fn test_backend_failure_yields_empty_translation_with_link() {
        let (compiler, _) = compiler(MockMode::Error("offline".to_string()));
        let block = CommentBlock::selection(span(), "getUserName");
        let result = compiler.compile(&block, "rust", Some("fr")).await.unwrap();

        assert!(!result.is_translated());
        assert_eq!(result.humanize_text, "get user name");
        assert_eq!(result.translate_link, "[Mock](mock://auto/fr/get%20user%20name)");
    }

    #[tokio::test]
    async fn test_comment_tokens_are_stripped_and_combined() {
        let (compiler, mock) = compiler(MockMode::Suffix);
        let tokens = vec![
            CommentToken::new("/**").with_ignore(3, 0),
            CommentToken::new(" * Returns the user name.").with_ignore(0, 0),
            CommentToken::new(" * falls back to the login"),
            CommentToken::new(" */").with_ignore(0, 2),
        ];
        let block = CommentBlock::comment(span(), "", tokens);
        let result = compiler.compile(&block, "rust", Some("fr")).await.unwrap();

        assert_eq!(
            mock.calls(),
            vec!["Returns the user name. falls back to the login"]
        );
        assert_eq!(
            result.translated_text,
            "Returns the user name. falls back to the login_fr"
        );
        assert_eq!(result.humanize_text, "");
    }

    #[tokio::test]
    async fn test_unwrapped_lines_keep_line_breaks() {
        let (compiler, mock) = compiler(MockMode::Suffix);
        let tokens = vec![
            CommentToken::new("# First paragraph").with_ignore(1, 0),
            CommentToken::new("# Second line"),
        ];
        let block = CommentBlock::comment(span(), "", tokens);
        compiler.compile(&block, "python", None).await;

        assert_eq!(mock.calls(), vec!["First paragraph\nSecond line"]);
    }

    #[tokio::test]
    async fn test_language_without_rule_is_not_stripped() {
        let (compiler, mock) = compiler(MockMode::Suffix);
        let tokens = vec![CommentToken::new("-- note").with_ignore(2, 0)];
        let block = CommentBlock::comment(span(), "", tokens);
        compiler.compile(&block, "lua", None).await;

        assert_eq!(mock.calls(), vec!["note"]);
    }

    #[tokio::test]
    async fn test_humanize_flag_on_token_block() {
        let (compiler, mock) = compiler(MockMode::Suffix);
        let mut block = CommentBlock::comment(
            span(),
            "maxRetryCount",
            vec![CommentToken::new("maxRetryCount")],
        );
        block.humanize = true;
        let result = compiler.compile(&block, "rust", Some("de")).await.unwrap();

        assert_eq!(result.humanize_text, "max retry count");
        assert_eq!(mock.calls(), vec!["max retry count"]);
    }

    #[tokio::test]
    async fn test_invalid_pattern_falls_back_to_raw_tokens() {
        let mock = Arc::new(MockTranslator::new(MockMode::Suffix));
        let compiler = BlockCompiler::new(
            TranslateManager::new(mock.clone()),
            vec![IgnoreRule::new("rust", "[oops")],
        );
        let tokens = vec![CommentToken::new("// * kept").with_ignore(2, 0)];
        let block = CommentBlock::comment(span(), "", tokens);
        compiler.compile(&block, "rust", None).await;

        assert_eq!(mock.calls(), vec!["* kept"]);
    }

    #[tokio::test]
    async fn test_source_language_reaches_link() {
        let (compiler, _) = compiler(MockMode::Suffix);
        let compiler = compiler.with_source_language("en");
        let block = CommentBlock::selection(span(), "hello world");
        let result = compiler.compile(&block, "rust", Some("ja")).await.unwrap();
        assert_eq!(result.translate_link, "[Mock](mock://en/ja/hello%20world)");
    }

    #[tokio::test]
    async fn test_empty_comment_skips_backend() {
        let (compiler, mock) = compiler(MockMode::Suffix);
        let tokens = vec![CommentToken::new("//").with_ignore(2, 0)];
        let block = CommentBlock::comment(span(), "//", tokens);
        let result = compiler.compile(&block, "rust", None).await;

        assert_eq!(result, None);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_blank_selection_skips_backend() {
        let (compiler, mock) = compiler(MockMode::Suffix);
        let block = CommentBlock::selection(span(), "   ");
        assert_eq!(compiler.compile(&block, "rust", None).await, None);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_bare_block_markers_skip_backend() {
        let (compiler, mock) = compiler(MockMode::Suffix);
        let tokens = vec![
            CommentToken::new("/*").with_ignore(2, 0),
            CommentToken::new(" *"),
            CommentToken::new(" */").with_ignore(0, 2),
        ];
        let block = CommentBlock::comment(span(), "/*\n *\n */", tokens);
        assert_eq!(compiler.compile(&block, "rust", None).await, None);
        assert!(mock.calls().is_empty());
    }
}

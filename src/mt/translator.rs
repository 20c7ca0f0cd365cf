//! Machine translation trait and utilities
//!
//! This module defines the `MachineTranslator` trait for provider abstraction,
//! so the comment pipeline can run against Google Translate, a mock, or any
//! other backend without knowing which one it talks to.
//!
//! # Example
//!
//! ```ignore
//! use comment_translate::mt::{GoogleTranslateProvider, MachineTranslator, TranslateOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GoogleTranslateProvider::new(Default::default())?;
//!     let options = TranslateOptions::to("zh-CN");
//!
//!     let result = provider.translate("get user name", &options).await?;
//!     println!("{}", result);
//!     println!("{}", provider.link("get user name", &options));
//!     Ok(())
//! }
//! ```

use crate::config::Settings;
use crate::mt::error::{MtError, MtResult};
use async_trait::async_trait;
use icu_locale::Locale;

/// Language tag meaning "let the backend decide"
pub const AUTO: &str = "auto";

/// Input length most backends accept per request
pub const DEFAULT_MAX_LEN: usize = 500;

/// Source and target language for one translation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslateOptions {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl TranslateOptions {
    /// Options translating into `target` from an auto-detected language
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            from: None,
            to: Some(target.into()),
        }
    }

    /// Set the source language
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.from = Some(source.into());
        self
    }

    pub fn source(&self) -> &str {
        self.from.as_deref().filter(|s| !s.is_empty()).unwrap_or(AUTO)
    }

    pub fn target(&self) -> &str {
        self.to.as_deref().filter(|s| !s.is_empty()).unwrap_or(AUTO)
    }
}

/// Capability interface for translation backends
///
/// Implementations handle the actual translation work, whether through a
/// web endpoint (Google Translate) or deterministic logic (Mock).
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate `text` according to `options`
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The translated text, possibly with dictionary extras appended
    /// * `Err(MtError)` - If the backend could not produce a translation
    async fn translate(&self, text: &str, options: &TranslateOptions) -> MtResult<String>;

    /// Build a link (markdown) that opens `text` in the backend's web translator
    fn link(&self, text: &str, options: &TranslateOptions) -> String;

    /// Maximum number of characters sent per request
    fn max_len(&self) -> usize {
        DEFAULT_MAX_LEN
    }

    /// Pick up provider-specific settings after a configuration change
    fn configure(&self, _settings: &Settings) {}

    /// Get the name of this translation provider, used for logging
    fn provider_name(&self) -> &str;
}

/// Canonicalize a language tag for use in a backend request
///
/// Tags are parsed with ICU so case and separators come out canonical:
/// - `zh-cn` → `zh-CN`
/// - `pt_br` → `pt-BR`
/// - `auto` → `auto` (passed through)
///
/// # Errors
///
/// `MtError::InvalidLocale` when the tag is empty or not a valid BCP 47 tag.
pub fn normalize_locale(locale: &str) -> MtResult<String> {
    let locale = locale.trim();
    if locale.is_empty() {
        return Err(MtError::InvalidLocale("Locale code is empty".to_string()));
    }
    if locale.eq_ignore_ascii_case(AUTO) {
        return Ok(AUTO.to_string());
    }

    let parsed: Locale = locale
        .replace('_', "-")
        .parse()
        .map_err(|e| MtError::InvalidLocale(format!("{}: {:?}", locale, e)))?;
    Ok(parsed.to_string())
}

/// Cut `text` down to at most `max_len` characters
pub fn clamp_chars(text: &str, max_len: usize) -> &str {
    match text.char_indices().nth(max_len) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

//! Front door to the configured translation backend
//!
//! Everything in the crate translates through a `TranslateManager` rather than
//! a provider directly, so input clean-up and logging happen in one place.

use crate::config::Settings;
use crate::mt::error::MtResult;
use crate::mt::translator::{MachineTranslator, TranslateOptions, clamp_chars};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct TranslateManager {
    provider: Arc<dyn MachineTranslator>,
}

impl TranslateManager {
    pub fn new(provider: Arc<dyn MachineTranslator>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    /// Translate `text`, trimmed and cut to the provider's maximum length
    ///
    /// Blank input short-circuits to an empty translation without a request.
    pub async fn translate(&self, text: &str, options: &TranslateOptions) -> MtResult<String> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(String::new());
        }

        let max_len = self.provider.max_len();
        let input = clamp_chars(text, max_len);
        if input.len() < text.len() {
            debug!(max_len, "translation input truncated");
        }

        let started = Instant::now();
        let result = self.provider.translate(input, options).await;
        match &result {
            Ok(translated) => debug!(
                provider = self.provider.provider_name(),
                to = options.target(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                chars = translated.chars().count(),
                "translated"
            ),
            Err(e) => warn!(
                provider = self.provider.provider_name(),
                to = options.target(),
                error = %e,
                "translation failed"
            ),
        }
        result
    }

    /// Link to the provider's web translator for `text`
    pub fn link(&self, text: &str, options: &TranslateOptions) -> String {
        self.provider.link(text.trim(), options)
    }

    /// Forward a configuration change to the provider
    pub fn configure(&self, settings: &Settings) {
        self.provider.configure(settings);
    }
}

impl std::fmt::Debug for TranslateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslateManager")
            .field("provider", &self.provider.provider_name())
            .finish()
    }
}

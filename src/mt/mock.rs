//! Mock Machine Translator for testing
//!
//! This module provides a deterministic, network-free translator for testing
//! the comment pipeline without touching any web endpoint. Every request is
//! recorded so tests can assert exactly what text reached the backend.
//!
//! # Example
//!
//! ```ignore
//! use comment_translate::mt::{MachineTranslator, MockMode, MockTranslator, TranslateOptions};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello", &TranslateOptions::to("fr")).await.unwrap();
//!     assert_eq!(result, "hello_fr");
//!     assert_eq!(mock.calls(), vec!["hello"]);
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::{MachineTranslator, TranslateOptions};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append target suffix: "hello" → "hello_fr"
    Suffix,

    /// Use predefined mappings: text → translation, falling back to `Suffix`
    Mappings(HashMap<String, String>),

    /// Simulate backend failures
    Error(String),

    /// Simulate a backend that answers with nothing
    Empty,
}

/// Mock translator that simulates various backend behaviors
#[derive(Debug)]
pub struct MockTranslator {
    mode: MockMode,
    /// Optional simulated network delay (in milliseconds)
    delay_ms: u64,
    calls: Mutex<Vec<String>>,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self::with_delay(mode, 0)
    }

    /// Create a MockTranslator with simulated network delay
    ///
    /// ```ignore
    /// let mock = MockTranslator::with_delay(MockMode::Suffix, 50);
    /// // Each translation will take ~50ms
    /// ```
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            mode,
            delay_ms,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Texts passed to `translate`, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn apply_delay(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    fn apply_translation(&self, text: &str, target: &str) -> MtResult<String> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => Ok(map
                .get(text)
                .cloned()
                .unwrap_or_else(|| format!("{}_{}", text, target))),
            MockMode::Error(msg) => Err(MtError::TranslationError(msg.clone())),
            MockMode::Empty => Ok(String::new()),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(&self, text: &str, options: &TranslateOptions) -> MtResult<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_string());

        self.apply_delay().await;
        self.apply_translation(text, options.target())
    }

    fn link(&self, text: &str, options: &TranslateOptions) -> String {
        format!(
            "[Mock](mock://{}/{}/{})",
            options.source(),
            options.target(),
            urlencoding::encode(text)
        )
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}

/// Machine Translation Module
///
/// Translation backends for the comment pipeline. Providers implement the
/// `MachineTranslator` capability trait; the rest of the crate reaches them
/// through `TranslateManager`.
///
/// # Overview
///
/// 1. **Translator trait** - `translate` plus `link` to the backend's web UI
/// 2. **Google provider** - web endpoint translation joined with a dictionary
///    pronunciation lookup
/// 3. **Mock provider** - deterministic backend for tests
/// 4. **Manager** - input trimming, length clamping and logging
///
/// # Example
///
/// ```ignore
/// use comment_translate::mt::{GoogleTranslateProvider, TranslateManager, TranslateOptions};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let provider = GoogleTranslateProvider::new(Default::default())?;
///     let manager = TranslateManager::new(Arc::new(provider));
///     let translated = manager.translate("get user name", &TranslateOptions::to("zh-CN")).await?;
///     println!("{:?}", translated);
///     Ok(())
/// }
/// ```
pub mod error;
pub mod google_translate;
pub mod manager;
pub mod mock;
pub mod phonetics;
pub mod translator;

pub use error::{MtError, MtResult};
pub use google_translate::{GoogleOptions, GoogleTranslateProvider};
pub use manager::TranslateManager;
pub use mock::{MockMode, MockTranslator};
pub use phonetics::Phonetics;
pub use translator::{MachineTranslator, TranslateOptions, normalize_locale};

//! Google Translate provider for machine translation
//!
//! This module talks to the public `translate_a/single` endpoint (the one the
//! Google Translate web widget uses, `client=gtx`) and enriches single-word
//! lookups with a phonetic transcription scraped from Oxford Learner's
//! Dictionaries. The two requests run concurrently; either may fail without
//! taking the other down.
//!
//! # Example
//!
//! ```ignore
//! use comment_translate::mt::{GoogleTranslateProvider, MachineTranslator, TranslateOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GoogleTranslateProvider::new(Default::default())?;
//!     let result = provider.translate("hello", &TranslateOptions::to("zh-CN")).await?;
//!     println!("{}", result); // "你好\n/həˈləʊ/ /həˈloʊ/"
//!     Ok(())
//! }
//! ```

use crate::config::Settings;
use crate::mt::error::{MtError, MtResult};
use crate::mt::phonetics::{self, Phonetics};
use crate::mt::translator::{AUTO, MachineTranslator, TranslateOptions, normalize_locale};
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, warn};

const BROWSER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/70.0.3538.102 Safari/537.36";

/// Connection settings for the Google provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleOptions {
    /// Per-request timeout for both translation and dictionary calls
    pub timeout: Duration,
    /// Top-level domain of the web translator used in links (`com`, `cn`, ...)
    pub tld: String,
    /// Base URL of a translator mirror; replaces the Google link when set
    pub mirror: String,
}

impl Default for GoogleOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            tld: "com".to_string(),
            mirror: String::new(),
        }
    }
}

/// Link settings that may change while the server runs
#[derive(Debug, Clone, PartialEq, Eq)]
struct LinkSite {
    tld: String,
    mirror: String,
}

/// Google Translate web endpoint provider
pub struct GoogleTranslateProvider {
    /// HTTP client for async requests
    client: reqwest::Client,
    /// Base URL for the translation endpoint
    base_url: String,
    /// Base URL for the pronunciation dictionary
    dictionary_url: String,
    site: RwLock<LinkSite>,
}

/// Response of `translate_a/single` with `dj=1`
#[derive(Debug, Default, Deserialize)]
struct SingleResponse {
    #[serde(default)]
    sentences: Vec<Sentence>,
    #[serde(default)]
    dict: Vec<DictEntry>,
}

#[derive(Debug, Deserialize)]
struct Sentence {
    /// Absent on the trailing transliteration sentence
    #[serde(default)]
    trans: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DictEntry {
    pos: String,
    #[serde(default)]
    terms: Vec<String>,
}

impl SingleResponse {
    /// Dictionary entries (part of speech plus the top three terms) when the
    /// input was a dictionary word, the sentence translation otherwise
    fn into_text(self) -> String {
        if !self.dict.is_empty() {
            return self
                .dict
                .iter()
                .map(|entry| {
                    let terms: Vec<&str> = entry.terms.iter().take(3).map(String::as_str).collect();
                    format!("{}: {}", entry.pos, terms.join(","))
                })
                .collect::<Vec<_>>()
                .join("\n");
        }

        self.sentences
            .into_iter()
            .filter_map(|s| s.trans)
            .collect::<String>()
    }
}

impl GoogleTranslateProvider {
    /// Maximum characters per request accepted by the web endpoint
    const MAX_CHARS: usize = 500;

    /// Create a provider with the given connection settings
    ///
    /// # Errors
    ///
    /// `MtError::NetworkError` if the HTTP client cannot be built.
    pub fn new(options: GoogleOptions) -> MtResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: "https://translate.googleapis.com/translate_a/single".to_string(),
            dictionary_url: "https://www.oxfordlearnersdictionaries.com".to_string(),
            site: RwLock::new(LinkSite {
                tld: options.tld,
                mirror: options.mirror,
            }),
        })
    }

    /// Point both endpoints somewhere else (local fixtures, proxies)
    pub fn with_endpoints(mut self, base_url: &str, dictionary_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self.dictionary_url = dictionary_url.trim_end_matches('/').to_string();
        self
    }

    async fn fetch_translation(&self, text: &str, from: &str, to: &str) -> MtResult<String> {
        let url = format!(
            "{}?client=gtx&sl={}&tl={}&hl={}&dt=t&dt=bd&dj=1&source=icon&q={}",
            self.base_url,
            from,
            to,
            to,
            urlencoding::encode(text)
        );

        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, BROWSER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MtError::TranslationError(format!(
                "Google Translate error ({}): {}",
                status, error_text
            )));
        }

        let body: SingleResponse = response.json().await.map_err(|e| {
            MtError::TranslationError(format!("Failed to parse Google Translate response: {}", e))
        })?;

        Ok(body.into_text())
    }

    async fn fetch_page(&self, url: &str) -> MtResult<Option<Phonetics>> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, BROWSER_AGENT)
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let html = response.text().await?;
        Ok(phonetics::parse_phonetics(&html))
    }

    /// Look up the pronunciation of a single word
    ///
    /// Both dictionary pages are requested at once; the definition page wins
    /// when both resolve.
    async fn fetch_phonetics(&self, text: &str) -> MtResult<Option<Phonetics>> {
        if !phonetics::is_single_word(text) {
            return Ok(None);
        }

        let [definition, search] = phonetics::lookup_urls(&self.dictionary_url, text.trim());
        let (by_definition, by_search) =
            tokio::join!(self.fetch_page(&definition), self.fetch_page(&search));

        match (by_definition, by_search) {
            (Ok(Some(found)), _) | (_, Ok(Some(found))) => Ok(Some(found)),
            (Err(e), _) => Err(e),
            _ => Ok(None),
        }
    }

    fn site(&self) -> LinkSite {
        self.site
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Combine the translation and phonetics requests for `text`
///
/// A failed phonetics lookup is dropped. A failed translation still yields the
/// phonetics when there are some; only when both come back empty-handed is the
/// translation error returned.
fn merge_outcomes(
    text: &str,
    translation: MtResult<String>,
    pronunciation: MtResult<Option<Phonetics>>,
) -> MtResult<String> {
    let pronunciation = match pronunciation {
        Ok(found) => found,
        Err(e) => {
            debug!(error = %e, "phonetics lookup failed");
            None
        }
    };

    match translation {
        Ok(translated) => Ok(phonetics::merge_phonetics(
            text,
            &translated,
            pronunciation.as_ref(),
        )),
        Err(e) if pronunciation.as_ref().is_some_and(|p| !p.phonetics.is_empty()) => {
            warn!(error = %e, "translation failed, showing phonetics only");
            Ok(phonetics::merge_phonetics(text, "", pronunciation.as_ref())
                .trim_start()
                .to_string())
        }
        Err(e) => Err(e),
    }
}

impl std::fmt::Debug for GoogleTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslateProvider")
            .field("base_url", &self.base_url)
            .field("dictionary_url", &self.dictionary_url)
            .field("site", &self.site())
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for GoogleTranslateProvider {
    async fn translate(&self, text: &str, options: &TranslateOptions) -> MtResult<String> {
        let from = normalize_locale(options.source())?;
        let to = normalize_locale(options.target())?;

        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let (translation, pronunciation) = tokio::join!(
            self.fetch_translation(text, &from, &to),
            self.fetch_phonetics(text)
        );

        merge_outcomes(text, translation, pronunciation)
    }

    fn link(&self, text: &str, options: &TranslateOptions) -> String {
        let site = self.site();
        let encoded = urlencoding::encode(text);
        let url = if site.mirror.is_empty() {
            format!(
                "https://translate.google.{}/#view=home&op=translate&sl={}&tl={}&text={}",
                site.tld,
                options.source(),
                options.target(),
                encoded
            )
        } else {
            format!(
                "{}/#view=home&op=translate&sl={}&tl={}&text={}",
                site.mirror.trim_end_matches('/'),
                AUTO,
                options.target(),
                encoded
            )
        };
        format!("[Google]({})", url)
    }

    fn max_len(&self) -> usize {
        Self::MAX_CHARS
    }

    fn configure(&self, settings: &Settings) {
        let next = LinkSite {
            tld: settings.google_translate.tld.clone(),
            mirror: settings.google_translate.mirror.clone(),
        };
        let mut site = self.site.write().unwrap_or_else(PoisonError::into_inner);
        if *site != next {
            debug!(tld = %next.tld, mirror = %next.mirror, "google link settings changed");
            *site = next;
        }
    }

    fn provider_name(&self) -> &str {
        "Google Translate"
    }
}

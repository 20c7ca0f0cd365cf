//! Pronunciation lookup against Oxford Learner's Dictionaries
//!
//! The dictionary has no API, so the entry page is scraped: the headword comes
//! from `<h1 class="headword">` and the transcriptions from the `phon` spans
//! inside the first `phonetics` block of the entry header.

use regex::Regex;
use std::sync::LazyLock;

static HEADWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<h1[^>]*class="headword"[^>]*>([^<]*)"#).expect("valid headword regex")
});

static PHONETICS_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<span[^>]*class="phonetics"[^>]*>"#).expect("valid phonetics regex")
});

static SPAN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?span\b[^>]*>").expect("valid span regex"));

static PHON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<span class="phon">(.*?)</span>"#).expect("valid phon regex")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

/// Headword and its transcriptions, e.g. `hello` / `/həˈləʊ/ /həˈloʊ/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phonetics {
    pub word: String,
    pub phonetics: String,
}

/// Whether a dictionary lookup makes sense for `text`
pub fn is_single_word(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c == '-' || c == '\'')
}

/// Dictionary pages tried for `word`, most specific first
pub fn lookup_urls(base_url: &str, word: &str) -> [String; 2] {
    let word = urlencoding::encode(&word.to_lowercase()).into_owned();
    [
        format!("{}/definition/english/{}?q={}", base_url, word, word),
        format!("{}/search/english/direct/?q={}", base_url, word),
    ]
}

/// Extract headword and phonetics from an entry page
///
/// Returns `None` when the page has no headword (search miss, error page).
pub fn parse_phonetics(html: &str) -> Option<Phonetics> {
    let word = HEADWORD
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| decode_entities(m.as_str().trim()))
        .filter(|w| !w.is_empty())?;

    let block = phonetics_block(html).unwrap_or_default();

    let phonetics = PHON
        .captures_iter(block)
        .filter_map(|c| c.get(1))
        .map(|m| decode_entities(TAG.replace_all(m.as_str(), "").trim()))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Some(Phonetics { word, phonetics })
}

/// Append dictionary results to a translation
///
/// When the headword is the looked-up text (ignoring case) only the
/// transcription is added; otherwise the headword goes first so the reader
/// sees which entry the transcription belongs to.
pub fn merge_phonetics(content: &str, translation: &str, phonetics: Option<&Phonetics>) -> String {
    let mut result = translation.to_string();
    let Some(found) = phonetics.filter(|p| !p.phonetics.is_empty()) else {
        return result;
    };

    if found.word.to_lowercase() == content.trim().to_lowercase() {
        result.push('\n');
        result.push_str(&found.phonetics);
    } else {
        result.push('\n');
        result.push_str(&found.word);
        result.push('\n');
        result.push_str(&found.phonetics);
    }
    result
}

/// Inner HTML of the first `phonetics` span, up to its own closing tag
fn phonetics_block(html: &str) -> Option<&str> {
    let start = PHONETICS_OPEN.find(html)?.end();
    let mut depth = 1usize;
    for tag in SPAN_TAG.find_iter(&html[start..]) {
        if tag.as_str().starts_with("</") {
            depth -= 1;
            if depth == 0 {
                return Some(&html[start..start + tag.start()]);
            }
        } else {
            depth += 1;
        }
    }
    Some(&html[start..])
}

fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

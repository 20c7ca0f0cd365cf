//! User settings and their defaults.
//!
//! Clients send settings either as the bare section or wrapped in
//! `{"commentTranslate": {...}}`; both shapes are accepted. Anything missing
//! or malformed falls back to the defaults below.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Settings section name used by editor clients
pub const SECTION: &str = "commentTranslate";

/// Target language used when neither the client nor the CLI picks one
pub const DEFAULT_TARGET_LANGUAGE: &str = "zh-CN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HoverSettings {
    /// Master switch for comment hovers
    pub enabled: bool,
    /// Only show comment hovers for the document marked live
    pub concise: bool,
    /// Shrink the hover range to the area around the cursor
    pub near_show: bool,
    /// Re-translate the other hovers shown at a position
    pub content: bool,
    /// How long a live mark lasts; `None` keeps it until the next mark
    pub live_ms: Option<u64>,
}

impl Default for HoverSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            concise: false,
            near_show: false,
            content: true,
            live_ms: None,
        }
    }
}

/// Prefix pattern stripped from comment lines of the listed languages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IgnoreRule {
    /// Comma-separated language ids, e.g. `"c,cpp"`
    pub language_id: String,
    #[serde(default)]
    pub regular: String,
}

impl IgnoreRule {
    pub fn new(language_id: &str, regular: &str) -> Self {
        Self {
            language_id: language_id.to_string(),
            regular: regular.to_string(),
        }
    }

    pub fn applies_to(&self, language_id: &str) -> bool {
        self.language_id
            .split(',')
            .any(|id| id.trim() == language_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    pub tld: String,
    pub mirror: String,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            tld: "com".to_string(),
            mirror: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub hover: HoverSettings,
    pub ignore: Vec<IgnoreRule>,
    pub target_language: String,
    pub source_language: String,
    pub google_translate: GoogleSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hover: HoverSettings::default(),
            ignore: default_ignore_rules(),
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            source_language: "auto".to_string(),
            google_translate: GoogleSettings::default(),
        }
    }
}

fn default_ignore_rules() -> Vec<IgnoreRule> {
    vec![
        IgnoreRule::new(
            "rust,c,cpp,java,javascript,typescript,go,csharp",
            r"[\*\s]+",
        ),
        IgnoreRule::new("python,shellscript,ruby", r"[#\s]+"),
    ]
}

impl Settings {
    /// Defaults with a different target language
    pub fn with_target(target_language: &str) -> Self {
        Self {
            target_language: target_language.to_string(),
            ..Self::default()
        }
    }

    /// Build settings from a client JSON payload
    ///
    /// `base` supplies every value the payload leaves out. A payload that does
    /// not deserialize is logged and `base` is returned unchanged.
    pub fn from_value(value: &Value, base: &Settings) -> Settings {
        let section = value.get(SECTION).unwrap_or(value);
        if section.is_null() {
            return base.clone();
        }

        let mut merged = match serde_json::to_value(base) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "failed to serialize current settings");
                return base.clone();
            }
        };
        merge_json(&mut merged, section);

        match serde_json::from_value(merged) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "invalid settings, keeping previous values");
                base.clone()
            }
        }
    }

    /// Ignore-prefix pattern for a language, empty when none is configured
    pub fn ignore_pattern(&self, language_id: &str) -> &str {
        ignore_pattern_for(&self.ignore, language_id)
    }
}

/// Pattern of the first rule listing `language_id`, empty when none does
pub fn ignore_pattern_for<'a>(rules: &'a [IgnoreRule], language_id: &str) -> &'a str {
    rules
        .iter()
        .find(|rule| rule.applies_to(language_id))
        .map(|rule| rule.regular.as_str())
        .unwrap_or("")
}

/// Overlay `patch` onto `target`, object by object
fn merge_json(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

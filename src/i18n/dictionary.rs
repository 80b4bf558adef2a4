//! Translated UI strings for a locale.
//!
//! Dictionaries come either from the CMS global settings (`dictionary` JSON
//! field) or from the JSON resources bundled under `locales/`. Nested objects
//! are flattened to dotted keys, so `{"nav": {"home": "Home"}}` is looked up
//! as `nav.home`.

use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

use anyhow::bail;
use tracing::{debug, warn};

use crate::content::GlobalSettings;
use crate::i18n::Locale;

const BUNDLED_EN: &str = include_str!("../../locales/en.json");
const BUNDLED_FR: &str = include_str!("../../locales/fr.json");

/// Where UI string dictionaries are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionarySource {
    /// The `dictionary` field of the locale's global settings
    Cms,
    /// JSON resources compiled into the binary
    Bundled,
}

impl FromStr for DictionarySource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cms" => Ok(DictionarySource::Cms),
            "bundled" | "static" => Ok(DictionarySource::Bundled),
            other => bail!("Unknown dictionary source '{}' (expected cms or bundled)", other),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    entries: HashMap<String, String>,
}

impl Dictionary {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Flatten a JSON object into dotted keys. Non-string leaves are
    /// stringified; arrays and nulls are skipped.
    pub fn from_json(value: &Value) -> Self {
        let mut entries = HashMap::new();
        flatten_into(&mut entries, "", value);
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Look up a key, rendering the key itself when it is missing.
    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        self.get(key).unwrap_or(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn flatten_into(entries: &mut HashMap<String, String>, prefix: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(entries, &path, child);
            }
        }
        Value::String(s) if !prefix.is_empty() => {
            entries.insert(prefix.to_string(), s.clone());
        }
        Value::Number(n) if !prefix.is_empty() => {
            entries.insert(prefix.to_string(), n.to_string());
        }
        Value::Bool(b) if !prefix.is_empty() => {
            entries.insert(prefix.to_string(), b.to_string());
        }
        _ => {}
    }
}

fn bundled_resource(code: &str) -> Option<&'static str> {
    match code {
        "en" => Some(BUNDLED_EN),
        "fr" => Some(BUNDLED_FR),
        _ => None,
    }
}

/// Dictionary for a locale from the bundled resources; empty when none ships.
pub fn bundled_dictionary(locale: &Locale) -> Dictionary {
    let Some(raw) = bundled_resource(locale.code()) else {
        debug!("No bundled dictionary for locale {}", locale);
        return Dictionary::empty();
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(value) => Dictionary::from_json(&value),
        Err(e) => {
            warn!("Bundled dictionary for {} is not valid JSON: {}", locale, e);
            Dictionary::empty()
        }
    }
}

/// Resolve the UI dictionary for a locale.
///
/// With [`DictionarySource::Cms`], `settings` is the global-settings fetch for
/// that locale (absent when the fetch failed); a missing or non-object
/// dictionary field yields an empty dictionary.
pub fn resolve_dictionary(
    source: DictionarySource,
    settings: Option<&GlobalSettings>,
    locale: &Locale,
) -> Dictionary {
    match source {
        DictionarySource::Bundled => bundled_dictionary(locale),
        DictionarySource::Cms => match settings.and_then(|s| s.dictionary.as_ref()) {
            Some(value @ Value::Object(_)) => Dictionary::from_json(value),
            Some(_) => {
                warn!("Global settings dictionary for {} is not an object", locale);
                Dictionary::empty()
            }
            None => {
                debug!("No CMS dictionary for locale {}, using empty", locale);
                Dictionary::empty()
            }
        },
    }
}

//! Locale registry: the configured set of supported locales.
//!
//! Built once at startup from configuration and passed explicitly to the
//! code that needs it. Resolution never yields an unsupported code: anything
//! outside the configured set maps to the designated default.

use anyhow::{bail, Result};

use crate::i18n::Locale;

/// Display metadata for a locale the site knows how to label.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    /// BCP 47 primary language code (e.g., "en", "fr")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "French")
    pub name: &'static str,

    /// Native name of the language, used by the language switcher
    pub native_name: &'static str,
}

/// Labels for the locales the site ships translations for.
const KNOWN_LOCALES: &[LocaleConfig] = &[
    LocaleConfig {
        code: "en",
        name: "English",
        native_name: "English",
    },
    LocaleConfig {
        code: "fr",
        name: "French",
        native_name: "Français",
    },
    LocaleConfig {
        code: "ar",
        name: "Arabic",
        native_name: "العربية",
    },
    LocaleConfig {
        code: "es",
        name: "Spanish",
        native_name: "Español",
    },
    LocaleConfig {
        code: "de",
        name: "German",
        native_name: "Deutsch",
    },
];

/// The supported locale set plus its default.
#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    supported: Vec<Locale>,
    default: Locale,
}

impl LocaleRegistry {
    /// Build a registry from configured codes.
    ///
    /// # Errors
    /// Fails if `supported` is empty or does not contain `default`.
    pub fn new<S: AsRef<str>>(supported: &[S], default: &str) -> Result<Self> {
        let mut locales: Vec<Locale> = Vec::new();
        for code in supported {
            let code = code.as_ref().trim().to_lowercase();
            if code.is_empty() || locales.iter().any(|l| l.code() == code) {
                continue;
            }
            locales.push(Locale::new(code));
        }

        if locales.is_empty() {
            bail!("At least one supported locale is required");
        }

        let default = match locales.iter().find(|l| l.code() == default) {
            Some(locale) => locale.clone(),
            None => bail!("Default locale '{}' is not in the supported set", default),
        };

        Ok(Self {
            supported: locales,
            default,
        })
    }

    /// Return the requested locale if supported, otherwise the default.
    ///
    /// Matching is case-insensitive and ignores a region suffix
    /// (`fr-CA` resolves to `fr` when `fr` is supported).
    pub fn resolve(&self, requested: &str) -> Locale {
        let normalized = requested.trim().to_lowercase();
        if let Some(locale) = self.get_by_code(&normalized) {
            return locale.clone();
        }

        let primary = normalized.split(['-', '_']).next().unwrap_or_default();
        self.get_by_code(primary)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }

    /// Like [`resolve`](Self::resolve), but reports whether the request was
    /// already the canonical code for the resolved locale.
    pub fn resolve_exact(&self, requested: &str) -> (Locale, bool) {
        let locale = self.resolve(requested);
        let exact = locale.code() == requested;
        (locale, exact)
    }

    pub fn get_by_code(&self, code: &str) -> Option<&Locale> {
        self.supported.iter().find(|l| l.code() == code)
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default
    }

    /// All supported locales, in configuration order.
    pub fn list_supported(&self) -> &[Locale] {
        &self.supported
    }

    /// Display metadata for a code, if the site has labels for it.
    pub fn metadata(code: &str) -> Option<&'static LocaleConfig> {
        KNOWN_LOCALES.iter().find(|l| l.code == code)
    }

    /// Native name for the language switcher; unknown codes show upper-cased.
    pub fn native_name(code: &str) -> String {
        Self::metadata(code)
            .map(|l| l.native_name.to_string())
            .unwrap_or_else(|| code.to_uppercase())
    }
}

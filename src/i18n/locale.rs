//! Locale type: a code that has been resolved against the registry.

use std::fmt;

use crate::i18n::{LocaleConfig, LocaleRegistry};

/// A resolved, supported locale.
///
/// Only [`LocaleRegistry`] constructs these, so holding a `Locale` means the
/// code is one of the configured supported locales.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    code: String,
}

impl Locale {
    pub(crate) fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    /// The locale code (e.g., "en", "fr").
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Display metadata, if the site has labels for this code.
    pub fn config(&self) -> Option<&'static LocaleConfig> {
        LocaleRegistry::metadata(&self.code)
    }

    /// Native name used by the language switcher.
    pub fn native_name(&self) -> String {
        LocaleRegistry::native_name(&self.code)
    }

    /// URL path prefix for this locale (e.g., "/fr").
    pub fn path_prefix(&self) -> String {
        format!("/{}", self.code)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

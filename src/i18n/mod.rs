//! Internationalization (i18n) module for multi-locale support.
//!
//! Locale handling is explicit: the registry is built from configuration at
//! startup and every request resolves its locale and dictionary up front,
//! then passes them down as parameters.
//!
//! # Architecture
//!
//! - `registry`: The configured set of supported locales and the default
//! - `locale`: Resolved `Locale` type, only constructed through the registry
//! - `dictionary`: Translated UI strings from the CMS or bundled resources
//!
//! # Example
//!
//! ```rust,ignore
//! use menaps_site::i18n::{resolve_dictionary, DictionarySource, LocaleRegistry};
//!
//! let registry = LocaleRegistry::new(&["en", "fr"], "en")?;
//! let locale = registry.resolve("de"); // unsupported, resolves to "en"
//! let dict = resolve_dictionary(DictionarySource::Cms, settings.as_ref(), &locale);
//! ```

mod dictionary;
mod locale;
mod registry;

pub use dictionary::{bundled_dictionary, resolve_dictionary, Dictionary, DictionarySource};
pub use locale::Locale;
pub use registry::{LocaleConfig, LocaleRegistry};

use anyhow::{bail, Context, Result};
use std::time::Duration;

use crate::i18n::DictionarySource;

#[derive(Debug, Clone)]
pub struct Config {
    // Content service
    pub cms_url: String,
    pub cms_api_token: Option<String>,
    pub cms_timeout: Duration,

    // Public site
    pub public_url: String,
    pub port: u16,

    // Localization
    pub supported_locales: Vec<String>,
    pub default_locale: String,
    pub dictionary_source: DictionarySource,

    // Contact relay
    pub contact_recipient_email: Option<String>,
    pub mail_api_url: Option<String>,
    pub mail_api_token: Option<String>,
    pub mail_sender_email: String,
    pub mail_sender_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let supported_locales = parse_locale_list(
            &std::env::var("SUPPORTED_LOCALES").unwrap_or_else(|_| "en,fr".to_string()),
        );
        let default_locale = std::env::var("DEFAULT_LOCALE")
            .map(|v| v.trim().to_lowercase())
            .unwrap_or_else(|_| "en".to_string());

        let dictionary_source = match std::env::var("DICTIONARY_SOURCE") {
            Ok(v) => v
                .parse()
                .with_context(|| format!("Invalid DICTIONARY_SOURCE: '{}'", v))?,
            Err(_) => DictionarySource::Cms,
        };

        let config = Self {
            // Content service (Strapi-style headless CMS)
            cms_url: trim_base_url(
                &std::env::var("CMS_URL").unwrap_or_else(|_| "http://localhost:1337".to_string()),
            ),
            cms_api_token: non_empty_var("CMS_API_TOKEN"),
            cms_timeout: Duration::from_secs(
                std::env::var("CMS_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),

            // Public site
            public_url: trim_base_url(
                &std::env::var("PUBLIC_URL")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            ),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),

            // Localization
            supported_locales,
            default_locale,
            dictionary_source,

            // Contact relay
            contact_recipient_email: non_empty_var("CONTACT_RECIPIENT_EMAIL"),
            mail_api_url: non_empty_var("MAIL_API_URL"),
            mail_api_token: non_empty_var("MAIL_API_TOKEN"),
            mail_sender_email: std::env::var("MAIL_SENDER_EMAIL")
                .unwrap_or_else(|_| "noreply@localhost".to_string()),
            mail_sender_name: std::env::var("MAIL_SENDER_NAME")
                .unwrap_or_else(|_| "Website Contact Form".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that individual parsing cannot catch.
    pub fn validate(&self) -> Result<()> {
        if self.supported_locales.is_empty() {
            bail!("SUPPORTED_LOCALES must list at least one locale code");
        }
        if !self.supported_locales.contains(&self.default_locale) {
            bail!(
                "DEFAULT_LOCALE '{}' is not one of SUPPORTED_LOCALES ({})",
                self.default_locale,
                self.supported_locales.join(",")
            );
        }
        Ok(())
    }
}

/// Split a comma-separated locale list, dropping blanks and duplicates.
fn parse_locale_list(raw: &str) -> Vec<String> {
    let mut locales: Vec<String> = Vec::new();
    for code in raw.split(',').map(|s| s.trim().to_lowercase()) {
        if !code.is_empty() && !locales.contains(&code) {
            locales.push(code);
        }
    }
    locales
}

fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

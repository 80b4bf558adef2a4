//! Preview binary - composes one page and prints the rendered HTML
//!
//! Usage:
//!   cargo run --bin preview                    # Home page in the default locale
//!   cargo run --bin preview -- fr contact      # A given locale and slug
//!
//! Reads the same environment as the server (CMS_URL, SUPPORTED_LOCALES, ...).
//! When the CMS is unreachable the built-in home page is printed.

use anyhow::{bail, Result};
use tracing::info;

use menaps_site::cms::CmsClient;
use menaps_site::composer::{PageComposer, SiteContext};
use menaps_site::config::Config;
use menaps_site::fallback::{self, CONTACT_SLUG, HOME_SLUG};
use menaps_site::i18n::{resolve_dictionary, LocaleRegistry};
use menaps_site::layout::{contact_form, render_page, LayoutContext};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout stays pure HTML
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("menaps_site=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    let registry = LocaleRegistry::new(config.supported_locales.as_slice(), &config.default_locale)?;

    let mut args = std::env::args().skip(1);
    let requested = args
        .next()
        .unwrap_or_else(|| registry.default_locale().code().to_string());
    let slug = args.next().unwrap_or_else(|| HOME_SLUG.to_string());

    let locale = registry.resolve(&requested);
    info!("Previewing '{}' in {}", slug, locale);

    let content = CmsClient::from_config(&config)?;
    let site = SiteContext::new(config.cms_url.clone(), config.public_url.clone());
    let composer = PageComposer::new(&content, &site);

    let composed = if slug == CONTACT_SLUG {
        composer
            .compose_page_or(&slug, &locale, fallback::contact_page())
            .await
    } else {
        match composer.compose_page(&slug, &locale).await {
            Ok(page) => page,
            Err(e) => bail!("{}", e),
        }
    };

    let dictionary = resolve_dictionary(config.dictionary_source, composed.settings.as_ref(), &locale);
    let ctx = LayoutContext {
        locales: registry.list_supported(),
        dictionary: &dictionary,
    };
    let extra = (slug == CONTACT_SLUG).then(|| contact_form(&dictionary, &locale, None));

    info!(
        "Composed {} sections (fallback: {})",
        composed.sections.len(),
        composed.is_fallback
    );
    println!("{}", render_page(&composed, &ctx, extra).into_string());

    Ok(())
}

//! XML sitemap: one entry per (locale, page).

use chrono::{DateTime, SecondsFormat, Utc};
use futures::future::join_all;
use maud::{html, PreEscaped};
use tracing::warn;

use crate::cms::ContentSource;
use crate::fallback::HOME_SLUG;
use crate::i18n::Locale;
use crate::seo::page_url;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub url: String,
    pub last_modified: DateTime<Utc>,
    pub change_frequency: &'static str,
    pub priority: f32,
}

/// Collect entries for every supported locale.
///
/// Locales are listed concurrently. Every locale gets a home page entry, even
/// when its listing fails or the CMS has no home page, since home always
/// renders.
pub async fn build_entries(
    content: &dyn ContentSource,
    locales: &[Locale],
    public_url: &str,
    now: DateTime<Utc>,
) -> Vec<SitemapEntry> {
    let listings = join_all(locales.iter().map(|locale| content.list_pages(locale))).await;

    let mut entries = Vec::new();
    for (locale, listing) in locales.iter().zip(listings) {
        let Some(pages) = listing else {
            warn!("Page listing failed for {}, sitemap only has its home page", locale);
            entries.push(entry(public_url, locale, HOME_SLUG, None, now));
            continue;
        };

        if !pages.iter().any(|p| p.slug == HOME_SLUG) {
            entries.push(entry(public_url, locale, HOME_SLUG, None, now));
        }
        for page in pages {
            entries.push(entry(public_url, locale, &page.slug, page.updated_at, now));
        }
    }

    entries
}

fn entry(
    public_url: &str,
    locale: &Locale,
    slug: &str,
    updated_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> SitemapEntry {
    SitemapEntry {
        url: page_url(public_url, locale.code(), slug, HOME_SLUG),
        last_modified: updated_at.unwrap_or(now),
        change_frequency: "weekly",
        priority: if slug == HOME_SLUG { 1.0 } else { 0.8 },
    }
}

pub fn render_xml(entries: &[SitemapEntry]) -> String {
    let body = html! {
        urlset xmlns=(SITEMAP_NS) {
            @for entry in entries {
                url {
                    loc { (entry.url) }
                    lastmod { (entry.last_modified.to_rfc3339_opts(SecondsFormat::Secs, true)) }
                    changefreq { (entry.change_frequency) }
                    priority { (PreEscaped(format!("{:.1}", entry.priority))) }
                }
            }
        }
    };

    format!("{}\n{}", XML_DECLARATION, body.into_string())
}

pub async fn generate(
    content: &dyn ContentSource,
    locales: &[Locale],
    public_url: &str,
) -> String {
    let entries = build_entries(content, locales, public_url, Utc::now()).await;
    render_xml(&entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::memory::MemoryContent;
    use crate::content::Page;
    use crate::i18n::LocaleRegistry;
    use chrono::TimeZone;

    fn locales() -> Vec<Locale> {
        LocaleRegistry::new(&["en", "fr"], "en")
            .expect("valid registry")
            .list_supported()
            .to_vec()
    }

    fn page(slug: &str, updated_at: Option<DateTime<Utc>>) -> Page {
        Page {
            slug: slug.to_string(),
            updated_at,
            ..Page::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_entries_per_locale_and_page() {
        let updated = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let content = MemoryContent::default()
            .with_page("en", page("home", Some(updated)))
            .with_page("en", page("about", None))
            .with_page("fr", page("home", None));

        let entries = build_entries(&content, &locales(), "https://site.example", now()).await;

        assert_eq!(entries.len(), 3);
        let about = entries
            .iter()
            .find(|e| e.url == "https://site.example/en/about")
            .expect("about entry");
        assert_eq!(about.priority, 0.8);
        assert_eq!(about.last_modified, now());

        let home = entries
            .iter()
            .find(|e| e.url == "https://site.example/en")
            .expect("home entry");
        assert_eq!(home.priority, 1.0);
        assert_eq!(home.last_modified, updated);

        assert!(entries.iter().any(|e| e.url == "https://site.example/fr"));
    }

    #[tokio::test]
    async fn test_offline_cms_yields_locale_homes() {
        let content = MemoryContent {
            offline: true,
            ..MemoryContent::default()
        };
        let entries = build_entries(&content, &locales(), "https://site.example", now()).await;
        let urls: Vec<&str> = entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec!["https://site.example/en", "https://site.example/fr"]);
    }

    #[tokio::test]
    async fn test_home_entry_added_when_missing() {
        let content = MemoryContent::default().with_page("en", page("about", None));
        let entries = build_entries(&content, &locales(), "https://site.example", now()).await;
        let urls: Vec<&str> = entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://site.example/en",
                "https://site.example/en/about",
                "https://site.example/fr"
            ]
        );
    }

    #[test]
    fn test_render_xml() {
        let xml = render_xml(&[SitemapEntry {
            url: "https://site.example/en/a&b".to_string(),
            last_modified: now(),
            change_frequency: "weekly",
            priority: 0.8,
        }]);

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#));
        assert!(xml.contains("<loc>https://site.example/en/a&amp;b</loc>"));
        assert!(xml.contains("<lastmod>2024-06-01T12:00:00Z</lastmod>"));
        assert!(xml.contains("<changefreq>weekly</changefreq>"));
        assert!(xml.contains("<priority>0.8</priority>"));
    }
}

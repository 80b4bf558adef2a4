//! Page composition: content fetch, fallback, metadata and rendering.
//!
//! A route (slug + resolved locale) becomes a [`ComposedPage`]. The page and
//! the locale's global settings are fetched concurrently; content failures
//! degrade to built-in content and only a missing non-home page is an error.

use tracing::{debug, info};

use crate::cms::ContentSource;
use crate::content::{GlobalSettings, LocalizedVariant, Page, Seo};
use crate::error::PageError;
use crate::fallback::{self, FallbackPage, HOME_SLUG};
use crate::i18n::Locale;
use crate::sections::{RenderedSection, SectionRenderer};
use crate::seo::{page_url, resolve_seo, ResolvedSeo, SeoDefaults};

/// Site-level values the composer needs besides content.
#[derive(Debug, Clone)]
pub struct SiteContext {
    /// CMS origin; relative media paths are resolved against it
    pub cms_url: String,
    /// Public origin of this site, for canonical URLs
    pub public_url: String,
    pub defaults: SeoDefaults,
}

impl SiteContext {
    pub fn new(cms_url: impl Into<String>, public_url: impl Into<String>) -> Self {
        Self {
            cms_url: cms_url.into(),
            public_url: public_url.into(),
            defaults: fallback::site_defaults(),
        }
    }
}

/// Everything the layout needs to produce a full document.
#[derive(Debug, Clone)]
pub struct ComposedPage {
    pub locale: Locale,
    pub slug: String,
    pub title: String,
    pub sections: Vec<RenderedSection>,
    pub seo: ResolvedSeo,
    /// Global settings for the locale, if the fetch succeeded
    pub settings: Option<GlobalSettings>,
    pub localizations: Vec<LocalizedVariant>,
    /// True when the sections come from built-in content
    pub is_fallback: bool,
}

pub struct PageComposer<'a> {
    content: &'a dyn ContentSource,
    site: &'a SiteContext,
}

impl<'a> PageComposer<'a> {
    pub fn new(content: &'a dyn ContentSource, site: &'a SiteContext) -> Self {
        Self { content, site }
    }

    /// Compose the page at `slug`.
    ///
    /// The home page always composes, using built-in content when the CMS
    /// has no page or the page has no sections. Any other missing page is
    /// [`PageError::NotFound`].
    pub async fn compose_page(&self, slug: &str, locale: &Locale) -> Result<ComposedPage, PageError> {
        let fallback = (slug == HOME_SLUG).then(fallback::home_page);
        self.compose(slug, locale, fallback).await
    }

    /// Compose the page at `slug`, substituting `fallback` when it is missing.
    pub async fn compose_page_or(
        &self,
        slug: &str,
        locale: &Locale,
        fallback: FallbackPage,
    ) -> ComposedPage {
        match self.compose(slug, locale, Some(fallback.clone())).await {
            Ok(page) => page,
            Err(_) => self.from_fallback(slug, locale, None, fallback),
        }
    }

    async fn compose(
        &self,
        slug: &str,
        locale: &Locale,
        fallback: Option<FallbackPage>,
    ) -> Result<ComposedPage, PageError> {
        let (page, settings) = tokio::join!(
            self.content.fetch_page_by_slug(slug, locale),
            self.content.fetch_global_settings(locale),
        );

        match (page, fallback) {
            (Some(page), Some(fallback)) if page.sections.is_empty() => {
                debug!("Page '{}' ({}) has no sections, using built-in sections", slug, locale);
                let seo = self.resolve_metadata(slug, locale, page.seo.as_ref(), settings.as_ref(), None);
                Ok(ComposedPage {
                    sections: self.renderer(locale).render(Some(&fallback.sections)),
                    locale: locale.clone(),
                    slug: slug.to_string(),
                    title: non_blank_title(&page.title, &fallback.title),
                    seo,
                    settings,
                    localizations: page.localizations,
                    is_fallback: true,
                })
            }
            (Some(page), _) => Ok(self.from_page(locale, page, settings)),
            (None, Some(fallback)) => {
                info!("No CMS content for '{}' ({}), serving built-in page", slug, locale);
                Ok(self.from_fallback(slug, locale, settings, fallback))
            }
            (None, None) => Err(PageError::NotFound {
                slug: slug.to_string(),
                locale: locale.code().to_string(),
            }),
        }
    }

    fn renderer(&self, locale: &Locale) -> SectionRenderer {
        SectionRenderer::new(self.site.cms_url.clone()).with_link_prefix(locale.path_prefix())
    }

    fn from_page(&self, locale: &Locale, page: Page, settings: Option<GlobalSettings>) -> ComposedPage {
        let seo = self.resolve_metadata(&page.slug, locale, page.seo.as_ref(), settings.as_ref(), None);
        ComposedPage {
            sections: self.renderer(locale).render(Some(&page.sections)),
            locale: locale.clone(),
            slug: page.slug,
            title: page.title,
            seo,
            settings,
            localizations: page.localizations,
            is_fallback: false,
        }
    }

    fn from_fallback(
        &self,
        slug: &str,
        locale: &Locale,
        settings: Option<GlobalSettings>,
        fallback: FallbackPage,
    ) -> ComposedPage {
        // Built-in metadata stands in for the missing page's own SEO block.
        let page_seo = Seo::from(&fallback.seo);
        let seo = self.resolve_metadata(slug, locale, Some(&page_seo), settings.as_ref(), Some(&fallback.seo));
        ComposedPage {
            sections: self.renderer(locale).render(Some(&fallback.sections)),
            locale: locale.clone(),
            slug: slug.to_string(),
            title: fallback.title,
            seo,
            settings,
            localizations: Vec::new(),
            is_fallback: true,
        }
    }

    fn resolve_metadata(
        &self,
        slug: &str,
        locale: &Locale,
        page_seo: Option<&Seo>,
        settings: Option<&GlobalSettings>,
        defaults: Option<&SeoDefaults>,
    ) -> ResolvedSeo {
        let canonical = page_url(&self.site.public_url, locale.code(), slug, HOME_SLUG);
        resolve_seo(
            page_seo,
            settings.and_then(|s| s.seo.as_ref()),
            defaults.unwrap_or(&self.site.defaults),
            canonical,
            &self.site.cms_url,
        )
    }
}

fn non_blank_title(title: &str, fallback: &str) -> String {
    if title.trim().is_empty() {
        fallback.to_string()
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::memory::MemoryContent;
    use crate::content::Section;
    use crate::i18n::LocaleRegistry;
    use crate::sections::SectionKind;
    use serde_json::json;

    // ==================== Helper Functions ====================

    fn site() -> SiteContext {
        SiteContext {
            cms_url: "https://cms.example".to_string(),
            public_url: "https://site.example".to_string(),
            defaults: SeoDefaults {
                title: "C".to_string(),
                description: "Default description".to_string(),
                keywords: None,
                image: None,
            },
        }
    }

    fn locale(code: &str) -> Locale {
        LocaleRegistry::new(&["en", "fr"], "en")
            .expect("valid registry")
            .resolve(code)
    }

    fn page(slug: &str, sections: Vec<Section>, seo: Option<Seo>) -> Page {
        Page {
            id: 1,
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            locale: Some("en".to_string()),
            sections,
            seo,
            ..Page::default()
        }
    }

    fn titled(title: &str) -> Seo {
        Seo {
            meta_title: Some(title.to_string()),
            ..Seo::default()
        }
    }

    fn settings_with_seo(title: &str) -> GlobalSettings {
        GlobalSettings {
            seo: Some(titled(title)),
            ..GlobalSettings::default()
        }
    }

    // ==================== Fallback Tests ====================

    #[tokio::test]
    async fn test_home_never_not_found_when_cms_offline() {
        let content = MemoryContent {
            offline: true,
            ..MemoryContent::default()
        };
        let site = site();
        let composed = PageComposer::new(&content, &site)
            .compose_page("home", &locale("en"))
            .await
            .expect("home always composes");

        assert!(composed.is_fallback);
        assert_eq!(composed.sections.len(), 5);
        assert_eq!(composed.seo.title, fallback::SITE_TITLE);
        assert_eq!(composed.seo.canonical_url, "https://site.example/en");
    }

    #[tokio::test]
    async fn test_home_with_empty_sections_uses_fallback_sections() {
        let content =
            MemoryContent::default().with_page("en", page("home", vec![], Some(titled("A"))));
        let site = site();
        let composed = PageComposer::new(&content, &site)
            .compose_page("home", &locale("en"))
            .await
            .expect("home always composes");

        assert!(composed.is_fallback);
        assert_eq!(composed.sections[0].kind, SectionKind::Hero);
        assert_eq!(composed.seo.title, "A");
    }

    #[tokio::test]
    async fn test_missing_page_is_not_found() {
        let content = MemoryContent::default();
        let site = site();
        let err = PageComposer::new(&content, &site)
            .compose_page("nonexistent-xyz", &locale("en"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            PageError::NotFound {
                slug: "nonexistent-xyz".to_string(),
                locale: "en".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_compose_page_or_uses_given_fallback() {
        let content = MemoryContent::default().with_settings("en", settings_with_seo("B"));
        let site = site();
        let composed = PageComposer::new(&content, &site)
            .compose_page_or("contact", &locale("en"), fallback::contact_page())
            .await;

        assert!(composed.is_fallback);
        assert_eq!(composed.seo.title, "Contact Us");
        assert_eq!(composed.seo.canonical_url, "https://site.example/en/contact");
        assert!(composed.settings.is_some());
    }

    // ==================== Content Tests ====================

    #[tokio::test]
    async fn test_page_sections_rendered_in_order() {
        let sections = vec![
            Section::from_value(json!({"__component": "sections.cta", "title": "Go"})),
            Section::from_value(json!({"__component": "sections.unknown"})),
            Section::from_value(json!({"__component": "sections.hero", "title": "Hi"})),
        ];
        let content = MemoryContent::default().with_page("fr", page("about", sections, None));
        let site = site();
        let composed = PageComposer::new(&content, &site)
            .compose_page("about", &locale("fr"))
            .await
            .expect("page exists");

        let kinds: Vec<SectionKind> = composed.sections.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SectionKind::Cta, SectionKind::Hero]);
        assert!(!composed.is_fallback);
        assert_eq!(composed.title, "ABOUT");
        assert_eq!(composed.seo.canonical_url, "https://site.example/fr/about");
    }

    #[tokio::test]
    async fn test_metadata_precedence() {
        let hero = vec![Section::from_value(json!({"__component": "sections.hero"}))];
        let site = site();

        let content = MemoryContent::default()
            .with_page("en", page("about", hero.clone(), Some(titled("A"))))
            .with_settings("en", settings_with_seo("B"));
        let composed = PageComposer::new(&content, &site)
            .compose_page("about", &locale("en"))
            .await
            .expect("page exists");
        assert_eq!(composed.seo.title, "A");

        let content = MemoryContent::default()
            .with_page("en", page("about", hero.clone(), None))
            .with_settings("en", settings_with_seo("B"));
        let composed = PageComposer::new(&content, &site)
            .compose_page("about", &locale("en"))
            .await
            .expect("page exists");
        assert_eq!(composed.seo.title, "B");

        let content = MemoryContent::default().with_page("en", page("about", hero, None));
        let composed = PageComposer::new(&content, &site)
            .compose_page("about", &locale("en"))
            .await
            .expect("page exists");
        assert_eq!(composed.seo.title, "C");
    }

    #[tokio::test]
    async fn test_page_title_is_not_metadata() {
        let content = MemoryContent::default().with_page(
            "en",
            page("services", vec![Section::from_value(json!({"__component": "sections.stats"}))], None),
        );
        let site = site();
        let composed = PageComposer::new(&content, &site)
            .compose_page("services", &locale("en"))
            .await
            .expect("page exists");
        assert_eq!(composed.title, "SERVICES");
        assert_eq!(composed.seo.title, "C");
    }
}

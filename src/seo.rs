//! Page metadata resolution.
//!
//! Each field is taken from the first layer that has it: the page's own SEO
//! block, then the locale's global-settings SEO block, then site defaults.
//! Blank strings count as absent.

use regex::Regex;
use std::sync::OnceLock;

use crate::content::{Media, Seo};
use crate::sections::present;

pub const DEFAULT_ROBOTS: &str = "index, follow";

/// Last layer of the metadata chain, always complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeoDefaults {
    pub title: String,
    pub description: String,
    pub keywords: Option<String>,
    pub image: Option<String>,
}

impl From<&SeoDefaults> for Seo {
    fn from(defaults: &SeoDefaults) -> Self {
        Seo {
            meta_title: Some(defaults.title.clone()),
            meta_description: Some(defaults.description.clone()),
            keywords: defaults.keywords.clone(),
            meta_image: defaults.image.clone().map(|url| Media {
                url,
                alternative_text: None,
            }),
            ..Seo::default()
        }
    }
}

/// Metadata ready to be written into the document head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSeo {
    pub title: String,
    pub description: String,
    pub keywords: Option<String>,
    pub canonical_url: String,
    pub robots: String,
    /// Absolute social preview image URL
    pub image_url: Option<String>,
}

/// Merge the three metadata layers.
///
/// `canonical_url` is used unless the page itself declares one; the global
/// layer never supplies a canonical URL since it would apply to every page.
/// Image paths are absolutized against `media_base_url`.
pub fn resolve_seo(
    page: Option<&Seo>,
    global: Option<&Seo>,
    defaults: &SeoDefaults,
    canonical_url: String,
    media_base_url: &str,
) -> ResolvedSeo {
    let layers = [page, global];

    let image = layers
        .iter()
        .flatten()
        .find_map(|seo| seo.meta_image.as_ref().map(|m| m.url.clone()))
        .or_else(|| defaults.image.clone());

    ResolvedSeo {
        title: first_present(&layers, |s| &s.meta_title).unwrap_or_else(|| defaults.title.clone()),
        description: first_present(&layers, |s| &s.meta_description)
            .unwrap_or_else(|| defaults.description.clone()),
        keywords: first_present(&layers, |s| &s.keywords).or_else(|| defaults.keywords.clone()),
        canonical_url: page
            .and_then(|seo| present(&seo.canonical_url))
            .map(str::to_string)
            .unwrap_or(canonical_url),
        robots: first_present(&layers, |s| &s.meta_robots).unwrap_or_else(|| DEFAULT_ROBOTS.to_string()),
        image_url: image.map(|path| absolutize_url(&path, media_base_url)),
    }
}

fn first_present(layers: &[Option<&Seo>], field: fn(&Seo) -> &Option<String>) -> Option<String> {
    layers
        .iter()
        .flatten()
        .find_map(|seo| present(field(seo)))
        .map(str::to_string)
}

fn scheme_regex() -> &'static Regex {
    static SCHEME: OnceLock<Regex> = OnceLock::new();
    SCHEME.get_or_init(|| {
        Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*://")
            .unwrap_or_else(|e| panic!("scheme regex is invalid: {}", e))
    })
}

/// Prefix a CMS-relative path with `base_url`. Absolute (`scheme://`) and
/// protocol-relative (`//host`) URLs are returned unchanged.
pub fn absolutize_url(path: &str, base_url: &str) -> String {
    if scheme_regex().is_match(path) || path.starts_with("//") {
        return path.to_string();
    }

    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Public URL of a page: the home page lives at the locale root.
pub fn page_url(public_url: &str, locale: &str, slug: &str, home_slug: &str) -> String {
    let base = public_url.trim_end_matches('/');
    if slug == home_slug {
        format!("{}/{}", base, locale)
    } else {
        format!("{}/{}/{}", base, locale, slug)
    }
}

//! Full HTML documents: head metadata, navigation, footer.

use chrono::{Datelike, Utc};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use regex::Regex;
use std::sync::OnceLock;

use crate::composer::ComposedPage;
use crate::contact::SubmissionOutcome;
use crate::content::{GlobalSettings, Link, LocalizedVariant, ThemeToken};
use crate::fallback::HOME_SLUG;
use crate::i18n::{Dictionary, Locale};
use crate::sections::{href, link_button, present, safe_color, safe_href};
use crate::seo::ResolvedSeo;

/// Per-request values shared by every document.
pub struct LayoutContext<'a> {
    pub locales: &'a [Locale],
    pub dictionary: &'a Dictionary,
}

/// Wrap a composed page in a document. `after_sections` is appended to the
/// main content (the contact form, for instance).
pub fn render_page(page: &ComposedPage, ctx: &LayoutContext, after_sections: Option<Markup>) -> Markup {
    let main = html! {
        @for section in &page.sections {
            (section.markup)
        }
        @if let Some(extra) = after_sections {
            (extra)
        }
    };

    document(
        &page.locale,
        page.settings.as_ref(),
        ctx,
        Some(&page.seo),
        &page.seo.title,
        &Switcher {
            slug: &page.slug,
            localizations: &page.localizations,
        },
        main,
    )
}

pub fn render_not_found(locale: &Locale, settings: Option<&GlobalSettings>, ctx: &LayoutContext) -> Markup {
    let dict = ctx.dictionary;
    let main = html! {
        section.section.not-found {
            div.container {
                h1 { (dict.t("notFound.title")) }
                p { (dict.t("notFound.message")) }
                a.btn.btn-primary href=(locale.path_prefix()) { (dict.t("notFound.back")) }
            }
        }
    };

    document(
        locale,
        settings,
        ctx,
        None,
        dict.t("notFound.title"),
        &Switcher {
            slug: HOME_SLUG,
            localizations: &[],
        },
        main,
    )
}

/// The public contact form, posted to the contact API. `status` is the
/// outcome of the previous browser submission, if any.
pub fn contact_form(dict: &Dictionary, locale: &Locale, status: Option<SubmissionOutcome>) -> Markup {
    html! {
        section.section.contact-form {
            div.container {
                @if let Some(status) = status {
                    p class=(format!("form-status form-status-{}", status.as_str())) role="status" {
                        (dict.t(status.message_key()))
                    }
                }
                form method="post" action="/api/contact" {
                    input type="hidden" name="locale" value=(locale.code());
                    label { (dict.t("contact.name")) input type="text" name="name" required; }
                    label { (dict.t("contact.email")) input type="email" name="email" required; }
                    label { (dict.t("contact.phone")) input type="tel" name="phone"; }
                    label { (dict.t("contact.company")) input type="text" name="company"; }
                    label { (dict.t("contact.subject")) input type="text" name="subject"; }
                    label { (dict.t("contact.message")) textarea name="message" rows="6" minlength="10" required {} }
                    button.btn.btn-primary type="submit" { (dict.t("contact.submit")) }
                }
            }
        }
    }
}

/// Which page the language switcher should point at in other locales.
struct Switcher<'a> {
    slug: &'a str,
    localizations: &'a [LocalizedVariant],
}

impl Switcher<'_> {
    fn path_for(&self, locale: &Locale) -> String {
        let slug = self
            .localizations
            .iter()
            .find(|l| l.locale == locale.code())
            .map(|l| l.slug.as_str())
            .unwrap_or(self.slug);

        if slug == HOME_SLUG {
            locale.path_prefix()
        } else {
            format!("{}/{}", locale.path_prefix(), slug)
        }
    }
}

fn document(
    locale: &Locale,
    settings: Option<&GlobalSettings>,
    ctx: &LayoutContext,
    seo: Option<&ResolvedSeo>,
    title: &str,
    switcher: &Switcher,
    main: Markup,
) -> Markup {
    let theme = settings.map(theme_css).filter(|css| !css.is_empty());

    html! {
        (DOCTYPE)
        html lang=(locale.code()) {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                @if let Some(seo) = seo {
                    meta name="description" content=(seo.description);
                    @if let Some(keywords) = &seo.keywords {
                        meta name="keywords" content=(keywords);
                    }
                    meta name="robots" content=(seo.robots);
                    link rel="canonical" href=(seo.canonical_url);
                    meta property="og:type" content="website";
                    meta property="og:title" content=(seo.title);
                    meta property="og:description" content=(seo.description);
                    meta property="og:url" content=(seo.canonical_url);
                    meta property="og:locale" content=(locale.code());
                    @if let Some(image) = &seo.image_url {
                        meta property="og:image" content=(image);
                    }
                    @for other in ctx.locales.iter().filter(|l| *l != locale) {
                        @if switcher.localizations.iter().any(|l| l.locale == other.code()) || switcher.slug == HOME_SLUG {
                            link rel="alternate" hreflang=(other.code()) href=(switcher.path_for(other));
                        }
                    }
                } @else {
                    meta name="robots" content="noindex";
                }
                @if let Some(css) = theme {
                    style { (PreEscaped(css)) }
                }
            }
            body {
                (header(locale, settings, ctx, switcher))
                main { (main) }
                (footer(locale, settings, ctx.dictionary))
            }
        }
    }
}

fn default_nav_links(dict: &Dictionary) -> Vec<Link> {
    [
        ("nav.home", "/"),
        ("nav.about", "/about"),
        ("nav.services", "/services"),
        ("nav.contact", "/contact"),
    ]
    .into_iter()
    .map(|(key, url)| Link {
        text: dict.t(key).to_string(),
        url: url.to_string(),
        open_in_new_tab: false,
    })
    .collect()
}

fn header(locale: &Locale, settings: Option<&GlobalSettings>, ctx: &LayoutContext, switcher: &Switcher) -> Markup {
    let dict = ctx.dictionary;
    let prefix = locale.path_prefix();
    let navigation = settings.and_then(|s| s.navigation.as_ref());

    let links = navigation
        .map(|n| n.links.clone())
        .filter(|links| !links.is_empty())
        .unwrap_or_else(|| default_nav_links(dict));
    let cta = navigation
        .and_then(|n| n.cta_button.clone())
        .unwrap_or_else(|| Link {
            text: dict.t("nav.contact").to_string(),
            url: "/contact".to_string(),
            open_in_new_tab: false,
        });
    let site_name = settings
        .and_then(|s| present(&s.site_name))
        .unwrap_or("MENAPS");

    html! {
        header.site-header {
            nav.container {
                a.brand href=(prefix) { (site_name) }
                ul.nav__links {
                    @for link in &links {
                        li { (link_button(link, "nav__link", &prefix)) }
                    }
                }
                (link_button(&cta, "btn btn-primary nav__cta", &prefix))
                @if ctx.locales.len() > 1 {
                    ul.language-switcher aria-label=(dict.t("nav.language")) {
                        @for other in ctx.locales {
                            li {
                                a href=(switcher.path_for(other)) hreflang=(other.code())
                                    aria-current=[(other == locale).then_some("true")] {
                                    (other.native_name())
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn footer(locale: &Locale, settings: Option<&GlobalSettings>, dict: &Dictionary) -> Markup {
    let prefix = locale.path_prefix();
    let footer = settings.and_then(|s| s.footer.as_ref());
    let description = footer
        .and_then(|f| present(&f.description))
        .map(str::to_string)
        .unwrap_or_else(|| dict.t("footer.description").to_string());

    let columns: Vec<(String, Vec<Link>)> = match footer.filter(|f| !f.columns.is_empty()) {
        Some(footer) => footer
            .columns
            .iter()
            .map(|c| (c.title.clone(), c.links.clone()))
            .collect(),
        None => default_footer_columns(dict),
    };

    let social = settings.map(|s| s.social_links.as_slice()).unwrap_or_default();
    let site_name = settings
        .and_then(|s| present(&s.site_name))
        .unwrap_or("MENAPS");
    let copyright = settings
        .and_then(|s| present(&s.copyright_text))
        .map(str::to_string)
        .unwrap_or_else(|| format!("© {} {}", Utc::now().year(), site_name));

    html! {
        footer.site-footer {
            div.container {
                p.footer__description { (description) }
                @for (title, links) in &columns {
                    div.footer__column {
                        h4 { (title) }
                        ul {
                            @for link in links {
                                li { a href=(href(Some(&link.url), &prefix)) { (link.text) } }
                            }
                        }
                    }
                }
                @if !social.is_empty() {
                    div.footer__social {
                        h4 { (dict.t("footer.follow")) }
                        ul {
                            @for link in social {
                                li {
                                    a href=(safe_href(Some(&link.url))) target="_blank" rel="noopener noreferrer" {
                                        (link.platform)
                                    }
                                }
                            }
                        }
                    }
                }
                p.footer__copyright { (copyright) }
            }
        }
    }
}

fn default_footer_columns(dict: &Dictionary) -> Vec<(String, Vec<Link>)> {
    let link = |key: &str, url: &str| Link {
        text: dict.t(key).to_string(),
        url: url.to_string(),
        open_in_new_tab: false,
    };

    vec![
        (
            dict.t("footer.quickLinks").to_string(),
            default_nav_links(dict),
        ),
        (
            dict.t("footer.legal").to_string(),
            vec![link("footer.privacy", "/privacy"), link("footer.terms", "/terms")],
        ),
    ]
}

fn token_name_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z][a-zA-Z0-9-]{0,40}$")
            .unwrap_or_else(|e| panic!("token regex is invalid: {}", e))
    })
}

fn css_variables(tokens: &[ThemeToken]) -> String {
    tokens
        .iter()
        .filter(|t| token_name_regex().is_match(t.name.trim()))
        .filter_map(|t| safe_color(&t.value).map(|value| format!("--color-{}: {};", t.name.trim(), value)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Theme color tokens as CSS custom properties; invalid tokens are dropped.
fn theme_css(settings: &GlobalSettings) -> String {
    let light = css_variables(&settings.light_theme);
    let dark = css_variables(&settings.dark_theme);

    let mut css = String::new();
    if !light.is_empty() {
        css.push_str(&format!(":root {{ {} }}", light));
    }
    if !dark.is_empty() {
        css.push_str(&format!(
            " @media (prefers-color-scheme: dark) {{ :root {{ {} }} }}",
            dark
        ));
    }
    css
}

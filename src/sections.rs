//! Section registry and renderer.
//!
//! The set of section types is closed: [`SectionKind`] enumerates it, the
//! registry maps CMS component tags onto it, and [`SectionRenderer::render`]
//! dispatches each decoded [`Section`] with an exhaustive match. Unknown and
//! malformed sections are logged and skipped; rendering never fails.

use maud::{html, Markup, PreEscaped};
use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

use crate::content::{
    CtaSection, DistinctionFeature, DistinctionSection, FeaturesSection, HeroSection, Link,
    Media, Partner, PartnersSection, Section, ServiceItem, ServicesGridSection, StatItem,
    StatsSection, TestimonialsSection,
};
use crate::seo::absolutize_url;

// ==================== Registry ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Hero,
    Features,
    Cta,
    Testimonials,
    Distinction,
    ServicesGrid,
    Stats,
    Partners,
}

/// Registry entry for one section type.
#[derive(Debug, Clone)]
pub struct SectionType {
    pub kind: SectionKind,
    /// Canonical component tag, as stored in the CMS
    pub tag: &'static str,
    /// Human-readable name for logs
    pub name: &'static str,
}

const SECTION_TYPES: &[SectionType] = &[
    SectionType {
        kind: SectionKind::Hero,
        tag: "sections.hero",
        name: "Hero",
    },
    SectionType {
        kind: SectionKind::Features,
        tag: "sections.features",
        name: "Features",
    },
    SectionType {
        kind: SectionKind::Cta,
        tag: "sections.cta",
        name: "Call to action",
    },
    SectionType {
        kind: SectionKind::Testimonials,
        tag: "sections.testimonials",
        name: "Testimonials",
    },
    SectionType {
        kind: SectionKind::Distinction,
        tag: "sections.distinction",
        name: "Distinction",
    },
    SectionType {
        kind: SectionKind::ServicesGrid,
        tag: "sections.services-grid",
        name: "Services grid",
    },
    SectionType {
        kind: SectionKind::Stats,
        tag: "sections.stats",
        name: "Stats",
    },
    SectionType {
        kind: SectionKind::Partners,
        tag: "sections.partners",
        name: "Partners",
    },
];

/// Older content stores components under this namespace.
const LEGACY_NAMESPACE: &str = "component.";
const NAMESPACE: &str = "sections.";

impl SectionKind {
    /// Look up a component tag. Accepts the legacy `component.*` namespace.
    pub fn from_tag(tag: &str) -> Option<SectionKind> {
        let normalized = match tag.strip_prefix(LEGACY_NAMESPACE) {
            Some(rest) => format!("{}{}", NAMESPACE, rest),
            None => tag.to_string(),
        };
        SECTION_TYPES
            .iter()
            .find(|t| t.tag == normalized)
            .map(|t| t.kind)
    }

    pub fn section_type(&self) -> &'static SectionType {
        SECTION_TYPES
            .iter()
            .find(|t| t.kind == *self)
            .unwrap_or(&SECTION_TYPES[0])
    }

    pub fn tag(&self) -> &'static str {
        self.section_type().tag
    }

    pub fn all() -> impl Iterator<Item = SectionKind> {
        SECTION_TYPES.iter().map(|t| t.kind)
    }
}

// ==================== Renderer ====================

/// One rendered section, tagged with the kind it came from.
#[derive(Debug, Clone)]
pub struct RenderedSection {
    pub kind: SectionKind,
    pub markup: Markup,
}

/// Turns decoded sections into HTML. Holds the media origin used to
/// absolutize CMS-relative asset paths and the locale prefix for internal
/// links; no I/O.
#[derive(Debug, Clone)]
pub struct SectionRenderer {
    media_base_url: String,
    link_prefix: String,
}

impl SectionRenderer {
    pub fn new(media_base_url: impl Into<String>) -> Self {
        Self {
            media_base_url: media_base_url.into(),
            link_prefix: String::new(),
        }
    }

    /// Prefix internal links (`/about`) with a locale path (`/fr`).
    pub fn with_link_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.link_prefix = prefix.into();
        self
    }

    fn href(&self, url: Option<&str>) -> String {
        href(url, &self.link_prefix)
    }

    fn button(&self, link: &Link, class: &str) -> Markup {
        link_button(link, class, &self.link_prefix)
    }

    /// Render sections in order, skipping unknown and malformed ones.
    ///
    /// `None` and an empty slice both produce an empty result.
    pub fn render(&self, sections: Option<&[Section]>) -> Vec<RenderedSection> {
        let Some(sections) = sections else {
            return Vec::new();
        };

        sections
            .iter()
            .enumerate()
            .filter_map(|(index, section)| self.render_section(index, section))
            .collect()
    }

    fn render_section(&self, index: usize, section: &Section) -> Option<RenderedSection> {
        let markup = match section {
            Section::Hero(data) => self.hero(data),
            Section::Features(data) => self.features(data),
            Section::Cta(data) => self.cta(data),
            Section::Testimonials(data) => self.testimonials(data),
            Section::Distinction(data) => self.distinction(data),
            Section::ServicesGrid(data) => self.services_grid(data),
            Section::Stats(data) => stats(data),
            Section::Partners(data) => self.partners(data),
            Section::Unknown { component } => {
                warn!(
                    "Component not found for: '{}' (section {}), skipping",
                    component, index
                );
                return None;
            }
            Section::Malformed { component, error } => {
                warn!(
                    "Section {} ({}) has an invalid payload, skipping: {}",
                    index, component, error
                );
                return None;
            }
        };

        let kind = section.kind()?;
        Some(RenderedSection { kind, markup })
    }

    fn media_url(&self, media: &Media) -> String {
        absolutize_url(&media.url, &self.media_base_url)
    }

    fn background_style(&self, media: Option<&Media>, overlay: f32) -> Option<String> {
        let url = self.media_url(media?);
        css_url(&url).map(|url| {
            format!(
                "background-image: linear-gradient(rgba(0, 0, 0, {overlay}), rgba(0, 0, 0, {overlay})), url('{url}')"
            )
        })
    }

    fn hero(&self, data: &HeroSection) -> Markup {
        let title = present(&data.title).unwrap_or("Welcome to our platform");
        html! {
            section.section.hero style=[self.background_style(data.background_image.as_ref(), 0.4)] {
                div.container {
                    h1.hero__title {
                        (title)
                        @if let Some(highlight) = present(&data.title_highlight) {
                            " " span.text-highlight { (highlight) }
                        }
                    }
                    @if let Some(subtitle) = present(&data.subtitle) {
                        p.hero__subtitle { (subtitle) }
                    }
                    @if let Some(description) = present(&data.description) {
                        p.hero__description { (description) }
                    }
                    div.hero__actions {
                        @if let Some(text) = present(&data.cta_text) {
                            a.btn.btn-primary href=(self.href(data.cta_link.as_deref())) { (text) }
                        }
                        @if let Some(text) = present(&data.secondary_cta_text) {
                            a.btn.btn-outline href=(self.href(data.secondary_cta_link.as_deref())) { (text) }
                        }
                        @for link in &data.cta_buttons {
                            (self.button(link, "btn btn-primary"))
                        }
                    }
                    @if let Some(card) = &data.floating_card {
                        div.hero__card {
                            @if let Some(icon) = present(&card.icon) {
                                span.hero__card-icon { (icon) }
                            }
                            @if let Some(title) = present(&card.title) {
                                strong { (title) }
                            }
                            @if let Some(subtitle) = present(&card.subtitle) {
                                span { (subtitle) }
                            }
                        }
                    }
                    @if data.show_scroll_indicator {
                        div.hero__scroll aria-hidden="true" {}
                    }
                }
            }
        }
    }

    fn features(&self, data: &FeaturesSection) -> Markup {
        let layout = Layout::parse(data.layout.as_deref());
        html! {
            section.section.features {
                div.container {
                    (section_heading(&data.subtitle, &data.title, &data.description))
                    @if !data.features.is_empty() {
                        div class={ "features__items layout-" (layout.as_str()) } {
                            @for feature in &data.features {
                                article.feature {
                                    @if let Some(image) = &feature.image {
                                        img.feature__image src=(self.media_url(image))
                                            alt=(image.alternative_text.as_deref().unwrap_or(&feature.title))
                                            loading="lazy";
                                    } @else if let Some(icon) = present(&feature.icon) {
                                        span.feature__icon { (icon) }
                                    }
                                    h3 { (feature.title) }
                                    @if let Some(description) = present(&feature.description) {
                                        p { (description) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    fn cta(&self, data: &CtaSection) -> Markup {
        let mut style: Vec<String> = Vec::new();
        if let Some(bg) = self.background_style(data.background_image.as_ref(), 0.6) {
            style.push(bg);
        }
        if let Some(color) = data.background_color.as_deref().and_then(safe_color) {
            style.push(format!("background-color: {}", color));
        }
        if let Some(color) = data.text_color.as_deref().and_then(safe_color) {
            style.push(format!("color: {}", color));
        }
        let style = (!style.is_empty()).then(|| style.join("; "));

        html! {
            section.section.cta style=[style] {
                div.container {
                    @if let Some(subtitle) = present(&data.subtitle) {
                        p.eyebrow { (subtitle) }
                    }
                    @if let Some(title) = present(&data.title) {
                        h2 { (title) }
                    }
                    @if let Some(description) = present(&data.description) {
                        p { (description) }
                    }
                    @if data.link.is_some() || data.secondary_link.is_some() {
                        div.cta__actions {
                            @if let Some(link) = &data.link {
                                (self.button(link, "btn btn-primary"))
                            }
                            @if let Some(link) = &data.secondary_link {
                                (self.button(link, "btn btn-outline"))
                            }
                        }
                    }
                }
            }
        }
    }

    fn testimonials(&self, data: &TestimonialsSection) -> Markup {
        let layout = Layout::parse(data.layout.as_deref());
        html! {
            section.section.testimonials {
                div.container {
                    (section_heading(&data.subtitle, &data.title, &data.description))
                    @if !data.testimonials.is_empty() {
                        div class={ "testimonials__items layout-" (layout.as_str()) } {
                            @for testimonial in &data.testimonials {
                                figure.testimonial {
                                    blockquote { (testimonial.quote) }
                                    figcaption {
                                        @if let Some(image) = &testimonial.image {
                                            img.testimonial__avatar src=(self.media_url(image))
                                                alt=(testimonial.author) loading="lazy";
                                        }
                                        strong { (testimonial.author) }
                                        @if let Some(role) = attribution(testimonial.role.as_deref(), testimonial.company.as_deref()) {
                                            span { (role) }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    fn partners(&self, data: &PartnersSection) -> Markup {
        let defaults;
        let partners: &[Partner] = if data.partners.is_empty() {
            defaults = default_partners();
            &defaults
        } else {
            &data.partners
        };
        let title = present(&data.title).unwrap_or("Trusted by Industry Leaders");

        html! {
            section.section.partners {
                div.container {
                    h3.partners__title { (title) }
                }
                div.partners__track {
                    @for (copy, hidden) in [(0, false), (1, true)] {
                        ul.partners__row aria-hidden=[hidden.then_some("true")] data-copy=(copy) {
                            @for partner in partners {
                                li.partner {
                                    @if let Some(logo) = &partner.logo {
                                        img src=(self.media_url(logo)) alt=(partner.name) loading="lazy";
                                    } @else {
                                        span.partner__name { (partner.name) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    fn distinction(&self, data: &DistinctionSection) -> Markup {
        let defaults;
        let features: &[DistinctionFeature] = if data.features.is_empty() {
            defaults = default_distinction_features();
            &defaults
        } else {
            &data.features
        };

        html! {
            section.section.distinction {
                div.container {
                    h2 {
                        (present(&data.title).unwrap_or("What makes us"))
                        " "
                        span.text-highlight { (present(&data.highlighted_text).unwrap_or("different?")) }
                    }
                    p { (present(&data.description).unwrap_or(DISTINCTION_DESCRIPTION)) }
                    ul.distinction__features {
                        @for feature in features {
                            li {
                                strong { (feature.title) }
                                @if let Some(description) = present(&feature.description) {
                                    p { (description) }
                                }
                            }
                        }
                    }
                    @if let Some(button) = &data.cta_button {
                        (self.button(button, "btn btn-outline"))
                    }
                }
            }
        }
    }

    fn services_grid(&self, data: &ServicesGridSection) -> Markup {
        let defaults;
        let services: &[ServiceItem] = if data.services.is_empty() {
            defaults = default_services();
            &defaults
        } else {
            &data.services
        };

        html! {
            section.section.services-grid id="expertise" {
                div.container {
                    h2 {
                        (present(&data.title).unwrap_or("Make us your"))
                        " "
                        span.text-highlight { (present(&data.subtitle).unwrap_or("preferred ally")) }
                    }
                    p { (present(&data.description).unwrap_or(SERVICES_DESCRIPTION)) }
                    div.services__grid {
                        @for service in services {
                            article.service {
                                span class={ "icon icon-" (ServiceIcon::parse(service.icon.as_deref()).as_str()) } aria-hidden="true" {}
                                h3 { (service.title) }
                                @if let Some(description) = present(&service.description) {
                                    p { (description) }
                                }
                                @if let Some(link) = service.link.as_deref() {
                                    a.service__link href=(self.href(Some(link))) { (PreEscaped("&rarr;")) }
                                }
                            }
                        }
                    }
                    @if let Some(button) = &data.cta_button {
                        (self.button(button, "btn btn-primary"))
                    }
                }
            }
        }
    }
}

fn stats(data: &StatsSection) -> Markup {
    let defaults;
    let items: &[StatItem] = if data.stats.is_empty() {
        defaults = default_stats();
        &defaults
    } else {
        &data.stats
    };

    html! {
        section.section.stats {
            div.container {
                @if let Some(title) = present(&data.title) {
                    h2 { (title) }
                }
                dl.stats__grid {
                    @for stat in items {
                        div.stat {
                            dt { (stat.label) }
                            dd {
                                span.stat__value { (stat.value) }
                                @if let Some(suffix) = present(&stat.suffix) {
                                    span.stat__suffix { (suffix) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

// ==================== Defaults ====================

const DISTINCTION_DESCRIPTION: &str = "We combine our business expertise with our technological mastery and data in order to bring you sustainable and innovative solutions.";
const SERVICES_DESCRIPTION: &str = "As each company is unique, we are ready to intervene at any stage of the construction process.";

pub(crate) fn default_distinction_features() -> Vec<DistinctionFeature> {
    ["Strategic Integration", "Operational Excellence", "Technological Mastery"]
        .into_iter()
        .map(|title| DistinctionFeature {
            title: title.to_string(),
            description: None,
        })
        .collect()
}

pub(crate) fn default_services() -> Vec<ServiceItem> {
    [
        ("Digital Solutions", "Advanced solutions tailored to your business needs.", "monitor"),
        ("Consulting", "Strategic guidance to optimize your operations.", "briefcase"),
        ("Cybersecurity", "Protecting your assets with cutting-edge security.", "shield-check"),
    ]
    .into_iter()
    .map(|(title, description, icon)| ServiceItem {
        title: title.to_string(),
        description: Some(description.to_string()),
        icon: Some(icon.to_string()),
        link: None,
    })
    .collect()
}

pub(crate) fn default_stats() -> Vec<StatItem> {
    [
        ("500", "Projects Delivered"),
        ("50", "Industry Experts"),
        ("25", "Years Experience"),
        ("15", "Countries Served"),
    ]
    .into_iter()
    .map(|(value, label)| StatItem {
        value: value.to_string(),
        label: label.to_string(),
        suffix: Some("+".to_string()),
    })
    .collect()
}

pub(crate) fn default_partners() -> Vec<Partner> {
    ["Airbus", "Renault", "Toyota", "Stellantis", "OCP", "Al Barid Bank"]
        .into_iter()
        .map(|name| Partner {
            name: name.to_string(),
            logo: None,
            url: None,
        })
        .collect()
}

// ==================== Layout and Icon Hints ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Grid,
    Carousel,
    Single,
    List,
}

impl Layout {
    fn parse(raw: Option<&str>) -> Layout {
        match raw.map(str::trim) {
            Some("carousel") => Layout::Carousel,
            Some("single") => Layout::Single,
            Some("list") => Layout::List,
            _ => Layout::Grid,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Layout::Grid => "grid",
            Layout::Carousel => "carousel",
            Layout::Single => "single",
            Layout::List => "list",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServiceIcon {
    Monitor,
    Briefcase,
    ShieldCheck,
    Zap,
    Database,
    Globe,
}

impl ServiceIcon {
    fn parse(raw: Option<&str>) -> ServiceIcon {
        match raw.map(str::trim) {
            Some("monitor") => ServiceIcon::Monitor,
            Some("briefcase") => ServiceIcon::Briefcase,
            Some("shield-check") => ServiceIcon::ShieldCheck,
            Some("database") => ServiceIcon::Database,
            Some("globe") => ServiceIcon::Globe,
            _ => ServiceIcon::Zap,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            ServiceIcon::Monitor => "monitor",
            ServiceIcon::Briefcase => "briefcase",
            ServiceIcon::ShieldCheck => "shield-check",
            ServiceIcon::Zap => "zap",
            ServiceIcon::Database => "database",
            ServiceIcon::Globe => "globe",
        }
    }
}

// ==================== Helpers ====================

/// Trimmed, non-empty text.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn attribution(role: Option<&str>, company: Option<&str>) -> Option<String> {
    let parts: Vec<&str> = [role, company]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

fn section_heading(
    eyebrow: &Option<String>,
    title: &Option<String>,
    description: &Option<String>,
) -> Markup {
    html! {
        @if present(eyebrow).is_some() || present(title).is_some() || present(description).is_some() {
            header.section__heading {
                @if let Some(eyebrow) = present(eyebrow) {
                    p.eyebrow { (eyebrow) }
                }
                @if let Some(title) = present(title) {
                    h2 { (title) }
                }
                @if let Some(description) = present(description) {
                    p { (description) }
                }
            }
        }
    }
}

pub(crate) fn link_button(link: &Link, class: &str, link_prefix: &str) -> Markup {
    html! {
        a class=(class) href=(href(Some(&link.url), link_prefix))
            target=[link.open_in_new_tab.then_some("_blank")]
            rel=[link.open_in_new_tab.then_some("noopener noreferrer")] {
            (link.text)
        }
    }
}

/// Allow relative, fragment, http(s), mailto and tel links; anything else
/// (e.g. `javascript:`) becomes `#`.
pub(crate) fn safe_href(url: Option<&str>) -> String {
    let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
        return "#".to_string();
    };

    let lower = url.to_ascii_lowercase();
    let allowed = url.starts_with('/')
        || url.starts_with('#')
        || url.starts_with('?')
        || lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:");

    if allowed {
        url.to_string()
    } else {
        "#".to_string()
    }
}

/// A safe href with internal paths moved under `link_prefix`.
pub(crate) fn href(url: Option<&str>, link_prefix: &str) -> String {
    localize_path(&safe_href(url), link_prefix)
}

/// `/about` under `/fr` becomes `/fr/about`; paths already under the prefix,
/// external URLs and fragments are left alone.
pub(crate) fn localize_path(url: &str, link_prefix: &str) -> String {
    let is_internal = url.starts_with('/') && !url.starts_with("//");
    if link_prefix.is_empty() || !is_internal {
        return url.to_string();
    }

    let already_prefixed = url == link_prefix
        || url
            .strip_prefix(link_prefix)
            .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('?') || rest.starts_with('#'));
    if already_prefixed {
        url.to_string()
    } else if url == "/" {
        link_prefix.to_string()
    } else {
        format!("{}{}", link_prefix, url)
    }
}

/// A URL safe to embed inside a single-quoted CSS `url('...')`.
fn css_url(url: &str) -> Option<&str> {
    let unsafe_char = |c: char| matches!(c, '\'' | '"' | '(' | ')' | '\\' | '<' | '>') || c.is_whitespace();
    (!url.is_empty() && !url.contains(unsafe_char)).then_some(url)
}

fn color_regex() -> &'static Regex {
    static COLOR: OnceLock<Regex> = OnceLock::new();
    COLOR.get_or_init(|| {
        Regex::new(r"^(#[0-9a-fA-F]{3,8}|[a-zA-Z]{3,20}|(rgb|rgba|hsl|hsla)\([0-9.,%\s]+\))$")
            .unwrap_or_else(|e| panic!("color regex is invalid: {}", e))
    })
}

/// A CSS color value from content, or `None` if it could smuggle other CSS.
pub(crate) fn safe_color(value: &str) -> Option<&str> {
    let value = value.trim();
    color_regex().is_match(value).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn renderer() -> SectionRenderer {
        SectionRenderer::new("https://cms.example")
    }

    fn section(value: serde_json::Value) -> Section {
        Section::from_value(value)
    }

    // ==================== Registry Tests ====================

    #[test]
    fn test_registry_tags_round_trip() {
        for kind in SectionKind::all() {
            assert_eq!(SectionKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(SectionKind::all().count(), 8);
    }

    #[test]
    fn test_registry_known_tags() {
        assert_eq!(SectionKind::from_tag("sections.hero"), Some(SectionKind::Hero));
        assert_eq!(
            SectionKind::from_tag("sections.services-grid"),
            Some(SectionKind::ServicesGrid)
        );
        assert_eq!(SectionKind::from_tag("component.cta"), Some(SectionKind::Cta));
    }

    #[test]
    fn test_registry_unknown_tags() {
        assert_eq!(SectionKind::from_tag("sections.video"), None);
        assert_eq!(SectionKind::from_tag("hero"), None);
        assert_eq!(SectionKind::from_tag(""), None);
    }

    // ==================== Renderer Tests ====================

    #[test]
    fn test_render_absent_is_empty() {
        assert!(renderer().render(None).is_empty());
    }

    #[test]
    fn test_render_empty_is_empty() {
        assert!(renderer().render(Some(&[])).is_empty());
    }

    #[test]
    fn test_render_skips_unknown_and_keeps_order() {
        let sections = vec![
            section(json!({"__component": "sections.stats"})),
            section(json!({"__component": "sections.video"})),
            section(json!({"__component": "sections.hero", "title": "Hello"})),
            section(json!({"__component": "sections.partners", "partners": 5})),
            section(json!({"__component": "sections.cta", "title": "Go"})),
        ];

        let rendered = renderer().render(Some(&sections));
        let kinds: Vec<SectionKind> = rendered.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![SectionKind::Stats, SectionKind::Hero, SectionKind::Cta]
        );
    }

    #[test]
    fn test_render_one_known_one_unknown() {
        let sections = vec![
            section(json!({"__component": "sections.features", "title": "F"})),
            section(json!({"__component": "sections.nope"})),
        ];
        let rendered = renderer().render(Some(&sections));
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].kind, SectionKind::Features);
    }

    #[test]
    fn test_hero_renders_text_and_escapes() {
        let sections = vec![section(json!({
            "__component": "sections.hero",
            "title": "<script>alert(1)</script>",
            "subtitle": "Sub",
            "ctaText": "Start",
            "ctaLink": "javascript:alert(1)",
            "backgroundImage": "/uploads/bg.jpg"
        }))];
        let html = renderer().render(Some(&sections))[0].markup.clone().into_string();

        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("Sub"));
        assert!(html.contains(r##"href="#""##));
        assert!(html.contains("https://cms.example/uploads/bg.jpg"));
    }

    #[test]
    fn test_hero_default_title() {
        let sections = vec![section(json!({"__component": "sections.hero"}))];
        let html = renderer().render(Some(&sections))[0].markup.clone().into_string();
        assert!(html.contains("Welcome to our platform"));
    }

    #[test]
    fn test_stats_defaults_when_empty() {
        let sections = vec![section(json!({"__component": "sections.stats", "stats": []}))];
        let html = renderer().render(Some(&sections))[0].markup.clone().into_string();
        assert!(html.contains("Projects Delivered"));
        assert!(html.contains("Countries Served"));
    }

    #[test]
    fn test_stats_from_content() {
        let sections = vec![section(json!({
            "__component": "sections.stats",
            "stats": [{"value": "12", "label": "Offices", "suffix": ""}]
        }))];
        let html = renderer().render(Some(&sections))[0].markup.clone().into_string();
        assert!(html.contains("Offices"));
        assert!(!html.contains("Projects Delivered"));
        assert!(!html.contains("stat__suffix"));
    }

    #[test]
    fn test_partners_defaults_and_logos() {
        let html = renderer().render(Some(&[section(json!({"__component": "sections.partners"}))]))[0]
            .markup
            .clone()
            .into_string();
        assert!(html.contains("Airbus"));
        assert!(html.contains("Trusted by Industry Leaders"));

        let html = renderer().render(Some(&[section(json!({
            "__component": "sections.partners",
            "title": "Clients",
            "partners": [{"name": "Acme", "logo": {"data": {"id": 1, "attributes": {"url": "/uploads/acme.svg"}}}}]
        }))]))[0]
            .markup
            .clone()
            .into_string();
        assert!(html.contains("https://cms.example/uploads/acme.svg"));
        assert!(!html.contains("Airbus"));
    }

    #[test]
    fn test_services_grid_icons() {
        let html = renderer().render(Some(&[section(json!({
            "__component": "sections.services-grid",
            "services": [
                {"title": "Data", "icon": "database"},
                {"title": "Other", "icon": "rocket"}
            ]
        }))]))[0]
            .markup
            .clone()
            .into_string();
        assert!(html.contains("icon-database"));
        assert!(html.contains("icon-zap"));
        assert!(html.contains("Make us your"));
    }

    #[test]
    fn test_distinction_defaults() {
        let html = renderer().render(Some(&[section(json!({"__component": "sections.distinction"}))]))[0]
            .markup
            .clone()
            .into_string();
        assert!(html.contains("different?"));
        assert!(html.contains("Operational Excellence"));
    }

    #[test]
    fn test_cta_rejects_unsafe_colors() {
        let html = renderer().render(Some(&[section(json!({
            "__component": "sections.cta",
            "title": "Go",
            "backgroundColor": "red; background: url(evil)",
            "textColor": "#fff"
        }))]))[0]
            .markup
            .clone()
            .into_string();
        assert!(!html.contains("evil"));
        assert!(html.contains("color: #fff"));
    }

    #[test]
    fn test_testimonials_layout_classes() {
        let html = renderer().render(Some(&[section(json!({
            "__component": "sections.testimonials",
            "layout": "carousel",
            "testimonials": [{"quote": "Great", "author": "Sam", "role": "CTO", "company": "Acme"}]
        }))]))[0]
            .markup
            .clone()
            .into_string();
        assert!(html.contains("layout-carousel"));
        assert!(html.contains("CTO, Acme"));
    }

    // ==================== Helper Tests ====================

    #[test]
    fn test_safe_href() {
        assert_eq!(safe_href(Some("/contact")), "/contact");
        assert_eq!(safe_href(Some("https://x.test")), "https://x.test");
        assert_eq!(safe_href(Some("mailto:a@b.com")), "mailto:a@b.com");
        assert_eq!(safe_href(Some("JavaScript:alert(1)")), "#");
        assert_eq!(safe_href(Some("  ")), "#");
        assert_eq!(safe_href(None), "#");
    }

    #[test]
    fn test_localize_path() {
        assert_eq!(localize_path("/about", "/fr"), "/fr/about");
        assert_eq!(localize_path("/", "/fr"), "/fr");
        assert_eq!(localize_path("/fr/about", "/fr"), "/fr/about");
        assert_eq!(localize_path("/fr", "/fr"), "/fr");
        assert_eq!(localize_path("/french-page", "/fr"), "/fr/french-page");
        assert_eq!(localize_path("https://x.test/a", "/fr"), "https://x.test/a");
        assert_eq!(localize_path("#top", "/fr"), "#top");
        assert_eq!(localize_path("/about", ""), "/about");
    }

    #[test]
    fn test_renderer_localizes_section_links() {
        let html = SectionRenderer::new("https://cms.example")
            .with_link_prefix("/fr")
            .render(Some(&[section(json!({
                "__component": "sections.cta",
                "link": {"text": "Contact", "url": "/contact"},
                "secondaryLink": {"text": "Docs", "url": "https://docs.example", "openInNewTab": true}
            }))]))[0]
            .markup
            .clone()
            .into_string();
        assert!(html.contains(r#"href="/fr/contact""#));
        assert!(html.contains(r#"href="https://docs.example" target="_blank""#));
    }

    #[test]
    fn test_safe_color() {
        assert_eq!(safe_color("#3B82F6"), Some("#3B82F6"));
        assert_eq!(safe_color("rebeccapurple"), Some("rebeccapurple"));
        assert_eq!(safe_color("rgba(0, 0, 0, 0.5)"), Some("rgba(0, 0, 0, 0.5)"));
        assert_eq!(safe_color("red;}body{display:none"), None);
    }

    #[test]
    fn test_css_url_rejects_quotes() {
        assert_eq!(css_url("https://x/a.png"), Some("https://x/a.png"));
        assert_eq!(css_url("https://x/a.png');x:("), None);
        assert_eq!(css_url(""), None);
    }
}

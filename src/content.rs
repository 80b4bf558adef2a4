//! Content model: pages, sections, SEO, global settings and contact
//! submissions as delivered by the headless CMS.
//!
//! The CMS wraps entities as `{ "data": { "id": 1, "attributes": { ... } } }`.
//! Custom controllers sometimes return the attributes flattened beside `id`,
//! so [`Entity`] accepts both. Everything except contact submissions is
//! read-only here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::sections::SectionKind;

// ==================== Envelope Types ====================

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Entity<A> {
    Wrapped {
        id: i64,
        attributes: A,
    },
    Flat {
        id: i64,
        #[serde(flatten)]
        attributes: A,
    },
}

impl<A> Entity<A> {
    pub fn into_parts(self) -> (i64, A) {
        match self {
            Entity::Wrapped { id, attributes } | Entity::Flat { id, attributes } => {
                (id, attributes)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de>"))]
pub(crate) struct Relation<A> {
    #[serde(default, deserialize_with = "null_default")]
    pub data: Vec<Entity<A>>,
}

/// Treat an explicit `null` like a missing field.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ==================== Media ====================

/// An uploaded asset. `url` is usually relative to the CMS origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub url: String,
    pub alternative_text: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MediaRepr {
    Url(String),
    Direct {
        url: String,
        #[serde(rename = "alternativeText")]
        alternative_text: Option<String>,
    },
    Relation {
        data: Option<MediaEntity>,
    },
}

#[derive(Deserialize)]
struct MediaEntity {
    attributes: MediaAttributes,
}

#[derive(Deserialize)]
struct MediaAttributes {
    url: String,
    #[serde(rename = "alternativeText")]
    alternative_text: Option<String>,
}

/// Accepts a bare URL string, a flat media object, or a single-media relation.
pub(crate) fn deserialize_media<'de, D>(deserializer: D) -> Result<Option<Media>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = Option::<MediaRepr>::deserialize(deserializer)?;
    let media = repr.and_then(|repr| match repr {
        MediaRepr::Url(url) => Some(Media {
            url,
            alternative_text: None,
        }),
        MediaRepr::Direct {
            url,
            alternative_text,
        } => Some(Media {
            url,
            alternative_text,
        }),
        MediaRepr::Relation { data } => data.map(|entity| Media {
            url: entity.attributes.url,
            alternative_text: entity.attributes.alternative_text,
        }),
    });
    Ok(media.filter(|m| !m.url.trim().is_empty()))
}

// ==================== Shared Components ====================

/// A labelled link. Older content uses `label`/`href` instead of `text`/`url`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Link {
    #[serde(alias = "label")]
    pub text: String,
    #[serde(alias = "href")]
    pub url: String,
    pub open_in_new_tab: bool,
}

// ==================== Section Payloads ====================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeroSection {
    pub title: Option<String>,
    pub title_highlight: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_media")]
    pub background_image: Option<Media>,
    pub cta_text: Option<String>,
    pub cta_link: Option<String>,
    pub secondary_cta_text: Option<String>,
    pub secondary_cta_link: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub cta_buttons: Vec<Link>,
    pub floating_card: Option<FloatingCard>,
    pub show_scroll_indicator: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FloatingCard {
    pub icon: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeaturesSection {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub features: Vec<FeatureItem>,
    pub layout: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureItem {
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    #[serde(deserialize_with = "deserialize_media")]
    pub image: Option<Media>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CtaSection {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub link: Option<Link>,
    pub secondary_link: Option<Link>,
    #[serde(deserialize_with = "deserialize_media")]
    pub background_image: Option<Media>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestimonialsSection {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub testimonials: Vec<Testimonial>,
    pub layout: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Testimonial {
    pub quote: String,
    pub author: String,
    pub role: Option<String>,
    pub company: Option<String>,
    #[serde(deserialize_with = "deserialize_media")]
    pub image: Option<Media>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DistinctionSection {
    pub title: Option<String>,
    pub highlighted_text: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub features: Vec<DistinctionFeature>,
    pub cta_button: Option<Link>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DistinctionFeature {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServicesGridSection {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub services: Vec<ServiceItem>,
    pub cta_button: Option<Link>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceItem {
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsSection {
    pub title: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub stats: Vec<StatItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatItem {
    pub value: String,
    pub label: String,
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartnersSection {
    pub title: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub partners: Vec<Partner>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Partner {
    pub name: String,
    #[serde(deserialize_with = "deserialize_media")]
    pub logo: Option<Media>,
    pub url: Option<String>,
}

// ==================== Section ====================

/// One block of page content, discriminated by its `__component` tag.
///
/// Tags outside the closed set, and known tags whose payload does not parse,
/// are kept as `Unknown`/`Malformed` so the renderer can skip them in place.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Hero(HeroSection),
    Features(FeaturesSection),
    Cta(CtaSection),
    Testimonials(TestimonialsSection),
    Distinction(DistinctionSection),
    ServicesGrid(ServicesGridSection),
    Stats(StatsSection),
    Partners(PartnersSection),
    Unknown { component: String },
    Malformed { component: String, error: String },
}

impl Section {
    /// Decode a raw section object, dispatching on its `__component` tag.
    pub fn from_value(value: Value) -> Section {
        let component = value
            .get("__component")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let Some(kind) = SectionKind::from_tag(&component) else {
            return Section::Unknown { component };
        };

        let parsed = match kind {
            SectionKind::Hero => serde_json::from_value(value).map(Section::Hero),
            SectionKind::Features => serde_json::from_value(value).map(Section::Features),
            SectionKind::Cta => serde_json::from_value(value).map(Section::Cta),
            SectionKind::Testimonials => serde_json::from_value(value).map(Section::Testimonials),
            SectionKind::Distinction => serde_json::from_value(value).map(Section::Distinction),
            SectionKind::ServicesGrid => serde_json::from_value(value).map(Section::ServicesGrid),
            SectionKind::Stats => serde_json::from_value(value).map(Section::Stats),
            SectionKind::Partners => serde_json::from_value(value).map(Section::Partners),
        };

        parsed.unwrap_or_else(|e| Section::Malformed {
            component,
            error: e.to_string(),
        })
    }

    /// The variant kind, or `None` for unknown and malformed sections.
    pub fn kind(&self) -> Option<SectionKind> {
        match self {
            Section::Hero(_) => Some(SectionKind::Hero),
            Section::Features(_) => Some(SectionKind::Features),
            Section::Cta(_) => Some(SectionKind::Cta),
            Section::Testimonials(_) => Some(SectionKind::Testimonials),
            Section::Distinction(_) => Some(SectionKind::Distinction),
            Section::ServicesGrid(_) => Some(SectionKind::ServicesGrid),
            Section::Stats(_) => Some(SectionKind::Stats),
            Section::Partners(_) => Some(SectionKind::Partners),
            Section::Unknown { .. } | Section::Malformed { .. } => None,
        }
    }
}

impl<'de> Deserialize<'de> for Section {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Section::from_value(value))
    }
}

// ==================== SEO ====================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Seo {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Option<String>,
    #[serde(rename = "canonicalURL", alias = "canonicalUrl")]
    pub canonical_url: Option<String>,
    pub meta_robots: Option<String>,
    #[serde(deserialize_with = "deserialize_media")]
    pub meta_image: Option<Media>,
}

// ==================== Page ====================

/// The same page in another locale, used for alternate-language links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedVariant {
    pub locale: String,
    pub slug: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub locale: Option<String>,
    pub sections: Vec<Section>,
    pub seo: Option<Seo>,
    pub updated_at: Option<DateTime<Utc>>,
    pub localizations: Vec<LocalizedVariant>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageAttributes {
    slug: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    locale: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    sections: Vec<Section>,
    #[serde(default)]
    seo: Option<Seo>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    localizations: Option<Relation<LocalizationAttributes>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LocalizationAttributes {
    locale: String,
    slug: String,
}

impl From<Entity<PageAttributes>> for Page {
    fn from(entity: Entity<PageAttributes>) -> Self {
        let (id, attrs) = entity.into_parts();
        let localizations = attrs
            .localizations
            .map(|rel| {
                rel.data
                    .into_iter()
                    .map(|e| {
                        let (_, l) = e.into_parts();
                        LocalizedVariant {
                            locale: l.locale,
                            slug: l.slug,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Page {
            id,
            slug: attrs.slug,
            title: attrs.title,
            locale: attrs.locale,
            sections: attrs.sections,
            seo: attrs.seo,
            updated_at: attrs.updated_at,
            localizations,
        }
    }
}

/// Slug and modification time only, for the sitemap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    pub slug: String,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageSummaryAttributes {
    slug: String,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<Entity<PageSummaryAttributes>> for PageSummary {
    fn from(entity: Entity<PageSummaryAttributes>) -> Self {
        let (_, attrs) = entity.into_parts();
        PageSummary {
            slug: attrs.slug,
            updated_at: attrs.updated_at,
        }
    }
}

// ==================== Global Settings ====================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Navigation {
    #[serde(deserialize_with = "null_default")]
    pub links: Vec<Link>,
    pub cta_button: Option<Link>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FooterColumn {
    pub title: String,
    #[serde(deserialize_with = "null_default")]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Footer {
    pub description: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub columns: Vec<FooterColumn>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
}

/// A named color token, e.g. `primary = #3B82F6`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ThemeToken {
    pub name: String,
    pub value: String,
}

/// Site-wide settings, one per locale.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalSettings {
    pub site_name: Option<String>,
    pub site_description: Option<String>,
    pub navigation: Option<Navigation>,
    pub footer: Option<Footer>,
    #[serde(deserialize_with = "null_default")]
    pub social_links: Vec<SocialLink>,
    #[serde(deserialize_with = "null_default")]
    pub light_theme: Vec<ThemeToken>,
    #[serde(deserialize_with = "null_default")]
    pub dark_theme: Vec<ThemeToken>,
    #[serde(alias = "defaultSeo")]
    pub seo: Option<Seo>,
    pub contact_recipient_email: Option<String>,
    pub smtp_from_name: Option<String>,
    pub smtp_from_email: Option<String>,
    pub copyright_text: Option<String>,
    pub dictionary: Option<Value>,
}

// ==================== Contact Submissions ====================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    New,
    Read,
    Archived,
}

/// Body of a create request; persisted with status `new` and `emailSent` unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub status: SubmissionStatus,
    pub email_sent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub status: SubmissionStatus,
    #[serde(default)]
    pub email_sent: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ContactSubmission {
    /// The record a store would hold right after accepting `new`.
    pub fn from_new(id: i64, new: &NewContactSubmission, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name.clone(),
            email: new.email.clone(),
            subject: new.subject.clone(),
            message: new.message.clone(),
            phone: new.phone.clone(),
            company: new.company.clone(),
            ip_address: new.ip_address.clone(),
            user_agent: new.user_agent.clone(),
            status: new.status,
            email_sent: new.email_sent,
            created_at: Some(created_at),
            updated_at: Some(created_at),
        }
    }
}

impl From<Entity<ContactSubmission>> for ContactSubmission {
    fn from(entity: Entity<ContactSubmission>) -> Self {
        let (id, mut submission) = entity.into_parts();
        submission.id = id;
        submission
    }
}

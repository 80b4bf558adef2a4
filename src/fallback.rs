//! Built-in content used when the CMS has nothing to offer.
//!
//! The home page must never render blank, so it carries a complete section
//! sequence. The contact page only needs a heading above its form.

use crate::content::{
    DistinctionSection, FloatingCard, HeroSection, Link, PartnersSection, Section,
    ServicesGridSection, StatsSection,
};
use crate::sections::{
    default_distinction_features, default_partners, default_services, default_stats,
};
use crate::seo::SeoDefaults;

pub const HOME_SLUG: &str = "home";
pub const CONTACT_SLUG: &str = "contact";

pub const SITE_TITLE: &str = "MENAPS - Integrated Strategic Consulting";
pub const SITE_DESCRIPTION: &str = "Strategic and operational consulting group, with a strong dimension of technological and digital innovation.";

/// Page content that does not come from the CMS.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackPage {
    pub title: String,
    pub sections: Vec<Section>,
    pub seo: SeoDefaults,
}

/// Site-wide metadata defaults, the last layer of every metadata lookup.
pub fn site_defaults() -> SeoDefaults {
    SeoDefaults {
        title: SITE_TITLE.to_string(),
        description: SITE_DESCRIPTION.to_string(),
        keywords: None,
        image: None,
    }
}

fn link(text: &str, url: &str) -> Link {
    Link {
        text: text.to_string(),
        url: url.to_string(),
        open_in_new_tab: false,
    }
}

pub fn home_page() -> FallbackPage {
    let sections = vec![
        Section::Hero(HeroSection {
            title: Some("MENAPS,".to_string()),
            title_highlight: Some("is an integrated".to_string()),
            subtitle: Some(SITE_DESCRIPTION.to_string()),
            cta_buttons: vec![link("Let's talk about it", "/contact")],
            floating_card: Some(FloatingCard {
                icon: Some("AI".to_string()),
                title: Some("Innovation First".to_string()),
                subtitle: Some("Leading the future".to_string()),
            }),
            show_scroll_indicator: true,
            ..HeroSection::default()
        }),
        Section::Distinction(DistinctionSection {
            title: Some("What makes us".to_string()),
            highlighted_text: Some("different?".to_string()),
            description: Some(
                "We combine our business expertise with our technological mastery and data in order to bring you sustainable and innovative solutions."
                    .to_string(),
            ),
            features: default_distinction_features(),
            cta_button: Some(link("Discover our values", "/about")),
        }),
        Section::ServicesGrid(ServicesGridSection {
            title: Some("Make us your".to_string()),
            subtitle: Some("preferred ally".to_string()),
            description: Some(
                "As each company is unique, we are ready to intervene at any stage of the construction process."
                    .to_string(),
            ),
            services: default_services(),
            cta_button: Some(link("Learn more", "/services")),
        }),
        Section::Stats(StatsSection {
            title: None,
            stats: default_stats(),
        }),
        Section::Partners(PartnersSection {
            title: Some("Trusted by Industry Leaders".to_string()),
            partners: default_partners(),
        }),
    ];

    FallbackPage {
        title: "Home".to_string(),
        sections,
        seo: site_defaults(),
    }
}

pub fn contact_page() -> FallbackPage {
    FallbackPage {
        title: "Contact Us".to_string(),
        sections: vec![Section::Hero(HeroSection {
            title: Some("Contact Us".to_string()),
            subtitle: Some("We'd love to hear from you.".to_string()),
            ..HeroSection::default()
        })],
        seo: SeoDefaults {
            title: "Contact Us".to_string(),
            description: "Get in touch with us.".to_string(),
            keywords: None,
            image: None,
        },
    }
}

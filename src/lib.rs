//! MENAPS marketing site.
//!
//! Pages, global settings and contact submissions live in a headless CMS.
//! This crate fetches that content per locale, renders it into HTML through
//! a closed registry of section types, and relays contact form submissions
//! to the CMS and the mail provider.

pub mod cms;
pub mod composer;
pub mod config;
pub mod contact;
pub mod content;
pub mod error;
pub mod fallback;
pub mod i18n;
pub mod layout;
pub mod mailer;
pub mod sections;
pub mod seo;
pub mod server;
pub mod sitemap;

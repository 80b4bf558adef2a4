//! HTTP surface: localized pages, sitemap, health and the contact API.

use anyhow::Result;
use axum::{
    extract::{ConnectInfo, FromRequest, Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use maud::Markup;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::cms::ContentSource;
use crate::composer::{PageComposer, SiteContext};
use crate::config::Config;
use crate::contact::{ContactBody, ContactForm, ContactRelay, MailDefaults, RequestMeta, SubmissionOutcome};
use crate::error::{ContactError, PageError};
use crate::fallback::{self, CONTACT_SLUG, HOME_SLUG};
use crate::i18n::{resolve_dictionary, Locale, LocaleRegistry};
use crate::layout::{contact_form, render_not_found, render_page, LayoutContext};
use crate::mailer::Mailer;
use crate::sitemap;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub locales: Arc<LocaleRegistry>,
    pub site: Arc<SiteContext>,
    pub mail: Arc<MailDefaults>,
    pub content: Arc<dyn ContentSource>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(config: Config, content: Arc<dyn ContentSource>, mailer: Arc<dyn Mailer>) -> Result<Self> {
        let locales = LocaleRegistry::new(config.supported_locales.as_slice(), &config.default_locale)?;
        let site = SiteContext::new(config.cms_url.clone(), config.public_url.clone());
        let mail = MailDefaults::from_config(&config);

        Ok(Self {
            config: Arc::new(config),
            locales: Arc::new(locales),
            site: Arc::new(site),
            mail: Arc::new(mail),
            content,
            mailer,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_redirect))
        .route("/health", get(health))
        .route("/sitemap.xml", get(sitemap_xml))
        .route("/api/contact", post(submit_contact))
        .route("/:locale", get(home_page))
        .route("/:locale/:slug", get(page))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ==================== Handlers ====================

async fn root_redirect(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.locales.default_locale().path_prefix())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn sitemap_xml(State(state): State<AppState>) -> Response {
    let xml = sitemap::generate(
        state.content.as_ref(),
        state.locales.list_supported(),
        &state.config.public_url,
    )
    .await;

    ([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], xml).into_response()
}

#[derive(Debug, Default, Deserialize)]
struct PageQuery {
    /// Outcome of a browser contact submission, set by the redirect back
    status: Option<String>,
}

async fn home_page(State(state): State<AppState>, Path(locale): Path<String>) -> Response {
    render_route(&state, &locale, HOME_SLUG, None).await
}

async fn page(
    State(state): State<AppState>,
    Path((locale, slug)): Path<(String, String)>,
    query: Option<Query<PageQuery>>,
) -> Response {
    let status = query
        .and_then(|Query(q)| q.status)
        .and_then(|s| SubmissionOutcome::parse(&s));
    render_route(&state, &locale, &slug, status).await
}

async fn render_route(
    state: &AppState,
    requested_locale: &str,
    slug: &str,
    status: Option<SubmissionOutcome>,
) -> Response {
    let (locale, exact) = state.locales.resolve_exact(requested_locale);
    if !exact {
        debug!("Locale '{}' not supported, redirecting to {}", requested_locale, locale);
        let target = if slug == HOME_SLUG {
            locale.path_prefix()
        } else {
            format!("{}/{}", locale.path_prefix(), slug)
        };
        return Redirect::temporary(&target).into_response();
    }

    let composer = PageComposer::new(state.content.as_ref(), &state.site);
    let (composed, extra) = if slug == CONTACT_SLUG {
        let composed = composer
            .compose_page_or(slug, &locale, fallback::contact_page())
            .await;
        (composed, true)
    } else {
        match composer.compose_page(slug, &locale).await {
            Ok(composed) => (composed, false),
            Err(PageError::NotFound { .. }) => return not_found(state, &locale).await,
        }
    };

    let dictionary = resolve_dictionary(
        state.config.dictionary_source,
        composed.settings.as_ref(),
        &locale,
    );
    let ctx = LayoutContext {
        locales: state.locales.list_supported(),
        dictionary: &dictionary,
    };
    let after_sections = extra.then(|| contact_form(&dictionary, &locale, status));

    render_page(&composed, &ctx, after_sections).into_response()
}

async fn not_found(state: &AppState, locale: &Locale) -> Response {
    let settings = state.content.fetch_global_settings(locale).await;
    let dictionary = resolve_dictionary(state.config.dictionary_source, settings.as_ref(), locale);
    let ctx = LayoutContext {
        locales: state.locales.list_supported(),
        dictionary: &dictionary,
    };
    let markup: Markup = render_not_found(locale, settings.as_ref(), &ctx);
    (StatusCode::NOT_FOUND, markup).into_response()
}

async fn submit_contact(State(state): State<AppState>, request: Request) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let meta = request_meta(request.headers(), peer);
    let wants_json = wants_json(request.headers());

    let form = match parse_contact_form(request, &state).await {
        Ok(form) => form,
        Err(response) => return response,
    };
    let locale = state.locales.resolve(form.locale.as_deref().unwrap_or_default());

    let relay = ContactRelay::new(
        state.content.as_ref(),
        state.mailer.as_ref(),
        &state.mail,
        state.locales.default_locale(),
    );
    let result = relay.submit(form, meta).await;

    // Plain HTML form posts go back to the contact page with the outcome.
    if !wants_json {
        let target = format!(
            "{}/{}?status={}",
            locale.path_prefix(),
            CONTACT_SLUG,
            SubmissionOutcome::of(&result).as_str()
        );
        return Redirect::to(&target).into_response();
    }

    match result {
        Ok(confirmation) => (
            StatusCode::CREATED,
            Json(json!({
                "data": confirmation.submission,
                "message": "Message sent successfully!",
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

fn header_contains(headers: &HeaderMap, name: header::HeaderName, needle: &str) -> bool {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains(needle))
}

/// JSON bodies, or clients asking for JSON, get JSON responses.
fn wants_json(headers: &HeaderMap) -> bool {
    header_contains(headers, header::CONTENT_TYPE, "application/json")
        || header_contains(headers, header::ACCEPT, "application/json")
}

/// JSON bodies by content type (bare or under `data`), form-encoded otherwise.
async fn parse_contact_form(request: Request, state: &AppState) -> Result<ContactForm, Response> {
    let is_json = header_contains(request.headers(), header::CONTENT_TYPE, "application/json");

    let parsed = if is_json {
        Json::<ContactBody>::from_request(request, state)
            .await
            .map(|Json(body)| body.into_form())
            .map_err(|rejection| rejection.body_text())
    } else {
        Form::<ContactForm>::from_request(request, state)
            .await
            .map(|Form(form)| form)
            .map_err(|rejection| rejection.body_text())
    };

    parsed.map_err(|reason| {
        warn!("Rejected contact request body: {}", reason);
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Invalid request body" })),
        )
            .into_response()
    })
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        match self {
            ContactError::Validation(error) => {
                let errors: HashMap<&str, Vec<String>> =
                    HashMap::from([(error.field.as_str(), vec![error.message])]);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "errors": errors, "message": "Validation Error" })),
                )
                    .into_response()
            }
            ContactError::Persist(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Failed to submit form" })),
            )
                .into_response(),
        }
    }
}

/// Client IP from the first `X-Forwarded-For` hop, else the socket peer.
fn request_meta(headers: &HeaderMap, peer: Option<SocketAddr>) -> RequestMeta {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string);

    RequestMeta {
        ip_address: forwarded.or_else(|| peer.map(|addr| addr.ip().to_string())),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_meta_prefers_forwarded_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9, 10.0.0.1"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.0"));
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();

        let meta = request_meta(&headers, Some(peer));
        assert_eq!(meta.ip_address.as_deref(), Some("203.0.113.9"));
        assert_eq!(meta.user_agent.as_deref(), Some("curl/8.0"));
    }

    #[test]
    fn test_request_meta_falls_back_to_peer() {
        let peer: SocketAddr = "192.0.2.4:443".parse().unwrap();
        let meta = request_meta(&HeaderMap::new(), Some(peer));
        assert_eq!(meta.ip_address.as_deref(), Some("192.0.2.4"));
        assert_eq!(meta.user_agent, None);
    }

    #[test]
    fn test_wants_json() {
        let mut headers = HeaderMap::new();
        assert!(!wants_json(&headers));

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/x-www-form-urlencoded"));
        assert!(!wants_json(&headers));

        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json, text/plain"));
        assert!(wants_json(&headers));

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
        assert!(wants_json(&headers));
    }

    #[test]
    fn test_request_meta_without_anything() {
        assert_eq!(request_meta(&HeaderMap::new(), None), RequestMeta::default());
    }
}

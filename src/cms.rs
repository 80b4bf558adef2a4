//! Content client for the headless CMS REST API.
//!
//! Reads (pages, global settings, page listings) never fail loudly: any
//! transport, status or decode problem is logged as a [`ContentError`] and
//! reported as absent content, so callers can fall back. Writes (contact
//! submissions) propagate their errors.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::content::{
    ContactSubmission, Entity, Envelope, GlobalSettings, NewContactSubmission, Page,
    PageAttributes, PageSummary, PageSummaryAttributes,
};
use crate::error::ContentError;
use crate::i18n::Locale;

const PAGES_PATH: &str = "/api/pages";
const GLOBAL_SETTINGS_PATH: &str = "/api/global-setting";
const SUBMISSIONS_PATH: &str = "/api/contact-submissions";

/// Page size used when listing pages for the sitemap.
const LIST_PAGE_SIZE: u32 = 100;
/// Hard stop for listing pagination.
const MAX_LIST_PAGES: u32 = 50;

/// Read/write access to site content.
///
/// [`CmsClient`] is the production implementation; tests substitute their own.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// The page with `slug` in `locale`, or `None` when it does not exist or
    /// could not be fetched.
    async fn fetch_page_by_slug(&self, slug: &str, locale: &Locale) -> Option<Page>;

    async fn fetch_global_settings(&self, locale: &Locale) -> Option<GlobalSettings>;

    /// Every published page in `locale`, or `None` when the listing failed.
    async fn list_pages(&self, locale: &Locale) -> Option<Vec<PageSummary>>;

    async fn create_contact_submission(
        &self,
        submission: &NewContactSubmission,
    ) -> Result<ContactSubmission>;

    async fn mark_email_sent(&self, id: i64) -> Result<()>;
}

pub struct CmsClient {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de>"))]
struct ListResponse<A> {
    #[serde(default)]
    data: Vec<Entity<A>>,
    #[serde(default)]
    meta: Option<ListMeta>,
}

#[derive(Debug, Deserialize)]
struct ListMeta {
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pagination {
    page: u32,
    page_count: u32,
}

impl CmsClient {
    pub fn new(
        base_url: impl Into<String>,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build CMS HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.cms_url.clone(),
            config.cms_api_token.clone(),
            config.cms_timeout,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let request = self.client.request(method, url);
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ContentError> {
        let unavailable = |reason: String| ContentError::Unavailable {
            path: path.to_string(),
            reason,
        };

        let response = self
            .request(reqwest::Method::GET, path)
            .query(query)
            .send()
            .await
            .map_err(|e| unavailable(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(unavailable(format!("CMS API error ({}): {}", status, body)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| unavailable(format!("invalid response body: {}", e)))
    }

    async fn list_pages_inner(&self, locale: &Locale) -> Result<Vec<PageSummary>, ContentError> {
        let mut summaries = Vec::new();
        let mut page = 1;

        loop {
            let query = [
                ("locale", locale.code().to_string()),
                ("fields[0]", "slug".to_string()),
                ("fields[1]", "updatedAt".to_string()),
                ("pagination[page]", page.to_string()),
                ("pagination[pageSize]", LIST_PAGE_SIZE.to_string()),
            ];
            let response: ListResponse<PageSummaryAttributes> =
                self.get_json(PAGES_PATH, &query).await?;

            summaries.extend(response.data.into_iter().map(PageSummary::from));

            let page_count = response
                .meta
                .and_then(|m| m.pagination)
                .map(|p| p.page_count.max(p.page))
                .unwrap_or(page);
            if page >= page_count {
                break;
            }
            if page >= MAX_LIST_PAGES {
                warn!(
                    "Page listing for {} stopped at {} of {} result pages, sitemap is truncated",
                    locale, page, page_count
                );
                break;
            }
            page += 1;
        }

        Ok(summaries)
    }
}

fn page_query(slug: &str, locale: &Locale) -> Vec<(&'static str, String)> {
    vec![
        ("filters[slug][$eq]", slug.to_string()),
        ("locale", locale.code().to_string()),
        ("populate[sections][populate]", "*".to_string()),
        ("populate[seo][populate]", "*".to_string()),
        ("populate[localizations][fields][0]", "slug".to_string()),
        ("populate[localizations][fields][1]", "locale".to_string()),
    ]
}

fn settings_query(locale: &Locale) -> Vec<(&'static str, String)> {
    vec![
        ("locale", locale.code().to_string()),
        ("populate[navigation][populate]", "*".to_string()),
        ("populate[footer][populate][columns][populate]", "*".to_string()),
        ("populate[socialLinks]", "*".to_string()),
        ("populate[lightTheme]", "*".to_string()),
        ("populate[darkTheme]", "*".to_string()),
        ("populate[seo][populate]", "*".to_string()),
    ]
}

#[async_trait]
impl ContentSource for CmsClient {
    async fn fetch_page_by_slug(&self, slug: &str, locale: &Locale) -> Option<Page> {
        let result: Result<ListResponse<PageAttributes>, ContentError> =
            self.get_json(PAGES_PATH, &page_query(slug, locale)).await;

        match result {
            Ok(response) => {
                let page = response.data.into_iter().next().map(Page::from);
                if page.is_none() {
                    debug!("No page '{}' in locale {}", slug, locale);
                }
                page
            }
            Err(e) => {
                warn!("Failed to fetch page '{}' ({}): {}", slug, locale, e);
                None
            }
        }
    }

    async fn fetch_global_settings(&self, locale: &Locale) -> Option<GlobalSettings> {
        let result: Result<Envelope<Option<Entity<GlobalSettings>>>, ContentError> = self
            .get_json(GLOBAL_SETTINGS_PATH, &settings_query(locale))
            .await;

        match result {
            Ok(envelope) => envelope.data.map(|entity| entity.into_parts().1),
            Err(e) => {
                warn!("Failed to fetch global settings ({}): {}", locale, e);
                None
            }
        }
    }

    async fn list_pages(&self, locale: &Locale) -> Option<Vec<PageSummary>> {
        match self.list_pages_inner(locale).await {
            Ok(pages) => {
                debug!("Listed {} pages for locale {}", pages.len(), locale);
                Some(pages)
            }
            Err(e) => {
                warn!("Failed to list pages ({}): {}", locale, e);
                None
            }
        }
    }

    async fn create_contact_submission(
        &self,
        submission: &NewContactSubmission,
    ) -> Result<ContactSubmission> {
        let response = self
            .request(reqwest::Method::POST, SUBMISSIONS_PATH)
            .json(&json!({ "data": submission }))
            .send()
            .await
            .context("Failed to send contact submission to CMS")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("CMS API error ({}): {}", status, body);
        }

        let envelope: Envelope<Entity<ContactSubmission>> = response
            .json()
            .await
            .context("Failed to parse contact submission response")?;
        let created = ContactSubmission::from(envelope.data);

        info!("Stored contact submission {}", created.id);
        Ok(created)
    }

    async fn mark_email_sent(&self, id: i64) -> Result<()> {
        let response = self
            .request(reqwest::Method::PUT, &format!("{}/{}", SUBMISSIONS_PATH, id))
            .json(&json!({ "data": { "emailSent": true } }))
            .send()
            .await
            .context("Failed to update contact submission")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("CMS API error ({}): {}", status, body);
        }

        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Section, SubmissionStatus};
    use crate::i18n::LocaleRegistry;
    use wiremock::{
        matchers::{body_partial_json, header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    // ==================== Helper Functions ====================

    fn client(server: &MockServer, token: Option<&str>) -> CmsClient {
        CmsClient::new(
            server.uri(),
            token.map(String::from),
            Duration::from_secs(2),
        )
        .expect("client builds")
    }

    fn locale(code: &str) -> Locale {
        LocaleRegistry::new(&["en", "fr"], "en")
            .expect("valid registry")
            .resolve(code)
    }

    fn new_submission() -> NewContactSubmission {
        NewContactSubmission {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            subject: "Hello".to_string(),
            message: "I would like a quote.".to_string(),
            phone: None,
            company: Some("Analytical".to_string()),
            ip_address: Some("10.0.0.1".to_string()),
            user_agent: None,
            status: SubmissionStatus::New,
            email_sent: false,
        }
    }

    // ==================== Page Tests ====================

    #[tokio::test]
    async fn test_fetch_page_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pages"))
            .and(query_param("filters[slug][$eq]", "about"))
            .and(query_param("locale", "fr"))
            .and(header("Authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "id": 3,
                    "attributes": {
                        "slug": "about",
                        "title": "À propos",
                        "locale": "fr",
                        "sections": [
                            {"__component": "sections.hero", "title": "Bonjour"},
                            {"__component": "sections.map"}
                        ],
                        "seo": {"metaTitle": "À propos de nous"}
                    }
                }],
                "meta": {"pagination": {"page": 1, "pageSize": 25, "pageCount": 1, "total": 1}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = client(&server, Some("secret"))
            .fetch_page_by_slug("about", &locale("fr"))
            .await
            .expect("page should be found");

        assert_eq!(page.id, 3);
        assert_eq!(page.slug, "about");
        assert_eq!(page.sections.len(), 2);
        assert!(matches!(page.sections[0], Section::Hero(_)));
        assert!(matches!(page.sections[1], Section::Unknown { .. }));
        assert_eq!(
            page.seo.and_then(|s| s.meta_title).as_deref(),
            Some("À propos de nous")
        );
    }

    #[tokio::test]
    async fn test_fetch_page_empty_result_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let page = client(&server, None)
            .fetch_page_by_slug("missing", &locale("en"))
            .await;
        assert!(page.is_none());
    }

    #[tokio::test]
    async fn test_fetch_page_server_error_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pages"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let page = client(&server, None)
            .fetch_page_by_slug("home", &locale("en"))
            .await;
        assert!(page.is_none());
    }

    #[tokio::test]
    async fn test_fetch_page_invalid_json_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pages"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let page = client(&server, None)
            .fetch_page_by_slug("home", &locale("en"))
            .await;
        assert!(page.is_none());
    }

    #[tokio::test]
    async fn test_fetch_page_unreachable_is_none() {
        let client = CmsClient::new("http://127.0.0.1:1", None, Duration::from_millis(500))
            .expect("client builds");
        assert!(client.fetch_page_by_slug("home", &locale("en")).await.is_none());
    }

    // ==================== Global Settings Tests ====================

    #[tokio::test]
    async fn test_fetch_global_settings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/global-setting"))
            .and(query_param("locale", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "id": 1,
                    "attributes": {
                        "siteName": "MENAPS",
                        "contactRecipientEmail": "team@menaps.test",
                        "dictionary": {"nav": {"home": "Home"}}
                    }
                }
            })))
            .mount(&server)
            .await;

        let settings = client(&server, None)
            .fetch_global_settings(&locale("en"))
            .await
            .expect("settings present");
        assert_eq!(settings.site_name.as_deref(), Some("MENAPS"));
        assert_eq!(
            settings.contact_recipient_email.as_deref(),
            Some("team@menaps.test")
        );
        assert!(settings.dictionary.is_some());
    }

    #[tokio::test]
    async fn test_fetch_global_settings_null_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/global-setting"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": null})))
            .mount(&server)
            .await;

        assert!(client(&server, None)
            .fetch_global_settings(&locale("en"))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_fetch_global_settings_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/global-setting"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert!(client(&server, None)
            .fetch_global_settings(&locale("fr"))
            .await
            .is_none());
    }

    // ==================== Listing Tests ====================

    #[tokio::test]
    async fn test_list_pages_follows_pagination() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pages"))
            .and(query_param("pagination[page]", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"id": 1, "attributes": {"slug": "home", "updatedAt": "2024-05-01T10:00:00.000Z"}}
                ],
                "meta": {"pagination": {"page": 1, "pageCount": 2}}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/pages"))
            .and(query_param("pagination[page]", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": 2, "attributes": {"slug": "about"}}],
                "meta": {"pagination": {"page": 2, "pageCount": 2}}
            })))
            .mount(&server)
            .await;

        let pages = client(&server, None)
            .list_pages(&locale("en"))
            .await
            .expect("listing succeeds");
        let slugs: Vec<&str> = pages.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["home", "about"]);
        assert!(pages[0].updated_at.is_some());
        assert!(pages[1].updated_at.is_none());
    }

    #[tokio::test]
    async fn test_list_pages_stops_at_page_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": 1, "attributes": {"slug": "about"}}],
                "meta": {"pagination": {"page": 1, "pageCount": 500}}
            })))
            .expect(u64::from(MAX_LIST_PAGES))
            .mount(&server)
            .await;

        let pages = client(&server, None)
            .list_pages(&locale("en"))
            .await
            .expect("listing succeeds");
        assert_eq!(pages.len(), MAX_LIST_PAGES as usize);
    }

    #[tokio::test]
    async fn test_list_pages_failure_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pages"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert!(client(&server, None).list_pages(&locale("en")).await.is_none());
    }

    // ==================== Submission Tests ====================

    #[tokio::test]
    async fn test_create_contact_submission() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/contact-submissions"))
            .and(body_partial_json(json!({
                "data": {
                    "name": "Ada",
                    "email": "ada@example.com",
                    "status": "new",
                    "emailSent": false,
                    "ipAddress": "10.0.0.1"
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "id": 42,
                    "attributes": {
                        "name": "Ada",
                        "email": "ada@example.com",
                        "subject": "Hello",
                        "message": "I would like a quote.",
                        "company": "Analytical",
                        "status": "new",
                        "emailSent": false,
                        "createdAt": "2024-05-01T10:00:00.000Z"
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = client(&server, None)
            .create_contact_submission(&new_submission())
            .await
            .expect("submission stored");
        assert_eq!(created.id, 42);
        assert_eq!(created.status, SubmissionStatus::New);
        assert!(!created.email_sent);
    }

    #[tokio::test]
    async fn test_create_contact_submission_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/contact-submissions"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad"))
            .mount(&server)
            .await;

        let err = client(&server, None)
            .create_contact_submission(&new_submission())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("400"));
    }

    #[tokio::test]
    async fn test_mark_email_sent() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/contact-submissions/42"))
            .and(body_partial_json(json!({"data": {"emailSent": true}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": 42}})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server, None)
            .mark_email_sent(42)
            .await
            .expect("update succeeds");
    }
}

//! Outbound email boundary.
//!
//! Mail is handed to an HTTP relay as JSON. Without `MAIL_API_URL` the site
//! runs with a disabled mailer whose sends fail, which the contact relay
//! logs and otherwise ignores.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Config;

/// One message with plain-text and HTML bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub from_email: String,
    pub from_name: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    from: Address<'a>,
    to: Vec<Address<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<Address<'a>>,
    subject: &'a str,
    text: &'a str,
    html: &'a str,
}

impl<'a> From<&'a OutboundEmail> for SendRequest<'a> {
    fn from(email: &'a OutboundEmail) -> Self {
        SendRequest {
            from: Address {
                email: &email.from_email,
                name: Some(&email.from_name),
            },
            to: vec![Address {
                email: &email.to,
                name: None,
            }],
            reply_to: email.reply_to.as_deref().map(|email| Address { email, name: None }),
            subject: &email.subject,
            text: &email.text,
            html: &email.html,
        }
    }
}

/// Sends mail through an HTTP mail relay.
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_token: Option<String>,
}

impl HttpMailer {
    pub fn new(api_url: impl Into<String>, api_token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build mail HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_token,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        let mut request = self.client.post(&self.api_url).json(&SendRequest::from(email));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .context("Failed to send request to mail API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Mail API error ({}): {}", status, body);
        }

        info!("Email '{}' sent to {}", email.subject, email.to);
        Ok(())
    }
}

/// Used when no mail relay is configured; every send fails.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        debug!("Dropping email '{}' to {}", email.subject, email.to);
        anyhow::bail!("Outbound mail is not configured (MAIL_API_URL not set)")
    }
}

pub fn from_config(config: &Config) -> Result<Arc<dyn Mailer>> {
    match &config.mail_api_url {
        Some(url) => Ok(Arc::new(HttpMailer::new(
            url.clone(),
            config.mail_api_token.clone(),
            config.cms_timeout,
        )?)),
        None => {
            info!("MAIL_API_URL not set, outbound mail disabled");
            Ok(Arc::new(DisabledMailer))
        }
    }
}
